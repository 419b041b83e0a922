// Procedure runs end to end

use gramtrace::controller::{Controller, ControllerConfig, StepListener};
use gramtrace::grammar::{Grammar, GrammarData, PlainGrammar};
use gramtrace::procedures::Procedure;
use gramtrace::snapshot::Snapshot;
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

const UNREDUCED: &str = r#"{
    "N": ["S", "A", "B", "C", "D"],
    "T": ["a", "b", "c"],
    "P": {
        "S": ["A B", "a A", "S"],
        "A": ["a A", "c"],
        "B": ["b B"],
        "C": ["c", "C"],
        "D": ["A"]
    },
    "S": "S"
}"#;

fn run(procedure: Procedure, config: ControllerConfig) -> Controller {
    let plain: PlainGrammar = serde_json::from_str(UNREDUCED).expect("Invalid grammar JSON");
    let grammar = Grammar::from_plain(plain).expect("Invalid grammar");
    let mut c = Controller::new(Snapshot::new(grammar), procedure.program(), config);
    c.execute().expect("Run failed");
    c
}

#[derive(Clone, Default)]
struct Counter(Rc<RefCell<(usize, bool)>>);

impl StepListener for Counter {
    fn on_step(&mut self, _label: &str, _name: &str) {
        self.0.borrow_mut().0 += 1;
    }

    fn on_finished(&mut self) {
        self.0.borrow_mut().1 = true;
    }
}

#[test]
fn test_reduce_unreduced_grammar() {
    let c = run(Procedure::Reduce, ControllerConfig::default());
    let last = c.final_snapshot().unwrap().materialize().unwrap();

    // B never terminates; C and D are unreachable
    let rules: Vec<String> = last.grammar.rules().map(|r| r.to_string()).collect();
    assert_eq!(rules, vec!["S -> a A", "A -> a A", "A -> c"]);
    assert!(Procedure::Reduce.check(&last.grammar));

    let nonterminals: Vec<&str> = last.grammar.nonterminals().map(|n| n.name()).collect();
    assert_eq!(nonterminals, vec!["S", "A"]);
}

#[test]
fn test_remove_loops_then_check() {
    let c = run(Procedure::RemoveLoops, ControllerConfig::default());
    let last = c.final_snapshot().unwrap().materialize().unwrap();
    assert!(Procedure::RemoveLoops.check(&last.grammar));
    assert_eq!(last.grammar.rule_count(), 7);
}

#[test]
fn test_batch_size_does_not_change_the_run() {
    let small = run(Procedure::Reduce, ControllerConfig::new().batch_steps(1));
    let large = run(Procedure::Reduce, ControllerConfig::new().batch_steps(1000));
    assert_eq!(small.steps(), large.steps());
    assert_eq!(small.final_snapshot(), large.final_snapshot());
}

#[test]
fn test_listener_sees_every_step() {
    let plain: PlainGrammar = serde_json::from_str(UNREDUCED).unwrap();
    let grammar = Grammar::from_plain(plain).unwrap();
    let mut c = Controller::new(
        Snapshot::new(grammar),
        Procedure::Reduce.program(),
        ControllerConfig::default(),
    );
    let counter = Counter::default();
    c.set_listener(Box::new(counter.clone()));
    c.execute().unwrap();

    let (steps, finished) = *counter.0.borrow();
    assert_eq!(steps, c.timeline().len());
    assert!(finished);
}

#[test]
fn test_final_snapshot_loads_as_input() {
    let c = run(Procedure::RemoveLoops, ControllerConfig::default());
    let json = serde_json::to_string(c.final_snapshot().unwrap()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let data: GrammarData = serde_json::from_value(value["grammar"].clone()).unwrap();
    let grammar = Grammar::from_data(&data).unwrap();
    assert_eq!(grammar.start(), "S");
}
