//! Loop removal: deletes every `A -> A` production, one per step

use crate::controller::{Controller, Program};
use crate::error::Result;
use crate::grammar::{Grammar, Rule, RuleKey};
use std::collections::VecDeque;

const QUEUE: &str = "remove_loops/queue";
const HAD_LOOPS: &str = "had_loops";

pub fn program() -> Program {
    Program::new(main)
}

/// True when the grammar has no `A -> A` production
pub fn check(grammar: &Grammar) -> bool {
    !grammar.rules().any(is_loop)
}

fn is_loop(rule: &Rule) -> bool {
    rule.right().len() == 1 && rule.right().contains(rule.left())
}

fn main(c: &mut Controller) -> Result<()> {
    c.set_name("remove loops")?;
    c.structures_mut()?.symbol_set(HAD_LOOPS, "Had loops")?;

    let queue: VecDeque<RuleKey> = c
        .grammar()?
        .rules()
        .filter(|rule| is_loop(rule))
        .map(|rule| rule.key().clone())
        .collect();
    let pending = !queue.is_empty();
    c.data_mut().insert(QUEUE, queue);

    if pending {
        c.schedule(Program::new(remove_single))?;
    }
    c.schedule(Program::new(|c| c.set_name("done")))?;
    Ok(())
}

fn remove_single(c: &mut Controller) -> Result<()> {
    let (snapshot, data) = c.parts_mut()?;
    let queue = data.get_or_insert_with(QUEUE, VecDeque::<RuleKey>::new);
    let Some(key) = queue.pop_front() else {
        return Ok(());
    };
    let more = !queue.is_empty();

    snapshot
        .structures
        .symbol_set(HAD_LOOPS, "Had loops")?
        .add(key.left.as_str());
    snapshot.grammar.remove_rule(&key)?;

    c.set_name(format!("remove the production {}", key))?;
    if more {
        c.request_repeat()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ControllerConfig;
    use crate::grammar::PlainGrammar;
    use crate::snapshot::Snapshot;
    use pretty_assertions::assert_eq;

    fn grammar() -> Grammar {
        let rules = [
            ("S", vec!["S", "A", "a"]),
            ("A", vec!["A", "b A"]),
        ]
        .into_iter()
        .map(|(left, rights)| {
            (
                left.to_string(),
                rights.into_iter().map(str::to_string).collect(),
            )
        })
        .collect();
        Grammar::from_plain(PlainGrammar {
            nonterminals: vec!["S".into(), "A".into()],
            terminals: vec!["a".into(), "b".into()],
            rules,
            start: "S".into(),
        })
        .unwrap()
    }

    #[test]
    fn test_one_step_per_loop() {
        let mut c = Controller::new(
            Snapshot::new(grammar()),
            program(),
            ControllerConfig::default(),
        );
        c.execute().unwrap();

        let names: Vec<String> = c
            .timeline()
            .chronological()
            .map(|id| c.timeline().node(id).unwrap().name().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "remove loops",
                "this is the initial state of the algorithm",
                "remove the production S -> S",
                "remove the production A -> A",
                "done",
            ]
        );

        let last = c.final_snapshot().unwrap().materialize().unwrap();
        assert!(check(&last.grammar));
        let had_loops: Vec<&str> = last
            .structures
            .get_symbol_set(HAD_LOOPS)
            .unwrap()
            .items()
            .collect();
        assert_eq!(had_loops, vec!["A", "S"]);
    }

    #[test]
    fn test_no_loops_means_no_removal_steps() {
        let mut g = grammar();
        g.remove_rule(&RuleKey::new("S", crate::grammar::Word::parse("S")))
            .unwrap();
        g.remove_rule(&RuleKey::new("A", crate::grammar::Word::parse("A")))
            .unwrap();
        g.finalize().unwrap();
        assert!(check(&g));

        let mut c = Controller::new(Snapshot::new(g), program(), ControllerConfig::default());
        c.execute().unwrap();
        assert_eq!(c.steps(), 3);
    }
}
