//! Step controller
//!
//! The [`Controller`] owns the [`Timeline`] and drives it one node at a time:
//!
//! 1. compute the node's label and materialize its state;
//! 2. run its [`Program`], which may schedule children, name the step,
//!    request a repeat or install a hook;
//! 3. duplicate the node if a repeat was requested;
//! 4. keep a record of the state as the step left it, then finalize the state
//!    and hand it to the chronologically next node;
//! 5. run the hook against that handed-over state;
//! 6. notify the [`StepListener`].
//!
//! Execution is cooperative: [`Controller::resume`] returns after
//! [`ControllerConfig::batch_steps`] steps so a host loop can stay responsive.
//! Stopping a run is simply not resuming it.

mod aux_data;
mod config;
mod program;

pub use aux_data::AuxData;
pub use config::ControllerConfig;
pub use program::{Program, StepListener};

use crate::constants::INITIAL_STEP_NAME;
use crate::error::{EngineError, Result};
use crate::grammar::Grammar;
use crate::snapshot::{Snapshot, SnapshotData, SnapshotState};
use crate::structures::Structures;
use crate::timeline::{NodeId, NodeStatus, Timeline};
use tracing::{debug, info, trace, warn};

/// What the controller is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Between steps
    Idle,
    /// A node's program is executing
    Running,
    /// A node's hook is executing
    Hook,
    /// No step is left
    Finished,
    /// A step failed
    Aborted,
}

/// Outcome of [`Controller::resume`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// A batch boundary was reached; more steps remain
    Yielded,
    Finished,
}

/// Runs step programs and records every step in a timeline
pub struct Controller {
    /// Every step, executed or scheduled
    timeline: Timeline,

    /// The node being executed, or the next one to execute
    current: NodeId,

    phase: Phase,

    /// Scratch data that outlives single steps
    data: AuxData,

    /// Number of executed steps
    steps: usize,

    config: ControllerConfig,

    listener: Option<Box<dyn StepListener>>,

    /// State handed over by the last step, once the run is complete
    final_state: SnapshotState,
}

impl Controller {
    /// Create a controller whose root step first records the initial state as
    /// its own step, then runs `main`
    pub fn new(initial: Snapshot, main: Program, config: ControllerConfig) -> Self {
        let root = Program::new(move |c| {
            c.schedule(Program::new(|c| c.set_name(INITIAL_STEP_NAME)))?;
            main.call(c)
        });
        Self::with_root(initial, root, config)
    }

    /// Create a controller running `root` directly as the root step
    pub fn with_root(initial: Snapshot, root: Program, config: ControllerConfig) -> Self {
        let timeline = Timeline::new(root, SnapshotState::Live(initial));
        Controller {
            current: timeline.root(),
            timeline,
            phase: Phase::Idle,
            data: AuxData::new(),
            steps: 0,
            config,
            listener: None,
            final_state: SnapshotState::Pending,
        }
    }

    pub fn set_listener(&mut self, listener: Box<dyn StepListener>) {
        self.listener = Some(listener);
    }

    // ========== Program-facing operations ==========

    /// Append a child step to the running step
    pub fn schedule(&mut self, program: Program) -> Result<NodeId> {
        self.require_running("schedule")?;
        let child = self.timeline.adopt(self.current, program)?;
        trace!(parent = %self.current, child = %child, "scheduled step");
        Ok(child)
    }

    /// Run `program` after the running step has been archived; the last call wins
    pub fn schedule_hook(&mut self, program: Program) -> Result<()> {
        self.require_running("schedule_hook")?;
        self.timeline.node_mut(self.current)?.hook = Some(program);
        Ok(())
    }

    /// Execute the running step's program once more, as a new sibling
    pub fn request_repeat(&mut self) -> Result<()> {
        self.require_running("request_repeat")?;
        self.timeline.node_mut(self.current)?.repeat = true;
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        self.require_running("set_name")?;
        self.timeline.node_mut(self.current)?.set_name(name.into());
        Ok(())
    }

    fn require_running(&self, operation: &'static str) -> Result<()> {
        if self.phase == Phase::Running {
            Ok(())
        } else {
            Err(EngineError::NotStepping { operation })
        }
    }

    // ========== State access ==========

    pub fn snapshot(&self) -> Result<&Snapshot> {
        let slot = match self.phase {
            Phase::Running => &self.timeline.node(self.current)?.state,
            Phase::Hook if !matches!(self.final_state, SnapshotState::Pending) => &self.final_state,
            Phase::Hook => &self.timeline.node(self.current)?.state,
            _ => return Err(EngineError::NotStepping { operation: "snapshot" }),
        };
        match slot {
            SnapshotState::Live(snapshot) => Ok(snapshot),
            _ => Err(not_live(self.current)),
        }
    }

    pub fn snapshot_mut(&mut self) -> Result<&mut Snapshot> {
        let current = self.current;
        let slot = state_slot(
            self.phase,
            current,
            &mut self.timeline,
            &mut self.final_state,
            "snapshot_mut",
        )?;
        match slot {
            SnapshotState::Live(snapshot) => Ok(snapshot),
            _ => Err(not_live(current)),
        }
    }

    pub fn grammar(&self) -> Result<&Grammar> {
        Ok(&self.snapshot()?.grammar)
    }

    pub fn grammar_mut(&mut self) -> Result<&mut Grammar> {
        Ok(&mut self.snapshot_mut()?.grammar)
    }

    pub fn structures(&self) -> Result<&Structures> {
        Ok(&self.snapshot()?.structures)
    }

    pub fn structures_mut(&mut self) -> Result<&mut Structures> {
        Ok(&mut self.snapshot_mut()?.structures)
    }

    /// Live state and scratch data at once
    pub fn parts_mut(&mut self) -> Result<(&mut Snapshot, &mut AuxData)> {
        let current = self.current;
        let slot = state_slot(
            self.phase,
            current,
            &mut self.timeline,
            &mut self.final_state,
            "parts_mut",
        )?;
        match slot {
            SnapshotState::Live(snapshot) => Ok((snapshot, &mut self.data)),
            _ => Err(not_live(current)),
        }
    }

    pub fn data(&self) -> &AuxData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut AuxData {
        &mut self.data
    }

    // ========== Run control ==========

    /// Point the controller at the root step; no effect once a step has run
    pub fn start(&mut self) {
        if self.phase == Phase::Idle && self.steps == 0 {
            self.current = self.timeline.root();
        }
    }

    /// Execute the current step; returns whether another step follows
    pub fn step(&mut self) -> Result<bool> {
        match self.phase {
            Phase::Idle => {}
            Phase::Finished => return Ok(false),
            Phase::Aborted => return Err(EngineError::RunAborted),
            Phase::Running | Phase::Hook => return Err(EngineError::StepInProgress),
        }
        let result = self.run_current();
        if let Err(err) = &result {
            warn!(node = %self.current, error = %err, "step failed, aborting run");
            self.phase = Phase::Aborted;
        }
        result
    }

    /// Run until the next batch boundary or the end of the run
    pub fn resume(&mut self) -> Result<RunState> {
        for _ in 0..self.config.batch_steps.max(1) {
            if !self.step()? {
                return Ok(RunState::Finished);
            }
        }
        trace!(steps = self.steps, "batch boundary");
        Ok(RunState::Yielded)
    }

    /// Run to completion, pausing between batches
    pub fn execute(&mut self) -> Result<()> {
        if matches!(self.phase, Phase::Running | Phase::Hook) {
            return Err(EngineError::StepInProgress);
        }
        self.start();
        while self.resume()? == RunState::Yielded {
            if !self.config.batch_delay.is_zero() {
                std::thread::sleep(self.config.batch_delay);
            }
        }
        Ok(())
    }

    fn run_current(&mut self) -> Result<bool> {
        let id = self.current;
        let label = self.timeline.compute_label(id)?.to_string();

        let program = {
            let node = self.timeline.node_mut(id)?;
            if node.state.materialize()?.is_none() {
                return Err(not_live(id));
            }
            node.status = NodeStatus::Running;
            node.program.clone()
        };

        self.phase = Phase::Running;
        program.call(self)?;
        self.phase = Phase::Idle;

        let (live, name, hook, repeat) = {
            let node = self.timeline.node_mut(id)?;
            let live = match std::mem::replace(&mut node.state, SnapshotState::Pending) {
                SnapshotState::Live(snapshot) => snapshot,
                _ => return Err(not_live(id)),
            };
            (live, node.name().to_string(), node.hook.clone(), node.repeat)
        };

        if repeat {
            self.timeline.duplicate(id)?;
        }

        {
            let node = self.timeline.node_mut(id)?;
            node.state = SnapshotState::Archived(live.to_data());
            node.status = NodeStatus::Archived;
        }
        let handover = live.archive()?;
        trace!(label = %label, "archived step");

        let next = self.timeline.after(id);
        match next {
            Some(next) => {
                self.timeline.node_mut(next)?.state = SnapshotState::Archived(handover);
                self.current = next;
            }
            None => self.final_state = SnapshotState::Archived(handover),
        }

        if let Some(hook) = hook {
            self.run_hook(hook)?;
        }

        self.steps += 1;
        debug!(label = %label, name = %name, "step finished");
        if let Some(listener) = self.listener.as_mut() {
            listener.on_step(&label, &name);
        }

        if next.is_none() {
            self.finish();
        }
        Ok(next.is_some())
    }

    fn run_hook(&mut self, hook: Program) -> Result<()> {
        self.phase = Phase::Hook;
        state_slot(
            self.phase,
            self.current,
            &mut self.timeline,
            &mut self.final_state,
            "hook",
        )?
        .materialize()?;
        hook.call(self)?;
        self.phase = Phase::Idle;

        // the final state has no successor to run on it; keep it archived
        if let SnapshotState::Live(snapshot) = &self.final_state {
            let data = snapshot.to_data();
            self.final_state = SnapshotState::Archived(data);
        }
        Ok(())
    }

    fn finish(&mut self) {
        self.phase = Phase::Finished;
        let root = self.timeline.root();
        self.current = self
            .timeline
            .node(root)
            .ok()
            .and_then(|node| node.first_child())
            .unwrap_or(root);
        info!(steps = self.steps, nodes = self.timeline.len(), "run finished");
        if let Some(listener) = self.listener.as_mut() {
            listener.on_finished();
        }
    }

    // ========== Replay ==========

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn root(&self) -> NodeId {
        self.timeline.root()
    }

    pub fn current(&self) -> NodeId {
        self.current
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Number of steps executed so far
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// The state as step `id` left it, tags still showing what it did
    pub fn snapshot_at(&self, id: NodeId) -> Result<Snapshot> {
        match self.timeline.node(id)?.state() {
            SnapshotState::Archived(data) => data.materialize(),
            SnapshotState::Live(snapshot) => Ok(snapshot.clone()),
            SnapshotState::Pending => Err(not_live(id)),
        }
    }

    /// Archived record of step `id`, if it has been executed
    pub fn record_at(&self, id: NodeId) -> Result<Option<&SnapshotData>> {
        let node = self.timeline.node(id)?;
        if node.status() == NodeStatus::Archived {
            Ok(node.state().archived())
        } else {
            Ok(None)
        }
    }

    /// Finalized state after the last step
    pub fn final_snapshot(&self) -> Option<&SnapshotData> {
        self.final_state.archived()
    }
}

/// The state a program or hook currently works on
fn state_slot<'a>(
    phase: Phase,
    current: NodeId,
    timeline: &'a mut Timeline,
    final_state: &'a mut SnapshotState,
    operation: &'static str,
) -> Result<&'a mut SnapshotState> {
    match phase {
        Phase::Running => Ok(&mut timeline.node_mut(current)?.state),
        Phase::Hook if !matches!(final_state, SnapshotState::Pending) => Ok(final_state),
        Phase::Hook => Ok(&mut timeline.node_mut(current)?.state),
        _ => Err(EngineError::NotStepping { operation }),
    }
}

fn not_live(id: NodeId) -> EngineError {
    EngineError::InvalidData {
        message: format!("step {} has no state to work on", id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decay::DecayTag;
    use crate::grammar::{PlainGrammar, RuleKey, Word};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::rc::Rc;

    fn initial() -> Snapshot {
        let mut rules = BTreeMap::new();
        rules.insert("S".to_string(), vec!["a".to_string(), "b".to_string()]);
        Snapshot::new(
            Grammar::from_plain(PlainGrammar {
                nonterminals: vec!["S".into()],
                terminals: vec!["a".into(), "b".into()],
                rules,
                start: "S".into(),
            })
            .unwrap(),
        )
    }

    fn labels(c: &Controller) -> Vec<String> {
        c.timeline()
            .chronological()
            .map(|id| c.timeline().node(id).unwrap().label().to_string())
            .collect()
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl StepListener for Recorder {
        fn on_step(&mut self, label: &str, name: &str) {
            self.0.borrow_mut().push(format!("{} {}", label, name));
        }

        fn on_finished(&mut self) {
            self.0.borrow_mut().push("done".into());
        }
    }

    #[test]
    fn test_initial_step_is_scheduled_first() {
        let main = Program::new(|c| {
            c.schedule(Program::new(|c| c.set_name("work")))?;
            Ok(())
        });
        let mut c = Controller::new(initial(), main, ControllerConfig::default());
        let recorder = Recorder::default();
        c.set_listener(Box::new(recorder.clone()));
        c.execute().unwrap();

        assert_eq!(
            *recorder.0.borrow(),
            vec![
                " ".to_string(),
                format!("1 {}", INITIAL_STEP_NAME),
                "2 work".to_string(),
                "done".to_string(),
            ]
        );
        let first = c.timeline().find_by_label("1").unwrap();
        assert_eq!(c.current(), first);
        assert!(c.is_finished());
    }

    #[test]
    fn test_removal_is_deferred_until_archive() {
        let remove = Program::new(|c| {
            let key = RuleKey::new("S", Word::parse("a"));
            c.grammar_mut()?.remove_rule(&key)?;
            // still visible while the step runs
            assert!(c.grammar()?.rule(&key).is_some());
            Ok(())
        });
        let mut c = Controller::with_root(initial(), remove, ControllerConfig::default());
        c.execute().unwrap();

        let record = c.snapshot_at(c.root()).unwrap();
        assert_eq!(
            record.grammar.rule(&RuleKey::new("S", Word::parse("a"))).unwrap().tag(),
            DecayTag::Removed
        );

        let after = c.final_snapshot().unwrap().materialize().unwrap();
        let rules: Vec<String> = after.grammar.rules().map(|r| r.to_string()).collect();
        assert_eq!(rules, vec!["S -> b".to_string()]);
    }

    #[test]
    fn test_repeat_until_counter() {
        let root = Program::new(|c| {
            c.schedule(Program::new(|c| {
                let count = c.data_mut().get_or_insert_with("count", || 0usize);
                *count += 1;
                let count = *count;
                c.set_name(format!("iteration {}", count))?;
                if count < 4 {
                    c.request_repeat()?;
                }
                Ok(())
            }))?;
            Ok(())
        });
        let mut c = Controller::with_root(initial(), root, ControllerConfig::default());
        c.execute().unwrap();

        assert_eq!(labels(&c), vec!["", "1", "2", "3", "4"]);
        let names: Vec<&str> = c
            .timeline()
            .children(c.root())
            .map(|id| c.timeline().node(id).unwrap().name())
            .collect();
        assert_eq!(
            names,
            vec!["iteration 1", "iteration 2", "iteration 3", "iteration 4"]
        );
    }

    #[test]
    fn test_program_api_outside_step() {
        let mut c = Controller::with_root(initial(), Program::new(|_| Ok(())), ControllerConfig::default());
        assert_eq!(
            c.request_repeat(),
            Err(EngineError::NotStepping {
                operation: "request_repeat"
            })
        );
        assert!(c.grammar().is_err());
        c.execute().unwrap();
        assert_eq!(
            c.schedule(Program::new(|_| Ok(()))).unwrap_err(),
            EngineError::NotStepping {
                operation: "schedule"
            }
        );
    }

    #[test]
    fn test_batches_yield() {
        let root = Program::new(|c| {
            for _ in 0..5 {
                c.schedule(Program::new(|_| Ok(())))?;
            }
            Ok(())
        });
        let config = ControllerConfig::new().batch_steps(2);
        let mut c = Controller::with_root(initial(), root, config);
        assert_eq!(c.resume().unwrap(), RunState::Yielded);
        assert_eq!(c.steps(), 2);
        assert_eq!(c.resume().unwrap(), RunState::Yielded);
        assert_eq!(c.resume().unwrap(), RunState::Finished);
        assert_eq!(c.steps(), 6);
        assert_eq!(c.resume().unwrap(), RunState::Finished);
    }

    #[test]
    fn test_hook_edits_successor_state() {
        let root = Program::new(|c| {
            c.schedule(Program::new(|c| {
                c.schedule_hook(Program::new(|c| {
                    c.structures_mut()?.symbol_set("marks", "Marks")?.add_now("S");
                    Ok(())
                }))
            }))?;
            c.schedule(Program::new(|c| {
                assert!(c.structures()?.get_symbol_set("marks")?.contains("S"));
                c.schedule_hook(Program::new(|c| c.set_name("too late")))
            }))?;
            Ok(())
        });
        let mut c = Controller::with_root(initial(), root, ControllerConfig::default());
        let result = c.execute();
        assert_eq!(
            result,
            Err(EngineError::NotStepping {
                operation: "set_name"
            })
        );
        assert_eq!(c.phase(), Phase::Aborted);
        assert_eq!(c.step(), Err(EngineError::RunAborted));
    }

    #[test]
    fn test_hook_on_last_step_edits_final_state() {
        let root = Program::new(|c| {
            c.schedule_hook(Program::new(|c| {
                c.grammar_mut()?.add_symbol("c")?;
                Ok(())
            }))
        });
        let mut c = Controller::with_root(initial(), root, ControllerConfig::default());
        c.execute().unwrap();
        let last = c.final_snapshot().unwrap();
        assert_eq!(last.grammar.terminals.get("c"), Some(&DecayTag::New));
    }

    #[test]
    fn test_last_scheduled_hook_wins() {
        let root = Program::new(|c| {
            c.schedule(Program::new(|c| {
                c.schedule_hook(Program::new(|c| {
                    c.data_mut().get_or_insert_with("hooks", Vec::<&str>::new).push("first");
                    Ok(())
                }))?;
                c.schedule_hook(Program::new(|c| {
                    c.data_mut().get_or_insert_with("hooks", Vec::<&str>::new).push("second");
                    Ok(())
                }))
            }))?;
            c.schedule(Program::new(|_| Ok(())))?;
            Ok(())
        });
        let mut c = Controller::with_root(initial(), root, ControllerConfig::default());
        c.execute().unwrap();
        assert_eq!(c.data().get::<Vec<&str>>("hooks"), Some(&vec!["second"]));
    }

    #[test]
    fn test_repeat_requested_twice_duplicates_once() {
        let root = Program::new(|c| {
            c.schedule(Program::new(|c| {
                let runs = c.data_mut().get_or_insert_with("runs", || 0usize);
                *runs += 1;
                if *runs == 1 {
                    c.request_repeat()?;
                    c.request_repeat()?;
                }
                Ok(())
            }))?;
            Ok(())
        });
        let mut c = Controller::with_root(initial(), root, ControllerConfig::default());
        c.execute().unwrap();

        assert_eq!(c.timeline().children(c.root()).count(), 2);
        assert_eq!(labels(&c), vec!["", "1", "2"]);
        assert_eq!(c.data().get::<usize>("runs"), Some(&2));
    }

    #[test]
    fn test_hook_is_not_a_step() {
        let root = Program::new(|c| {
            c.schedule(Program::new(|c| {
                c.set_name("hooked")?;
                c.schedule_hook(Program::new(|c| {
                    c.grammar_mut()?.add_symbol("c")?;
                    Ok(())
                }))
            }))?;
            c.schedule(Program::new(|c| c.set_name("plain")))?;
            Ok(())
        });
        let mut c = Controller::with_root(initial(), root, ControllerConfig::default());
        let recorder = Recorder::default();
        c.set_listener(Box::new(recorder.clone()));
        c.execute().unwrap();

        assert_eq!(c.steps(), 3);
        assert_eq!(c.timeline().len(), 3);
        assert_eq!(
            *recorder.0.borrow(),
            vec![
                " ".to_string(),
                "1 hooked".to_string(),
                "2 plain".to_string(),
                "done".to_string(),
            ]
        );
    }

    #[test]
    fn test_reentrant_step_is_rejected() {
        let root = Program::new(|c| c.step().map(|_| ()));
        let mut c = Controller::with_root(initial(), root, ControllerConfig::default());
        assert_eq!(c.execute(), Err(EngineError::StepInProgress));
    }
}
