//! # Introduction
//!
//! gramtrace runs grammar procedures as sequences of recorded steps. Every
//! step a procedure takes becomes a node in a timeline, and the state after
//! each step is archived so the whole run can be browsed forward and backward
//! afterwards, with decay tags showing what each step changed.
//!
//! ## Execution pipeline
//!
//! ```text
//! Grammar → Snapshot → Controller (steps) → Timeline → Replay / TUI
//! ```
//!
//! 1. [`grammar`] and [`structures`]: the two halves of a [`snapshot::Snapshot`],
//!    a tagged grammar with deferred rewrites, and a bag of auxiliary sets,
//!    tables, mappings and stacks.
//! 2. [`decay`]: the emphasis tags and how they fade when a step is archived.
//! 3. [`controller`]: runs step [`controller::Program`]s, handles repeats and
//!    hooks, and archives state between steps.
//! 4. [`timeline`]: the tree of steps with its chronological threading.
//! 5. [`replay`]: cursor navigation over a finished run.
//! 6. [`procedures`]: ready-made procedures (loop removal, reduction).
//! 7. [`ui`]: ratatui-based explorer; not part of the stable library API.
//!
//! ## Example
//!
//! ```
//! use gramtrace::controller::{Controller, ControllerConfig};
//! use gramtrace::grammar::{Grammar, PlainGrammar};
//! use gramtrace::procedures::Procedure;
//! use gramtrace::snapshot::Snapshot;
//!
//! let plain: PlainGrammar = serde_json::from_str(
//!     r#"{ "N": ["S"], "T": ["a"], "P": { "S": ["a", "S"] }, "S": "S" }"#,
//! ).unwrap();
//! let grammar = Grammar::from_plain(plain).unwrap();
//!
//! let mut c = Controller::new(
//!     Snapshot::new(grammar),
//!     Procedure::RemoveLoops.program(),
//!     ControllerConfig::default(),
//! );
//! c.execute().unwrap();
//! assert_eq!(c.final_snapshot().unwrap().grammar.rules["S"].len(), 1);
//! ```

pub mod constants;
pub mod controller;
pub mod decay;
pub mod error;
pub mod grammar;
pub mod procedures;
pub mod replay;
pub mod snapshot;
pub mod structures;
pub mod timeline;
pub mod ui;

pub use error::{EngineError, Result};
