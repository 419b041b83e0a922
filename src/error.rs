//! Error types for the step engine
//!
//! Every variant of [`EngineError`] is a contract violation: a step program (or
//! the caller driving the controller) asked for something that cannot exist in
//! a faithful timeline. None of them are retryable - the engine is pure
//! in-memory computation - so each one aborts the whole run.

use crate::timeline::NodeId;
use thiserror::Error;

/// Errors raised by the grammar, structure bag, timeline and controller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A program-only operation was called outside an active step
    #[error("'{operation}' can only be called while a step is executing")]
    NotStepping { operation: &'static str },

    /// Referenced a symbol that is not part of the grammar
    #[error("Unknown symbol '{name}'")]
    UnknownSymbol { name: String },

    /// Symbol text does not follow the naming rules
    #[error("'{name}' is not a valid {expected} name")]
    InvalidSymbolName { name: String, expected: &'static str },

    /// Symbol exists, but is of the other kind
    #[error("Symbol '{name}' is not a {expected}")]
    SymbolKind { name: String, expected: &'static str },

    /// Referenced a rule that is not part of the grammar
    #[error("Unknown rule {left} -> {right}")]
    UnknownRule { left: String, right: String },

    /// Archiving deleted a symbol that a surviving rule (or the start) still uses
    #[error("Symbol '{symbol}' was removed but is still used by {used_by}")]
    DanglingSymbol { symbol: String, used_by: String },

    /// No structure with this id in the bag
    #[error("Unknown structure '{id}'")]
    UnknownStructure { id: String },

    /// Structure exists under this id with a different kind
    #[error("Structure '{id}' is a {found}, not a {expected}")]
    StructureKind {
        id: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The root node can never be repeated
    #[error("The root step cannot be duplicated")]
    DuplicateRoot,

    /// A node id that does not belong to this timeline
    #[error("Unknown timeline node {0}")]
    UnknownNode(NodeId),

    /// A program tried to drive the controller it is running in
    #[error("A step is already executing")]
    StepInProgress,

    /// A previous step failed; the run cannot continue
    #[error("The run was aborted by a failing step")]
    RunAborted,

    /// Archived data could not be materialized
    #[error("Invalid archived data: {message}")]
    InvalidData { message: String },
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, EngineError>;
