// Constants for the step engine

/// Number of steps executed between two cooperative yields
pub const DEFAULT_BATCH_STEPS: usize = 20;

/// Text representation of the empty word
pub const EPSILON: &str = "eps";

/// Suffix appended to a desired nonterminal name until it no longer conflicts
pub const RENAME_SUFFIX: &str = "/0";

/// Name of the step the controller schedules before the main program's steps
pub const INITIAL_STEP_NAME: &str = "this is the initial state of the algorithm";

/// Name shown for steps whose program never named them
pub const UNNAMED_STEP: &str = "(unnamed step)";
