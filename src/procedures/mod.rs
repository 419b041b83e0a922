//! Grammar procedures written as step programs
//!
//! - [`remove_loops`]: drop every `A -> A` production, one step each
//! - [`reduce`]: convert to reduced normal form
//!
//! Each procedure also offers a `check` that tells whether a grammar is
//! already in the target shape.

pub mod reduce;
pub mod remove_loops;

use crate::controller::Program;
use crate::grammar::Grammar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Procedure {
    RemoveLoops,
    Reduce,
}

impl Procedure {
    pub const ALL: [Procedure; 2] = [Procedure::RemoveLoops, Procedure::Reduce];

    /// Command-line name
    pub fn name(self) -> &'static str {
        match self {
            Procedure::RemoveLoops => "remove-loops",
            Procedure::Reduce => "reduce",
        }
    }

    pub fn from_name(name: &str) -> Option<Procedure> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    pub fn program(self) -> Program {
        match self {
            Procedure::RemoveLoops => remove_loops::program(),
            Procedure::Reduce => reduce::program(),
        }
    }

    pub fn check(self, grammar: &Grammar) -> bool {
        match self {
            Procedure::RemoveLoops => remove_loops::check(grammar),
            Procedure::Reduce => reduce::check(grammar),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for procedure in Procedure::ALL {
            assert_eq!(Procedure::from_name(procedure.name()), Some(procedure));
        }
        assert_eq!(Procedure::from_name("cnf"), None);
    }
}
