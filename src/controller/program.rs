// Step programs and step listeners

use crate::controller::Controller;
use crate::error::Result;
use std::fmt;
use std::rc::Rc;

/// The code a timeline node runs
///
/// Programs are shared: a repeated step reruns the very same closure, so any
/// state that must change between iterations lives in the snapshot or in the
/// controller's [`AuxData`](crate::controller::AuxData), never in the closure.
#[derive(Clone)]
pub struct Program(Rc<dyn Fn(&mut Controller) -> Result<()>>);

impl Program {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Controller) -> Result<()> + 'static,
    {
        Program(Rc::new(f))
    }

    pub fn call(&self, controller: &mut Controller) -> Result<()> {
        (self.0)(controller)
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Program(..)")
    }
}

/// Receives progress notifications from a running controller
pub trait StepListener {
    /// Called after each step has been archived and its hook has run
    fn on_step(&mut self, label: &str, name: &str);

    /// Called once, when no step is left
    fn on_finished(&mut self) {}
}
