// Controller configuration

use crate::constants::DEFAULT_BATCH_STEPS;
use std::time::Duration;

/// How a controller paces its run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Steps executed before [`Controller::resume`](crate::controller::Controller::resume) yields
    pub batch_steps: usize,

    /// Pause between two batches in [`Controller::execute`](crate::controller::Controller::execute)
    pub batch_delay: Duration,
}

impl ControllerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the batch size; zero is treated as one
    pub fn batch_steps(mut self, steps: usize) -> Self {
        self.batch_steps = steps.max(1);
        self
    }

    pub fn batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            batch_steps: DEFAULT_BATCH_STEPS,
            batch_delay: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ControllerConfig::default();
        assert_eq!(config.batch_steps, 20);
        assert!(config.batch_delay.is_zero());
    }

    #[test]
    fn test_zero_batch_is_clamped() {
        assert_eq!(ControllerConfig::new().batch_steps(0).batch_steps, 1);
    }
}
