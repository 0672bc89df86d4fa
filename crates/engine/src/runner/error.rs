//! Failure taxonomy for demo steps and runner controls.

use thiserror::Error;

/// Why a step did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    /// A pending wait was cancelled by `pause()` or `stop()`. Never surfaced.
    #[error("demo step aborted")]
    Aborted,
    /// The step's selector matched nothing on the page.
    #[error("Element not found: {selector}")]
    ElementNotFound { selector: String },
    /// The step is missing a field its action requires.
    #[error("{action} step is missing its {field}")]
    InvalidStep { action: String, field: &'static str },
    /// The action tag is outside the closed set. Skipped, not fatal.
    #[error("Unknown action: {0}")]
    UnknownAction(String),
}

impl StepError {
    /// Whether this outcome is the expected result of a pause or stop.
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}

/// Rejected runner control calls.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum RunnerError {
    #[error("demo speed must be a positive, finite number; got {0}")]
    InvalidSpeed(f64),
}
