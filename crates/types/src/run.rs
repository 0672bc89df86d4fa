//! Runtime status and lifecycle events emitted while a demo plays.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::demo::DemoStep;

/// Lifecycle state of a demo runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunnerStatus {
    /// Created, never started.
    #[default]
    Idle,
    /// Advancing through steps.
    Playing,
    /// Halted by a pause or a failed step; resumable from the current step.
    Paused,
    /// Every step ran. Starting again replays from the first step.
    Completed,
    /// Stopped by the host. Terminal.
    Stopped,
}

impl RunnerStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}

impl fmt::Display for RunnerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Stopped => "stopped",
        };
        f.write_str(label)
    }
}

/// Point-in-time copy of a runner's state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunnerSnapshot {
    pub step_index: usize,
    pub total_steps: usize,
    pub playing: bool,
    pub speed: f64,
    pub status: RunnerStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// Transient, fire-and-forget message surfaced to whoever watches the demo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Event streamed to a demo host over a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DemoRunEvent {
    /// A step is about to execute.
    StepStarted {
        index: usize,
        step: DemoStep,
        label: String,
        at: DateTime<Utc>,
    },
    /// A notification was raised.
    Notified { notification: Notification },
    /// The script ran to the end.
    Completed { at: DateTime<Utc> },
    /// The host stopped the demo.
    Stopped { at: DateTime<Utc> },
}

impl DemoRunEvent {
    /// Whether no further events follow for the current play cycle.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Stopped { .. })
    }
}
