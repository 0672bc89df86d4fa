//! Cancellation-scoped timers.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// How a [`cancellable_wait`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The full duration passed.
    Elapsed,
    /// The token was cancelled first; the timer was dropped.
    Aborted,
}

impl WaitOutcome {
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}

/// Sleeps for `duration` unless `token` is cancelled first.
///
/// An already-cancelled token aborts even a zero-length wait, so a cancelled
/// play cycle can never slip past one more step.
pub async fn cancellable_wait(token: &CancellationToken, duration: Duration) -> WaitOutcome {
    if token.is_cancelled() {
        return WaitOutcome::Aborted;
    }
    tokio::select! {
        biased;
        _ = token.cancelled() => WaitOutcome::Aborted,
        _ = tokio::time::sleep(duration) => WaitOutcome::Elapsed,
    }
}

/// Converts a millisecond delay into wall-clock time at `speed`.
///
/// Saturates at [`Duration::MAX`] when a tiny speed pushes the delay out of range.
pub fn scaled_delay(delay_ms: u64, speed: f64) -> Duration {
    Duration::try_from_secs_f64(delay_ms as f64 / speed / 1000.0).unwrap_or(Duration::MAX)
}
