//! Scripted demo playback with pause, resume, stop, and speed control.
//!
//! A [`DemoRunner`] owns one script and one [`RunnerState`]. `start()` spawns a
//! cooperative task that walks the script step by step; every timed wait in that
//! task is scoped to a [`CancellationToken`] created for the current play cycle,
//! so `pause()` and `stop()` interrupt it at the next await point. The loop
//! serializes itself: a resumed cycle waits for the previous one to unwind
//! before executing anything.
//!
//! Step failures never escape the loop. Aborts end the cycle silently, unknown
//! actions are skipped with a warning, and anything else pauses playback and
//! raises one error notification.

mod error;
mod wait;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use savor_types::{DemoAction, DemoScript, DemoStep, Notification, RunnerSnapshot, RunnerStatus};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

pub use error::{RunnerError, StepError};
pub use wait::{WaitOutcome, cancellable_wait, scaled_delay};

use crate::host::{DemoHost, DomEvent, ElementHandle};

/// Class applied to the element the current step targets.
pub const HIGHLIGHT_CLASS: &str = "demo-highlight";
const HIGHLIGHT_SELECTOR: &str = ".demo-highlight";

/// Pause after every executed action, before speed scaling.
pub const PACING_DELAY_MS: u64 = 500;
/// Simulated payment gateway round-trip.
pub const PAYMENT_DELAY_MS: u64 = 2000;
/// Simulated order status round-trip.
pub const STATUS_UPDATE_DELAY_MS: u64 = 1000;

const PAYMENT_SUCCESS_MESSAGE: &str = "Payment Simulated Successfully";

/// Mutable playback state. Only ever touched under the runner's lock, and the
/// lock is never held across an await.
#[derive(Debug)]
struct RunnerState {
    step_index: usize,
    playing: bool,
    speed: f64,
    status: RunnerStatus,
    cancel: Option<CancellationToken>,
}

impl Default for RunnerState {
    fn default() -> Self {
        Self {
            step_index: 0,
            playing: false,
            speed: 1.0,
            status: RunnerStatus::Idle,
            cancel: None,
        }
    }
}

/// Handle to a demo runner. Clones share the same runner.
#[derive(Clone)]
pub struct DemoRunner {
    inner: Arc<RunnerInner>,
}

struct RunnerInner {
    script: DemoScript,
    host: DemoHost,
    state: Mutex<RunnerState>,
    // Held by a play cycle for its whole lifetime.
    lane: tokio::sync::Mutex<()>,
}

impl fmt::Debug for DemoRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DemoRunner")
            .field("script", &self.inner.script.name)
            .field("state", &self.snapshot())
            .finish()
    }
}

impl DemoRunner {
    pub fn new(script: DemoScript, host: DemoHost) -> Self {
        Self {
            inner: Arc::new(RunnerInner {
                script,
                host,
                state: Mutex::new(RunnerState::default()),
                lane: tokio::sync::Mutex::new(()),
            }),
        }
    }

    pub fn script(&self) -> &DemoScript {
        &self.inner.script
    }

    pub fn snapshot(&self) -> RunnerSnapshot {
        let state = self.inner.lock_state();
        RunnerSnapshot {
            step_index: state.step_index,
            total_steps: self.inner.script.len(),
            playing: state.playing,
            speed: state.speed,
            status: state.status,
        }
    }

    pub fn step_index(&self) -> usize {
        self.inner.lock_state().step_index
    }

    pub fn is_playing(&self) -> bool {
        self.inner.lock_state().playing
    }

    pub fn status(&self) -> RunnerStatus {
        self.inner.lock_state().status
    }

    pub fn speed(&self) -> f64 {
        self.inner.lock_state().speed
    }

    /// Begins or resumes playback from the current step.
    ///
    /// Returns the spawned play cycle, or `None` when nothing was started: the
    /// runner is already playing, or it has been stopped. A completed runner
    /// replays from the first step. Must be called from within a Tokio runtime.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        let token = {
            let mut state = self.inner.lock_state();
            if state.playing {
                debug!(script = %self.inner.script.name, "start ignored; already playing");
                return None;
            }
            if state.status.is_terminal() {
                warn!(script = %self.inner.script.name, "start ignored; runner was stopped");
                return None;
            }
            if state.status == RunnerStatus::Completed {
                state.step_index = 0;
            }
            let token = CancellationToken::new();
            state.playing = true;
            state.status = RunnerStatus::Playing;
            state.cancel = Some(token.clone());
            token
        };

        debug!(script = %self.inner.script.name, "demo playback starting");
        let inner = Arc::clone(&self.inner);
        Some(tokio::spawn(inner.run(token)))
    }

    /// Halts playback at the in-flight step. The step index is kept, so the next
    /// `start()` re-runs the interrupted step.
    pub fn pause(&self) {
        let mut state = self.inner.lock_state();
        state.playing = false;
        if let Some(token) = state.cancel.take() {
            token.cancel();
        }
        if state.status == RunnerStatus::Playing {
            state.status = RunnerStatus::Paused;
        }
        debug!(step_index = state.step_index, "demo playback paused");
    }

    /// Cancels playback, rewinds to the first step, clears the highlight, and
    /// notifies the observer. The runner cannot be started again.
    pub fn stop(&self) {
        {
            let mut state = self.inner.lock_state();
            state.playing = false;
            state.step_index = 0;
            state.status = RunnerStatus::Stopped;
            if let Some(token) = state.cancel.take() {
                token.cancel();
            }
        }
        debug!(script = %self.inner.script.name, "demo playback stopped");
        self.inner.remove_highlight();
        self.inner.host.observer.on_stop();
    }

    /// Sets the divisor applied to every subsequent wait.
    pub fn set_speed(&self, speed: f64) -> Result<(), RunnerError> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(RunnerError::InvalidSpeed(speed));
        }
        self.inner.lock_state().speed = speed;
        Ok(())
    }
}

impl RunnerInner {
    fn lock_state(&self) -> MutexGuard<'_, RunnerState> {
        self.state.lock().expect("runner state lock poisoned")
    }

    async fn run(self: Arc<Self>, token: CancellationToken) {
        let _lane = self.lane.lock().await;

        while let Some((index, step)) = self.next_step(&token) {
            self.host.observer.on_step_change(index, &step);

            match self.execute_step(index, &step, &token).await {
                Ok(()) => {
                    if !self.advance(&token) {
                        debug!(index, "demo playback aborted after step");
                        return;
                    }
                }
                Err(StepError::Aborted) => {
                    debug!(index, "demo playback aborted");
                    return;
                }
                Err(step_error) => {
                    error!(index, action = %step.action, error = %step_error, "Demo step failed");
                    if self.halt(&token) {
                        self.host
                            .notifier
                            .notify(Notification::error(format!("Demo step failed: {step_error}")));
                    }
                    return;
                }
            }
        }

        if self.complete(&token) {
            debug!(script = %self.script.name, "demo playback completed");
            self.host.observer.on_complete();
        }
    }

    /// The step at the cursor, unless this cycle was cancelled or the script is done.
    fn next_step(&self, token: &CancellationToken) -> Option<(usize, DemoStep)> {
        let state = self.lock_state();
        if token.is_cancelled() || !state.playing {
            return None;
        }
        self.script.step(state.step_index).map(|step| (state.step_index, step.clone()))
    }

    fn advance(&self, token: &CancellationToken) -> bool {
        let mut state = self.lock_state();
        if token.is_cancelled() {
            return false;
        }
        state.step_index += 1;
        true
    }

    /// Pauses after a failed step. Returns false when the cycle was already
    /// cancelled by the host.
    fn halt(&self, token: &CancellationToken) -> bool {
        let mut state = self.lock_state();
        if token.is_cancelled() {
            return false;
        }
        state.playing = false;
        state.status = RunnerStatus::Paused;
        if let Some(current) = state.cancel.take() {
            current.cancel();
        }
        true
    }

    fn complete(&self, token: &CancellationToken) -> bool {
        let mut state = self.lock_state();
        if token.is_cancelled() || state.step_index < self.script.len() {
            return false;
        }
        state.playing = false;
        state.status = RunnerStatus::Completed;
        state.cancel = None;
        true
    }

    async fn execute_step(&self, index: usize, step: &DemoStep, token: &CancellationToken) -> Result<(), StepError> {
        self.wait_scaled(step.delay, token).await?;

        if step.action == DemoAction::Wait {
            return Ok(());
        }

        if let Some(selector) = step.selector.as_deref() {
            self.highlight(selector)?;
        }

        match self.perform_action(step, token).await {
            Ok(()) => {}
            Err(StepError::UnknownAction(tag)) => {
                warn!(index, action = %tag, "Unknown action; skipping step");
            }
            Err(step_error) => return Err(step_error),
        }

        self.wait_scaled(PACING_DELAY_MS, token).await
    }

    async fn perform_action(&self, step: &DemoStep, token: &CancellationToken) -> Result<(), StepError> {
        let page = &self.host.page;
        match &step.action {
            DemoAction::Wait => {}
            DemoAction::Navigate => {
                let path = step.value.as_deref().ok_or(StepError::InvalidStep {
                    action: step.action.to_string(),
                    field: "value",
                })?;
                self.host.navigator.navigate(path);
            }
            DemoAction::Click => {
                let element = self.locate(step)?;
                page.click(element);
            }
            DemoAction::Fill => {
                let element = self.locate(step)?;
                page.set_value(element, step.value.as_deref().unwrap_or_default());
                page.dispatch_event(element, DomEvent::Input);
                page.dispatch_event(element, DomEvent::Change);
            }
            DemoAction::SimulatePayment => {
                self.wait_scaled(PAYMENT_DELAY_MS, token).await?;
                self.host.notifier.notify(Notification::success(PAYMENT_SUCCESS_MESSAGE));
            }
            DemoAction::UpdateStatus => {
                self.wait_scaled(STATUS_UPDATE_DELAY_MS, token).await?;
                self.host.notifier.notify(Notification::success(status_update_message(step)));
            }
            DemoAction::Unknown(tag) => return Err(StepError::UnknownAction(tag.clone())),
        }
        Ok(())
    }

    fn locate(&self, step: &DemoStep) -> Result<ElementHandle, StepError> {
        let selector = step.selector.as_deref().ok_or(StepError::InvalidStep {
            action: step.action.to_string(),
            field: "selector",
        })?;
        self.host
            .page
            .query_selector(selector)
            .ok_or_else(|| StepError::ElementNotFound {
                selector: selector.to_string(),
            })
    }

    async fn wait_scaled(&self, delay_ms: u64, token: &CancellationToken) -> Result<(), StepError> {
        let speed = self.lock_state().speed;
        match cancellable_wait(token, scaled_delay(delay_ms, speed)).await {
            WaitOutcome::Elapsed => Ok(()),
            WaitOutcome::Aborted => Err(StepError::Aborted),
        }
    }

    fn highlight(&self, selector: &str) -> Result<(), StepError> {
        let page = &self.host.page;
        let element = page.query_selector(selector).ok_or_else(|| StepError::ElementNotFound {
            selector: selector.to_string(),
        })?;
        page.scroll_into_view(element);
        self.remove_highlight();
        page.add_class(element, HIGHLIGHT_CLASS);
        Ok(())
    }

    fn remove_highlight(&self) {
        if let Some(existing) = self.host.page.query_selector(HIGHLIGHT_SELECTOR) {
            self.host.page.remove_class(existing, HIGHLIGHT_CLASS);
        }
    }
}

// No backend call is made; the admin demo only announces the change.
fn status_update_message(step: &DemoStep) -> String {
    match (step.order_id.as_deref(), step.status.as_deref()) {
        (Some(order_id), Some(status)) => format!("Order {order_id} status updated to {status}"),
        (None, Some(status)) => format!("Order status updated to {status}"),
        _ => "Order status updated".to_string(),
    }
}
