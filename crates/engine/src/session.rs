//! Demo session controller.
//!
//! A [`DemoSession`] is what a storefront UI binds its demo controls to. It signs
//! in with role-scoped demo credentials, builds a [`DemoRunner`] for the role's
//! script, and tracks the step overlay and the active flag from runner callbacks.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use savor_api::StorefrontClient;
use savor_store::AuthStore;
use savor_types::{Credentials, DemoRole, DemoScript, DemoStep, script_for};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::host::{DemoHost, RunnerObserver};
use crate::runner::{DemoRunner, RunnerError};

/// Source of role-scoped demo credentials.
#[async_trait]
pub trait DemoAuthenticator: Send + Sync {
    async fn demo_credentials(&self, role: DemoRole) -> Result<Credentials>;
}

#[async_trait]
impl DemoAuthenticator for StorefrontClient {
    async fn demo_credentials(&self, role: DemoRole) -> Result<Credentials> {
        self.demo_token(role).await
    }
}

/// Step the overlay is showing.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentStep {
    pub index: usize,
    pub step: DemoStep,
}

#[derive(Debug, Default)]
struct TrackerState {
    active: bool,
    current: Option<CurrentStep>,
}

/// Records overlay state, then forwards every callback to the host observer.
struct SessionTracker {
    state: Mutex<TrackerState>,
    forward: Arc<dyn RunnerObserver>,
}

impl SessionTracker {
    fn lock_state(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().expect("session state lock poisoned")
    }
}

impl RunnerObserver for SessionTracker {
    fn on_step_change(&self, index: usize, step: &DemoStep) {
        self.lock_state().current = Some(CurrentStep {
            index,
            step: step.clone(),
        });
        self.forward.on_step_change(index, step);
    }

    fn on_complete(&self) {
        self.forward.on_complete();
    }

    fn on_stop(&self) {
        {
            let mut state = self.lock_state();
            state.active = false;
            state.current = None;
        }
        self.forward.on_stop();
    }
}

pub struct DemoSession {
    host: DemoHost,
    auth: Arc<dyn AuthStore>,
    authenticator: Option<Arc<dyn DemoAuthenticator>>,
    tracker: Arc<SessionTracker>,
    runner: Mutex<Option<DemoRunner>>,
    role: Mutex<DemoRole>,
    speed: Mutex<f64>,
}

impl DemoSession {
    /// Builds an inactive session. Without an authenticator, demos run with
    /// whatever credentials the auth store already holds.
    pub fn new(host: DemoHost, auth: Arc<dyn AuthStore>, authenticator: Option<Arc<dyn DemoAuthenticator>>) -> Self {
        let tracker = Arc::new(SessionTracker {
            state: Mutex::new(TrackerState::default()),
            forward: Arc::clone(&host.observer),
        });
        Self {
            host: host.with_observer(tracker.clone()),
            auth,
            authenticator,
            tracker,
            runner: Mutex::new(None),
            role: Mutex::new(DemoRole::User),
            speed: Mutex::new(1.0),
        }
    }

    /// Starts the shipped script for `role`.
    pub async fn start_demo(&self, role: DemoRole) -> Result<JoinHandle<()>> {
        self.start_with_script(role, script_for(role)).await
    }

    /// Signs in as the demo `role` and plays `script` at the session speed.
    ///
    /// A demo that is already running is stopped first. When authentication
    /// fails the session is left inactive.
    pub async fn start_with_script(&self, role: DemoRole, script: DemoScript) -> Result<JoinHandle<()>> {
        if let Some(previous) = self.lock_runner().take() {
            previous.stop();
        }
        *self.role.lock().expect("session role lock poisoned") = role;
        self.tracker.lock_state().active = true;

        if let Some(authenticator) = &self.authenticator {
            let credentials = match authenticator.demo_credentials(role).await {
                Ok(credentials) => credentials,
                Err(error) => {
                    warn!(%role, error = %error, "failed to start demo");
                    self.tracker.lock_state().active = false;
                    return Err(error.context(format!("failed to start the {role} demo")));
                }
            };
            self.auth.set_credentials(credentials);
        }

        let runner = DemoRunner::new(script, self.host.clone());
        runner
            .set_speed(self.speed())
            .context("session speed rejected by runner")?;
        let handle = runner.start().ok_or_else(|| anyhow!("demo runner refused to start"))?;
        info!(%role, steps = runner.script().len(), "demo started");
        *self.lock_runner() = Some(runner);
        Ok(handle)
    }

    /// Pauses a playing demo or resumes a paused one. Returns the resumed play
    /// cycle, if any.
    pub fn toggle_play(&self) -> Option<JoinHandle<()>> {
        let runner = self.lock_runner().clone()?;
        if runner.is_playing() {
            runner.pause();
            None
        } else {
            runner.start()
        }
    }

    /// Records `speed` for future demos and applies it to the live one.
    pub fn change_speed(&self, speed: f64) -> Result<(), RunnerError> {
        if let Some(runner) = self.lock_runner().as_ref() {
            runner.set_speed(speed)?;
        } else if !speed.is_finite() || speed <= 0.0 {
            return Err(RunnerError::InvalidSpeed(speed));
        }
        *self.speed.lock().expect("session speed lock poisoned") = speed;
        Ok(())
    }

    pub fn stop_demo(&self) {
        let runner = self.lock_runner().clone();
        if let Some(runner) = runner {
            runner.stop();
        }
    }

    pub fn is_active(&self) -> bool {
        self.tracker.lock_state().active
    }

    pub fn is_playing(&self) -> bool {
        self.lock_runner().as_ref().is_some_and(DemoRunner::is_playing)
    }

    pub fn current_step(&self) -> Option<CurrentStep> {
        self.tracker.lock_state().current.clone()
    }

    pub fn role(&self) -> DemoRole {
        *self.role.lock().expect("session role lock poisoned")
    }

    pub fn speed(&self) -> f64 {
        *self.speed.lock().expect("session speed lock poisoned")
    }

    /// The live runner, if a demo was started.
    pub fn runner(&self) -> Option<DemoRunner> {
        self.lock_runner().clone()
    }

    fn lock_runner(&self) -> MutexGuard<'_, Option<DemoRunner>> {
        self.runner.lock().expect("session runner lock poisoned")
    }
}
