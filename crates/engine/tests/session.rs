use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, bail};
use async_trait::async_trait;
use savor_engine::{DemoAuthenticator, DemoHost, DemoSession, EventSink, storefront_fixture};
use savor_store::{AuthStore, InMemoryAuthStore};
use savor_types::{Credentials, DemoRole, DemoRunEvent, DemoScript, DemoStep, RunnerStatus, StorefrontUser};
use tokio::sync::mpsc;

struct FakeAuthenticator {
    fail: bool,
    requested: Mutex<Vec<DemoRole>>,
}

impl FakeAuthenticator {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            fail,
            requested: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl DemoAuthenticator for FakeAuthenticator {
    async fn demo_credentials(&self, role: DemoRole) -> Result<Credentials> {
        self.requested.lock().unwrap().push(role);
        if self.fail {
            bail!("demo accounts are disabled");
        }
        Ok(Credentials {
            access_token: format!("{role}-token"),
            user: StorefrontUser {
                id: format!("demo-{role}"),
                role: Some(role.as_str().to_string()),
                ..StorefrontUser::default()
            },
        })
    }
}

struct Harness {
    session: DemoSession,
    auth: Arc<InMemoryAuthStore>,
    events: mpsc::UnboundedReceiver<DemoRunEvent>,
}

fn harness(authenticator: Option<Arc<FakeAuthenticator>>) -> Harness {
    let page = Arc::new(storefront_fixture());
    let (event_tx, events) = mpsc::unbounded_channel();
    let sink = Arc::new(EventSink::new(event_tx));
    let host = DemoHost::new(page.clone(), page, sink.clone(), sink);
    let auth = Arc::new(InMemoryAuthStore::new());
    let authenticator = authenticator.map(|authenticator| authenticator as Arc<dyn DemoAuthenticator>);
    Harness {
        session: DemoSession::new(host, auth.clone(), authenticator),
        auth,
        events,
    }
}

fn waits() -> DemoScript {
    DemoScript::new("waits", vec![DemoStep::navigate("/"), DemoStep::wait(1000), DemoStep::wait(1000)])
}

#[tokio::test(start_paused = true)]
async fn start_signs_in_and_tracks_the_current_step() {
    let authenticator = FakeAuthenticator::new(false);
    let mut harness = harness(Some(authenticator.clone()));

    let cycle = harness.session.start_with_script(DemoRole::Admin, waits()).await.unwrap();
    assert!(harness.session.is_active());
    assert!(harness.session.is_playing());
    assert_eq!(harness.session.role(), DemoRole::Admin);
    assert_eq!(*authenticator.requested.lock().unwrap(), vec![DemoRole::Admin]);
    assert_eq!(harness.auth.snapshot().token.as_deref(), Some("admin-token"));

    cycle.await.unwrap();
    assert_eq!(harness.session.current_step().map(|current| current.index), Some(2));
    assert!(!harness.session.is_playing());
    assert!(harness.session.is_active());

    let mut last = None;
    while let Ok(event) = harness.events.try_recv() {
        last = Some(event);
    }
    assert!(matches!(last, Some(DemoRunEvent::Completed { .. })));
}

#[tokio::test]
async fn failed_sign_in_leaves_the_session_inactive() {
    let harness = harness(Some(FakeAuthenticator::new(true)));

    let error = harness.session.start_demo(DemoRole::User).await.unwrap_err();
    assert!(format!("{error:#}").contains("demo accounts are disabled"));
    assert!(!harness.session.is_active());
    assert!(harness.session.runner().is_none());
    assert!(!harness.auth.is_authenticated());
}

#[tokio::test(start_paused = true)]
async fn toggle_pauses_and_resumes() {
    let harness = harness(None);
    harness.session.start_with_script(DemoRole::User, waits()).await.unwrap();

    tokio::time::sleep(Duration::from_millis(700)).await;
    assert!(harness.session.toggle_play().is_none());
    assert!(!harness.session.is_playing());
    let runner = harness.session.runner().unwrap();
    assert_eq!(runner.status(), RunnerStatus::Paused);
    assert_eq!(runner.step_index(), 1);

    let resumed = harness.session.toggle_play().expect("resumes");
    assert!(harness.session.is_playing());
    resumed.await.unwrap();
    assert_eq!(runner.status(), RunnerStatus::Completed);
}

#[tokio::test(start_paused = true)]
async fn stop_clears_the_overlay_and_deactivates() {
    let mut harness = harness(None);
    harness.session.start_with_script(DemoRole::User, waits()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert!(harness.session.current_step().is_some());

    harness.session.stop_demo();

    assert!(!harness.session.is_active());
    assert!(!harness.session.is_playing());
    assert!(harness.session.current_step().is_none());
    let mut stops = 0;
    while let Ok(event) = harness.events.try_recv() {
        if matches!(event, DemoRunEvent::Stopped { .. }) {
            stops += 1;
        }
    }
    assert_eq!(stops, 1);
}

#[tokio::test(start_paused = true)]
async fn speed_carries_into_the_next_demo() {
    let harness = harness(None);
    assert!(harness.session.change_speed(0.0).is_err());
    harness.session.change_speed(2.0).unwrap();

    harness.session.start_with_script(DemoRole::User, waits()).await.unwrap();
    assert_eq!(harness.session.runner().unwrap().speed(), 2.0);

    harness.session.change_speed(0.5).unwrap();
    assert_eq!(harness.session.runner().unwrap().speed(), 0.5);
    assert_eq!(harness.session.speed(), 0.5);
}

#[tokio::test(start_paused = true)]
async fn restarting_replaces_the_previous_demo() {
    let harness = harness(None);
    harness.session.start_with_script(DemoRole::User, waits()).await.unwrap();
    let first = harness.session.runner().unwrap();

    let cycle = harness.session.start_demo(DemoRole::Admin).await.unwrap();
    assert_eq!(first.status(), RunnerStatus::Stopped);
    assert!(harness.session.is_active());
    assert_eq!(harness.session.runner().unwrap().script().name, "admin");
    cycle.abort();
}
