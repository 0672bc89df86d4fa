//! Capabilities a demo runner consumes from its host.
//!
//! The runner never touches a concrete page, router, or toast surface. Hosts
//! hand it trait objects instead:
//!
//! - [`PageDriver`]: selector lookup plus the native element behaviors a step
//!   needs (click, value changes, scrolling, classes)
//! - [`Navigator`]: in-app route changes
//! - [`Notifier`]: transient success/error messages
//! - [`RunnerObserver`]: step, completion, and stop callbacks
//!
//! [`EventSink`] implements both observer and notifier by forwarding everything
//! as [`DemoRunEvent`]s over a Tokio channel.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use savor_types::{DemoRunEvent, DemoStep, Notification, NotificationLevel};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info};

/// Opaque reference to an element owned by a [`PageDriver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(u64);

impl ElementHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Notification dispatched on an element after its value changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomEvent {
    Input,
    Change,
}

impl fmt::Display for DomEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Input => "input",
            Self::Change => "change",
        })
    }
}

/// Selector lookup and element behaviors.
pub trait PageDriver: Send + Sync {
    /// Returns the first element matching `selector`, if any.
    fn query_selector(&self, selector: &str) -> Option<ElementHandle>;
    fn scroll_into_view(&self, element: ElementHandle);
    fn add_class(&self, element: ElementHandle, class: &str);
    fn remove_class(&self, element: ElementHandle, class: &str);
    /// Default activation, as if a user clicked the element.
    fn click(&self, element: ElementHandle);
    fn set_value(&self, element: ElementHandle, value: &str);
    /// Dispatches a bubbling event so reactive bindings observe a change.
    fn dispatch_event(&self, element: ElementHandle, event: DomEvent);
}

/// In-app route changes without a full reload.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Fire-and-forget user-visible messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Host callbacks. Every method defaults to doing nothing.
pub trait RunnerObserver: Send + Sync {
    /// Invoked before step `index` executes.
    fn on_step_change(&self, _index: usize, _step: &DemoStep) {}
    /// Invoked once when the script runs to the end.
    fn on_complete(&self) {}
    /// Invoked once per `stop()`.
    fn on_stop(&self) {}
}

/// Observer that ignores every callback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RunnerObserver for NoopObserver {}

/// Notifier that writes messages to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => info!(message = %notification.message, "demo notification"),
            NotificationLevel::Error => error!(message = %notification.message, "demo notification"),
        }
    }
}

/// Streams observer callbacks and notifications as [`DemoRunEvent`]s.
///
/// Send failures are ignored: a host that dropped its receiver no longer
/// cares about the demo.
#[derive(Debug, Clone)]
pub struct EventSink {
    event_tx: UnboundedSender<DemoRunEvent>,
}

impl EventSink {
    pub fn new(event_tx: UnboundedSender<DemoRunEvent>) -> Self {
        Self { event_tx }
    }
}

impl RunnerObserver for EventSink {
    fn on_step_change(&self, index: usize, step: &DemoStep) {
        let _ = self.event_tx.send(DemoRunEvent::StepStarted {
            index,
            step: step.clone(),
            label: step.summary(),
            at: Utc::now(),
        });
    }

    fn on_complete(&self) {
        let _ = self.event_tx.send(DemoRunEvent::Completed { at: Utc::now() });
    }

    fn on_stop(&self) {
        let _ = self.event_tx.send(DemoRunEvent::Stopped { at: Utc::now() });
    }
}

impl Notifier for EventSink {
    fn notify(&self, notification: Notification) {
        let _ = self.event_tx.send(DemoRunEvent::Notified { notification });
    }
}

/// Bundle of host capabilities handed to every runner a host creates.
#[derive(Clone)]
pub struct DemoHost {
    pub page: Arc<dyn PageDriver>,
    pub navigator: Arc<dyn Navigator>,
    pub notifier: Arc<dyn Notifier>,
    pub observer: Arc<dyn RunnerObserver>,
}

impl DemoHost {
    pub fn new(
        page: Arc<dyn PageDriver>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        observer: Arc<dyn RunnerObserver>,
    ) -> Self {
        Self {
            page,
            navigator,
            notifier,
            observer,
        }
    }

    /// Same capabilities with a different observer.
    pub fn with_observer(&self, observer: Arc<dyn RunnerObserver>) -> Self {
        Self {
            observer,
            ..self.clone()
        }
    }
}

impl fmt::Debug for DemoHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DemoHost").finish_non_exhaustive()
    }
}
