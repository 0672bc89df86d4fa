//! # Savor Engine
//!
//! Plays scripted storefront demos: a fixed list of UI steps (navigate, click,
//! fill, wait, simulated payment, status update) executed against a host page
//! with pause, resume, stop, and speed control.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use savor_engine::{DemoHost, DemoRunner, NoopObserver, TracingNotifier, storefront_fixture};
//! use savor_types::user_demo_script;
//!
//! # async fn demo() {
//! let page = Arc::new(storefront_fixture());
//! let host = DemoHost::new(page.clone(), page.clone(), Arc::new(TracingNotifier), Arc::new(NoopObserver));
//! let runner = DemoRunner::new(user_demo_script(), host);
//! runner.set_speed(2.0).unwrap();
//! if let Some(cycle) = runner.start() {
//!     cycle.await.unwrap();
//! }
//! assert_eq!(page.current_route(), "/checkout");
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **`host`**: capability traits the runner consumes and the event sink
//! - **`runner`**: the playback state machine and its cancellable waits
//! - **`page`**: a headless page with compound selector support
//! - **`session`**: the demo controller a UI binds to
//! - **`script_file`**: YAML/JSON demo scripts

pub mod host;
pub mod page;
pub mod runner;
pub mod script_file;
pub mod session;

pub use host::{DemoHost, DomEvent, ElementHandle, EventSink, Navigator, NoopObserver, Notifier, PageDriver, RunnerObserver, TracingNotifier};
pub use page::{ElementSnapshot, HeadlessPage, PageElement, Selector, SelectorError, storefront_fixture};
pub use runner::{DemoRunner, HIGHLIGHT_CLASS, RunnerError, StepError};
pub use script_file::load_script_file;
pub use session::{CurrentStep, DemoAuthenticator, DemoSession};
