//! Shared type definitions for the Savor storefront toolkit.
//!
//! The demo model ([`DemoStep`], [`DemoScript`]) is consumed by the engine and by
//! script files; run events and snapshots describe playback to hosts; the auth and
//! cart records mirror the storefront API payloads.

pub mod auth;
pub mod cart;
pub mod demo;
pub mod run;
pub mod scripts;

pub use auth::{AuthState, Credentials, StorefrontUser};
pub use cart::{CartItem, Product};
pub use demo::{DemoAction, DemoRole, DemoScript, DemoStep, ParseDemoRoleError, SPEED_PRESETS};
pub use run::{DemoRunEvent, Notification, NotificationLevel, RunnerSnapshot, RunnerStatus};
pub use scripts::{admin_demo_script, script_for, user_demo_script};
