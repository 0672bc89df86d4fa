//! Demo script model shared by the engine, the CLI, and script files.
//!
//! A [`DemoScript`] is an ordered list of [`DemoStep`]s authored ahead of time. Each
//! step names one simulated UI action; the runner in `savor-engine` plays them back
//! against a page. Field names serialize in camelCase so script files read the same
//! way the storefront markup is authored (`orderId`, `simulatePayment`).

use std::{error::Error, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Playback speed multipliers offered by the demo controls.
pub const SPEED_PRESETS: [f64; 3] = [0.5, 1.0, 2.0];

/// Action performed by a single demo step.
///
/// The set of known actions is closed. Tags outside of it are preserved as
/// [`DemoAction::Unknown`] so that a script authored against a newer runner still
/// loads; the runner skips those steps with a warning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DemoAction {
    /// Route the host application to `value`.
    Navigate,
    /// Activate the element matched by `selector`.
    Click,
    /// Write `value` into the element matched by `selector`.
    Fill,
    /// Do nothing beyond the step delay.
    Wait,
    /// Pretend to round-trip a payment gateway.
    SimulatePayment,
    /// Announce an order status change.
    UpdateStatus,
    /// Any tag the runner does not understand.
    Unknown(String),
}

impl DemoAction {
    /// Returns the tag used in script files.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Navigate => "navigate",
            Self::Click => "click",
            Self::Fill => "fill",
            Self::Wait => "wait",
            Self::SimulatePayment => "simulatePayment",
            Self::UpdateStatus => "updateStatus",
            Self::Unknown(tag) => tag,
        }
    }

    /// Whether the action belongs to the closed set the runner executes.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<String> for DemoAction {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "navigate" => Self::Navigate,
            "click" => Self::Click,
            "fill" => Self::Fill,
            "wait" => Self::Wait,
            "simulatePayment" => Self::SimulatePayment,
            "updateStatus" => Self::UpdateStatus,
            _ => Self::Unknown(tag),
        }
    }
}

impl From<DemoAction> for String {
    fn from(action: DemoAction) -> Self {
        match action {
            DemoAction::Unknown(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for DemoAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scripted UI action plus its optional target, payload, and delay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoStep {
    /// What the step does.
    pub action: DemoAction,
    /// Query selector for the element the step targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    /// Navigation path for `navigate`, input value for `fill`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Milliseconds to wait before the action runs, before speed scaling.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub delay: u64,
    /// Order referenced by `updateStatus`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Status announced by `updateStatus`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

impl DemoStep {
    fn bare(action: DemoAction) -> Self {
        Self {
            action,
            selector: None,
            value: None,
            delay: 0,
            order_id: None,
            status: None,
        }
    }

    pub fn navigate(path: impl Into<String>) -> Self {
        Self {
            value: Some(path.into()),
            ..Self::bare(DemoAction::Navigate)
        }
    }

    pub fn click(selector: impl Into<String>) -> Self {
        Self {
            selector: Some(selector.into()),
            ..Self::bare(DemoAction::Click)
        }
    }

    pub fn fill(selector: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            selector: Some(selector.into()),
            value: Some(value.into()),
            ..Self::bare(DemoAction::Fill)
        }
    }

    /// A pause of `delay_ms` with no other effect.
    pub fn wait(delay_ms: u64) -> Self {
        Self {
            delay: delay_ms,
            ..Self::bare(DemoAction::Wait)
        }
    }

    pub fn simulate_payment() -> Self {
        Self::bare(DemoAction::SimulatePayment)
    }

    pub fn update_status(order_id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            order_id: Some(order_id.into()),
            status: Some(status.into()),
            ..Self::bare(DemoAction::UpdateStatus)
        }
    }

    /// Returns a step carrying an arbitrary action tag.
    pub fn with_action(action: DemoAction) -> Self {
        Self::bare(action)
    }

    /// Sets the pre-action delay in milliseconds.
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay = delay_ms;
        self
    }

    /// Short description shown in the playback overlay while the step runs.
    pub fn summary(&self) -> String {
        match (&self.action, self.value.as_deref()) {
            (DemoAction::Wait, _) => "Waiting...".to_string(),
            (DemoAction::Navigate, Some(path)) => format!("Navigating to {path}"),
            (DemoAction::Navigate, None) => "Navigating".to_string(),
            (DemoAction::Click, _) => "Clicking element".to_string(),
            (DemoAction::Fill, _) => "Filling form".to_string(),
            _ => "Processing...".to_string(),
        }
    }
}

/// Ordered, authoring-time-fixed list of steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoScript {
    /// Identifier shown in listings and logs.
    #[serde(default)]
    pub name: String,
    pub steps: Vec<DemoStep>,
}

impl DemoScript {
    pub fn new(name: impl Into<String>, steps: Vec<DemoStep>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, index: usize) -> Option<&DemoStep> {
        self.steps.get(index)
    }

    /// Sum of the authored pre-action delays, unscaled.
    pub fn authored_delay_ms(&self) -> u64 {
        self.steps.iter().map(|step| step.delay).sum()
    }
}

/// Which demo account and script a session plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemoRole {
    /// Customer purchase flow.
    #[default]
    User,
    /// Order management flow.
    Admin,
}

impl DemoRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Heading used by the playback controls.
    pub fn title(&self) -> &'static str {
        match self {
            Self::User => "User Demo",
            Self::Admin => "Admin Demo",
        }
    }
}

impl fmt::Display for DemoRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DemoRole {
    type Err = ParseDemoRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseDemoRoleError),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseDemoRoleError;

impl fmt::Display for ParseDemoRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid demo role; expected 'user' or 'admin'")
    }
}

impl Error for ParseDemoRoleError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_action_tags_survive_deserialization() {
        let step: DemoStep = serde_json::from_str(r##"{"action":"hover","selector":"#menu"}"##).expect("parse step");
        assert_eq!(step.action, DemoAction::Unknown("hover".into()));
        assert!(!step.action.is_known());

        let rendered = serde_json::to_value(&step).expect("serialize step");
        assert_eq!(rendered["action"], "hover");
    }

    #[test]
    fn camel_case_fields_and_default_delay() {
        let yaml = r#"
action: updateStatus
orderId: "1001"
status: delivered
"#;
        let step: DemoStep = serde_yaml::from_str(yaml).expect("parse yaml step");
        assert_eq!(step.action, DemoAction::UpdateStatus);
        assert_eq!(step.order_id.as_deref(), Some("1001"));
        assert_eq!(step.delay, 0);
    }

    #[test]
    fn summary_matches_overlay_copy() {
        assert_eq!(DemoStep::wait(10).summary(), "Waiting...");
        assert_eq!(DemoStep::navigate("/cart").summary(), "Navigating to /cart");
        assert_eq!(DemoStep::click("#x").summary(), "Clicking element");
        assert_eq!(DemoStep::fill("#x", "y").summary(), "Filling form");
        assert_eq!(DemoStep::simulate_payment().summary(), "Processing...");
    }

    #[test]
    fn role_parsing_is_case_insensitive() {
        assert_eq!("Admin".parse::<DemoRole>(), Ok(DemoRole::Admin));
        assert_eq!(" user ".parse::<DemoRole>(), Ok(DemoRole::User));
        assert!("guest".parse::<DemoRole>().is_err());
    }
}
