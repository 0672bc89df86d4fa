//! Demo scripts authored as YAML or JSON files.
//!
//! Two layouts are accepted:
//!
//! ```yaml
//! name: checkout
//! steps:
//!   - action: navigate
//!     value: /
//!   - action: click
//!     selector: '[data-demo="cart-icon"]'
//!     delay: 500
//! ```
//!
//! or the bare `steps` list. Files ending in `.json` are parsed as JSON, all
//! others as YAML.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use savor_types::{DemoScript, DemoStep};
use serde::Deserialize;
use tracing::warn;

#[derive(Deserialize)]
#[serde(untagged)]
enum ScriptDocument {
    Named(DemoScript),
    Steps(Vec<DemoStep>),
}

/// Loads a demo script, naming bare step lists after the file stem.
pub fn load_script_file(file_path: impl AsRef<Path>) -> Result<DemoScript> {
    let file_path = file_path.as_ref();
    let content = fs::read_to_string(file_path).with_context(|| format!("Failed to read demo script: {}", file_path.display()))?;
    let is_json = file_path
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));

    let document: ScriptDocument = if is_json {
        serde_json::from_str(&content).with_context(|| format!("Invalid JSON demo script: {}", file_path.display()))?
    } else {
        serde_yaml::from_str(&content).with_context(|| format!("Invalid YAML demo script: {}", file_path.display()))?
    };

    let fallback_name = || {
        file_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "custom".to_string())
    };
    let script = match document {
        ScriptDocument::Named(mut script) => {
            if script.name.trim().is_empty() {
                script.name = fallback_name();
            }
            script
        }
        ScriptDocument::Steps(steps) => DemoScript::new(fallback_name(), steps),
    };

    if script.is_empty() {
        bail!("Demo script {} has no steps", file_path.display());
    }
    for (index, step) in script.steps.iter().enumerate() {
        if !step.action.is_known() {
            warn!(index, action = %step.action, "demo script uses an unknown action; the step will be skipped");
        }
    }
    Ok(script)
}
