//! Demo playback preferences (speed and role) kept in a small JSON file.
//!
//! The file lives at `<config_dir>/savor/preferences.json` unless
//! [`PREFERENCES_PATH_ENV`] points elsewhere. A missing file means "no
//! preference"; an unparsable one is logged and ignored.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use savor_types::DemoRole;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config_file_path;

pub const PREFERENCES_PATH_ENV: &str = "SAVOR_PREFERENCES_PATH";
pub const PREFERENCES_FILE_NAME: &str = "preferences.json";

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("cannot access preferences file: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot encode preferences: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("demo speed must be a positive, finite number; got {0}")]
    InvalidSpeed(f64),
}

/// On-disk shape. Absent keys read as "unset".
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferencesPayload {
    #[serde(default)]
    pub demo_speed: Option<f64>,
    #[serde(default)]
    pub demo_role: Option<DemoRole>,
}

impl PreferencesPayload {
    fn read(path: &Path) -> Result<Self, PreferencesError> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(error) => return Err(error.into()),
        };
        Ok(serde_json::from_str(&data).unwrap_or_else(|error| {
            warn!(path = %path.display(), %error, "ignoring unreadable preferences file");
            Self::default()
        }))
    }

    fn write(&self, path: &Path) -> Result<(), PreferencesError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!(path = %path.display(), "saved preferences");
        Ok(())
    }
}

/// Preference store shared by the `demo` commands.
///
/// A store built with [`UserPreferences::ephemeral`] has no file and keeps
/// changes in memory only.
#[derive(Debug, Default)]
pub struct UserPreferences {
    path: Option<PathBuf>,
    payload: Mutex<PreferencesPayload>,
}

impl UserPreferences {
    /// Opens the file named by [`PREFERENCES_PATH_ENV`], or the default location.
    pub fn new() -> Result<Self, PreferencesError> {
        Self::open(config_file_path(PREFERENCES_PATH_ENV, PREFERENCES_FILE_NAME))
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PreferencesError> {
        let path = path.into();
        let payload = PreferencesPayload::read(&path)?;
        Ok(Self {
            path: Some(path),
            payload: Mutex::new(payload),
        })
    }

    pub fn ephemeral() -> Self {
        Self::default()
    }

    /// Backing file; empty for an ephemeral store.
    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or(Path::new(""))
    }

    pub fn demo_speed(&self) -> Option<f64> {
        self.lock_payload().demo_speed
    }

    pub fn set_demo_speed(&self, speed: f64) -> Result<(), PreferencesError> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(PreferencesError::InvalidSpeed(speed));
        }
        self.update(|payload| payload.demo_speed = Some(speed))
    }

    pub fn demo_role(&self) -> Option<DemoRole> {
        self.lock_payload().demo_role
    }

    /// `None` clears the saved role.
    pub fn set_demo_role(&self, role: Option<DemoRole>) -> Result<(), PreferencesError> {
        self.update(|payload| payload.demo_role = role)
    }

    fn lock_payload(&self) -> MutexGuard<'_, PreferencesPayload> {
        self.payload.lock().expect("preferences lock poisoned")
    }

    fn update(&self, apply: impl FnOnce(&mut PreferencesPayload)) -> Result<(), PreferencesError> {
        let mut payload = self.lock_payload();
        apply(&mut payload);
        match &self.path {
            Some(path) => payload.write(path),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_round_trips_through_disk() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join(PREFERENCES_FILE_NAME);

        let preferences = UserPreferences::open(&path).unwrap();
        assert_eq!(preferences.demo_speed(), None);
        preferences.set_demo_speed(2.0).unwrap();
        preferences.set_demo_role(Some(DemoRole::Admin)).unwrap();

        let reopened = UserPreferences::open(&path).unwrap();
        assert_eq!(reopened.demo_speed(), Some(2.0));
        assert_eq!(reopened.demo_role(), Some(DemoRole::Admin));
    }

    #[test]
    fn rejects_non_positive_speed() {
        let preferences = UserPreferences::ephemeral();
        assert_eq!(preferences.path(), Path::new(""));
        assert!(matches!(preferences.set_demo_speed(0.0), Err(PreferencesError::InvalidSpeed(_))));
        assert!(matches!(preferences.set_demo_speed(f64::NAN), Err(PreferencesError::InvalidSpeed(_))));
        assert_eq!(preferences.demo_speed(), None);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(PREFERENCES_FILE_NAME);
        fs::write(&path, "{not json").unwrap();

        let preferences = UserPreferences::open(&path).unwrap();
        assert_eq!(preferences.demo_speed(), None);
    }

    #[test]
    fn env_override_selects_the_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("prefs.json");
        temp_env::with_var(PREFERENCES_PATH_ENV, Some(path.to_str().unwrap()), || {
            let preferences = UserPreferences::new().unwrap();
            assert_eq!(preferences.path(), path.as_path());
        });
    }
}
