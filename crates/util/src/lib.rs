//! Helpers shared by the Savor crates: credential redaction, config paths, and
//! persisted user preferences.

pub mod path_processing;
pub mod preferences;
pub mod text_processing;

pub use path_processing::{config_file_path, expand_tilde};
pub use preferences::{PreferencesError, UserPreferences};
pub use text_processing::{mask_token, redact_sensitive, redact_sensitive_with};
