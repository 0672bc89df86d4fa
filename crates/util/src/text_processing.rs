//! # Text Processing Utilities
//!
//! Redaction of credentials before they reach logs or the terminal.

use once_cell::sync::Lazy;
use regex::Regex;

/// Redacts values that look like secrets in a string.
///
/// Bearer authorization headers, `KEY=value` style secrets, JSON `token`/`password`
/// fields, and bare JWTs are replaced with `[REDACTED]` while the surrounding key
/// names are preserved.
///
/// # Example
/// ```rust
/// use savor_util::redact_sensitive;
///
/// let redacted = redact_sensitive("Authorization: Bearer abc.def.ghi");
/// assert_eq!(redacted, "Authorization: Bearer [REDACTED]");
/// ```
pub fn redact_sensitive(input: &str) -> String {
    redact_sensitive_with(input, "[REDACTED]")
}

/// Redacts sensitive-looking values, using a custom replacement token.
pub fn redact_sensitive_with(input: &str, replacement: &str) -> String {
    let mut redacted = input.to_string();

    for pattern in redact_patterns().iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                let suffix = captures.get(3).map(|m| m.as_str()).unwrap_or("");
                format!("{prefix}{replacement}{suffix}")
            })
            .to_string();
    }

    redacted
}

/// Shows only the last four characters of a token.
pub fn mask_token(token: &str) -> String {
    let visible: String = token.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    if token.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("****{visible}")
    }
}

/// Returns compiled regex patterns for detecting sensitive information.
///
/// Every pattern captures a prefix in group 1, the secret in group 2, and an
/// optional suffix in group 3.
fn redact_patterns() -> &'static Vec<Regex> {
    static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(build_redact_patterns);

    &REDACT_PATTERNS
}

fn build_redact_patterns() -> Vec<Regex> {
    [
        r"(?i)(authorization:\s*bearer\s+)([^\s,;]+)()",
        r#"(?i)("(?:access_?token|accessToken|token|password)"\s*:\s*")([^"]+)(")"#,
        r"(?i)([A-Z0-9_]*(?:KEY|TOKEN|SECRET|PASSWORD)=)([^\s]+)()",
        r"()(eyJ[A-Za-z0-9_-]{5,}\.[A-Za-z0-9_-]{5,}\.[A-Za-z0-9_-]{5,})()",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_json_token_fields() {
        let input = r#"{"token":"abc123","user":{"name":"Demo"}}"#;
        assert_eq!(redact_sensitive(input), r#"{"token":"[REDACTED]","user":{"name":"Demo"}}"#);
    }

    #[test]
    fn redacts_env_style_secrets() {
        assert_eq!(redact_sensitive("SAVOR_API_TOKEN=xyz other=1"), "SAVOR_API_TOKEN=[REDACTED] other=1");
    }

    #[test]
    fn redacts_bare_jwts() {
        let jwt = "eyJhbGciOi.eyJzdWIiOiIx.c2lnbmF0dXJl";
        assert_eq!(redact_sensitive(&format!("token {jwt} issued")), "token [REDACTED] issued");
    }

    #[test]
    fn masks_all_but_the_tail() {
        assert_eq!(mask_token("abcdef123456"), "****3456");
        assert_eq!(mask_token("abc"), "****");
    }
}
