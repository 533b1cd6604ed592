//! Production settings for the web application serving the built site.

use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// Environment variable overriding the session secret
pub const SECRET_KEY_VAR: &str = "SECRET_KEY";

/// Used when `SECRET_KEY` is unset. Insecure; production must override it.
pub const FALLBACK_SECRET_KEY: &str = "your-secret-key-here";

const DAY: u64 = 24 * 60 * 60;

/// SameSite attribute of the session cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Application log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// Session secret; never shown by `Debug` or serialization
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// True when the insecure built-in fallback is in use
    pub fn is_fallback(&self) -> bool {
        self.0 == FALLBACK_SECRET_KEY
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

impl Serialize for SecretKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("<redacted>")
    }
}

fn as_secs<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(d.as_secs())
}

/// Production deployment settings, built once at startup and passed to `create_app`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductionConfig {
    // Security
    pub secret_key: SecretKey,
    pub session_cookie_secure: bool,
    pub session_cookie_httponly: bool,
    pub session_cookie_samesite: SameSite,
    #[serde(serialize_with = "as_secs")]
    pub permanent_session_lifetime: Duration,

    // Performance
    pub jsonify_prettyprint_regular: bool,
    pub json_sort_keys: bool,

    /// Cache lifetime for static files
    #[serde(serialize_with = "as_secs")]
    pub send_file_max_age_default: Duration,

    pub debug: bool,
    pub testing: bool,

    pub log_level: LogLevel,

    // Security headers
    pub secure_content_type_nosniff: bool,
    pub secure_browser_xss_filter: bool,
    pub secure_ssl_redirect: bool,
    pub x_frame_options: String,
    pub x_content_type_options: String,
    pub x_xss_protection: String,
}

impl ProductionConfig {
    /// Settings with the secret taken from `SECRET_KEY`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Settings with the secret resolved through `lookup`.
    /// An unset or empty value falls back to `FALLBACK_SECRET_KEY`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let secret = lookup(SECRET_KEY_VAR)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| FALLBACK_SECRET_KEY.to_string());

        Self {
            secret_key: SecretKey::new(secret),
            session_cookie_secure: true,
            session_cookie_httponly: true,
            session_cookie_samesite: SameSite::Lax,
            permanent_session_lifetime: Duration::from_secs(30 * DAY),
            jsonify_prettyprint_regular: false,
            json_sort_keys: false,
            send_file_max_age_default: Duration::from_secs(365 * DAY),
            debug: false,
            testing: false,
            log_level: LogLevel::Warning,
            secure_content_type_nosniff: true,
            secure_browser_xss_filter: true,
            secure_ssl_redirect: true,
            x_frame_options: "SAMEORIGIN".to_string(),
            x_content_type_options: "nosniff".to_string(),
            x_xss_protection: "1; mode=block".to_string(),
        }
    }
}
