use std::env;

/// Session token settings.
///
/// - `JWT_SECRET`: signing secret
/// - `SESSION_EXPIRY`: token and session lifetime in seconds (default: 7 days)
/// - `SESSION_COOKIE`: cookie carrying the token for browser requests (default: `session`)
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub session_expiry: i64,
    pub cookie_name: String,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            secret: lookup("JWT_SECRET").unwrap_or(defaults.secret),
            session_expiry: lookup("SESSION_EXPIRY")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.session_expiry),
            cookie_name: lookup("SESSION_COOKIE").unwrap_or(defaults.cookie_name),
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "your-secret-key-change-in-production".to_string(),
            session_expiry: 604800, // 7 days
            cookie_name: "session".to_string(),
        }
    }
}
