use std::env;

use crate::parse_bool;

/// Role-version cookie settings.
///
/// - `ROLES_VERSION_COOKIE`: cookie name, also the client storage key (default: `rolesVersion`)
/// - `COOKIE_SECURE`: mark cookies `Secure` (default: `true`; disable only for plain-HTTP development)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StampConfig {
    pub cookie_name: String,
    pub secure: bool,
}

impl StampConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            cookie_name: lookup("ROLES_VERSION_COOKIE").unwrap_or(defaults.cookie_name),
            secure: lookup("COOKIE_SECURE")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.secure),
        }
    }
}

impl Default for StampConfig {
    fn default() -> Self {
        Self {
            cookie_name: "rolesVersion".to_string(),
            secure: true,
        }
    }
}
