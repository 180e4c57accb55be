//! Route-class configuration.
//!
//! # Environment Variables
//!
//! Each list is comma-separated; `*` matches any run of characters.
//!
//! - `ROUTES_BYPASS`: no authentication work at all (default: `/health,/metrics,/feed.xml,/static/*,/favicon.ico`)
//! - `ROUTES_ADMIN`: requires the `admin` role (default: `/admin,/admin/*`)
//! - `ROUTES_PROTECTED`: requires a session (default: `/logout,/api/*`)
//! - `ROUTES_PROTECTED_REDIRECT`: requires a session, login returns here (default: `/dashboard,/dashboard/*,/account,/account/*`)
//! - `ROUTES_REDIRECT`: anonymous only (default: `/login`)
//! - `LOGIN_PATH` (default: `/login`) and `HOME_PATH` (default: `/`)

use std::env;

use crate::parse_list;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteConfig {
    pub bypass: Vec<String>,
    pub admin: Vec<String>,
    pub protected: Vec<String>,
    pub protected_redirect: Vec<String>,
    pub redirect: Vec<String>,
    pub login_path: String,
    pub home_path: String,
}

impl RouteConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let list = |key: &str, fallback: Vec<String>| {
            lookup(key).map(|v| parse_list(&v)).unwrap_or(fallback)
        };

        Self {
            bypass: list("ROUTES_BYPASS", defaults.bypass),
            admin: list("ROUTES_ADMIN", defaults.admin),
            protected: list("ROUTES_PROTECTED", defaults.protected),
            protected_redirect: list("ROUTES_PROTECTED_REDIRECT", defaults.protected_redirect),
            redirect: list("ROUTES_REDIRECT", defaults.redirect),
            login_path: lookup("LOGIN_PATH").unwrap_or(defaults.login_path),
            home_path: lookup("HOME_PATH").unwrap_or(defaults.home_path),
        }
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            bypass: owned(&["/health", "/metrics", "/feed.xml", "/static/*", "/favicon.ico"]),
            admin: owned(&["/admin", "/admin/*"]),
            protected: owned(&["/logout", "/api/*"]),
            protected_redirect: owned(&["/dashboard", "/dashboard/*", "/account", "/account/*"]),
            redirect: owned(&["/login"]),
            login_path: "/login".into(),
            home_path: "/".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_overrides_replace_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("ROUTES_ADMIN", "/ops/*, /admin/*"),
            ("LOGIN_PATH", "/signin"),
        ]);
        let config = RouteConfig::from_vars(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.admin, vec!["/ops/*", "/admin/*"]);
        assert_eq!(config.login_path, "/signin");
        assert_eq!(config.redirect, vec!["/login"]);
    }

    #[test]
    fn test_empty_list_disables_class() {
        let config = RouteConfig::from_vars(|k| (k == "ROUTES_BYPASS").then(String::new));
        assert!(config.bypass.is_empty());
    }
}
