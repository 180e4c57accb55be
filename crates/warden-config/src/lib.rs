//! # Warden Config
//!
//! Configuration types loaded from environment variables:
//!
//! - [`routes`]: the five route-class pattern lists plus login/home paths
//! - [`jwt`]: session token signing and the session cookie name
//! - [`stamp`]: the role-version cookie
//! - [`server`]: listen address
//!
//! Every struct has a `from_env()` constructor and a `Default` matching the
//! documented defaults. `from_vars` takes a lookup closure so tests can supply
//! values without touching the process environment.
//!
//! # Example
//!
//! ```ignore
//! use warden_config::AppConfig;
//!
//! dotenvy::dotenv().ok();
//! let config = AppConfig::from_env();
//! println!("listening on {}", config.server.address());
//! ```

use std::env;

pub mod jwt;
pub mod routes;
pub mod server;
pub mod stamp;

pub use jwt::JwtConfig;
pub use routes::RouteConfig;
pub use server::ServerConfig;
pub use stamp::StampConfig;

/// All configuration needed to build the application state.
#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub routes: RouteConfig,
    pub jwt: JwtConfig,
    pub stamp: StampConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            routes: RouteConfig::from_vars(&lookup),
            jwt: JwtConfig::from_vars(&lookup),
            stamp: StampConfig::from_vars(&lookup),
            server: ServerConfig::from_vars(&lookup),
        }
    }
}

/// Splits a comma-separated variable into trimmed, non-empty entries.
pub(crate) fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
