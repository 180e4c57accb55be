//! `Cache-Control` header helpers.
//!
//! Bypass routes (feeds, static assets) set their own public caching with
//! [`cache_control`]; the authorization pipeline marks every other response
//! [`CacheControlConfig::no_store`] unless the handler chose a policy itself.
//!
//! # Example
//!
//! ```ignore
//! use warden_cache::http::{cache_control, CacheControlConfig};
//! use axum::Router;
//!
//! let feed = Router::new()
//!     .route("/feed.xml", get(feed))
//!     .layer(cache_control(CacheControlConfig::public(300)));
//! ```

use axum::http::{HeaderValue, Response, header::CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;

/// Configuration for Cache-Control header.
#[derive(Debug, Clone)]
pub struct CacheControlConfig {
    /// Whether the response can be cached by any cache (public) or only by browser (private).
    pub public: bool,
    /// Maximum age in seconds the response is considered fresh.
    pub max_age: u64,
    /// Whether the response should not be cached at all.
    pub no_cache: bool,
    /// Whether the response should not be stored at all.
    pub no_store: bool,
}

impl CacheControlConfig {
    /// Create a public cache configuration.
    pub fn public(max_age: u64) -> Self {
        Self {
            public: true,
            max_age,
            no_cache: false,
            no_store: false,
        }
    }

    /// Create a no-store configuration (never cache). Used for
    /// responses that depend on who is signed in.
    pub fn no_store() -> Self {
        Self {
            public: false,
            max_age: 0,
            no_cache: true,
            no_store: true,
        }
    }

    /// Build the Cache-Control header value.
    pub fn to_header_value(&self) -> HeaderValue {
        let mut directives = Vec::new();

        directives.push(if self.public { "public" } else { "private" }.to_string());

        if self.no_store {
            directives.push("no-store".to_string());
        }

        if self.no_cache {
            directives.push("no-cache".to_string());
        }

        if !self.no_store && !self.no_cache {
            directives.push(format!("max-age={}", self.max_age));
        }

        HeaderValue::from_str(&directives.join(", "))
            .unwrap_or_else(|_| HeaderValue::from_static("no-cache"))
    }
}

impl Default for CacheControlConfig {
    fn default() -> Self {
        Self::no_store()
    }
}

/// Helper struct to generate Cache-Control header values.
#[derive(Clone)]
pub struct CacheControlMakeHeader(HeaderValue);

impl<B> tower_http::set_header::MakeHeaderValue<Response<B>> for CacheControlMakeHeader {
    fn make_header_value(&mut self, _message: &Response<B>) -> Option<HeaderValue> {
        Some(self.0.clone())
    }
}

/// Create a Cache-Control layer with the given configuration.
///
/// The header is only added when the handler did not set one.
pub fn cache_control(config: CacheControlConfig) -> SetResponseHeaderLayer<CacheControlMakeHeader> {
    let header_value = config.to_header_value();
    SetResponseHeaderLayer::if_not_present(CACHE_CONTROL, CacheControlMakeHeader(header_value))
}
