//! Authentication and authorization middleware.
//!
//! # Modules
//!
//! - [`pipeline`]: the axum middleware tying everything together
//! - [`session`]: credentials to [`warden_core::RequestContext`]
//! - [`gate`]: the pure route-policy decision
//! - [`ban`]: session revocation for banned users
//! - [`stamp`]: role-version cookie and client check on HTML responses
//! - [`extract`]: handler extractors over the request context
//!
//! # Flow
//!
//! 1. Bypass routes go straight to the handler
//! 2. The session is resolved (anonymous on any failure)
//! 3. The gate allows, redirects, or orders a ban
//! 4. Allowed requests run with the context in their extensions
//! 5. HTML responses for signed-in users are stamped with the role version

use axum::{
    http::{HeaderValue, StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::Cookie;

pub mod ban;
pub mod extract;
pub mod gate;
pub mod pipeline;
pub mod session;
pub mod stamp;

pub use extract::{AuthUser, RequireAdmin, Viewer};
pub use gate::{AuthorizationGate, Decision};
pub use pipeline::{RequestPipeline, auth_pipeline};

/// `302 Found` to `location`.
pub fn found(location: &str) -> Response {
    let location = HeaderValue::from_str(location).unwrap_or_else(|_| HeaderValue::from_static("/"));
    (StatusCode::FOUND, [(LOCATION, location)]).into_response()
}

/// A cookie that tells the browser to forget `name`.
pub fn removal_cookie(name: &str) -> Cookie<'static> {
    let mut cookie = Cookie::build((name.to_string(), "")).path("/").build();
    cookie.make_removal();
    cookie
}
