//! # Warden Core
//!
//! Foundational types shared by every Warden crate:
//!
//! - [`errors`]: HTTP-facing [`AppError`] and the gate failure taxonomy
//! - [`identity`]: [`Identity`], the immutable [`RoleSet`] and [`RoleSnapshot`]
//! - [`context`]: the per-request [`RequestContext`]
//! - [`routes`]: glob-style route patterns and route-class classification
//!
//! # Example
//!
//! ```ignore
//! use warden_core::{RoleSet, RoutePatterns};
//!
//! let roles = RoleSet::for_identity(["admin"]);
//! assert!(roles.contains("user"));
//!
//! let admin = RoutePatterns::compile(["/admin/*"])?;
//! assert!(admin.matches("/admin/settings"));
//! ```

pub mod context;
pub mod errors;
pub mod identity;
pub mod routes;

pub use context::RequestContext;
pub use errors::{AppError, GateFailure};
pub use identity::{Identity, ROLE_ADMIN, ROLE_BANNED, ROLE_USER, RoleSet, RoleSnapshot};
pub use routes::{RouteClass, RouteMatch, RoutePatterns, RouteTable, matches};
