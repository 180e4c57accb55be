//! # Warden Auth
//!
//! The external capabilities the authorization pipeline consumes, and the
//! implementations Warden ships for them:
//!
//! - [`provider`]: [`AuthProvider`] resolves request credentials to a [`Session`]
//! - [`store`]: [`SessionStore`] owns server-side session records
//! - [`resolver`]: [`RoleResolver`] reports a user's roles and role version
//! - [`jwt_provider`]: [`JwtAuthProvider`], a JWT-backed provider whose tokens
//!   are only honoured while their session record is live
//! - [`claims`] and [`jwt`]: token structure, creation and verification
//!
//! In-memory implementations ([`MemorySessionStore`], [`StaticRoleResolver`])
//! back local development and tests; Postgres implementations live in
//! `warden-db`.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use warden_auth::{JwtAuthProvider, MemorySessionStore};
//! use warden_config::JwtConfig;
//! use warden_core::Identity;
//!
//! let sessions = Arc::new(MemorySessionStore::new());
//! let provider = JwtAuthProvider::new(JwtConfig::from_env(), sessions);
//! let token = provider
//!     .issue_session(&Identity::new("42", "ada@example.com", "Ada"))
//!     .await?;
//! ```

pub mod claims;
pub mod error;
pub mod jwt;
pub mod jwt_provider;
pub mod provider;
pub mod resolver;
pub mod store;

pub use claims::SessionClaims;
pub use error::AuthError;
pub use jwt::{create_session_token, verify_session_token};
pub use jwt_provider::JwtAuthProvider;
pub use provider::{AuthProvider, Session};
pub use resolver::{RoleResolver, StaticRoleResolver};
pub use store::{MemorySessionStore, SessionStore};
