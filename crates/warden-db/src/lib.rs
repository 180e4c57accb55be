//! # Warden DB
//!
//! Postgres implementations of the auth capabilities:
//!
//! - [`PgSessionStore`]: session records in the `sessions` table
//! - [`PgRoleResolver`]: roles from `user_roles`/`roles`, version from
//!   `users.roles_version`
//! - [`users`]: identity lookup and creation used by the admin CLI
//!
//! The tables are described in `migrations/0001_warden.sql`.
//!
//! # Example
//!
//! ```ignore
//! use warden_db::{init_db_pool, PgRoleResolver, PgSessionStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let pool = init_db_pool().await;
//!     let sessions = PgSessionStore::new(pool.clone());
//!     let roles = PgRoleResolver::new(pool);
//! }
//! ```

use std::env;

pub mod roles;
pub mod sessions;
pub mod users;

pub use roles::PgRoleResolver;
pub use sessions::PgSessionStore;

/// Initializes a PostgreSQL connection pool.
///
/// This function reads the database URL from the `DATABASE_URL` environment
/// variable and creates a connection pool.
///
/// # Panics
///
/// Panics if:
/// - `DATABASE_URL` environment variable is not set
/// - Connection to the database fails
///
/// # Note
///
/// Call once during startup; the returned pool is cheaply cloneable.
pub async fn init_db_pool() -> sqlx::PgPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    sqlx::PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to database")
}

/// Parses a user id as stored in Postgres.
pub(crate) fn parse_user_id(user_id: &str) -> Option<uuid::Uuid> {
    uuid::Uuid::parse_str(user_id).ok()
}

// Re-export PgPool for convenience
pub use sqlx::PgPool;
