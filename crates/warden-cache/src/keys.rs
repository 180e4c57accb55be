//! Cache key generation.

/// Builds a cache key under `prefix`.
fn build_key(prefix: &str, parts: &[&str]) -> String {
    format!("{}:{}", prefix, parts.join(":"))
}

/// Cache keys for role data.
pub mod roles {
    use super::*;

    /// Key holding a user's JSON role snapshot.
    pub fn snapshot(prefix: &str, user_id: &str) -> String {
        build_key(prefix, &["user", user_id, "roles"])
    }

    /// Key holding a user's role version floor.
    pub fn version(prefix: &str, user_id: &str) -> String {
        build_key(prefix, &["user", user_id, "roles_version"])
    }
}
