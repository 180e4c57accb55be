use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, instrument};

use warden_auth::{AuthError, RoleResolver};
use warden_core::{RoleSet, RoleSnapshot};

use crate::parse_user_id;

fn lookup_error(err: sqlx::Error) -> AuthError {
    AuthError::RoleLookup(err.into())
}

/// Roles from `user_roles`, version from `users.roles_version`.
///
/// Both come from one statement so they always describe the same moment.
/// Role changes made through [`PgRoleResolver::assign_role`] and
/// [`PgRoleResolver::revoke_role`] bump the version in the same transaction.
#[derive(Clone, Debug)]
pub struct PgRoleResolver {
    pool: PgPool,
}

impl PgRoleResolver {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Grants `role` to `user_id`, creating the role if needed. Returns the new version.
    #[instrument(skip(self))]
    pub async fn assign_role(&self, user_id: &str, role: &str) -> Result<u64, AuthError> {
        let uid = parse_user_id(user_id)
            .ok_or_else(|| AuthError::UnknownUser(user_id.to_string()))?;
        let mut tx = self.pool.begin().await.map_err(lookup_error)?;

        sqlx::query("INSERT INTO roles (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(role)
            .execute(&mut *tx)
            .await
            .map_err(lookup_error)?;

        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            SELECT $1, id FROM roles WHERE name = $2
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(uid)
        .bind(role)
        .execute(&mut *tx)
        .await
        .map_err(lookup_error)?;

        let version = bump_version(&mut tx, uid).await?;
        tx.commit().await.map_err(lookup_error)?;

        info!(user_id = %user_id, role = %role, roles_version = version, "Role assigned");
        Ok(version)
    }

    /// Marks the user's roles as changed without changing them. Returns the new version.
    pub async fn bump_version(&self, user_id: &str) -> Result<u64, AuthError> {
        let uid = parse_user_id(user_id)
            .ok_or_else(|| AuthError::UnknownUser(user_id.to_string()))?;
        let mut tx = self.pool.begin().await.map_err(lookup_error)?;
        let version = bump_version(&mut tx, uid).await?;
        tx.commit().await.map_err(lookup_error)?;
        Ok(version)
    }

    /// Removes `role` from `user_id`. Returns the new version.
    #[instrument(skip(self))]
    pub async fn revoke_role(&self, user_id: &str, role: &str) -> Result<u64, AuthError> {
        let uid = parse_user_id(user_id)
            .ok_or_else(|| AuthError::UnknownUser(user_id.to_string()))?;
        let mut tx = self.pool.begin().await.map_err(lookup_error)?;

        sqlx::query(
            r#"
            DELETE FROM user_roles
            WHERE user_id = $1 AND role_id IN (SELECT id FROM roles WHERE name = $2)
            "#,
        )
        .bind(uid)
        .bind(role)
        .execute(&mut *tx)
        .await
        .map_err(lookup_error)?;

        let version = bump_version(&mut tx, uid).await?;
        tx.commit().await.map_err(lookup_error)?;

        info!(user_id = %user_id, role = %role, roles_version = version, "Role revoked");
        Ok(version)
    }
}

async fn bump_version(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: uuid::Uuid,
) -> Result<u64, AuthError> {
    let version = sqlx::query_scalar::<_, i64>(
        "UPDATE users SET roles_version = roles_version + 1 WHERE id = $1 RETURNING roles_version",
    )
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(lookup_error)?
    .ok_or_else(|| AuthError::UnknownUser(user_id.to_string()))?;

    Ok(version.max(0) as u64)
}

#[async_trait]
impl RoleResolver for PgRoleResolver {
    #[instrument(skip(self))]
    async fn verify_user_roles(&self, user_id: &str) -> Result<RoleSnapshot, AuthError> {
        let uid = parse_user_id(user_id)
            .ok_or_else(|| AuthError::UnknownUser(user_id.to_string()))?;

        let row = sqlx::query_as::<_, (i64, Vec<String>)>(
            r#"
            SELECT u.roles_version,
                   COALESCE(array_agg(r.name) FILTER (WHERE r.name IS NOT NULL), '{}') AS roles
            FROM users u
            LEFT JOIN user_roles ur ON ur.user_id = u.id
            LEFT JOIN roles r ON r.id = ur.role_id
            WHERE u.id = $1
            GROUP BY u.id, u.roles_version
            "#,
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await
        .map_err(lookup_error)?;

        let (version, names) = row.ok_or_else(|| AuthError::UnknownUser(user_id.to_string()))?;

        Ok(RoleSnapshot::new(
            RoleSet::for_identity(names),
            version.max(0) as u64,
        ))
    }
}
