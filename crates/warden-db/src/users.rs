//! Identity lookup for the admin CLI.

use sqlx::PgPool;
use uuid::Uuid;

use warden_core::Identity;

use crate::parse_user_id;

pub async fn find_identity(pool: &PgPool, user_id: &str) -> Result<Option<Identity>, sqlx::Error> {
    let Some(uid) = parse_user_id(user_id) else {
        return Ok(None);
    };

    let row = sqlx::query_as::<_, (Uuid, String, String)>(
        "SELECT id, email, display_name FROM users WHERE id = $1",
    )
    .bind(uid)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(id, email, name)| Identity::new(id.to_string(), email, name)))
}

pub async fn create_user(
    pool: &PgPool,
    email: &str,
    display_name: &str,
) -> Result<Identity, sqlx::Error> {
    let (id,) = sqlx::query_as::<_, (Uuid,)>(
        "INSERT INTO users (email, display_name) VALUES ($1, $2) RETURNING id",
    )
    .bind(email)
    .bind(display_name)
    .fetch_one(pool)
    .await?;

    Ok(Identity::new(id.to_string(), email, display_name))
}
