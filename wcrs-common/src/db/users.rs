//! User queries
//!
//! Authentication lives outside this system; the users table only backs
//! audit fields and host membership.

use crate::error::{Error, Result};
use sqlx::{Row, SqlitePool};

/// Insert a user, returning the new id
pub async fn create_user(pool: &SqlitePool, name: &str) -> Result<i64> {
    if name.trim().is_empty() {
        return Err(Error::Validation("user name is required".to_string()));
    }
    let row = sqlx::query("INSERT INTO users (name) VALUES (?) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await?;
    Ok(row.get::<i64, _>("id"))
}

/// All user ids except the given one, ordered by name (co-host pickers)
pub async fn other_users(pool: &SqlitePool, user_id: i64) -> Result<Vec<(i64, String)>> {
    let rows = sqlx::query_as::<_, (i64, String)>(
        "SELECT id, name FROM users WHERE id != ? ORDER BY name",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
