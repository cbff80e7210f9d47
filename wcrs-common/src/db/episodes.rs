//! Episode queries
//!
//! The UNIQUE constraint on air_date is the global one-broadcast-per-
//! instant rule; two concurrent submissions for the same instant resolve
//! to one insert and one EpisodeTimeslotConflict.

use crate::ctx::Ctx;
use crate::db::map_unique_violation;
use crate::db::models::{Episode, EpisodeSummary};
use crate::error::{Error, Result};
use sqlx::{Row, SqlitePool};

/// Fields for a new episode; air_date already validated against the
/// show's timeslot by the lifecycle layer
#[derive(Debug, Clone)]
pub struct NewEpisode {
    pub show_id: i64,
    pub title: String,
    pub description: String,
    /// Unix epoch seconds, UTC
    pub air_date: i64,
    pub file_id: String,
    pub original_filename: String,
}

/// Insert an episode, returning the new id
pub async fn insert_episode(pool: &SqlitePool, new: &NewEpisode, ctx: &Ctx) -> Result<i64> {
    let now = ctx.now.timestamp();
    let row = sqlx::query(
        "INSERT INTO episodes (show_id, title, description, air_date, file_id,
                               original_filename, created_by, updated_by, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         RETURNING id",
    )
    .bind(new.show_id)
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.air_date)
    .bind(&new.file_id)
    .bind(&new.original_filename)
    .bind(ctx.user_id)
    .bind(ctx.user_id)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| map_unique_violation(e, Error::EpisodeTimeslotConflict))?;

    Ok(row.get::<i64, _>("id"))
}

/// Get an episode by id
pub async fn get_episode(pool: &SqlitePool, id: i64) -> Result<Episode> {
    let row = sqlx::query(
        "SELECT id, show_id, title, description, air_date, file_id, original_filename,
                created_by, updated_by, created_at, updated_at
         FROM episodes WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("episode id {} doesn't exist", id)))?;

    Ok(Episode {
        id: row.get("id"),
        show_id: row.get("show_id"),
        title: row.get("title"),
        description: row.get("description"),
        air_date: row.get("air_date"),
        file_id: row.get("file_id"),
        original_filename: row.get("original_filename"),
        created_by: row.get("created_by"),
        updated_by: row.get("updated_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Update title/description. air_date and file_id are immutable after
/// creation; replacing the audio is delete + recreate.
pub async fn update_episode(
    pool: &SqlitePool,
    id: i64,
    title: &str,
    description: &str,
    ctx: &Ctx,
) -> Result<()> {
    let result = sqlx::query(
        "UPDATE episodes SET title = ?, description = ?, updated_by = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(title)
    .bind(description)
    .bind(ctx.user_id)
    .bind(ctx.now.timestamp())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("episode id {} doesn't exist", id)));
    }
    Ok(())
}

/// Delete an episode. Idempotent: returns false when the row was already
/// gone. Never touches the show or any staged files.
pub async fn delete_episode(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM episodes WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Upcoming episodes for a show, air_date strictly after `now_epoch`,
/// ascending (catalog projection)
pub async fn list_upcoming(
    pool: &SqlitePool,
    show_id: i64,
    now_epoch: i64,
) -> Result<Vec<EpisodeSummary>> {
    let rows = sqlx::query(
        "SELECT id, title, air_date, file_id
         FROM episodes
         WHERE show_id = ? AND air_date > ?
         ORDER BY air_date ASC",
    )
    .bind(show_id)
    .bind(now_epoch)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| EpisodeSummary {
            id: row.get("id"),
            title: row.get("title"),
            air_date: row.get("air_date"),
            file_id: row.get("file_id"),
        })
        .collect())
}
