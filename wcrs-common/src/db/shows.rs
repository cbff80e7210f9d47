//! Show queries
//!
//! The (day_of_week, start_time) UNIQUE constraint is the conflict check;
//! inserts interpret a violation as ShowTimeslotConflict rather than
//! pre-checking, which would race under concurrent creators.

use crate::ctx::Ctx;
use crate::db::map_unique_violation;
use crate::db::models::{Show, ShowSummary};
use crate::error::{Error, Result};
use sqlx::{Row, SqlitePool};

/// Fields for a new show; day/time assumed pre-validated by the caller
#[derive(Debug, Clone)]
pub struct NewShow {
    pub title: String,
    pub description: String,
    pub day_of_week: String,
    pub start_time: String,
    pub output_path: String,
    /// Hosts beyond the creator
    pub co_hosts: Vec<i64>,
}

/// Insert a show and its host set in one transaction.
///
/// The creator is always a host, so the owner set is never empty.
pub async fn create_show(pool: &SqlitePool, new: &NewShow, ctx: &Ctx) -> Result<i64> {
    let mut tx = pool.begin().await?;
    let now = ctx.now.timestamp();

    let row = sqlx::query(
        "INSERT INTO shows (title, description, day_of_week, start_time, output_path,
                            created_by, updated_by, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
         RETURNING id",
    )
    .bind(&new.title)
    .bind(&new.description)
    .bind(&new.day_of_week)
    .bind(&new.start_time)
    .bind(&new.output_path)
    .bind(ctx.user_id)
    .bind(ctx.user_id)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| map_unique_violation(e, Error::ShowTimeslotConflict))?;
    let show_id = row.get::<i64, _>("id");

    sqlx::query("INSERT INTO show_hosts (user_id, show_id) VALUES (?, ?)")
        .bind(ctx.user_id)
        .bind(show_id)
        .execute(&mut *tx)
        .await?;

    for host in &new.co_hosts {
        if *host == ctx.user_id {
            continue;
        }
        sqlx::query("INSERT INTO show_hosts (user_id, show_id) VALUES (?, ?)")
            .bind(host)
            .bind(show_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(show_id)
}

/// Get a show by id
pub async fn get_show(pool: &SqlitePool, id: i64) -> Result<Show> {
    let row = sqlx::query(
        "SELECT id, title, description, day_of_week, start_time, output_path,
                created_by, updated_by, created_at, updated_at
         FROM shows WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("show id {} doesn't exist", id)))?;

    Ok(row_to_show(&row))
}

/// Update title/description and replace co-hosts. The recurrence key and
/// output path are fixed at creation.
pub async fn update_show(
    pool: &SqlitePool,
    id: i64,
    title: &str,
    description: &str,
    co_hosts: &[i64],
    ctx: &Ctx,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        "UPDATE shows SET title = ?, description = ?, updated_by = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(title)
    .bind(description)
    .bind(ctx.user_id)
    .bind(ctx.now.timestamp())
    .bind(id)
    .execute(&mut *tx)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(Error::NotFound(format!("show id {} doesn't exist", id)));
    }

    // Replace the co-host set, keeping the acting host
    sqlx::query("DELETE FROM show_hosts WHERE show_id = ? AND user_id != ?")
        .bind(id)
        .bind(ctx.user_id)
        .execute(&mut *tx)
        .await?;
    for host in co_hosts {
        if *host == ctx.user_id {
            continue;
        }
        sqlx::query("INSERT OR IGNORE INTO show_hosts (user_id, show_id) VALUES (?, ?)")
            .bind(host)
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Delete a show. Refused while future episodes exist, so the puller's
/// view can never reference an orphaned output path.
pub async fn delete_show(pool: &SqlitePool, id: i64, now_epoch: i64) -> Result<()> {
    let mut tx = pool.begin().await?;

    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM shows WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Err(Error::NotFound(format!("show id {} doesn't exist", id)));
    }

    let future: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM episodes WHERE show_id = ? AND air_date > ?")
            .bind(id)
            .bind(now_epoch)
            .fetch_one(&mut *tx)
            .await?;
    if future > 0 {
        return Err(Error::Validation(format!(
            "show {} still has {} scheduled episode(s); delete them first",
            id, future
        )));
    }

    sqlx::query("DELETE FROM episodes WHERE show_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM show_hosts WHERE show_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM shows WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// All shows with their playout output paths (catalog projection)
pub async fn list_shows(pool: &SqlitePool) -> Result<Vec<ShowSummary>> {
    let rows = sqlx::query("SELECT id, title, output_path FROM shows ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|row| ShowSummary {
            id: row.get("id"),
            title: row.get("title"),
            file_path: row.get("output_path"),
        })
        .collect())
}

/// Whether the user is a host of the show
pub async fn is_host(pool: &SqlitePool, show_id: i64, user_id: i64) -> Result<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM show_hosts WHERE show_id = ? AND user_id = ?")
            .bind(show_id)
            .bind(user_id)
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}

/// Host user ids for a show
pub async fn hosts(pool: &SqlitePool, show_id: i64) -> Result<Vec<i64>> {
    let rows = sqlx::query_scalar::<_, i64>(
        "SELECT user_id FROM show_hosts WHERE show_id = ? ORDER BY user_id",
    )
    .bind(show_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

fn row_to_show(row: &sqlx::sqlite::SqliteRow) -> Show {
    Show {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        day_of_week: row.get("day_of_week"),
        start_time: row.get("start_time"),
        output_path: row.get("output_path"),
        created_by: row.get("created_by"),
        updated_by: row.get("updated_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
