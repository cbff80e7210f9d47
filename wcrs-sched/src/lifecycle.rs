//! Episode and show lifecycle rules
//!
//! The only write path for schedule state. Every mutating call takes an
//! explicit Ctx (acting user + reference instant); validation happens
//! here, conflict detection happens at the storage constraint and is
//! translated by the db layer.

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc};
use sqlx::SqlitePool;
use wcrs_common::config::StationConfig;
use wcrs_common::db::episodes::{self, NewEpisode};
use wcrs_common::db::shows::{self, NewShow};
use wcrs_common::db::{Episode, Show};
use wcrs_common::schedule;
use wcrs_common::{Ctx, Error, Result};

/// Caller-supplied fields for a new show
#[derive(Debug, Clone)]
pub struct ShowInput {
    pub title: String,
    pub description: String,
    pub day_of_week: String,
    pub start_time: String,
    pub output_path: String,
    pub co_hosts: Vec<i64>,
}

/// Caller-supplied fields for a new episode. `air_date_local` is station
/// wall-clock `YYYY-MM-DDTHH:MM`, exactly what the upload form posts.
#[derive(Debug, Clone)]
pub struct EpisodeInput {
    pub title: String,
    pub description: String,
    pub air_date_local: String,
    pub file_id: String,
    pub original_filename: String,
}

/// Create a show occupying a weekly timeslot.
///
/// The (day_of_week, start_time) pair must be free; a constraint
/// violation surfaces as ShowTimeslotConflict.
pub async fn create_show(pool: &SqlitePool, input: &ShowInput, ctx: &Ctx) -> Result<i64> {
    if input.title.trim().is_empty() {
        return Err(Error::Validation("title is required".to_string()));
    }
    if input.description.trim().is_empty() {
        return Err(Error::Validation("description is required".to_string()));
    }
    if input.output_path.trim().is_empty() {
        return Err(Error::Validation("output path is required".to_string()));
    }
    let day = schedule::parse_weekday(&input.day_of_week)?;
    let start_time = schedule::parse_start_time(&input.start_time)?;

    let new = NewShow {
        title: input.title.clone(),
        description: input.description.clone(),
        day_of_week: schedule::weekday_symbol(day).to_string(),
        start_time: start_time.format("%H:%M").to_string(),
        output_path: input.output_path.clone(),
        co_hosts: input.co_hosts.clone(),
    };
    shows::create_show(pool, &new, ctx).await
}

/// Update a show's title, description, and co-host set (hosts only)
pub async fn update_show(
    pool: &SqlitePool,
    show_id: i64,
    title: &str,
    description: &str,
    co_hosts: &[i64],
    ctx: &Ctx,
) -> Result<()> {
    let show = shows::get_show(pool, show_id).await?;
    require_host(pool, &show, ctx).await?;
    if title.trim().is_empty() {
        return Err(Error::Validation("title is required".to_string()));
    }
    shows::update_show(pool, show_id, title, description, co_hosts, ctx).await
}

/// Delete a show (hosts only). Refused while future episodes exist.
pub async fn delete_show(pool: &SqlitePool, show_id: i64, ctx: &Ctx) -> Result<()> {
    let show = shows::get_show(pool, show_id).await?;
    require_host(pool, &show, ctx).await?;
    shows::delete_show(pool, show_id, ctx.now.timestamp()).await
}

/// Schedule an episode of a show.
///
/// The candidate date must land on the show's weekday at the show's
/// start time in the station zone (`ScheduleMismatch` otherwise), and the
/// composed instant must be strictly more than the lead time in the
/// future (`TooLateToSchedule` otherwise). A concurrent submission for
/// the same instant loses with `EpisodeTimeslotConflict`.
pub async fn create_episode(
    pool: &SqlitePool,
    station: &StationConfig,
    show_id: i64,
    input: &EpisodeInput,
    ctx: &Ctx,
) -> Result<i64> {
    let show = shows::get_show(pool, show_id).await?;
    require_host(pool, &show, ctx).await?;

    if input.title.trim().is_empty() {
        return Err(Error::Validation("title is required".to_string()));
    }
    if input.file_id.trim().is_empty() {
        return Err(Error::Validation("an uploaded audio file is required".to_string()));
    }

    let air_date = validate_air_date(station, &show, &input.air_date_local, ctx.now)?;

    let new = NewEpisode {
        show_id,
        title: input.title.clone(),
        description: input.description.clone(),
        air_date: air_date.timestamp(),
        file_id: input.file_id.clone(),
        original_filename: input.original_filename.clone(),
    };
    episodes::insert_episode(pool, &new, ctx).await
}

/// Update an episode's title/description (hosts only). The air date and
/// audio are immutable; changing the audio is delete + recreate.
pub async fn update_episode(
    pool: &SqlitePool,
    episode_id: i64,
    title: &str,
    description: &str,
    ctx: &Ctx,
) -> Result<()> {
    let episode = episodes::get_episode(pool, episode_id).await?;
    let show = shows::get_show(pool, episode.show_id).await?;
    require_host(pool, &show, ctx).await?;
    if title.trim().is_empty() {
        return Err(Error::Validation("title is required".to_string()));
    }
    episodes::update_episode(pool, episode_id, title, description, ctx).await
}

/// Delete an episode (hosts only). Idempotent: deleting an absent id is a
/// no-op. Staged puller files are not touched; the next pipeline pass
/// reconciles.
pub async fn delete_episode(pool: &SqlitePool, episode_id: i64, ctx: &Ctx) -> Result<bool> {
    let episode = match episodes::get_episode(pool, episode_id).await {
        Ok(episode) => episode,
        Err(Error::NotFound(_)) => return Ok(false),
        Err(e) => return Err(e),
    };
    let show = shows::get_show(pool, episode.show_id).await?;
    require_host(pool, &show, ctx).await?;
    episodes::delete_episode(pool, episode_id).await
}

/// Next occurrence of a show's timeslot after `now`, for pre-filling the
/// episode form
pub async fn next_occurrence(
    pool: &SqlitePool,
    station: &StationConfig,
    show_id: i64,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>> {
    let show = shows::get_show(pool, show_id).await?;
    let day = schedule::parse_weekday(&show.day_of_week)?;
    let start_time = schedule::parse_start_time(&show.start_time)?;
    schedule::next_occurrence(day, start_time, station.timezone, now, station.lead_time())
}

/// Validate a candidate local air date against the show's timeslot and
/// the lead-time policy, returning the composed UTC instant
fn validate_air_date(
    station: &StationConfig,
    show: &Show,
    air_date_local: &str,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>> {
    let candidate = NaiveDateTime::parse_from_str(air_date_local, "%Y-%m-%dT%H:%M").map_err(
        |_| Error::Validation(format!("'{}' is not a YYYY-MM-DDTHH:MM air date", air_date_local)),
    )?;

    let day = schedule::parse_weekday(&show.day_of_week)?;
    let start_time = schedule::parse_start_time(&show.start_time)?;

    if candidate.weekday() != day {
        return Err(Error::ScheduleMismatch(format!(
            "'{}' airs on {}s, but {} is a {}",
            show.title,
            show.day_of_week,
            candidate.date(),
            schedule::weekday_symbol(candidate.weekday()),
        )));
    }
    if candidate.time().hour() != start_time.hour()
        || candidate.time().minute() != start_time.minute()
    {
        return Err(Error::ScheduleMismatch(format!(
            "'{}' airs at {}, not {}",
            show.title,
            show.start_time,
            candidate.time().format("%H:%M"),
        )));
    }

    let air_date = schedule::resolve_local(station.timezone, candidate).ok_or_else(|| {
        Error::Validation(format!(
            "{} does not exist in {} (daylight saving gap)",
            candidate, station.timezone
        ))
    })?;

    if air_date - now <= station.lead_time() {
        return Err(Error::TooLateToSchedule(format!(
            "episodes must be published more than {} minutes before air",
            station.lead_time_minutes
        )));
    }

    Ok(air_date)
}

async fn require_host(pool: &SqlitePool, show: &Show, ctx: &Ctx) -> Result<()> {
    if shows::is_host(pool, show.id, ctx.user_id).await? {
        Ok(())
    } else {
        Err(Error::Forbidden(format!(
            "user {} is not a host of '{}'",
            ctx.user_id, show.title
        )))
    }
}

/// Re-exported for handlers that need the full episode row
pub async fn get_episode(pool: &SqlitePool, episode_id: i64) -> Result<Episode> {
    episodes::get_episode(pool, episode_id).await
}
