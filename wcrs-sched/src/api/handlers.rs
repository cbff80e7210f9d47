//! HTTP request handlers
//!
//! Handlers are thin: build a Ctx at the boundary (acting user from the
//! x-user-id header, "now" from the clock), call the lifecycle layer,
//! and let the shared Error type render the response payload.

use crate::lifecycle::{self, EpisodeInput, ShowInput};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use wcrs_common::db::{episodes, shows, users};
use wcrs_common::storage::UploadTarget;
use wcrs_common::{Ctx, Error, Result};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct EpisodesParams {
    show_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateShowRequest {
    title: String,
    #[serde(default)]
    description: String,
    day_of_week: String,
    start_time: String,
    output_path: String,
    #[serde(default)]
    co_hosts: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateShowRequest {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    co_hosts: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEpisodeRequest {
    title: String,
    #[serde(default)]
    description: String,
    /// Station-local wall clock, YYYY-MM-DDTHH:MM
    air_date: String,
    file_id: String,
    #[serde(default)]
    original_filename: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEpisodeRequest {
    title: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "module": "wcrs-sched",
        "version": env!("CARGO_PKG_VERSION"),
        "station_tz": state.station.timezone.name(),
    }))
}

/// Catalog: all shows with their playout paths
pub async fn catalog_shows(State(state): State<AppState>) -> Result<Json<Value>> {
    let shows = shows::list_shows(&state.db).await?;
    Ok(Json(json!({ "shows": shows })))
}

/// Catalog: upcoming episodes for one show, soonest first. Filtering to
/// future air dates happens here so the puller never sees aired rows.
pub async fn catalog_episodes(
    State(state): State<AppState>,
    Query(params): Query<EpisodesParams>,
) -> Result<Json<Value>> {
    // 404 for an unknown show rather than an empty list
    shows::get_show(&state.db, params.show_id).await?;
    let now = Utc::now();
    let episodes = episodes::list_upcoming(&state.db, params.show_id, now.timestamp()).await?;
    Ok(Json(json!({
        "show_id": params.show_id,
        "episodes": episodes,
    })))
}

pub async fn create_show(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateShowRequest>,
) -> Result<Json<CreatedResponse>> {
    let ctx = ctx_from_headers(&headers)?;
    let input = ShowInput {
        title: req.title,
        description: req.description,
        day_of_week: req.day_of_week,
        start_time: req.start_time,
        output_path: req.output_path,
        co_hosts: req.co_hosts,
    };
    let id = lifecycle::create_show(&state.db, &input, &ctx).await?;
    Ok(Json(CreatedResponse { id }))
}

pub async fn get_show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    let show = shows::get_show(&state.db, id).await?;
    let hosts = shows::hosts(&state.db, id).await?;
    Ok(Json(json!({ "show": show, "hosts": hosts })))
}

pub async fn update_show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<UpdateShowRequest>,
) -> Result<Json<Value>> {
    let ctx = ctx_from_headers(&headers)?;
    lifecycle::update_show(&state.db, id, &req.title, &req.description, &req.co_hosts, &ctx)
        .await?;
    Ok(Json(json!({ "status": "ok" })))
}

pub async fn delete_show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Value>> {
    let ctx = ctx_from_headers(&headers)?;
    lifecycle::delete_show(&state.db, id, &ctx).await?;
    Ok(Json(json!({ "status": "ok" })))
}

/// Next air date of a show's slot, for pre-filling the episode form
pub async fn next_occurrence(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    let now = Utc::now();
    let occurrence = lifecycle::next_occurrence(&state.db, &state.station, id, now).await?;
    let local = occurrence.with_timezone(&state.station.timezone);
    Ok(Json(json!({
        "show_id": id,
        "air_date": occurrence.timestamp(),
        "air_date_local": local.format("%Y-%m-%dT%H:%M").to_string(),
    })))
}

pub async fn create_episode(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<CreateEpisodeRequest>,
) -> Result<Json<CreatedResponse>> {
    let ctx = ctx_from_headers(&headers)?;
    let input = EpisodeInput {
        title: req.title,
        description: req.description,
        air_date_local: req.air_date,
        file_id: req.file_id,
        original_filename: req.original_filename,
    };
    let id = lifecycle::create_episode(&state.db, &state.station, id, &input, &ctx).await?;
    Ok(Json(CreatedResponse { id }))
}

pub async fn get_episode(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    let episode = lifecycle::get_episode(&state.db, id).await?;
    Ok(Json(json!({ "episode": episode })))
}

pub async fn update_episode(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<UpdateEpisodeRequest>,
) -> Result<Json<Value>> {
    let ctx = ctx_from_headers(&headers)?;
    lifecycle::update_episode(&state.db, id, &req.title, &req.description, &ctx).await?;
    Ok(Json(json!({ "status": "ok" })))
}

pub async fn delete_episode(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Value>> {
    let ctx = ctx_from_headers(&headers)?;
    let deleted = lifecycle::delete_episode(&state.db, id, &ctx).await?;
    Ok(Json(json!({ "status": "ok", "deleted": deleted })))
}

/// Other DJs, for the co-host picker on the show forms
pub async fn list_djs(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>> {
    let ctx = ctx_from_headers(&headers)?;
    let djs: Vec<Value> = users::other_users(&state.db, ctx.user_id)
        .await?
        .into_iter()
        .map(|(id, name)| json!({ "id": id, "name": name }))
        .collect();
    Ok(Json(json!({ "djs": djs })))
}

/// Hand the browser a direct-upload target for the episode bucket
pub async fn upload_url(State(state): State<AppState>) -> Result<Json<UploadTarget>> {
    let store = state
        .store
        .as_ref()
        .ok_or_else(|| Error::StorageUnavailable("object storage is not configured".to_string()))?;
    let bucket_id = state
        .bucket_id
        .as_ref()
        .ok_or_else(|| Error::StorageUnavailable("upload bucket is not configured".to_string()))?;
    let target = store.upload_target(bucket_id).await?;
    Ok(Json(target))
}

/// Acting user id from the x-user-id header (stand-in for the session
/// layer, which lives outside this service)
fn ctx_from_headers(headers: &HeaderMap) -> Result<Ctx> {
    let user_id = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok())
        .ok_or_else(|| Error::Validation("x-user-id header is required".to_string()))?;
    Ok(Ctx::new(user_id, Utc::now()))
}
