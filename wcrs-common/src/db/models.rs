//! Database models

use serde::{Deserialize, Serialize};

/// A recurring weekly show occupying a fixed (day_of_week, start_time)
/// slot in the station's timezone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Show {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Lowercase weekday symbol, e.g. "tuesday"
    pub day_of_week: String,
    /// Local wall-clock HH:MM
    pub start_time: String,
    /// File the playout automation reads for this show
    pub output_path: String,
    pub created_by: i64,
    pub updated_by: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// One dated broadcast of a show, bound to uploaded audio
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    pub id: i64,
    pub show_id: i64,
    pub title: String,
    pub description: String,
    /// Unix epoch seconds, UTC. Globally unique.
    pub air_date: i64,
    /// Opaque object-storage reference
    pub file_id: String,
    /// Display only; the staged file is keyed by episode id
    pub original_filename: String,
    pub created_by: i64,
    pub updated_by: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Catalog projection of a show, as served to the puller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowSummary {
    pub id: i64,
    pub title: String,
    pub file_path: String,
}

/// Catalog projection of an upcoming episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub id: i64,
    pub title: String,
    pub air_date: i64,
    pub file_id: String,
}
