//! Catalog client
//!
//! Read-only view of published shows and their upcoming episodes, served
//! by wcrs-sched. The trait seam lets pipeline tests substitute a fake;
//! the HTTP implementation is the production path.

use async_trait::async_trait;
use serde::Deserialize;
use wcrs_common::db::{EpisodeSummary, ShowSummary};
use wcrs_common::{Error, Result};

/// Read-only catalog contract consumed by the pipeline
#[async_trait]
pub trait Catalog: Send + Sync {
    /// All shows with their playout output paths
    async fn shows(&self) -> Result<Vec<ShowSummary>>;

    /// Upcoming episodes for one show, ascending by air date; the server
    /// filters out anything already aired
    async fn upcoming_episodes(&self, show_id: i64) -> Result<Vec<EpisodeSummary>>;
}

#[derive(Debug, Deserialize)]
struct ShowsResponse {
    shows: Vec<ShowSummary>,
}

#[derive(Debug, Deserialize)]
struct EpisodesResponse {
    episodes: Vec<EpisodeSummary>,
}

/// HTTP client against the scheduler's catalog endpoints
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Best-effort extraction of the scheduler's error payload for logs
    async fn error_detail(response: reqwest::Response) -> String {
        let status = response.status();
        let detail = match response.json::<serde_json::Value>().await {
            Ok(body) => body
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string(),
            Err(_) => "unknown".to_string(),
        };
        format!("http status {}, error: {}", status, detail)
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn shows(&self) -> Result<Vec<ShowSummary>> {
        let url = format!("{}/shows", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::StorageUnavailable(format!("catalog '{}': {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::StorageUnavailable(format!(
                "get shows: {}",
                Self::error_detail(response).await
            )));
        }

        let body: ShowsResponse = response
            .json()
            .await
            .map_err(|e| Error::StorageUnavailable(format!("get shows body: {}", e)))?;
        Ok(body.shows)
    }

    async fn upcoming_episodes(&self, show_id: i64) -> Result<Vec<EpisodeSummary>> {
        let url = format!("{}/episodes", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("show_id", show_id)])
            .send()
            .await
            .map_err(|e| Error::StorageUnavailable(format!("catalog '{}': {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::StorageUnavailable(format!(
                "get episodes for show {}: {}",
                show_id,
                Self::error_detail(response).await
            )));
        }

        let body: EpisodesResponse = response
            .json()
            .await
            .map_err(|e| Error::StorageUnavailable(format!("get episodes body: {}", e)))?;
        Ok(body.episodes)
    }
}
