//! The download/promote/purge pipeline
//!
//! Brings the local staging tree and each show's playout file into
//! agreement with the published catalog. Idempotent by construction: a
//! staged file is never re-downloaded, and promotion is skipped when the
//! marker already names the next-up episode. One show's failure never
//! stops the others; only a total catalog failure aborts the run.

use crate::catalog::Catalog;
use chrono::{DateTime, Duration, Utc};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use wcrs_common::db::{EpisodeSummary, ShowSummary};
use wcrs_common::storage::{temp_sibling, ObjectStore};
use wcrs_common::Result;

/// Marker file per show directory recording the episode id currently
/// occupying the show's output path
const NEXT_UP_MARKER: &str = ".next-up";

/// Counts reported at the end of a run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub shows: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub promoted: usize,
    pub purged: usize,
    pub failures: usize,
}

pub struct Pipeline<'a> {
    catalog: &'a dyn Catalog,
    store: &'a dyn ObjectStore,
    staging_root: PathBuf,
    retention: Duration,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        catalog: &'a dyn Catalog,
        store: &'a dyn ObjectStore,
        staging_root: &Path,
        retention_days: i64,
    ) -> Self {
        Self {
            catalog,
            store,
            staging_root: staging_root.to_path_buf(),
            retention: Duration::days(retention_days),
        }
    }

    /// One full pass. `now` is injected so retention boundaries are
    /// testable. A catalog fetch failure is fatal; everything else is
    /// isolated per show and counted.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<RunSummary> {
        let shows = self.catalog.shows().await?;
        info!("catalog lists {} shows", shows.len());

        let mut summary = RunSummary {
            shows: shows.len(),
            ..RunSummary::default()
        };

        for show in &shows {
            if let Err(e) = self.process_show(show, &mut summary).await {
                error!(show_id = show.id, operation = "process_show", "{}", e);
                summary.failures += 1;
            }
        }

        self.purge_stale(now, &mut summary);

        info!(
            shows = summary.shows,
            downloaded = summary.downloaded,
            skipped = summary.skipped,
            promoted = summary.promoted,
            purged = summary.purged,
            failures = summary.failures,
            "pipeline run complete"
        );
        Ok(summary)
    }

    /// Stage this show's upcoming episodes and promote the soonest one
    async fn process_show(&self, show: &ShowSummary, summary: &mut RunSummary) -> Result<()> {
        let episodes = self.catalog.upcoming_episodes(show.id).await?;
        let show_dir = self.staging_root.join(show.id.to_string());
        std::fs::create_dir_all(&show_dir)?;

        for episode in &episodes {
            let staged = show_dir.join(episode.id.to_string());
            if staged.exists() {
                summary.skipped += 1;
                continue;
            }
            match self.store.download_to(&episode.file_id, &staged).await {
                Ok(()) => {
                    info!(
                        show_id = show.id,
                        episode_id = episode.id,
                        "downloaded '{}':'{}' to '{}'",
                        show.title,
                        episode.title,
                        staged.display()
                    );
                    summary.downloaded += 1;
                }
                Err(e) => {
                    error!(
                        show_id = show.id,
                        episode_id = episode.id,
                        operation = "download",
                        "{}",
                        e
                    );
                    summary.failures += 1;
                }
            }
        }

        // Promote the next episode to where the playout automation looks.
        // No upcoming episode = leave the current output file alone.
        if let Some(next) = episodes.iter().min_by_key(|e| e.air_date) {
            self.promote(show, next, &show_dir, summary)?;
        }

        Ok(())
    }

    /// Copy the staged next-up file over the show's output path, unless
    /// the marker says that episode is already on air. Copy rather than
    /// link: the playout process may hold the old file open, and the
    /// temp-then-rename keeps readers off partial writes.
    fn promote(
        &self,
        show: &ShowSummary,
        next: &EpisodeSummary,
        show_dir: &Path,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let staged = show_dir.join(next.id.to_string());
        if !staged.exists() {
            warn!(
                show_id = show.id,
                episode_id = next.id,
                "next-up episode has no staged file; skipping promotion"
            );
            summary.failures += 1;
            return Ok(());
        }

        let output = Path::new(&show.file_path);
        let marker = show_dir.join(NEXT_UP_MARKER);
        let current: Option<i64> = std::fs::read_to_string(&marker)
            .ok()
            .and_then(|s| s.trim().parse().ok());

        if current == Some(next.id) && output.exists() {
            return Ok(());
        }

        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = temp_sibling(output)?;
        std::fs::copy(&staged, &tmp)?;
        std::fs::rename(&tmp, output)?;
        std::fs::write(&marker, next.id.to_string())?;

        info!(
            show_id = show.id,
            episode_id = next.id,
            "'{}':'{}' is scheduled next, promoted to '{}'",
            show.title,
            next.title,
            show.file_path
        );
        summary.promoted += 1;
        Ok(())
    }

    /// Delete staged files older than the retention window, whether or
    /// not they were ever promoted. Marker files are spared. Per-file
    /// errors are logged and counted, never fatal.
    fn purge_stale(&self, now: DateTime<Utc>, summary: &mut RunSummary) {
        let cutoff = now - self.retention;
        let mut stack = vec![self.staging_root.clone()];

        while let Some(dir) = stack.pop() {
            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(operation = "purge", "cannot read '{}': {}", dir.display(), e);
                    continue;
                }
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                    continue;
                }
                if path.file_name().and_then(|n| n.to_str()) == Some(NEXT_UP_MARKER) {
                    continue;
                }
                match file_age_reference(&path) {
                    Ok(created) if created < cutoff => match std::fs::remove_file(&path) {
                        Ok(()) => {
                            info!(operation = "purge", "deleted aged file '{}'", path.display());
                            summary.purged += 1;
                        }
                        Err(e) => {
                            warn!(operation = "purge", "cannot delete '{}': {}", path.display(), e);
                            summary.failures += 1;
                        }
                    },
                    Ok(_) => {}
                    Err(e) => {
                        warn!(operation = "purge", "cannot stat '{}': {}", path.display(), e);
                        summary.failures += 1;
                    }
                }
            }
        }
    }
}

/// Creation time where the filesystem records it, mtime otherwise
fn file_age_reference(path: &Path) -> std::io::Result<DateTime<Utc>> {
    let metadata = std::fs::metadata(path)?;
    let stamp = metadata.created().or_else(|_| metadata.modified())?;
    Ok(DateTime::<Utc>::from(stamp))
}
