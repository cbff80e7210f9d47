//! Pipeline behavior tests over fake catalog/storage collaborators
//!
//! Real temp directories, fake network. "now" is injected everywhere the
//! pipeline needs a clock, so retention and promotion boundaries are
//! exact.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use wcrs_common::db::{EpisodeSummary, ShowSummary};
use wcrs_common::storage::{ObjectStore, UploadTarget};
use wcrs_common::{Error, Result};
use wcrs_pull::catalog::Catalog;
use wcrs_pull::pipeline::Pipeline;

struct FakeCatalog {
    shows: Vec<ShowSummary>,
    episodes: HashMap<i64, Vec<EpisodeSummary>>,
    fail_shows: bool,
    fail_episodes_for: Option<i64>,
}

impl FakeCatalog {
    fn new(shows: Vec<ShowSummary>, episodes: HashMap<i64, Vec<EpisodeSummary>>) -> Self {
        Self {
            shows,
            episodes,
            fail_shows: false,
            fail_episodes_for: None,
        }
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn shows(&self) -> Result<Vec<ShowSummary>> {
        if self.fail_shows {
            return Err(Error::StorageUnavailable("catalog down".to_string()));
        }
        Ok(self.shows.clone())
    }

    async fn upcoming_episodes(&self, show_id: i64) -> Result<Vec<EpisodeSummary>> {
        if self.fail_episodes_for == Some(show_id) {
            return Err(Error::StorageUnavailable("episodes endpoint down".to_string()));
        }
        Ok(self.episodes.get(&show_id).cloned().unwrap_or_default())
    }
}

struct FakeStore {
    contents: HashMap<String, Vec<u8>>,
    downloads: AtomicUsize,
}

impl FakeStore {
    fn new(contents: HashMap<String, Vec<u8>>) -> Self {
        Self {
            contents,
            downloads: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn upload_target(&self, _bucket_id: &str) -> Result<UploadTarget> {
        Err(Error::StorageUnavailable("uploads not faked".to_string()))
    }

    async fn download_to(&self, file_id: &str, dest: &Path) -> Result<()> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        let bytes = self
            .contents
            .get(file_id)
            .ok_or_else(|| Error::StorageUnavailable(format!("no such file {}", file_id)))?;
        std::fs::write(dest, bytes)?;
        Ok(())
    }
}

fn show(id: i64, output: &Path) -> ShowSummary {
    ShowSummary {
        id,
        title: format!("Show {}", id),
        file_path: output.to_str().unwrap().to_string(),
    }
}

fn episode(id: i64, air_date: DateTime<Utc>, file_id: &str) -> EpisodeSummary {
    EpisodeSummary {
        id,
        title: format!("Episode {}", id),
        air_date: air_date.timestamp(),
        file_id: file_id.to_string(),
    }
}

/// Three upcoming episodes at T+1d, T+3d, T+10d, catalog order not
/// soonest-first on purpose
fn three_episode_fixture(now: DateTime<Utc>) -> (Vec<EpisodeSummary>, HashMap<String, Vec<u8>>) {
    let episodes = vec![
        episode(11, now + Duration::days(3), "file-mid"),
        episode(10, now + Duration::days(1), "file-soon"),
        episode(12, now + Duration::days(10), "file-late"),
    ];
    let mut contents = HashMap::new();
    contents.insert("file-soon".to_string(), b"soon audio".to_vec());
    contents.insert("file-mid".to_string(), b"mid audio".to_vec());
    contents.insert("file-late".to_string(), b"late audio".to_vec());
    (episodes, contents)
}

#[tokio::test]
async fn downloads_all_and_promotes_soonest() {
    let staging = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let output = out_dir.path().join("show7.mp3");

    let now = Utc::now();
    let (episodes, contents) = three_episode_fixture(now);
    let catalog = FakeCatalog::new(
        vec![show(7, &output)],
        HashMap::from([(7, episodes)]),
    );
    let store = FakeStore::new(contents);

    let pipeline = Pipeline::new(&catalog, &store, staging.path(), 30);
    let summary = pipeline.run_once(now).await.unwrap();

    assert_eq!(summary.downloaded, 3);
    assert_eq!(summary.promoted, 1);
    assert_eq!(summary.failures, 0);
    assert!(staging.path().join("7").join("10").exists());
    assert_eq!(std::fs::read(&output).unwrap(), b"soon audio");
}

#[tokio::test]
async fn second_run_downloads_nothing_and_leaves_output_alone() {
    let staging = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let output = out_dir.path().join("show7.mp3");

    let now = Utc::now();
    let (episodes, contents) = three_episode_fixture(now);
    let catalog = FakeCatalog::new(
        vec![show(7, &output)],
        HashMap::from([(7, episodes)]),
    );
    let store = FakeStore::new(contents);
    let pipeline = Pipeline::new(&catalog, &store, staging.path(), 30);

    pipeline.run_once(now).await.unwrap();
    let bytes_before = std::fs::read(&output).unwrap();
    let downloads_before = store.downloads.load(Ordering::SeqCst);

    let summary = pipeline.run_once(now).await.unwrap();

    assert_eq!(store.downloads.load(Ordering::SeqCst), downloads_before);
    assert_eq!(summary.downloaded, 0);
    assert_eq!(summary.skipped, 3);
    assert_eq!(summary.promoted, 0);
    assert_eq!(std::fs::read(&output).unwrap(), bytes_before);
}

#[tokio::test]
async fn promotion_advances_after_soonest_airs() {
    let staging = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let output = out_dir.path().join("show7.mp3");

    let now = Utc::now();
    let (mut episodes, contents) = three_episode_fixture(now);
    let catalog = FakeCatalog::new(
        vec![show(7, &output)],
        HashMap::from([(7, episodes.clone())]),
    );
    let store = FakeStore::new(contents.clone());
    let pipeline = Pipeline::new(&catalog, &store, staging.path(), 30);
    pipeline.run_once(now).await.unwrap();
    assert_eq!(std::fs::read(&output).unwrap(), b"soon audio");

    // T+1d passes: the catalog no longer lists episode 10 as upcoming
    episodes.retain(|e| e.id != 10);
    let catalog = FakeCatalog::new(
        vec![show(7, &output)],
        HashMap::from([(7, episodes)]),
    );
    let store = FakeStore::new(contents);
    let pipeline = Pipeline::new(&catalog, &store, staging.path(), 30);
    let summary = pipeline.run_once(now + Duration::days(2)).await.unwrap();

    assert_eq!(summary.promoted, 1);
    assert_eq!(std::fs::read(&output).unwrap(), b"mid audio");
}

#[tokio::test]
async fn retention_deletes_at_thirty_days_but_not_twenty_nine() {
    let staging = tempfile::tempdir().unwrap();

    // Hand-staged file plus a promotion marker in the same directory
    let show_dir = staging.path().join("3");
    std::fs::create_dir_all(&show_dir).unwrap();
    std::fs::write(show_dir.join("55"), b"old audio").unwrap();
    std::fs::write(show_dir.join(".next-up"), b"55").unwrap();

    let catalog = FakeCatalog::new(vec![], HashMap::new());
    let store = FakeStore::new(HashMap::new());
    let pipeline = Pipeline::new(&catalog, &store, staging.path(), 30);

    // 29 days after staging: retained
    let summary = pipeline.run_once(Utc::now() + Duration::days(29)).await.unwrap();
    assert_eq!(summary.purged, 0);
    assert!(show_dir.join("55").exists());

    // 31 days after staging: reclaimed, marker spared
    let summary = pipeline.run_once(Utc::now() + Duration::days(31)).await.unwrap();
    assert_eq!(summary.purged, 1);
    assert!(!show_dir.join("55").exists());
    assert!(show_dir.join(".next-up").exists());
}

#[tokio::test]
async fn one_failing_show_does_not_stop_the_others() {
    let staging = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let out_a = out_dir.path().join("a.mp3");
    let out_b = out_dir.path().join("b.mp3");

    let now = Utc::now();
    let mut catalog = FakeCatalog::new(
        vec![show(1, &out_a), show(2, &out_b)],
        HashMap::from([(2, vec![episode(20, now + Duration::days(1), "file-b")])]),
    );
    catalog.fail_episodes_for = Some(1);
    let store = FakeStore::new(HashMap::from([(
        "file-b".to_string(),
        b"b audio".to_vec(),
    )]));

    let pipeline = Pipeline::new(&catalog, &store, staging.path(), 30);
    let summary = pipeline.run_once(now).await.unwrap();

    assert_eq!(summary.failures, 1);
    assert_eq!(summary.downloaded, 1);
    assert_eq!(std::fs::read(&out_b).unwrap(), b"b audio");
}

#[tokio::test]
async fn failed_download_is_counted_but_run_continues() {
    let staging = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let output = out_dir.path().join("show5.mp3");

    let now = Utc::now();
    let catalog = FakeCatalog::new(
        vec![show(5, &output)],
        HashMap::from([(
            5,
            vec![
                episode(50, now + Duration::days(1), "missing-file"),
                episode(51, now + Duration::days(2), "file-ok"),
            ],
        )]),
    );
    let store = FakeStore::new(HashMap::from([(
        "file-ok".to_string(),
        b"ok audio".to_vec(),
    )]));

    let pipeline = Pipeline::new(&catalog, &store, staging.path(), 30);
    let summary = pipeline.run_once(now).await.unwrap();

    // Download of the next-up episode failed, so nothing was promoted,
    // but the later episode still staged fine
    assert_eq!(summary.downloaded, 1);
    assert_eq!(summary.failures, 2); // one download, one promotion skip
    assert_eq!(summary.promoted, 0);
    assert!(!output.exists());
    assert!(staging.path().join("5").join("51").exists());
}

#[tokio::test]
async fn total_catalog_failure_aborts_the_run() {
    let staging = tempfile::tempdir().unwrap();
    let mut catalog = FakeCatalog::new(vec![], HashMap::new());
    catalog.fail_shows = true;
    let store = FakeStore::new(HashMap::new());

    let pipeline = Pipeline::new(&catalog, &store, staging.path(), 30);
    let err = pipeline.run_once(Utc::now()).await.unwrap_err();
    assert!(matches!(err, Error::StorageUnavailable(_)));
}

#[tokio::test]
async fn no_upcoming_episodes_leaves_output_untouched() {
    let staging = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let output = out_dir.path().join("quiet.mp3");
    std::fs::write(&output, b"last week's show").unwrap();

    let catalog = FakeCatalog::new(
        vec![show(9, &output)],
        HashMap::from([(9, vec![])]),
    );
    let store = FakeStore::new(HashMap::new());

    let pipeline = Pipeline::new(&catalog, &store, staging.path(), 30);
    let summary = pipeline.run_once(Utc::now()).await.unwrap();

    assert_eq!(summary.promoted, 0);
    assert_eq!(std::fs::read(&output).unwrap(), b"last week's show");
}
