//! Common test utilities and constants
//!
//! Shared catalogs and mock sources used across all test modules.

use animedex::prelude::*;
use animedex::{Error, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[allow(dead_code)]
pub const TEST_DATA_DIR: &str = "tests/data";
#[allow(dead_code)]
pub const TEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds a record from the fields that take part in matching
#[allow(dead_code)]
pub fn record(
    id: &str,
    title: &str,
    synonyms: &[&str],
    genre: &str,
    studio: &str,
    year: Option<u32>,
) -> AnimeRecord {
    AnimeRecord {
        id: id.to_string(),
        title: title.to_string(),
        synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        genre: genre.to_string(),
        studio: studio.to_string(),
        year,
        ..Default::default()
    }
}

/// Two-record catalog: a series and a similarly named parody
#[allow(dead_code)]
pub fn titan_catalog() -> Vec<AnimeRecord> {
    vec![
        record(
            "1",
            "Attack on Titan",
            &["Shingeki no Kyojin", "AoT"],
            "Action, Drama, Fantasy",
            "Wit Studio",
            Some(2013),
        ),
        record(
            "2",
            "Attack no Titan Parody",
            &[],
            "Comedy",
            "Indie",
            Some(2015),
        ),
    ]
}

#[allow(dead_code)]
pub fn titles(results: &[&AnimeRecord]) -> Vec<String> {
    results.iter().map(|anime| anime.title.clone()).collect()
}

#[allow(dead_code)]
pub fn owned_titles(results: &[AnimeRecord]) -> Vec<String> {
    results.iter().map(|anime| anime.title.clone()).collect()
}

/// How a [`MockSource`] answers searches
#[allow(dead_code)]
#[derive(Clone)]
pub enum MockBehavior {
    Results(Vec<AnimeRecord>),
    Empty,
    Fail,
}

/// Remote stand-in that counts the searches it receives
#[allow(dead_code)]
pub struct MockSource {
    id: &'static str,
    behavior: MockBehavior,
    calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl MockSource {
    pub fn new(id: &'static str, behavior: MockBehavior) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = Self {
            id,
            behavior,
            calls: Arc::clone(&calls),
        };
        (source, calls)
    }
}

#[async_trait]
impl Source for MockSource {
    fn id(&self) -> &'static str {
        self.id
    }

    fn name(&self) -> &'static str {
        "Mock Source"
    }

    fn base_url(&self) -> &str {
        "mock://"
    }

    async fn search(&self, params: SearchParams) -> Result<SearchPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            MockBehavior::Results(results) => Ok(SearchPage::single(
                results
                    .iter()
                    .take(params.limit.unwrap_or(usize::MAX))
                    .cloned()
                    .collect(),
            )),
            MockBehavior::Empty => Ok(SearchPage::default()),
            MockBehavior::Fail => Err(Error::source(self.id, "connection refused")),
        }
    }

    async fn info(&self, anime_id: &str) -> Result<AnimeDetails> {
        Err(Error::not_found(anime_id))
    }

    async fn streaming_links(&self, episode_id: &str) -> Result<StreamingLinks> {
        Err(Error::not_found(episode_id))
    }
}

/// Creates a fresh, empty test subdirectory
#[allow(dead_code)]
pub async fn setup_test_dir(subdir: &str) -> PathBuf {
    let dir = PathBuf::from(TEST_DATA_DIR).join(subdir);
    if dir.exists() {
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
    tokio::fs::create_dir_all(&dir).await.unwrap();
    dir
}

/// Removes a test subdirectory and everything in it
#[allow(dead_code)]
pub async fn cleanup_test_subdir(subdir: &str) {
    let dir = PathBuf::from(TEST_DATA_DIR).join(subdir);
    if dir.exists() {
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
