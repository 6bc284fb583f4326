//! In-memory catalog used for offline browsing and as the search fallback.
//!
//! [`LocalCatalog`] implements [`Source`] on top of a plain vector of
//! records, answering searches with [`ranked_search`]. It ships with a small
//! built-in catalog of well-known series and can also be loaded from JSON.

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

use crate::{
    browse::{CategoryFilter, filter_by_category, top_anime},
    error::Result,
    net::json,
    search::ranked_search,
    source::Source,
    types::{
        AnimeDetails, AnimeRecord, AnimeStatus, Episode, SearchPage, SearchParams, Season,
        StreamingLinks, TopCategory, TopSort,
    },
};

/// An in-memory catalog of anime records.
///
/// # Examples
///
/// ```rust
/// use animedex::prelude::*;
///
/// let catalog = LocalCatalog::builtin();
/// let ranked = catalog.rank("wit", None);
/// let titles: Vec<&str> = ranked
///     .iter()
///     .map(|anime| anime.title.as_str())
///     .collect();
/// assert_eq!(titles, ["Attack on Titan", "Spy x Family"]);
/// ```
#[derive(Debug, Clone)]
pub struct LocalCatalog {
    records: Vec<AnimeRecord>,
    page_size: usize,
}

impl LocalCatalog {
    pub const DEFAULT_PAGE_SIZE: usize = 20;

    pub fn from_records(records: Vec<AnimeRecord>) -> Self {
        Self {
            records,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets the page size used when a search carries no explicit limit.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Loads records from a JSON file.
    ///
    /// The file holds either a bare array of records or an object with a
    /// `results` array, the shape the content API returns.
    ///
    /// # Errors
    ///
    /// * [`Error::Io`](crate::Error::Io) - If the file cannot be read
    /// * [`Error::Json`](crate::Error::Json) - If the records are malformed
    /// * [`Error::Parse`](crate::Error::Parse) - If no record list is found
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let value: Value = serde_json::from_slice(&bytes)?;

        let records: Vec<AnimeRecord> = match value {
            Value::Array(_) => serde_json::from_value(value)?,
            _ => json::extract_as(&value, "results")?,
        };

        debug!(path = %path.display(), count = records.len(), "loaded local catalog");
        Ok(Self::from_records(records))
    }

    /// The built-in catalog of fifteen popular series.
    #[rustfmt::skip]
    pub fn builtin() -> Self {
        use AnimeStatus::{Completed, Ongoing};

        let records = vec![
            fixture("1", "Attack on Titan", 9.0, 25, Completed, "Action, Drama, Fantasy", 2013, "Wit Studio", 1_500_000, true, &["Shingeki no Kyojin", "AoT", "SNK"]),
            fixture("2", "Demon Slayer", 8.8, 26, Ongoing, "Action, Fantasy, Historical", 2019, "ufotable", 1_200_000, true, &["Kimetsu no Yaiba", "KNY"]),
            fixture("3", "My Hero Academia", 8.5, 25, Ongoing, "Action, Comedy, Superhero", 2016, "Bones", 980_000, true, &["Boku no Hero Academia", "BNHA", "HeroAca"]),
            fixture("4", "One Piece", 9.2, 1000, Ongoing, "Action, Adventure, Comedy", 1999, "Toei Animation", 2_000_000, false, &["Wan Pisu", "OP"]),
            fixture("5", "Naruto Shippuden", 8.7, 500, Completed, "Action, Adventure, Fantasy", 2007, "Studio Pierrot", 1_800_000, false, &["Naruto", "Naruto Shipudden"]),
            fixture("6", "Death Note", 9.1, 37, Completed, "Mystery, Thriller, Supernatural", 2006, "Madhouse", 1_100_000, false, &["Desu Noto"]),
            fixture("7", "Fullmetal Alchemist", 9.3, 64, Completed, "Action, Adventure, Fantasy", 2003, "Bones", 950_000, false, &["FMA", "Full Metal Alchemist", "Hagane no Renkinjutsushi"]),
            fixture("8", "Hunter x Hunter", 8.9, 148, Completed, "Action, Adventure, Fantasy", 2011, "Madhouse", 850_000, false, &["HxH", "HxH 2011"]),
            fixture("9", "Steins;Gate", 9.0, 24, Completed, "Sci-Fi, Thriller, Romance", 2011, "White Fox", 750_000, false, &["Steins Gate", "SteinsGate"]),
            fixture("10", "Code Geass", 8.8, 25, Completed, "Action, Drama, Mecha", 2006, "Sunrise", 700_000, false, &["Code Geass: Lelouch of the Rebellion", "Geass"]),
            fixture("11", "Jujutsu Kaisen", 8.6, 24, Ongoing, "Action, Fantasy, Supernatural", 2020, "MAPPA", 1_300_000, true, &["JJK", "Jujutsu Kaisen"]),
            fixture("12", "Spy x Family", 8.4, 25, Ongoing, "Action, Comedy, Slice of Life", 2022, "Wit Studio", 1_400_000, true, &["Spy Family", "Spy x Family"]),
            fixture("13", "Bleach", 8.2, 366, Completed, "Action, Adventure, Supernatural", 2004, "Studio Pierrot", 1_600_000, false, &["Burichi"]),
            fixture("14", "Dragon Ball Z", 8.7, 291, Completed, "Action, Adventure, Fantasy", 1989, "Toei Animation", 1_700_000, false, &["DBZ", "Dragon Ball Zetto"]),
            fixture("15", "Fairy Tail", 8.0, 328, Completed, "Action, Adventure, Fantasy", 2009, "A-1 Pictures", 900_000, false, &["Feari Teiru"]),
        ];

        Self::from_records(records)
    }

    pub fn records(&self) -> &[AnimeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ranked search over the catalog, cloned and optionally truncated.
    pub fn rank(&self, query: &str, limit: Option<usize>) -> Vec<AnimeRecord> {
        ranked_search(query, &self.records)
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    fn find(&self, anime_id: &str) -> Option<&AnimeRecord> {
        self.records.iter().find(|record| record.id == anime_id)
    }

    fn paginate(&self, matches: Vec<&AnimeRecord>, page: u32, per_page: usize) -> SearchPage {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let start = (page as usize - 1).saturating_mul(per_page);

        SearchPage {
            current_page: page,
            has_next_page: matches.len() > start.saturating_add(per_page),
            results: matches
                .into_iter()
                .skip(start)
                .take(per_page)
                .cloned()
                .collect(),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn fixture(
    id: &str,
    title: &str,
    rating: f64,
    episodes: u32,
    status: AnimeStatus,
    genre: &str,
    year: u32,
    studio: &str,
    views: u64,
    trending: bool,
    synonyms: &[&str],
) -> AnimeRecord {
    AnimeRecord {
        id: id.to_string(),
        title: title.to_string(),
        synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        genre: genre.to_string(),
        studio: studio.to_string(),
        year: Some(year),
        rating,
        episodes: Some(episodes),
        status,
        views,
        trending,
        image: None,
        airing_day: None,
    }
}

#[async_trait]
impl Source for LocalCatalog {
    fn id(&self) -> &'static str {
        "local"
    }

    fn name(&self) -> &'static str {
        "Local Catalog"
    }

    fn base_url(&self) -> &str {
        "memory://local"
    }

    async fn search(&self, params: SearchParams) -> Result<SearchPage> {
        let matches = ranked_search(&params.query, &self.records);
        let per_page = params.limit.unwrap_or(self.page_size);
        Ok(self.paginate(matches, params.page, per_page))
    }

    async fn info(&self, anime_id: &str) -> Result<AnimeDetails> {
        let record = self
            .find(anime_id)
            .ok_or_else(|| crate::Error::not_found(format!("Anime with ID '{}'", anime_id)))?;

        let episode_list = (1..=record.episodes.unwrap_or(0))
            .map(|number| Episode {
                id: format!("{}-episode-{}", record.id, number),
                number: f64::from(number),
            })
            .collect();

        Ok(AnimeDetails {
            record: record.clone(),
            description: None,
            episode_list,
        })
    }

    /// The local catalog carries no streams.
    async fn streaming_links(&self, episode_id: &str) -> Result<StreamingLinks> {
        Err(crate::Error::not_found(format!(
            "Streams for episode '{}'",
            episode_id
        )))
    }

    async fn recent_episodes(&self, page: u32) -> Result<SearchPage> {
        let matches = self
            .records
            .iter()
            .filter(|r| matches!(r.status, AnimeStatus::Ongoing | AnimeStatus::Airing))
            .collect();
        Ok(self.paginate(matches, page, self.page_size))
    }

    async fn top_airing(&self, page: u32) -> Result<SearchPage> {
        let matches = top_anime(&self.records, TopCategory::Trending, TopSort::Rating);
        Ok(self.paginate(matches, page, self.page_size))
    }

    async fn seasonal(&self, year: u32, _season: Season) -> Result<SearchPage> {
        let matches = filter_by_category(&self.records, &CategoryFilter::Year(year));
        Ok(self.paginate(matches, 1, usize::MAX))
    }

    async fn by_genre(&self, genre: &str, page: u32) -> Result<SearchPage> {
        let matches = filter_by_category(&self.records, &CategoryFilter::Genre(genre.to_string()));
        Ok(self.paginate(matches, page, self.page_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids_are_unique() {
        let catalog = LocalCatalog::builtin();
        let mut ids: Vec<&str> = catalog.records().iter().map(|r| r.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn test_paginate_reports_next_page() {
        let catalog = LocalCatalog::builtin();
        let all: Vec<&AnimeRecord> = catalog.records().iter().collect();

        let first = catalog.paginate(all.clone(), 1, 10);
        assert_eq!(first.results.len(), 10);
        assert!(first.has_next_page);

        let second = catalog.paginate(all.clone(), 2, 10);
        assert_eq!(second.results.len(), 5);
        assert!(!second.has_next_page);

        let beyond = catalog.paginate(all, 9, 10);
        assert!(beyond.results.is_empty());
    }

    #[tokio::test]
    async fn test_info_builds_episode_ids() {
        let catalog = LocalCatalog::builtin();
        let details = catalog.info("6").await.unwrap();
        assert_eq!(details.record.title, "Death Note");
        assert_eq!(details.episode_list.len(), 37);
        assert_eq!(details.episode_list[0].id, "6-episode-1");

        assert!(matches!(
            catalog.info("missing").await,
            Err(crate::Error::NotFound(_))
        ));
    }
}
