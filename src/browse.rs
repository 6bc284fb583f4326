//! Catalog browsing: category filters, top lists and seasonal statistics.
//!
//! All functions here are pure views over a borrowed catalog. They never
//! reorder or copy records unless the operation is explicitly a sort.
//!
//! # Examples
//!
//! ```rust
//! use animedex::prelude::*;
//! use animedex::browse::{CategoryFilter, CategoryOptions, filter_by_category, top_anime};
//!
//! let catalog = LocalCatalog::builtin();
//!
//! let options = CategoryOptions::from_catalog(catalog.records());
//! assert_eq!(options.years.first(), Some(&2022));
//!
//! let madhouse = filter_by_category(
//!     catalog.records(),
//!     &CategoryFilter::Studio("Madhouse".to_string()),
//! );
//! assert_eq!(madhouse.len(), 2);
//!
//! let recent = top_anime(catalog.records(), TopCategory::Recent, TopSort::Year);
//! assert_eq!(recent[0].title, "Spy x Family");
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::types::{AnimeRecord, AnimeStatus, TopCategory, TopSort};

/// Separators between genre labels in a genre string.
static GENRE_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*[,/]\s*").expect("valid genre separator regex"));

/// A single browse-by-category selection.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryFilter {
    /// Genre string contains the label (case-sensitive, as displayed)
    Genre(String),
    Year(u32),
    /// Exact studio name
    Studio(String),
    Status(AnimeStatus),
}

impl CategoryFilter {
    pub fn matches(&self, record: &AnimeRecord) -> bool {
        match self {
            CategoryFilter::Genre(genre) => record.genre.contains(genre.as_str()),
            CategoryFilter::Year(year) => record.year == Some(*year),
            CategoryFilter::Studio(studio) => record.studio == *studio,
            CategoryFilter::Status(status) => record.status == *status,
        }
    }
}

/// Records of `catalog` selected by `filter`, in catalog order.
pub fn filter_by_category<'a>(
    catalog: &'a [AnimeRecord],
    filter: &CategoryFilter,
) -> Vec<&'a AnimeRecord> {
    catalog.iter().filter(|record| filter.matches(record)).collect()
}

/// Splits a delimited genre string into trimmed labels.
///
/// ```rust
/// use animedex::browse::split_genres;
///
/// assert_eq!(split_genres("Action, Sci-Fi/Thriller"), ["Action", "Sci-Fi", "Thriller"]);
/// assert!(split_genres("  ").is_empty());
/// ```
pub fn split_genres(genre: &str) -> Vec<&str> {
    GENRE_SEPARATOR
        .split(genre.trim())
        .filter(|label| !label.is_empty())
        .collect()
}

/// The distinct values offered by each browse category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryOptions {
    /// In order of first appearance
    pub genres: Vec<String>,
    /// Newest first
    pub years: Vec<u32>,
    /// Alphabetical
    pub studios: Vec<String>,
    /// In order of first appearance
    pub statuses: Vec<AnimeStatus>,
}

impl CategoryOptions {
    pub fn from_catalog(catalog: &[AnimeRecord]) -> Self {
        let mut options = Self::default();
        let mut seen_genres = HashSet::new();
        let mut seen_statuses = HashSet::new();

        for record in catalog {
            for genre in split_genres(&record.genre) {
                if seen_genres.insert(genre) {
                    options.genres.push(genre.to_string());
                }
            }
            if seen_statuses.insert(record.status) {
                options.statuses.push(record.status);
            }
        }

        options.years = catalog.iter().filter_map(|record| record.year).collect();
        options.years.sort_unstable_by(|a, b| b.cmp(a));
        options.years.dedup();

        options.studios = catalog
            .iter()
            .map(|record| record.studio.clone())
            .filter(|studio| !studio.is_empty())
            .collect();
        options.studios.sort();
        options.studios.dedup();

        options
    }
}

impl TopCategory {
    /// Whether `record` belongs in this top list.
    pub fn admits(&self, record: &AnimeRecord) -> bool {
        match self {
            TopCategory::Trending => record.trending,
            TopCategory::HighestRated => record.rating >= 8.5,
            TopCategory::MostWatched => record.views >= 1_000_000,
            TopCategory::Completed => record.status == AnimeStatus::Completed,
            TopCategory::Ongoing => record.status == AnimeStatus::Ongoing,
            TopCategory::Recent => record.year.is_some_and(|year| year >= 2020),
            TopCategory::All => true,
        }
    }
}

impl TopSort {
    /// Ordering placing the record that should be listed first as `Less`.
    pub fn compare(&self, a: &AnimeRecord, b: &AnimeRecord) -> Ordering {
        match self {
            TopSort::Rating => b.rating.total_cmp(&a.rating),
            TopSort::Views => b.views.cmp(&a.views),
            TopSort::Year => b.year.cmp(&a.year),
            TopSort::Episodes => b.episodes.cmp(&a.episodes),
            TopSort::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        }
    }
}

/// Filters `catalog` by `category` and sorts the result by `sort`.
///
/// The sort is stable, so ties keep catalog order.
pub fn top_anime<'a>(
    catalog: &'a [AnimeRecord],
    category: TopCategory,
    sort: TopSort,
) -> Vec<&'a AnimeRecord> {
    let mut list: Vec<&AnimeRecord> = catalog
        .iter()
        .filter(|record| category.admits(record))
        .collect();
    list.sort_by(|a, b| sort.compare(a, b));
    list
}

/// Headline numbers for a seasonal listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonalStats {
    pub airing: usize,
    pub upcoming: usize,
    pub trending: usize,
    /// Mean rating of rated records, one decimal; `None` when nothing is rated
    pub average_rating: Option<f64>,
}

impl SeasonalStats {
    pub fn from_catalog(catalog: &[AnimeRecord]) -> Self {
        let rated: Vec<f64> = catalog
            .iter()
            .map(|record| record.rating)
            .filter(|&rating| rating > 0.0)
            .collect();

        let average_rating = (!rated.is_empty()).then(|| {
            let mean = rated.iter().sum::<f64>() / rated.len() as f64;
            (mean * 10.0).round() / 10.0
        });

        Self {
            airing: count_status(catalog, AnimeStatus::Airing),
            upcoming: count_status(catalog, AnimeStatus::Upcoming),
            trending: catalog.iter().filter(|record| record.trending).count(),
            average_rating,
        }
    }
}

fn count_status(catalog: &[AnimeRecord], status: AnimeStatus) -> usize {
    catalog
        .iter()
        .filter(|record| record.status == status)
        .count()
}

/// Airing records broadcast on `day` (case-insensitive weekday name).
pub fn airing_on<'a>(catalog: &'a [AnimeRecord], day: &str) -> Vec<&'a AnimeRecord> {
    catalog
        .iter()
        .filter(|record| record.status == AnimeStatus::Airing)
        .filter(|record| {
            record
                .airing_day
                .as_deref()
                .is_some_and(|airing| airing.eq_ignore_ascii_case(day))
        })
        .collect()
}
