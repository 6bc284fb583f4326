//! Core data types for anime records, search parameters and catalog views.
//!
//! - [`AnimeRecord`] - A catalog entry, the unit every search operates on
//! - [`AnimeStatus`] - Airing / completion state of a series
//! - [`SearchParams`] - Parameters for remote searches (builder available)
//! - [`SearchPage`] - One page of results as returned by a [`Source`](crate::Source)
//! - [`AnimeDetails`], [`Episode`], [`StreamingLinks`] - Detail and playback data
//! - [`TopCategory`], [`TopSort`], [`Season`] - Browse selectors
//!
//! # Examples
//!
//! ```rust
//! use animedex::types::*;
//!
//! let record = AnimeRecord {
//!     id: "1".to_string(),
//!     title: "Attack on Titan".to_string(),
//!     synonyms: vec!["Shingeki no Kyojin".to_string(), "AoT".to_string()],
//!     genre: "Action, Drama, Fantasy".to_string(),
//!     studio: "Wit Studio".to_string(),
//!     year: Some(2013),
//!     ..Default::default()
//! };
//! assert_eq!(record.status, AnimeStatus::Unknown);
//! ```

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single anime catalog entry.
///
/// Every field except `id` and `title` defaults when absent from the input,
/// so records decoded from partial JSON are always fully populated and the
/// search code never has to deal with missing values.
///
/// Only `title`, `synonyms`, `genre`, `studio` and `year` take part in
/// matching. The remaining fields are display data carried through as-is.
///
/// # Examples
///
/// ```rust
/// use animedex::types::AnimeRecord;
///
/// let record: AnimeRecord =
///     serde_json::from_str(r#"{"id": "13", "title": "Bleach"}"#).unwrap();
/// assert!(record.synonyms.is_empty());
/// assert!(record.genre.is_empty());
/// assert_eq!(record.year, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimeRecord {
    /// Unique identifier within a catalog
    pub id: String,

    /// Display title, the primary matching field
    pub title: String,

    /// Alternate titles, kept in display order
    #[serde(default)]
    pub synonyms: Vec<String>,

    /// Genre labels as one delimited string ("Action, Drama")
    #[serde(default)]
    pub genre: String,

    /// Production studio
    #[serde(default)]
    pub studio: String,

    /// Release year
    #[serde(default)]
    pub year: Option<u32>,

    /// Average score, 0.0 when unrated
    #[serde(default)]
    pub rating: f64,

    /// Episode count when known
    #[serde(default)]
    pub episodes: Option<u32>,

    #[serde(default)]
    pub status: AnimeStatus,

    /// Total view count
    #[serde(default)]
    pub views: u64,

    #[serde(default)]
    pub trending: bool,

    /// Cover image URL
    #[serde(default)]
    pub image: Option<String>,

    /// Weekday the series airs on, for currently airing shows
    #[serde(default, alias = "airing_day")]
    pub airing_day: Option<String>,
}

/// Airing or completion state of a series.
///
/// Unrecognised strings decode to [`AnimeStatus::Unknown`] rather than
/// failing the whole record.
///
/// ```rust
/// use animedex::types::AnimeStatus;
///
/// let status: AnimeStatus = serde_json::from_str("\"Completed\"").unwrap();
/// assert_eq!(status, AnimeStatus::Completed);
///
/// let status: AnimeStatus = serde_json::from_str("\"Hiatus\"").unwrap();
/// assert_eq!(status, AnimeStatus::Unknown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimeStatus {
    Ongoing,
    Completed,
    Airing,
    Upcoming,
    #[default]
    #[serde(other)]
    Unknown,
}

impl AnimeStatus {
    /// Maps the free-form status strings used by content APIs.
    pub fn from_api(status: &str) -> Self {
        match status.trim().to_lowercase().as_str() {
            "ongoing" => AnimeStatus::Ongoing,
            "completed" | "finished" => AnimeStatus::Completed,
            "airing" | "currently airing" => AnimeStatus::Airing,
            "upcoming" | "not yet aired" => AnimeStatus::Upcoming,
            _ => AnimeStatus::Unknown,
        }
    }
}

impl fmt::Display for AnimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnimeStatus::Ongoing => "Ongoing",
            AnimeStatus::Completed => "Completed",
            AnimeStatus::Airing => "Airing",
            AnimeStatus::Upcoming => "Upcoming",
            AnimeStatus::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

impl FromStr for AnimeStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match AnimeStatus::from_api(s) {
            AnimeStatus::Unknown => Err(crate::Error::parse(format!("Unknown status: {}", s))),
            status => Ok(status),
        }
    }
}

/// Search parameters for querying catalog sources.
///
/// The `derive_builder` crate generates a `SearchParamsBuilder`:
///
/// ```rust
/// use animedex::types::SearchParamsBuilder;
///
/// let params = SearchParamsBuilder::default()
///     .query("one piece")
///     .page(2u32)
///     .limit(Some(10))
///     .build()
///     .unwrap();
/// assert_eq!(params.page, 2);
/// ```
///
/// * `query` - Free-text search query
/// * `page` - 1-based page number for paged remote APIs
/// * `limit` - Maximum number of results to keep
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct SearchParams {
    pub query: String,
    #[builder(default = "1")]
    pub page: u32,
    #[builder(default)]
    pub limit: Option<usize>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            query: String::new(),
            page: 1,
            limit: None,
        }
    }
}

impl From<String> for SearchParams {
    /// ```rust
    /// use animedex::types::SearchParams;
    ///
    /// let params: SearchParams = "one piece".to_string().into();
    /// assert_eq!(params.query, "one piece");
    /// assert_eq!(params.page, 1);
    /// ```
    fn from(query: String) -> Self {
        SearchParams {
            query,
            ..Default::default()
        }
    }
}

impl From<&str> for SearchParams {
    fn from(query: &str) -> Self {
        query.to_string().into()
    }
}

/// One page of catalog results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub current_page: u32,
    pub has_next_page: bool,
    pub results: Vec<AnimeRecord>,
}

impl SearchPage {
    /// A single page holding every given record.
    pub fn single(results: Vec<AnimeRecord>) -> Self {
        Self {
            current_page: 1,
            has_next_page: false,
            results,
        }
    }
}

/// Detailed view of one anime, including its episode list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimeDetails {
    pub record: AnimeRecord,
    pub description: Option<String>,
    pub episode_list: Vec<Episode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    pub number: f64,
}

/// A playable stream for one episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamSource {
    pub url: String,
    /// Quality label such as "1080p", "default" or "backup"
    pub quality: Option<String>,
    pub is_m3u8: bool,
}

/// All streams available for an episode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamingLinks {
    pub sources: Vec<StreamSource>,
    /// Referer header some hosts require for playback
    pub referer: Option<String>,
}

/// Filters offered by the top-anime view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TopCategory {
    #[default]
    Trending,
    /// Rating of 8.5 or above
    HighestRated,
    /// One million views or more
    MostWatched,
    Completed,
    Ongoing,
    /// Released in 2020 or later
    Recent,
    All,
}

impl FromStr for TopCategory {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "trending" => Ok(TopCategory::Trending),
            "highest-rated" => Ok(TopCategory::HighestRated),
            "most-watched" => Ok(TopCategory::MostWatched),
            "completed" => Ok(TopCategory::Completed),
            "ongoing" => Ok(TopCategory::Ongoing),
            "recent" => Ok(TopCategory::Recent),
            "all" => Ok(TopCategory::All),
            _ => Err(crate::Error::parse(format!("Unknown top category: {}", s))),
        }
    }
}

/// Sort orders offered by the top-anime view.
///
/// Every numeric order sorts descending; `Title` sorts alphabetically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TopSort {
    #[default]
    Rating,
    Views,
    Year,
    Episodes,
    Title,
}

impl FromStr for TopSort {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "rating" => Ok(TopSort::Rating),
            "views" => Ok(TopSort::Views),
            "year" => Ok(TopSort::Year),
            "episodes" => Ok(TopSort::Episodes),
            "title" => Ok(TopSort::Title),
            _ => Err(crate::Error::parse(format!("Unknown sort order: {}", s))),
        }
    }
}

/// Broadcast season, rendered lower case as the content API expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
        };
        f.write_str(name)
    }
}

impl FromStr for Season {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "winter" => Ok(Season::Winter),
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "fall" | "autumn" => Ok(Season::Fall),
            _ => Err(crate::Error::parse(format!("Unknown season: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_params_defaults() {
        let params = SearchParams::from("one piece");
        assert_eq!(params.query, "one piece");
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, None);

        let params = SearchParamsBuilder::default().query("bleach").build().unwrap();
        assert_eq!(params.page, 1);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(AnimeStatus::from_api("Currently Airing"), AnimeStatus::Airing);
        assert_eq!(AnimeStatus::from_api("Finished"), AnimeStatus::Completed);
        assert!("hiatus".parse::<AnimeStatus>().is_err());
        assert_eq!("ongoing".parse::<AnimeStatus>().unwrap(), AnimeStatus::Ongoing);
    }

    #[test]
    fn test_record_uses_camel_case_fields() {
        let json = r#"{"id":"s1","title":"X","status":"Airing","airingDay":"Sunday"}"#;
        let record: AnimeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.status, AnimeStatus::Airing);
        assert_eq!(record.airing_day.as_deref(), Some("Sunday"));

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["airingDay"], "Sunday");

        // Older snake_case files still load
        let json = r#"{"id":"s2","title":"Y","airing_day":"Monday"}"#;
        let record: AnimeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.airing_day.as_deref(), Some("Monday"));
    }

    #[test]
    fn test_browse_selectors_parse() {
        assert_eq!(
            "highest-rated".parse::<TopCategory>().unwrap(),
            TopCategory::HighestRated
        );
        assert_eq!("Views".parse::<TopSort>().unwrap(), TopSort::Views);
        assert_eq!("autumn".parse::<Season>().unwrap(), Season::Fall);
        assert_eq!(Season::Fall.to_string(), "fall");
        assert!("popular".parse::<TopCategory>().is_err());
    }
}
