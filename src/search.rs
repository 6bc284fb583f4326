//! Tiered catalog search, the fluent search builder and result processing.
//!
//! The heart of this module is [`ranked_search`], a pure function that orders
//! the records of a catalog by how well they match a free-text query. Remote
//! searches go through [`SearchBuilder`], whose [`execute`](SearchBuilder::execute)
//! strategy substitutes a local ranked search whenever the remote sources fail
//! or come back empty.
//!
//! # Examples
//!
//! ```rust
//! use animedex::prelude::*;
//! # use animedex::error::Result;
//!
//! # async fn example() -> Result<()> {
//! let sources = Sources::new().with_fallback(LocalCatalog::builtin());
//!
//! // Always yields results, from the API or from the local catalog
//! let outcome = sources.search("attack on titan").limit(10).execute().await;
//! for anime in outcome.results() {
//!     println!("{}", anime.title);
//! }
//!
//! // Post-process a plain result vector
//! let results = sources
//!     .search("naruto")
//!     .flatten()
//!     .await?
//!     .dedupe_by_id()
//!     .rank_by_query("naruto");
//! # Ok(())
//! # }
//! ```

use crate::{
    error::Result,
    source::Sources,
    types::{AnimeRecord, SearchPage, SearchParams, TopCategory, TopSort},
};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Minimum length, in characters, of a query word taking part in fuzzy matching.
pub const FUZZY_MIN_WORD_LEN: usize = 3;

/// The precedence level at which a record matched a query.
///
/// Tiers are ordered most relevant first, so sorting by `MatchTier` yields
/// the ranking order used by [`ranked_search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchTier {
    /// Title equals the trimmed query
    ExactTitle = 1,
    /// Title contains the query
    Title = 2,
    /// An alternate title contains the query
    Synonym = 3,
    /// Genre string contains the query
    Genre = 4,
    /// Studio name contains the query
    Studio = 5,
    /// Release year contains the query
    Year = 6,
    /// A query word of three or more characters appears in the title
    Fuzzy = 7,
}

/// A query normalised once per search.
struct Query<'q> {
    raw: &'q str,
    lower: String,
    exact: String,
    words: Vec<String>,
}

impl<'q> Query<'q> {
    /// Returns `None` for empty or whitespace-only input.
    fn parse(raw: &'q str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }

        let lower = raw.to_lowercase();
        let exact = lower.trim().to_string();
        let words = lower
            .split_whitespace()
            .filter(|word| word.chars().count() >= FUZZY_MIN_WORD_LEN)
            .map(str::to_string)
            .collect();

        Some(Self {
            raw,
            lower,
            exact,
            words,
        })
    }

    fn tier_of(&self, record: &AnimeRecord) -> Option<MatchTier> {
        let title = record.title.to_lowercase();

        if title == self.exact {
            return Some(MatchTier::ExactTitle);
        }
        if title.contains(&self.lower) {
            return Some(MatchTier::Title);
        }
        if record
            .synonyms
            .iter()
            .any(|synonym| synonym.to_lowercase().contains(&self.lower))
        {
            return Some(MatchTier::Synonym);
        }
        if record.genre.to_lowercase().contains(&self.lower) {
            return Some(MatchTier::Genre);
        }
        if record.studio.to_lowercase().contains(&self.lower) {
            return Some(MatchTier::Studio);
        }
        // Years are compared against the query exactly as typed.
        if record
            .year
            .is_some_and(|year| year.to_string().contains(self.raw))
        {
            return Some(MatchTier::Year);
        }
        if self.words.iter().any(|word| title.contains(word.as_str())) {
            return Some(MatchTier::Fuzzy);
        }

        None
    }
}

/// Returns the tier at which `record` matches `query`, if any.
///
/// # Examples
///
/// ```rust
/// use animedex::search::{match_tier, MatchTier};
/// use animedex::types::AnimeRecord;
///
/// let record = AnimeRecord {
///     id: "1".to_string(),
///     title: "Attack on Titan".to_string(),
///     synonyms: vec!["AoT".to_string()],
///     year: Some(2013),
///     ..Default::default()
/// };
///
/// assert_eq!(match_tier("attack on titan", &record), Some(MatchTier::ExactTitle));
/// assert_eq!(match_tier("aot", &record), Some(MatchTier::Synonym));
/// assert_eq!(match_tier("2013", &record), Some(MatchTier::Year));
/// assert_eq!(match_tier("   ", &record), None);
/// ```
pub fn match_tier(query: &str, record: &AnimeRecord) -> Option<MatchTier> {
    Query::parse(query)?.tier_of(record)
}

/// Catalog positions of matching records, in ranking order.
fn ranked_indices(query: &str, catalog: &[AnimeRecord]) -> Vec<usize> {
    let Some(query) = Query::parse(query) else {
        return Vec::new();
    };

    let mut matches: Vec<(MatchTier, usize)> = catalog
        .iter()
        .enumerate()
        .filter_map(|(index, record)| query.tier_of(record).map(|tier| (tier, index)))
        .collect();

    // Stable: records within a tier keep their catalog order.
    matches.sort_by_key(|(tier, _)| *tier);

    let mut seen = HashSet::new();
    matches
        .into_iter()
        .filter(|(_, index)| seen.insert(catalog[*index].id.as_str()))
        .map(|(_, index)| index)
        .collect()
}

/// Searches `catalog` for `query` using a fixed seven-tier precedence.
///
/// Each record is placed in the first tier it matches and appears at most
/// once. Tiers, most relevant first:
///
/// 1. exact title (query trimmed)
/// 2. title contains the query
/// 3. any synonym contains the query
/// 4. genre contains the query
/// 5. studio contains the query
/// 6. release year contains the query
/// 7. any query word of 3+ characters appears in the title
///
/// All textual comparisons are case-insensitive. Records matching at the same
/// tier keep their relative catalog order. An empty or whitespace-only query
/// matches nothing.
///
/// This function is pure and never fails.
///
/// # Examples
///
/// ```rust
/// use animedex::search::ranked_search;
/// use animedex::types::AnimeRecord;
///
/// let catalog = vec![
///     AnimeRecord {
///         id: "1".to_string(),
///         title: "Attack no Titan Parody".to_string(),
///         ..Default::default()
///     },
///     AnimeRecord {
///         id: "2".to_string(),
///         title: "Attack on Titan".to_string(),
///         ..Default::default()
///     },
/// ];
///
/// let results = ranked_search("attack", &catalog);
/// assert_eq!(results.len(), 2);
///
/// let results = ranked_search("Attack on Titan", &catalog);
/// assert_eq!(results[0].id, "2");
/// ```
pub fn ranked_search<'a>(query: &str, catalog: &'a [AnimeRecord]) -> Vec<&'a AnimeRecord> {
    ranked_indices(query, catalog)
        .into_iter()
        .map(|index| &catalog[index])
        .collect()
}

/// Where the results of [`SearchBuilder::execute`] came from.
///
/// Both variants carry ordinary result lists; callers that do not care about
/// provenance use [`results`](SearchOutcome::results) or
/// [`into_results`](SearchOutcome::into_results).
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Results returned by the remote sources
    Remote(Vec<AnimeRecord>),
    /// Results of a ranked search over the local fallback catalog
    Local(Vec<AnimeRecord>),
}

impl SearchOutcome {
    pub fn results(&self) -> &[AnimeRecord] {
        match self {
            SearchOutcome::Remote(results) | SearchOutcome::Local(results) => results,
        }
    }

    pub fn into_results(self) -> Vec<AnimeRecord> {
        match self {
            SearchOutcome::Remote(results) | SearchOutcome::Local(results) => results,
        }
    }

    /// True when the remote path failed or was empty and local results were used.
    pub fn is_fallback(&self) -> bool {
        matches!(self, SearchOutcome::Local(_))
    }
}

/// A fluent search builder that can build search parameters and execute searches.
///
/// `SearchBuilder` holds a reference to a [`Sources`] collection and builds
/// [`SearchParams`] as you chain method calls.
///
/// # Execution Strategies
///
/// - [`execute()`](SearchBuilder::execute) - Remote search with local fallback, never fails
/// - [`flatten()`](SearchBuilder::flatten) - All remote results in a single vector
/// - [`group()`](SearchBuilder::group) - Remote results grouped by source
/// - [`from_source()`](SearchBuilder::from_source) - A single source only
/// - [`build()`](SearchBuilder::build) - Just the search parameters
///
/// # Examples
///
/// ```rust
/// use animedex::prelude::*;
///
/// # async fn example() {
/// let sources = Sources::new().with_fallback(LocalCatalog::builtin());
///
/// let outcome = sources.search("demon slayer").page(1).limit(5).execute().await;
/// if outcome.is_fallback() {
///     println!("served from the local catalog");
/// }
/// # }
/// ```
pub struct SearchBuilder<'a> {
    sources: &'a Sources,
    params: SearchParams,
}

impl<'a> SearchBuilder<'a> {
    pub(crate) fn new(sources: &'a Sources, query: impl Into<String>) -> Self {
        Self {
            sources,
            params: SearchParams {
                query: query.into(),
                ..Default::default()
            },
        }
    }

    /// Sets the 1-based result page requested from paged sources.
    pub fn page(mut self, page: u32) -> Self {
        self.params.page = page.max(1);
        self
    }

    /// Sets the maximum number of results kept per source.
    pub fn limit(mut self, limit: usize) -> Self {
        self.params.limit = Some(limit);
        self
    }

    /// Searches the remote sources, falling back to the local catalog.
    ///
    /// When every remote source fails, or the sources return no records at
    /// all, the query is run through [`ranked_search`] against the fallback
    /// catalog registered with [`Sources::with_fallback`]. Remote errors are
    /// logged and never surfaced. An empty or whitespace-only query returns an
    /// empty [`SearchOutcome::Local`] without contacting any source.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use animedex::prelude::*;
    ///
    /// # async fn example() {
    /// let sources = Sources::new().with_fallback(LocalCatalog::builtin());
    /// let titles: Vec<String> = sources
    ///     .search("AoT")
    ///     .execute()
    ///     .await
    ///     .into_results()
    ///     .into_iter()
    ///     .map(|anime| anime.title)
    ///     .collect();
    /// # }
    /// ```
    pub async fn execute(self) -> SearchOutcome {
        if self.params.query.trim().is_empty() {
            return SearchOutcome::Local(Vec::new());
        }

        let query = self.params.query.clone();
        let limit = self.params.limit;

        match self.sources.search_all_flat(self.params).await {
            Ok(results) if !results.is_empty() => {
                debug!(query = %query, count = results.len(), "remote search succeeded");
                return SearchOutcome::Remote(results);
            }
            Ok(_) => debug!(query = %query, "remote search returned no results"),
            Err(e) => warn!(query = %query, error = %e, "remote search failed"),
        }

        let results = match self.sources.fallback() {
            Some(catalog) => catalog.rank(&query, limit),
            None => Vec::new(),
        };
        debug!(query = %query, count = results.len(), "serving local catalog results");
        SearchOutcome::Local(results)
    }

    /// Executes the search across all remote sources and flattens the results.
    ///
    /// Results are concatenated in source registration order. Fails only
    /// when every source failed.
    pub async fn flatten(self) -> Result<Vec<AnimeRecord>> {
        self.sources.search_all_flat(self.params).await
    }

    /// Executes the search and returns one page per source, keyed by source ID.
    pub async fn group(self) -> Vec<(String, Result<SearchPage>)> {
        self.sources.search_all_grouped(self.params).await
    }

    /// Executes the search on a single source.
    ///
    /// # Errors
    ///
    /// * [`Error::NotFound`](crate::Error::NotFound) - If no source has the given ID
    /// * Any error from the source itself
    pub async fn from_source(self, source_id: &str) -> Result<SearchPage> {
        match self.sources.get(source_id) {
            Some(source) => source.search(self.params).await,
            None => Err(crate::Error::not_found(format!("Source: {}", source_id))),
        }
    }

    /// Returns the built search parameters without executing.
    pub fn build(self) -> SearchParams {
        self.params
    }
}

/// Extension trait providing post-processing methods for result vectors.
///
/// # Examples
///
/// ```rust
/// use animedex::prelude::*;
///
/// let catalog = LocalCatalog::builtin();
/// let top = catalog
///     .records()
///     .to_vec()
///     .filter_top(TopCategory::HighestRated)
///     .sort_top(TopSort::Rating);
/// assert!(top.windows(2).all(|w| w[0].rating >= w[1].rating));
/// ```
pub trait SearchResultExt {
    /// Removes records whose `id` was already seen, keeping the first.
    fn dedupe_by_id(self) -> Self;

    /// Removes records whose title (case-insensitive) was already seen.
    ///
    /// Useful when several sources list the same series.
    fn dedupe_by_title(self) -> Self;

    /// Keeps only records matching `query`, ordered as [`ranked_search`] orders them.
    fn rank_by_query(self, query: &str) -> Self;

    /// Keeps only records admitted by a top-anime category.
    fn filter_top(self, category: TopCategory) -> Self;

    /// Stable sort by a top-anime sort order.
    fn sort_top(self, sort: TopSort) -> Self;
}

impl SearchResultExt for Vec<AnimeRecord> {
    fn dedupe_by_id(mut self) -> Self {
        let mut seen = HashSet::new();
        self.retain(|anime| seen.insert(anime.id.clone()));
        self
    }

    fn dedupe_by_title(mut self) -> Self {
        let mut seen = HashSet::new();
        self.retain(|anime| seen.insert(anime.title.to_lowercase()));
        self
    }

    fn rank_by_query(self, query: &str) -> Self {
        let order = ranked_indices(query, &self);
        let mut slots: Vec<Option<AnimeRecord>> = self.into_iter().map(Some).collect();
        order
            .into_iter()
            .filter_map(|index| slots[index].take())
            .collect()
    }

    fn filter_top(mut self, category: TopCategory) -> Self {
        self.retain(|anime| category.admits(anime));
        self
    }

    fn sort_top(mut self, sort: TopSort) -> Self {
        self.sort_by(|a, b| sort.compare(a, b));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, title: &str) -> AnimeRecord {
        AnimeRecord {
            id: id.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_query_words_below_threshold_are_dropped() {
        let query = Query::parse("to be or not").unwrap();
        assert_eq!(query.words, vec!["not".to_string()]);
    }

    #[test]
    fn test_query_keeps_untrimmed_lowercase() {
        let query = Query::parse("  Naruto ").unwrap();
        assert_eq!(query.lower, "  naruto ");
        assert_eq!(query.exact, "naruto");
    }

    #[test]
    fn test_fuzzy_threshold_counts_characters() {
        // Two characters, four bytes
        let catalog = vec![record("1", "Ōō Adventure")];
        assert!(ranked_search("xx ōō", &catalog).is_empty());
    }

    #[test]
    fn test_duplicate_ids_are_collapsed() {
        let catalog = vec![record("1", "Naruto Shippuden"), record("1", "Naruto")];
        let results = ranked_search("naruto", &catalog);
        assert_eq!(results.len(), 1);
        // The exact match wins the placement.
        assert_eq!(results[0].title, "Naruto");
    }

    #[test]
    fn test_dedupe_by_id_keeps_first() {
        let results = vec![
            record("1", "Bleach"),
            record("2", "Death Note"),
            record("1", "Bleach: Thousand-Year Blood War"),
        ]
        .dedupe_by_id();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Bleach");
        assert_eq!(results[1].id, "2");
    }

    #[test]
    fn test_dedupe_by_title_ignores_case() {
        let results = vec![record("1", "Bleach"), record("9", "BLEACH")].dedupe_by_title();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "1");

        // Distinct titles sharing an id are left to dedupe_by_id
        let results = vec![record("1", "Bleach"), record("1", "Bleach TYBW")].dedupe_by_title();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_rank_by_query_drops_non_matches() {
        let results = vec![record("1", "Bleach"), record("2", "Death Note")]
            .rank_by_query("note");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "2");
    }

    #[test]
    fn test_outcome_accessors() {
        let outcome = SearchOutcome::Local(vec![record("1", "Bleach")]);
        assert!(outcome.is_fallback());
        assert_eq!(outcome.results().len(), 1);
        assert!(!SearchOutcome::Remote(vec![]).is_fallback());
    }
}
