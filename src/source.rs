//! Source trait and collection for managing anime catalog sources.
//!
//! This module defines the [`Source`] trait every catalog source implements,
//! and the [`Sources`] collection that fans searches out across several
//! sources and holds the local catalog used when they all come up empty.
//!
//! # Examples
//!
//! ```rust
//! use animedex::prelude::*;
//! use animedex::error::Result;
//!
//! # async fn example() -> Result<()> {
//! let mut sources = Sources::new().with_fallback(LocalCatalog::builtin());
//! // sources.add(ConsumetSource::new());
//!
//! // Search across all sources
//! let results = sources.search("one piece").limit(10).flatten().await?;
//!
//! // Use a specific source directly
//! if let Some(source) = sources.get("consumet") {
//!     let details = source.info("one-piece").await?;
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use futures::future;
use std::collections::HashMap;
use tracing::debug;

use crate::{
    error::Result,
    search::SearchBuilder,
    sources::LocalCatalog,
    types::{AnimeDetails, AnimeRecord, SearchPage, SearchParams, Season, StreamingLinks},
};

/// Trait that all catalog sources implement.
///
/// # Required Methods
///
/// * [`id()`](Source::id) - Unique identifier for the source
/// * [`name()`](Source::name) - Human-readable name
/// * [`base_url()`](Source::base_url) - Base URL of the source
/// * [`search()`](Source::search) - Free-text search
/// * [`info()`](Source::info) - Details and episode list for one anime
/// * [`streaming_links()`](Source::streaming_links) - Streams for one episode
///
/// The listing endpoints ([`recent_episodes()`](Source::recent_episodes),
/// [`top_airing()`](Source::top_airing), [`seasonal()`](Source::seasonal),
/// [`by_genre()`](Source::by_genre)) default to a [`Error::Source`](crate::Error::Source)
/// for sources that do not offer them.
///
/// # Implementation Guidelines
///
/// - Use the [`net::HttpClient`](crate::net::HttpClient) for HTTP requests
/// - Honour `params.limit` by truncating the returned page
/// - Return detailed errors using the [`Error`](crate::Error) types
///
/// # Examples
///
/// ```rust
/// use animedex::prelude::*;
/// use animedex::error::Result;
/// use async_trait::async_trait;
///
/// struct StaticSource;
///
/// #[async_trait]
/// impl Source for StaticSource {
///     fn id(&self) -> &'static str { "static" }
///     fn name(&self) -> &'static str { "Static Source" }
///     fn base_url(&self) -> &str { "memory://" }
///
///     async fn search(&self, params: SearchParams) -> Result<SearchPage> {
/// #       Ok(SearchPage::default())
///     }
///
///     async fn info(&self, anime_id: &str) -> Result<AnimeDetails> {
/// #       Err(animedex::Error::not_found(anime_id))
///     }
///
///     async fn streaming_links(&self, episode_id: &str) -> Result<StreamingLinks> {
/// #       Err(animedex::Error::not_found(episode_id))
///     }
/// }
/// ```
#[async_trait]
pub trait Source: Send + Sync {
    /// Returns the unique, lowercase identifier for this source.
    fn id(&self) -> &'static str;

    /// Returns the human-readable name of this source.
    fn name(&self) -> &'static str;

    /// Returns the base URL requests are made against.
    fn base_url(&self) -> &str;

    /// Searches the source for anime matching the query.
    ///
    /// # Errors
    ///
    /// * [`Error::Network`](crate::Error::Network) - Network communication errors
    /// * [`Error::Parse`](crate::Error::Parse) - Unexpected response shape
    /// * [`Error::Source`](crate::Error::Source) - Source-specific errors
    async fn search(&self, params: SearchParams) -> Result<SearchPage>;

    /// Retrieves details and the episode list for one anime.
    async fn info(&self, anime_id: &str) -> Result<AnimeDetails>;

    /// Retrieves playable streams for one episode.
    async fn streaming_links(&self, episode_id: &str) -> Result<StreamingLinks>;

    /// Lists recently released episodes' series.
    async fn recent_episodes(&self, _page: u32) -> Result<SearchPage> {
        Err(crate::Error::source(self.id(), "Recent episodes are not supported"))
    }

    /// Lists currently airing series ordered by popularity.
    async fn top_airing(&self, _page: u32) -> Result<SearchPage> {
        Err(crate::Error::source(self.id(), "Top airing is not supported"))
    }

    /// Lists series of one broadcast season.
    async fn seasonal(&self, _year: u32, _season: Season) -> Result<SearchPage> {
        Err(crate::Error::source(self.id(), "Seasonal listings are not supported"))
    }

    /// Lists series tagged with a genre.
    async fn by_genre(&self, _genre: &str, _page: u32) -> Result<SearchPage> {
        Err(crate::Error::source(self.id(), "Genre listings are not supported"))
    }
}

/// An ordered collection of catalog sources plus an optional fallback catalog.
///
/// # Examples
///
/// ```rust
/// use animedex::prelude::*;
///
/// # async fn example() {
/// let mut sources = Sources::new().with_fallback(LocalCatalog::builtin());
/// #[cfg(feature = "source-consumet")]
/// sources.add(ConsumetSource::new());
///
/// let outcome = sources.search("spy x family").execute().await;
/// println!("{} results", outcome.results().len());
/// # }
/// ```
pub struct Sources {
    sources: Vec<Box<dyn Source>>,
    by_id: HashMap<String, usize>,
    fallback: Option<LocalCatalog>,
}

impl Sources {
    /// Creates an empty collection without a fallback catalog.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            by_id: HashMap::new(),
            fallback: None,
        }
    }

    /// Sets the catalog searched locally when remote searches fail or are empty.
    pub fn with_fallback(mut self, catalog: LocalCatalog) -> Self {
        self.fallback = Some(catalog);
        self
    }

    /// Replaces the fallback catalog in place.
    pub fn set_fallback(&mut self, catalog: LocalCatalog) -> &mut Self {
        self.fallback = Some(catalog);
        self
    }

    /// The fallback catalog, if one was registered.
    pub fn fallback(&self) -> Option<&LocalCatalog> {
        self.fallback.as_ref()
    }

    /// Starts a fluent search across the collection.
    pub fn search(&self, query: impl Into<String>) -> SearchBuilder<'_> {
        SearchBuilder::new(self, query)
    }

    /// Adds a source. A later source with the same ID shadows earlier ones in [`get`](Sources::get).
    pub fn add(&mut self, source: impl Source + 'static) -> &mut Self {
        let id = source.id().to_string();
        let index = self.sources.len();
        self.sources.push(Box::new(source));
        self.by_id.insert(id, index);
        self
    }

    /// Gets a source by its ID.
    pub fn get(&self, id: &str) -> Option<&dyn Source> {
        self.by_id
            .get(id)
            .and_then(|&index| self.sources.get(index))
            .map(|s| s.as_ref())
    }

    /// IDs of all sources, in registration order.
    pub fn list_ids(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.id()).collect()
    }

    /// Searches every source concurrently, returning one result per source.
    pub async fn search_all_grouped(
        &self,
        params: SearchParams,
    ) -> Vec<(String, Result<SearchPage>)> {
        let futures = self.sources.iter().map(|source| {
            let params = params.clone();
            async move {
                let source_id = source.id().to_string();
                let result = source.search(params).await;
                if let Err(e) = &result {
                    debug!(source = %source_id, error = %e, "source search failed");
                }
                (source_id, result)
            }
        });

        future::join_all(futures).await
    }

    /// Searches every source concurrently and concatenates their results.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Other`](crate::Error::Other) only when no source
    /// produced results and at least one failed.
    pub async fn search_all_flat(&self, params: SearchParams) -> Result<Vec<AnimeRecord>> {
        let grouped = self.search_all_grouped(params).await;

        let mut all_results = Vec::new();
        let mut errors = Vec::new();

        for (source_id, result) in grouped {
            match result {
                Ok(mut page) => all_results.append(&mut page.results),
                Err(e) => errors.push(format!("{}: {}", source_id, e)),
            }
        }

        if all_results.is_empty() && !errors.is_empty() {
            return Err(crate::Error::Other(format!(
                "All sources failed: {}",
                errors.join(", ")
            )));
        }

        Ok(all_results)
    }

    /// Number of registered sources, not counting the fallback catalog.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for Sources {
    fn default() -> Self {
        Self::new()
    }
}
