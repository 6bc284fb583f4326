//! # Animedex - Anime catalog aggregation with tiered local search
//!
//! Animedex is an async anime discovery library. It searches remote content
//! APIs through a unified [`Source`] interface and answers from a local
//! catalog with a deterministic, tiered relevance search whenever the remote
//! side fails or comes back empty.
//!
//! ## Features
//!
//! - **Ranked Search**: Seven-tier relevance ordering over titles, synonyms,
//!   genres, studios and release years
//! - **Remote Fallback**: Searches never fail; the local catalog takes over
//! - **Fluent Builder Pattern**: Chain search parameters and execution strategies
//! - **Browsing**: Category filters, top lists and seasonal statistics
//! - **User Library**: Profiles, favorites, watch history, watchlist and progress
//! - **Rate Limiting**: Per-source rate limiting with retry on 429
//!
//! ## Quick Start
//!
//! ### Ranking a catalog
//!
//! ```rust
//! use animedex::prelude::*;
//!
//! let catalog = LocalCatalog::builtin();
//! let results = ranked_search("Naruto", catalog.records());
//! assert_eq!(results[0].title, "Naruto Shippuden");
//! ```
//!
//! ### Searching with fallback
//!
//! ```rust
//! use animedex::prelude::*;
//! #[cfg(feature = "source-consumet")]
//! use animedex::sources::ConsumetSource;
//!
//! # async fn example() {
//! let mut sources = Sources::new().with_fallback(LocalCatalog::builtin());
//! #[cfg(feature = "source-consumet")]
//! sources.add(ConsumetSource::new());
//!
//! let outcome = sources.search("attack on titan").limit(20).execute().await;
//! println!("{} results", outcome.results().len());
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`search`]: Ranked search, fluent search builder and result processing
//! - [`source`]: Core trait and collection for catalog sources
//! - [`sources`]: Source implementations, including the local catalog
//! - [`browse`]: Category, top list and seasonal views over a catalog
//! - [`library`]: Per-user profile data and its stores
//! - [`types`]: Core data structures
//! - [`config`]: Environment-driven configuration
//! - [`net`]: HTTP client, rate limiting and JSON helpers
//! - [`error`]: Error handling
//!
//! ## Search Strategies
//!
//! ```rust
//! # use animedex::prelude::*;
//! # use animedex::error::Result;
//!
//! # async fn example() -> Result<()> {
//! # let sources = Sources::new();
//! // Remote first, local catalog when remote fails or is empty
//! let outcome = sources.search("naruto").execute().await;
//!
//! // Flatten results from all remote sources
//! let all_results = sources.search("naruto").flatten().await?;
//!
//! // Group results by source (useful for debugging)
//! let grouped = sources.search("naruto").group().await;
//!
//! // Search a specific source only
//! let specific = sources.search("naruto").from_source("consumet").await;
//! # Ok(())
//! # }
//! ```

pub mod browse;
pub mod config;
pub mod error;
pub mod library;
pub mod net;
pub mod search;
pub mod source;
pub mod sources;
pub mod types;

/// Prelude module for convenient imports.
///
/// ```rust
/// use animedex::prelude::*;
///
/// // Now you have access to:
/// // - Sources, Source trait, LocalCatalog
/// // - ranked_search, SearchBuilder, SearchOutcome, SearchResultExt
/// // - AnimeRecord, AnimeStatus, SearchParams, TopCategory, TopSort, ...
/// ```
pub mod prelude {
    pub use crate::{
        browse::{CategoryFilter, CategoryOptions, SeasonalStats, filter_by_category, top_anime},
        library::{Library, LibraryEntry, UserStore, WatchEntry},
        search::{MatchTier, SearchBuilder, SearchOutcome, SearchResultExt, ranked_search},
        source::{Source, Sources},
        sources::LocalCatalog,
        types::{
            AnimeDetails, AnimeRecord, AnimeStatus, Episode, SearchPage, SearchParams, Season,
            StreamingLinks, TopCategory, TopSort,
        },
    };

    #[cfg(feature = "source-consumet")]
    pub use crate::sources::ConsumetSource;
}

// Re-export main types at crate root for direct access
pub use error::{Error, Result};
pub use search::{SearchBuilder, SearchOutcome, SearchResultExt, ranked_search};
pub use source::{Source, Sources};
pub use types::{AnimeRecord, AnimeStatus, SearchPage, SearchParams};
