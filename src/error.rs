//! Error types and result handling for animedex operations.
//!
//! All fallible operations return a [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`.
//!
//! # Error Categories
//!
//! - **Network Errors**: Connection issues, timeouts, HTTP transport errors
//! - **Parse Errors**: Unexpected payload shapes from the content API
//! - **Source Errors**: Catalog-source specific failures with context
//! - **Not Found**: Missing anime, sources or user profiles
//! - **Rate Limiting**: When the content API throttles requests
//! - **IO / JSON Errors**: Local catalog files and the JSON user store
//! - **Config Errors**: Invalid environment configuration
//!
//! Note that [`ranked_search`](crate::search::ranked_search) never fails, and
//! [`SearchBuilder::execute`](crate::search::SearchBuilder::execute) swallows
//! remote errors by falling back to the local catalog.
//!
//! # Examples
//!
//! ```rust
//! use animedex::prelude::*;
//! use animedex::error::{Error, Result};
//!
//! # async fn example() -> Result<()> {
//! let sources = Sources::new();
//!
//! match sources.search("naruto").from_source("invalid").await {
//!     Ok(page) => println!("Found {} results", page.results.len()),
//!     Err(Error::NotFound(msg)) => println!("Source not found: {}", msg),
//!     Err(Error::Network(e)) => println!("Network error: {}", e),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

/// Type alias for Results with animedex errors.
///
/// ```rust
/// use animedex::{Error, Result};
///
/// fn example_with_error() -> Result<()> {
///     Err(Error::parse("Something went wrong"))
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all fallible animedex operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Network-related errors from HTTP operations.
    ///
    /// Wraps errors from the underlying HTTP client (reqwest): connection
    /// timeouts, DNS failures, TLS errors and the like.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The content API answered with data we could not interpret.
    ///
    /// ```rust
    /// use animedex::Error;
    ///
    /// let error = Error::parse("Missing results field in response");
    /// ```
    #[error("Parse error: {0}")]
    Parse(String),

    /// Source-specific errors with contextual information.
    ///
    /// * `src` - The identifier of the source that encountered the error
    /// * `message` - Descriptive error message explaining what went wrong
    ///
    /// ```rust
    /// use animedex::Error;
    ///
    /// let error = Error::source("consumet", "HTTP 503 Service Unavailable");
    /// ```
    #[error("Source error [{src}]: {message}")]
    Source { src: String, message: String },

    /// A requested anime, episode, source or user profile does not exist.
    ///
    /// ```rust
    /// use animedex::Error;
    ///
    /// let error = Error::not_found("Anime with ID 'attack-on-titan'");
    /// let error = Error::not_found("User profile: u-42");
    /// ```
    #[error("Not found: {0}")]
    NotFound(String),

    /// The content API rate-limited us and retries were exhausted.
    ///
    /// `retry_after` carries the `Retry-After` header in seconds when the
    /// API sent one.
    #[error("Rate limited, retry after {retry_after:?} seconds")]
    RateLimit { retry_after: Option<u64> },

    /// File system errors from local catalogs and the JSON user store.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization and deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration value.
    ///
    /// ```rust
    /// use animedex::Error;
    ///
    /// let error = Error::config("ANIMEDEX_MAX_RETRIES must be a number");
    /// ```
    #[error("Config error: {0}")]
    Config(String),

    /// Errors that fit none of the categories above.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates a parse error with the given message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Creates a source-specific error with source ID and message.
    ///
    /// ```rust
    /// use animedex::Error;
    ///
    /// let error = Error::source("local", "Streaming is not available offline");
    /// assert!(error.to_string().contains("[local]"));
    /// ```
    pub fn source(src: impl Into<String>, msg: impl Into<String>) -> Self {
        Error::Source {
            src: src.into(),
            message: msg.into(),
        }
    }

    /// Creates a not found error with the given message.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    /// Creates a rate limit error with optional retry-after time.
    ///
    /// The retry-after value typically comes from the `Retry-After` HTTP header.
    pub fn rate_limit(retry_after: Option<u64>) -> Self {
        Error::RateLimit { retry_after }
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}
