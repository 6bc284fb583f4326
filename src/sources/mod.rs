//! Anime source implementations.
//!
//! Remote sources sit behind feature flags so minimal builds only carry the
//! sources they need. The in-memory [`LocalCatalog`] is always available; it
//! backs offline browsing and the search fallback.
//!
//! # Feature Flags
//!
//! - `source-consumet` - Enables the Consumet content API source
//! - `all-sources` - Enables all sources (default)
//!
//! Build without any remote source:
//! ```bash
//! cargo build --no-default-features
//! ```
//!
//! # Available Sources
//!
//! - [`LocalCatalog`] - In-memory catalog (always available)
//! - [`ConsumetSource`] - Consumet gogoanime API (requires `source-consumet` feature)

pub mod fixture;

#[cfg(feature = "source-consumet")]
pub mod consumet;

pub use fixture::LocalCatalog;

#[cfg(feature = "source-consumet")]
pub use consumet::ConsumetSource;
