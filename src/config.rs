//! Runtime configuration.
//!
//! Defaults work out of the box; every field can be overridden through
//! environment variables (a `.env` file is honoured):
//!
//! | Variable                 | Field           | Default                                       |
//! |--------------------------|-----------------|-----------------------------------------------|
//! | `ANIMEDEX_API_BASE`      | `api_base`      | `https://api.consumet.org/anime/gogoanime`    |
//! | `ANIMEDEX_RATE_LIMIT_MS` | `rate_limit_ms` | `250`                                         |
//! | `ANIMEDEX_MAX_RETRIES`   | `max_retries`   | `3`                                           |
//! | `ANIMEDEX_PAGE_SIZE`     | `page_size`     | `20`                                          |
//! | `ANIMEDEX_DATA_DIR`      | `data_dir`      | platform data dir + `animedex`                |
//!
//! # Examples
//!
//! ```rust
//! use animedex::config::Config;
//!
//! let config = Config::from_lookup(|key| match key {
//!     "ANIMEDEX_MAX_RETRIES" => Some("5".to_string()),
//!     _ => None,
//! })
//! .unwrap();
//! assert_eq!(config.max_retries, 5);
//! assert_eq!(config.page_size, 20);
//! ```

use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_API_BASE: &str = "https://api.consumet.org/anime/gogoanime";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the content API, without trailing slash
    pub api_base: String,
    /// Minimum delay between content API requests
    pub rate_limit_ms: u64,
    pub max_retries: u32,
    /// Page size used by the local catalog
    pub page_size: usize,
    /// Directory holding the JSON user store
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            rate_limit_ms: 250,
            max_retries: 3,
            page_size: 20,
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] when a variable is set but invalid.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env"),
            Err(e) => debug!(error = %e, "no .env file loaded"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base) = lookup("ANIMEDEX_API_BASE") {
            config.api_base = validate_api_base(&base)?;
        }
        if let Some(delay) = parse_var(&lookup, "ANIMEDEX_RATE_LIMIT_MS")? {
            config.rate_limit_ms = delay;
        }
        if let Some(retries) = parse_var(&lookup, "ANIMEDEX_MAX_RETRIES")? {
            config.max_retries = retries;
        }
        if let Some(size) = parse_var::<usize, _>(&lookup, "ANIMEDEX_PAGE_SIZE")? {
            if size == 0 {
                return Err(Error::config("ANIMEDEX_PAGE_SIZE must be at least 1"));
            }
            config.page_size = size;
        }
        if let Some(dir) = lookup("ANIMEDEX_DATA_DIR").filter(|d| !d.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }

        Ok(config)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("animedex")
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::config(format!("{} has invalid value '{}'", key, raw))),
        None => Ok(None),
    }
}

fn validate_api_base(raw: &str) -> Result<String> {
    let url = Url::parse(raw.trim())
        .map_err(|e| Error::config(format!("ANIMEDEX_API_BASE is not a URL: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::config(format!(
            "ANIMEDEX_API_BASE must be http or https, got '{}'",
            url.scheme()
        )));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.max_retries, 3);
        assert!(config.data_dir.ends_with("animedex"));
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("ANIMEDEX_API_BASE", "http://localhost:3000/anime/gogoanime/"),
            ("ANIMEDEX_RATE_LIMIT_MS", " 0 "),
            ("ANIMEDEX_PAGE_SIZE", "5"),
            ("ANIMEDEX_DATA_DIR", "/tmp/animedex-test"),
        ]))
        .unwrap();

        assert_eq!(config.api_base, "http://localhost:3000/anime/gogoanime");
        assert_eq!(config.rate_limit_ms, 0);
        assert_eq!(config.page_size, 5);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/animedex-test"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = Config::from_lookup(lookup_from(&[("ANIMEDEX_MAX_RETRIES", "many")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Config::from_lookup(lookup_from(&[("ANIMEDEX_API_BASE", "ftp://x")]))
            .unwrap_err();
        assert!(err.to_string().contains("http or https"));

        assert!(Config::from_lookup(lookup_from(&[("ANIMEDEX_PAGE_SIZE", "0")])).is_err());
    }
}
