//! JSON path helpers for loosely shaped catalog payloads.
//!
//! Content APIs and hand-written fixture files do not always agree on where
//! the list of records lives. These helpers navigate nested objects with dot
//! notation.
//!
//! # Examples
//!
//! ```rust
//! use animedex::net::json;
//! use serde_json::json;
//!
//! let data = json!({
//!     "currentPage": 1,
//!     "results": [
//!         {"id": "one-piece", "title": "One Piece"},
//!         {"id": "bleach", "title": "Bleach"}
//!     ]
//! });
//!
//! let results = json::extract_path(&data, "results").unwrap();
//! assert_eq!(results.as_array().map(Vec::len), Some(2));
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Extracts a value from nested JSON using dot notation.
///
/// ```rust
/// use animedex::net::json;
/// use serde_json::json;
///
/// let data = json!({"anime": {"title": "Death Note", "year": 2006}});
///
/// let title = json::extract_path(&data, "anime.title");
/// assert_eq!(title.unwrap().as_str(), Some("Death Note"));
/// assert_eq!(json::extract_path(&data, "anime.studio"), None);
/// ```
pub fn extract_path(json: &Value, path: &str) -> Option<Value> {
    let mut current = json;

    for key in path.split('.') {
        current = current.get(key)?;
    }

    Some(current.clone())
}

/// Extracts and deserializes the value at a dot path.
///
/// # Errors
///
/// * [`Error::Parse`](crate::Error::Parse) - If the path doesn't exist
/// * [`Error::Json`](crate::Error::Json) - If deserialization fails
///
/// ```rust
/// use animedex::net::json;
/// use serde_json::json;
///
/// let data = json!({"anime": {"year": 2006}});
/// let year: u32 = json::extract_as(&data, "anime.year").unwrap();
/// assert_eq!(year, 2006);
/// ```
pub fn extract_as<T>(json: &Value, path: &str) -> crate::Result<T>
where
    T: DeserializeOwned,
{
    extract_path(json, path)
        .ok_or_else(|| crate::Error::parse(format!("Path not found: {}", path)))
        .and_then(|v| serde_json::from_value(v).map_err(Into::into))
}
