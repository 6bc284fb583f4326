//! Per-user library data: profile, favorites, watch history, watchlist and
//! playback progress.
//!
//! A [`Library`] works on whole [`UserProfile`] documents fetched from and
//! written back to a [`UserStore`]. Every mutation is a load, modify, save
//! cycle with last write wins. Reads of a missing profile yield empty results;
//! mutations of a missing profile fail with [`Error::NotFound`].
//!
//! # Examples
//!
//! ```rust
//! use animedex::library::{Library, LibraryEntry, MemoryStore};
//!
//! # async fn example() -> animedex::Result<()> {
//! let library = Library::new(MemoryStore::new());
//! library.create_profile("u1", "Kai", "🍙").await?;
//!
//! library
//!     .add_favorite("u1", LibraryEntry::new("6", "Death Note"))
//!     .await?;
//! assert!(library.is_favorite("u1", "6").await);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};

pub const DEFAULT_HISTORY_LIMIT: usize = 50;
pub const DEFAULT_DISPLAY_NAME: &str = "User";
pub const DEFAULT_AVATAR: &str = "😊";

/// Everything stored for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub display_name: String,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub favorites: Vec<LibraryEntry>,
    #[serde(default)]
    pub watch_history: Vec<WatchEntry>,
    #[serde(default)]
    pub watchlist: Vec<LibraryEntry>,
    #[serde(default)]
    pub watch_progress: Vec<WatchProgress>,
}

impl UserProfile {
    pub fn new(display_name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            avatar: avatar.into(),
            created_at: Utc::now(),
            favorites: Vec::new(),
            watch_history: Vec::new(),
            watchlist: Vec::new(),
            watch_progress: Vec::new(),
        }
    }
}

impl Default for UserProfile {
    fn default() -> Self {
        Self::new(DEFAULT_DISPLAY_NAME, DEFAULT_AVATAR)
    }
}

/// A favorite or watchlist entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntry {
    pub anime_id: String,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl LibraryEntry {
    pub fn new(anime_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            anime_id: anime_id.into(),
            title: title.into(),
            image: None,
            added_at: Utc::now(),
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// One watched episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchEntry {
    pub anime_id: String,
    pub episode_id: String,
    pub title: String,
    #[serde(default)]
    pub episode_number: Option<f64>,
    pub watched_at: DateTime<Utc>,
}

impl WatchEntry {
    pub fn new(
        anime_id: impl Into<String>,
        episode_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            anime_id: anime_id.into(),
            episode_id: episode_id.into(),
            title: title.into(),
            episode_number: None,
            watched_at: Utc::now(),
        }
    }
}

/// Playback position within a series, one per anime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchProgress {
    pub anime_id: String,
    /// Episode id last played
    pub current_episode: String,
    pub last_watched: DateTime<Utc>,
    #[serde(default)]
    pub position_secs: f64,
    #[serde(default)]
    pub duration_secs: f64,
}

impl WatchProgress {
    /// Position as a percentage of the duration, clamped to `0..=100`.
    ///
    /// ```rust
    /// use animedex::library::WatchProgress;
    ///
    /// let progress = WatchProgress {
    ///     anime_id: "1".into(),
    ///     current_episode: "1-episode-3".into(),
    ///     last_watched: chrono::Utc::now(),
    ///     position_secs: 720.0,
    ///     duration_secs: 1440.0,
    /// };
    /// assert_eq!(progress.percent(), 50.0);
    /// ```
    pub fn percent(&self) -> f64 {
        if self.duration_secs <= 0.0 {
            return 0.0;
        }
        (self.position_secs / self.duration_secs * 100.0).clamp(0.0, 100.0)
    }
}

/// Partial profile update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub avatar: Option<String>,
}

/// Partial progress update; `None` fields keep their previous value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProgressUpdate {
    pub position_secs: Option<f64>,
    pub duration_secs: Option<f64>,
}

/// Persistence backend holding one [`UserProfile`] document per user.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn load(&self, user_id: &str) -> Result<Option<UserProfile>>;

    async fn save(&self, user_id: &str, profile: &UserProfile) -> Result<()>;
}

/// Process-local store, mostly useful for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    profiles: Mutex<HashMap<String, UserProfile>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn load(&self, user_id: &str) -> Result<Option<UserProfile>> {
        Ok(self.profiles.lock().get(user_id).cloned())
    }

    async fn save(&self, user_id: &str, profile: &UserProfile) -> Result<()> {
        self.profiles
            .lock()
            .insert(user_id.to_string(), profile.clone());
        Ok(())
    }
}

/// Store keeping each profile in `<dir>/<user_id>.json`.
///
/// User ids are percent-encoded before becoming file names, so distinct ids
/// never share a file and `/` cannot escape the directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under `<data_dir>/users`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.data_dir.join("users"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, user_id: &str) -> Result<PathBuf> {
        if user_id.trim().is_empty() {
            return Err(Error::Other("User id must not be empty".to_string()));
        }

        let name = urlencoding::encode(user_id);
        Ok(self.dir.join(format!("{}.json", name)))
    }
}

impl Default for JsonFileStore {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[async_trait]
impl UserStore for JsonFileStore {
    async fn load(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let path = self.path_for(user_id)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, user_id: &str, profile: &UserProfile) -> Result<()> {
        let path = self.path_for(user_id)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let data = serde_json::to_vec_pretty(profile)?;
        tokio::fs::write(&path, data).await?;
        debug!(path = %path.display(), "saved profile");
        Ok(())
    }
}

/// User library operations over a [`UserStore`].
pub struct Library<S> {
    store: S,
}

impl<S: UserStore> Library<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates a profile, returning `false` if one already exists.
    pub async fn create_profile(
        &self,
        user_id: &str,
        display_name: &str,
        avatar: &str,
    ) -> Result<bool> {
        if self.store.load(user_id).await?.is_some() {
            return Ok(false);
        }
        self.store
            .save(user_id, &UserProfile::new(display_name, avatar))
            .await?;
        debug!(user_id, "created profile");
        Ok(true)
    }

    pub async fn profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        self.store.load(user_id).await
    }

    /// Applies `update`, creating a default profile first when none exists.
    pub async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<()> {
        let mut profile = self.store.load(user_id).await?.unwrap_or_default();
        if let Some(name) = update.display_name {
            profile.display_name = name;
        }
        if let Some(avatar) = update.avatar {
            profile.avatar = avatar;
        }
        self.store.save(user_id, &profile).await
    }

    /// Adds a favorite, replacing any entry with the same anime id.
    pub async fn add_favorite(&self, user_id: &str, entry: LibraryEntry) -> Result<()> {
        self.modify(user_id, |profile| upsert_entry(&mut profile.favorites, entry))
            .await
    }

    pub async fn remove_favorite(&self, user_id: &str, anime_id: &str) -> Result<()> {
        self.modify(user_id, |profile| {
            profile.favorites.retain(|entry| entry.anime_id != anime_id)
        })
        .await
    }

    pub async fn favorites(&self, user_id: &str) -> Result<Vec<LibraryEntry>> {
        Ok(self
            .store
            .load(user_id)
            .await?
            .map(|profile| profile.favorites)
            .unwrap_or_default())
    }

    /// Store errors are logged and reported as `false`.
    pub async fn is_favorite(&self, user_id: &str, anime_id: &str) -> bool {
        match self.favorites(user_id).await {
            Ok(favorites) => favorites.iter().any(|entry| entry.anime_id == anime_id),
            Err(e) => {
                warn!(user_id, error = %e, "favorite check failed");
                false
            }
        }
    }

    pub async fn add_to_history(&self, user_id: &str, entry: WatchEntry) -> Result<()> {
        self.modify(user_id, |profile| profile.watch_history.push(entry))
            .await
    }

    /// Most recent entries first, at most `limit` (default 50).
    pub async fn history(&self, user_id: &str, limit: Option<usize>) -> Result<Vec<WatchEntry>> {
        let mut history = self
            .store
            .load(user_id)
            .await?
            .map(|profile| profile.watch_history)
            .unwrap_or_default();

        history.sort_by(|a, b| b.watched_at.cmp(&a.watched_at));
        history.truncate(limit.unwrap_or(DEFAULT_HISTORY_LIMIT));
        Ok(history)
    }

    /// Removes every history entry of `anime_id`.
    pub async fn remove_from_history(&self, user_id: &str, anime_id: &str) -> Result<()> {
        self.modify(user_id, |profile| {
            profile
                .watch_history
                .retain(|entry| entry.anime_id != anime_id)
        })
        .await
    }

    /// Adds to the watchlist, replacing any entry with the same anime id.
    pub async fn add_to_watchlist(&self, user_id: &str, entry: LibraryEntry) -> Result<()> {
        self.modify(user_id, |profile| upsert_entry(&mut profile.watchlist, entry))
            .await
    }

    pub async fn remove_from_watchlist(&self, user_id: &str, anime_id: &str) -> Result<()> {
        self.modify(user_id, |profile| {
            profile.watchlist.retain(|entry| entry.anime_id != anime_id)
        })
        .await
    }

    pub async fn watchlist(&self, user_id: &str) -> Result<Vec<LibraryEntry>> {
        Ok(self
            .store
            .load(user_id)
            .await?
            .map(|profile| profile.watchlist)
            .unwrap_or_default())
    }

    /// Store errors are logged and reported as `false`.
    pub async fn is_in_watchlist(&self, user_id: &str, anime_id: &str) -> bool {
        match self.watchlist(user_id).await {
            Ok(watchlist) => watchlist.iter().any(|entry| entry.anime_id == anime_id),
            Err(e) => {
                warn!(user_id, error = %e, "watchlist check failed");
                false
            }
        }
    }

    /// Records the current episode and position for `anime_id`.
    ///
    /// An existing record is updated in place; fields absent from `update`
    /// keep their previous values.
    pub async fn update_progress(
        &self,
        user_id: &str,
        anime_id: &str,
        episode_id: &str,
        update: ProgressUpdate,
    ) -> Result<()> {
        self.modify(user_id, |profile| {
            let now = Utc::now();
            match profile
                .watch_progress
                .iter_mut()
                .find(|progress| progress.anime_id == anime_id)
            {
                Some(progress) => {
                    progress.current_episode = episode_id.to_string();
                    progress.last_watched = now;
                    if let Some(position) = update.position_secs {
                        progress.position_secs = position;
                    }
                    if let Some(duration) = update.duration_secs {
                        progress.duration_secs = duration;
                    }
                }
                None => profile.watch_progress.push(WatchProgress {
                    anime_id: anime_id.to_string(),
                    current_episode: episode_id.to_string(),
                    last_watched: now,
                    position_secs: update.position_secs.unwrap_or(0.0),
                    duration_secs: update.duration_secs.unwrap_or(0.0),
                }),
            }
        })
        .await
    }

    pub async fn progress(&self, user_id: &str, anime_id: &str) -> Result<Option<WatchProgress>> {
        Ok(self.store.load(user_id).await?.and_then(|profile| {
            profile
                .watch_progress
                .into_iter()
                .find(|progress| progress.anime_id == anime_id)
        }))
    }

    async fn modify<F>(&self, user_id: &str, apply: F) -> Result<()>
    where
        F: FnOnce(&mut UserProfile) + Send,
    {
        let mut profile = self
            .store
            .load(user_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Profile for user '{}'", user_id)))?;
        apply(&mut profile);
        self.store.save(user_id, &profile).await
    }
}

fn upsert_entry(entries: &mut Vec<LibraryEntry>, entry: LibraryEntry) {
    match entries.iter_mut().find(|e| e.anime_id == entry.anime_id) {
        Some(existing) => *existing = entry,
        None => entries.push(entry),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_percent_clamps() {
        let mut progress = WatchProgress {
            anime_id: "1".into(),
            current_episode: "1-episode-1".into(),
            last_watched: Utc::now(),
            position_secs: 2000.0,
            duration_secs: 1000.0,
        };
        assert_eq!(progress.percent(), 100.0);

        progress.duration_secs = 0.0;
        assert_eq!(progress.percent(), 0.0);
    }

    #[test]
    fn test_upsert_entry_replaces_same_anime() {
        let mut entries = vec![LibraryEntry::new("1", "Old title")];
        upsert_entry(&mut entries, LibraryEntry::new("1", "New title"));
        upsert_entry(&mut entries, LibraryEntry::new("2", "Other"));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "New title");
    }

    #[test]
    fn test_path_for_encodes_ids() {
        let store = JsonFileStore::new("/data");
        let path = store.path_for("../evil/user").unwrap();
        assert_eq!(path, PathBuf::from("/data/..%2Fevil%2Fuser.json"));
        assert_eq!(path.parent(), Some(Path::new("/data")));

        let dotted = store.path_for("alice.smith").unwrap();
        let underscored = store.path_for("alice_smith").unwrap();
        let at = store.path_for("alice@smith").unwrap();
        assert_ne!(dotted, underscored);
        assert_ne!(underscored, at);
        assert_eq!(at, PathBuf::from("/data/alice%40smith.json"));

        assert!(store.path_for("  ").is_err());
    }

    #[tokio::test]
    async fn test_history_is_newest_first() {
        let library = Library::new(MemoryStore::new());
        library.create_profile("u", "U", "x").await.unwrap();

        let base = Utc::now();
        for n in 0..3 {
            let mut entry = WatchEntry::new("1", format!("1-episode-{}", n), "Show");
            entry.watched_at = base + Duration::minutes(n);
            library.add_to_history("u", entry).await.unwrap();
        }

        let history = library.history("u", Some(2)).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].episode_id, "1-episode-2");
        assert_eq!(history[1].episode_id, "1-episode-1");
    }

    #[test]
    fn test_profile_serializes_camel_case() {
        let profile = UserProfile::default();
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["displayName"], "User");
        assert!(json["watchHistory"].as_array().unwrap().is_empty());
    }
}
