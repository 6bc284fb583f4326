use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    config::Config,
    error::Result,
    net::HttpClient,
    source::Source,
    types::{
        AnimeDetails, AnimeRecord, AnimeStatus, Episode, SearchPage, SearchParams, Season,
        StreamSource, StreamingLinks,
    },
};

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{4})\b").expect("valid year regex"));

/// Paged list response shared by search and listing endpoints
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConsumetPage {
    #[serde(default)]
    current_page: Value,
    #[serde(default)]
    has_next_page: bool,
    #[serde(default)]
    results: Vec<ConsumetAnime>,
}

/// Anime entry as listed by the API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConsumetAnime {
    id: String,
    title: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    other_name: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    total_episodes: Option<u32>,
}

/// `/info/{id}` response
#[derive(Debug, Deserialize)]
struct ConsumetInfo {
    #[serde(flatten)]
    anime: ConsumetAnime,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    episodes: Vec<ConsumetEpisode>,
}

#[derive(Debug, Deserialize)]
struct ConsumetEpisode {
    id: String,
    number: f64,
}

/// `/watch/{episode_id}` response
#[derive(Debug, Deserialize)]
struct ConsumetWatch {
    #[serde(default)]
    headers: Option<ConsumetHeaders>,
    #[serde(default)]
    sources: Vec<ConsumetStream>,
}

#[derive(Debug, Deserialize)]
struct ConsumetHeaders {
    #[serde(rename = "Referer")]
    referer: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConsumetStream {
    url: String,
    #[serde(default)]
    quality: Option<String>,
    #[serde(rename = "isM3U8", default)]
    is_m3u8: bool,
}

impl From<ConsumetAnime> for AnimeRecord {
    fn from(anime: ConsumetAnime) -> Self {
        let year = anime
            .release_date
            .as_deref()
            .and_then(|date| YEAR.captures(date))
            .and_then(|caps| caps[1].parse().ok());

        let synonyms = anime
            .other_name
            .as_deref()
            .map(|names| {
                names
                    .split([';', ','])
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        AnimeRecord {
            id: anime.id,
            title: anime.title,
            synonyms,
            genre: anime.genres.join(", "),
            year,
            episodes: anime.total_episodes,
            status: anime
                .status
                .as_deref()
                .map(AnimeStatus::from_api)
                .unwrap_or_default(),
            image: anime.image,
            ..Default::default()
        }
    }
}

impl ConsumetPage {
    fn into_page(self, limit: Option<usize>) -> SearchPage {
        let current_page = match &self.current_page {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
        .unwrap_or(1);

        SearchPage {
            current_page,
            has_next_page: self.has_next_page,
            results: self
                .results
                .into_iter()
                .take(limit.unwrap_or(usize::MAX))
                .map(AnimeRecord::from)
                .collect(),
        }
    }
}

/// Source backed by a Consumet gogoanime-style content API.
///
/// # Features
///
/// - Free-text search with paging
/// - Anime details with episode lists
/// - Streaming links per episode
/// - Recent episodes, top airing, seasonal and genre listings
/// - Rate limiting and retries through [`HttpClient`]
///
/// # Examples
///
/// ```rust
/// use animedex::sources::ConsumetSource;
/// use animedex::prelude::*;
///
/// # async fn example() -> animedex::Result<()> {
/// let source = ConsumetSource::new();
///
/// let page = source.search("one piece".into()).await?;
/// if let Some(anime) = page.results.first() {
///     let details = source.info(&anime.id).await?;
///     if let Some(episode) = details.episode_list.first() {
///         let links = source.streaming_links(&episode.id).await?;
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct ConsumetSource {
    client: HttpClient,
    api_base: String,
}

impl ConsumetSource {
    /// Creates a source against the public API with default settings.
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    /// Creates a source using the API base, rate limit and retries of `config`.
    pub fn from_config(config: &Config) -> Self {
        Self {
            client: HttpClient::new("consumet")
                .with_rate_limit(config.rate_limit_ms)
                .with_max_retries(config.max_retries)
                .with_header("Accept", "application/json"),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Search URL; the query is sent as given, only percent-encoded.
    fn search_url(&self, params: &SearchParams) -> String {
        format!(
            "{}/{}?page={}",
            self.api_base,
            urlencoding::encode(&params.query),
            params.page
        )
    }

    async fn fetch_page(&self, url: &str, limit: Option<usize>) -> Result<SearchPage> {
        let page: ConsumetPage = self.client.get_json(url).await?;
        let page = page.into_page(limit);
        debug!(url, count = page.results.len(), "fetched page");
        Ok(page)
    }
}

impl Default for ConsumetSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for ConsumetSource {
    fn id(&self) -> &'static str {
        "consumet"
    }

    fn name(&self) -> &'static str {
        "Consumet (Gogoanime)"
    }

    fn base_url(&self) -> &str {
        &self.api_base
    }

    async fn search(&self, params: SearchParams) -> Result<SearchPage> {
        let url = self.search_url(&params);
        self.fetch_page(&url, params.limit).await
    }

    async fn info(&self, anime_id: &str) -> Result<AnimeDetails> {
        let url = format!("{}/info/{}", self.api_base, urlencoding::encode(anime_id));
        let info: ConsumetInfo = self.client.get_json(&url).await?;

        Ok(AnimeDetails {
            episode_list: info
                .episodes
                .into_iter()
                .map(|ep| Episode {
                    id: ep.id,
                    number: ep.number,
                })
                .collect(),
            description: info.description,
            record: info.anime.into(),
        })
    }

    async fn streaming_links(&self, episode_id: &str) -> Result<StreamingLinks> {
        let url = format!("{}/watch/{}", self.api_base, urlencoding::encode(episode_id));
        let watch: ConsumetWatch = self.client.get_json(&url).await?;

        if watch.sources.is_empty() {
            return Err(crate::Error::not_found(format!(
                "Streams for episode '{}'",
                episode_id
            )));
        }

        Ok(StreamingLinks {
            referer: watch.headers.and_then(|h| h.referer),
            sources: watch
                .sources
                .into_iter()
                .map(|s| StreamSource {
                    url: s.url,
                    quality: s.quality,
                    is_m3u8: s.is_m3u8,
                })
                .collect(),
        })
    }

    async fn recent_episodes(&self, page: u32) -> Result<SearchPage> {
        let url = format!("{}/recent-episodes?page={}", self.api_base, page);
        self.fetch_page(&url, None).await
    }

    async fn top_airing(&self, page: u32) -> Result<SearchPage> {
        let url = format!("{}/top-airing?page={}", self.api_base, page);
        self.fetch_page(&url, None).await
    }

    async fn seasonal(&self, year: u32, season: Season) -> Result<SearchPage> {
        let url = format!("{}/seasonal?year={}&season={}", self.api_base, year, season);
        self.fetch_page(&url, None).await
    }

    async fn by_genre(&self, genre: &str, page: u32) -> Result<SearchPage> {
        let url = format!(
            "{}/genre/{}?page={}",
            self.api_base,
            urlencoding::encode(genre),
            page
        );
        self.fetch_page(&url, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_page_mapping() {
        let raw = r#"{
            "currentPage": "2",
            "hasNextPage": true,
            "results": [
                {"id": "shingeki-no-kyojin", "title": "Attack on Titan",
                 "image": "https://img/aot.png", "releaseDate": "Released: 2013",
                 "subOrDub": "sub"},
                {"id": "bleach", "title": "Bleach"}
            ]
        }"#;

        let page: ConsumetPage = serde_json::from_str(raw).unwrap();
        let page = page.into_page(None);

        assert_eq!(page.current_page, 2);
        assert!(page.has_next_page);
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].year, Some(2013));
        assert_eq!(page.results[0].image.as_deref(), Some("https://img/aot.png"));
        assert_eq!(page.results[1].year, None);
        assert!(page.results[1].synonyms.is_empty());
    }

    #[test]
    fn test_page_limit_truncates() {
        let raw = r#"{"currentPage": 1, "results": [
            {"id": "a", "title": "A"}, {"id": "b", "title": "B"}, {"id": "c", "title": "C"}
        ]}"#;
        let page: ConsumetPage = serde_json::from_str(raw).unwrap();
        assert_eq!(page.into_page(Some(2)).results.len(), 2);
    }

    #[test]
    fn test_oversized_page_number_defaults_to_first() {
        let raw = r#"{"currentPage": 4294967296, "results": []}"#;
        let page: ConsumetPage = serde_json::from_str(raw).unwrap();
        assert_eq!(page.into_page(None).current_page, 1);

        let raw = r#"{"currentPage": 4294967295, "results": []}"#;
        let page: ConsumetPage = serde_json::from_str(raw).unwrap();
        assert_eq!(page.into_page(None).current_page, u32::MAX);
    }

    #[test]
    fn test_info_mapping() {
        let raw = r#"{
            "id": "death-note", "title": "Death Note",
            "genres": ["Mystery", "Thriller"], "totalEpisodes": 37,
            "releaseDate": "2006", "status": "Completed",
            "otherName": "Desu Noto; デスノート",
            "description": "A notebook...",
            "episodes": [{"id": "death-note-episode-1", "number": 1}]
        }"#;

        let info: ConsumetInfo = serde_json::from_str(raw).unwrap();
        assert_eq!(info.episodes.len(), 1);

        let record = AnimeRecord::from(info.anime);
        assert_eq!(record.genre, "Mystery, Thriller");
        assert_eq!(record.status, AnimeStatus::Completed);
        assert_eq!(record.episodes, Some(37));
        assert_eq!(record.synonyms, vec!["Desu Noto", "デスノート"]);
    }

    #[test]
    fn test_watch_mapping() {
        let raw = r#"{
            "headers": {"Referer": "https://gogo.example/embed"},
            "sources": [{"url": "https://cdn/ep1.m3u8", "isM3U8": true, "quality": "1080p"}]
        }"#;
        let watch: ConsumetWatch = serde_json::from_str(raw).unwrap();
        assert_eq!(
            watch.headers.and_then(|h| h.referer).as_deref(),
            Some("https://gogo.example/embed")
        );
        assert!(watch.sources[0].is_m3u8);
    }

    #[test]
    fn test_from_config_trims_base() {
        let config = Config {
            api_base: "http://localhost:3000/anime/gogoanime/".to_string(),
            ..Config::default()
        };
        let source = ConsumetSource::from_config(&config);
        assert_eq!(source.base_url(), "http://localhost:3000/anime/gogoanime");
    }

    #[test]
    fn test_search_url_keeps_query_as_given() {
        let config = Config {
            api_base: "http://localhost:3000/anime/gogoanime".to_string(),
            ..Config::default()
        };
        let source = ConsumetSource::from_config(&config);
        let params = SearchParams {
            query: " one piece ".to_string(),
            page: 2,
            limit: None,
        };
        assert_eq!(
            source.search_url(&params),
            "http://localhost:3000/anime/gogoanime/%20one%20piece%20?page=2"
        );
    }
}
