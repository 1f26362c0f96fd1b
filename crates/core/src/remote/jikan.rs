//! Jikan (MyAnimeList) API client.
//!
//! Jikan needs no API key but enforces strict rate limits
//! (around 3 requests per second, 60 per minute).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{CatalogItem, CatalogPage, PageInfo};
use super::{RemoteCatalog, RemoteError};

/// Jikan API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JikanConfig {
    /// Base URL (default: https://api.jikan.moe/v4).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Request timeout in seconds (default: 30).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for JikanConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: None,
        }
    }
}

/// Jikan API client.
pub struct JikanClient {
    client: Client,
    base_url: String,
}

impl JikanClient {
    /// Create a new Jikan client.
    pub fn new(config: JikanConfig) -> Result<Self, RemoteError> {
        let timeout = Duration::from_secs(config.timeout_secs.unwrap_or(30));
        let client = Client::builder().timeout(timeout).build()?;

        let base_url = config
            .base_url
            .unwrap_or_else(|| "https://api.jikan.moe/v4".to_string());

        Ok(Self { client, base_url })
    }

    async fn check_status(
        response: reqwest::Response,
        context: &str,
    ) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if status == 404 {
            return Err(RemoteError::NotFound(context.to_string()));
        }
        if status == 429 {
            return Err(RemoteError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl RemoteCatalog for JikanClient {
    async fn list_page(&self, page: u32) -> Result<CatalogPage, RemoteError> {
        let url = format!("{}/anime", self.base_url);

        debug!("Jikan list: page={}", page);

        let response = self
            .client
            .get(&url)
            .query(&[("page", page.to_string())])
            .send()
            .await?;

        let response = Self::check_status(response, &format!("anime page {}", page)).await?;

        let listing: JikanListResponse = response.json().await.map_err(|e| {
            RemoteError::Parse(format!("Failed to parse list response: {}", e))
        })?;

        Ok(listing.into())
    }

    async fn get_by_id(&self, id: u32) -> Result<CatalogItem, RemoteError> {
        let url = format!("{}/anime/{}", self.base_url, id);

        debug!("Jikan get: id={}", id);

        let response = self.client.get(&url).send().await?;
        let response = Self::check_status(response, &format!("anime {}", id)).await?;

        let detail: JikanDetailResponse = response.json().await.map_err(|e| {
            RemoteError::Parse(format!("Failed to parse detail response: {}", e))
        })?;

        Ok(detail.data.into())
    }

    async fn search(
        &self,
        query: &str,
        page: u32,
        limit: u32,
    ) -> Result<CatalogPage, RemoteError> {
        let url = format!("{}/anime", self.base_url);

        debug!("Jikan search: query='{}', page={}, limit={}", query, page, limit);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query.to_string()),
                ("page", page.to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?;

        let response =
            Self::check_status(response, &format!("anime search '{}'", query)).await?;

        let listing: JikanListResponse = response.json().await.map_err(|e| {
            RemoteError::Parse(format!("Failed to parse search response: {}", e))
        })?;

        Ok(listing.into())
    }

    async fn top(&self, limit: u32) -> Result<Vec<CatalogItem>, RemoteError> {
        let url = format!("{}/top/anime", self.base_url);

        debug!("Jikan top: limit={}", limit);

        let response = self
            .client
            .get(&url)
            .query(&[("limit", limit.to_string())])
            .send()
            .await?;

        let response = Self::check_status(response, "top anime").await?;

        let listing: JikanListResponse = response.json().await.map_err(|e| {
            RemoteError::Parse(format!("Failed to parse top response: {}", e))
        })?;

        Ok(listing.data.into_iter().map(|r| r.into()).collect())
    }
}

// ============================================================================
// Jikan API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct JikanListResponse {
    #[serde(default)]
    data: Vec<JikanAnime>,
    pagination: Option<JikanPagination>,
}

#[derive(Debug, Deserialize)]
struct JikanDetailResponse {
    data: JikanAnime,
}

#[derive(Debug, Deserialize)]
struct JikanPagination {
    current_page: Option<u32>,
    last_visible_page: Option<u32>,
    items: Option<JikanPaginationItems>,
}

#[derive(Debug, Deserialize)]
struct JikanPaginationItems {
    total: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct JikanAnime {
    mal_id: u32,
    title: String,
    title_english: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    episodes: Option<u32>,
    score: Option<f32>,
    popularity: Option<u32>,
    year: Option<u32>,
    status: Option<String>,
    #[serde(default)]
    airing: bool,
    synopsis: Option<String>,
    images: Option<JikanImages>,
    #[serde(default)]
    genres: Vec<JikanGenre>,
}

#[derive(Debug, Deserialize)]
struct JikanImages {
    jpg: Option<JikanImageSet>,
}

#[derive(Debug, Deserialize)]
struct JikanImageSet {
    image_url: Option<String>,
    large_image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JikanGenre {
    name: String,
}

// ============================================================================
// Conversions
// ============================================================================

impl From<JikanAnime> for CatalogItem {
    fn from(a: JikanAnime) -> Self {
        let (image_url, large_image_url) = match a.images.and_then(|i| i.jpg) {
            Some(jpg) => (jpg.image_url, jpg.large_image_url),
            None => (None, None),
        };

        Self {
            id: a.mal_id,
            title: a.title,
            title_english: a.title_english,
            kind: a.kind,
            episodes: a.episodes,
            score: a.score,
            popularity: a.popularity,
            year: a.year,
            status: a.status,
            airing: a.airing,
            synopsis: a.synopsis,
            image_url,
            large_image_url,
            genres: a.genres.into_iter().map(|g| g.name).collect(),
        }
    }
}

impl From<JikanListResponse> for CatalogPage {
    fn from(r: JikanListResponse) -> Self {
        let items: Vec<CatalogItem> = r.data.into_iter().map(|a| a.into()).collect();
        let page = match r.pagination {
            Some(p) => PageInfo {
                current_page: p.current_page.unwrap_or(1),
                last_page: p.last_visible_page.unwrap_or(1),
                total_items: p.items.and_then(|i| i.total).unwrap_or(items.len() as u64),
            },
            None => PageInfo {
                current_page: 1,
                last_page: 1,
                total_items: items.len() as u64,
            },
        };
        Self { items, page }
    }
}
