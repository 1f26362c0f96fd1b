//! Types for remote catalog API responses.

use serde::{Deserialize, Serialize};

/// One anime title as last seen on the remote catalog.
///
/// Snapshots are replaced whole on every fetch; fields are never
/// merged between fetches of the same id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    /// Remote catalog id (MyAnimeList id), stable across fetches.
    pub id: u32,
    /// Primary title.
    pub title: String,
    /// English title, if different.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_english: Option<String>,
    /// Media kind ("TV", "Movie", "OVA", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Episode count, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episodes: Option<u32>,
    /// Community score (1-10).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    /// Popularity rank (lower is more popular).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<u32>,
    /// First airing year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    /// Airing status ("Finished Airing", "Currently Airing", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Whether the title is currently airing.
    #[serde(default)]
    pub airing: bool,
    /// Synopsis text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
    /// Thumbnail image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Full-size image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_image_url: Option<String>,
    /// Genre names.
    #[serde(default)]
    pub genres: Vec<String>,
}

/// Pagination metadata as reported by the remote catalog itself.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageInfo {
    pub current_page: u32,
    pub last_page: u32,
    pub total_items: u64,
}

/// One page of catalog items plus the catalog's own pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogPage {
    pub items: Vec<CatalogItem>,
    pub page: PageInfo,
}
