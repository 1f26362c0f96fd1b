//! Testing utilities and mock implementations.
//!
//! This module provides a mock remote catalog and fixture helpers so
//! the sourcing and ingestion layers can be tested without network
//! access.

mod mock_remote;

pub use mock_remote::{MockRemoteCatalog, RecordedRemoteQuery};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::remote::CatalogItem;

    /// A catalog item with sensible defaults.
    pub fn catalog_item(id: u32, title: &str, score: Option<f32>) -> CatalogItem {
        CatalogItem {
            id,
            title: title.to_string(),
            title_english: None,
            kind: Some("TV".to_string()),
            episodes: Some(12),
            score,
            popularity: Some(id),
            year: Some(2020),
            status: Some("Finished Airing".to_string()),
            airing: false,
            synopsis: Some(format!("Synopsis for {}", title)),
            image_url: Some(format!("https://cdn.example/{}.jpg", id)),
            large_image_url: None,
            genres: vec!["Action".to_string()],
        }
    }
}
