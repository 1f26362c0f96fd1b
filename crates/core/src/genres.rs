//! Genre enrichment for the catalog API.
//!
//! Genre names come from the cache; this module attaches the display
//! image and description the frontend expects.

use serde::Serialize;

// Single placeholder until per-genre art exists.
const DEFAULT_GENRE_IMAGE: &str =
    "https://images.unsplash.com/photo-1578662996442-48f60103fc96?w=400&h=225&fit=crop";

/// A genre with display metadata attached.
#[derive(Debug, Clone, Serialize)]
pub struct GenreDescriptor {
    pub name: String,
    pub image: String,
    pub description: String,
}

/// Image URL for a genre, falling back to the default placeholder.
pub fn genre_image(_name: &str) -> &'static str {
    DEFAULT_GENRE_IMAGE
}

/// Attach image and description to a genre name.
pub fn describe_genre(name: &str) -> GenreDescriptor {
    GenreDescriptor {
        name: name.to_string(),
        image: genre_image(name).to_string(),
        description: format!("Explora animes del género {}", name),
    }
}

/// Enrich a list of genre names in order.
pub fn describe_genres(names: &[String]) -> Vec<GenreDescriptor> {
    names.iter().map(|n| describe_genre(n)).collect()
}
