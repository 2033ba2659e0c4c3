use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

mod client;
pub mod map;

pub use client::OmdbClient;

/// The two OMDb lookups the enrichment pipeline relies on.
#[async_trait]
pub trait OmdbApi: Send + Sync {
    /// Title search (`?s=`), first page only. An unknown title yields an
    /// empty list, not an error.
    async fn search_titles(&self, term: &str) -> Result<Vec<SearchHit>>;
    /// Full record for one IMDb id (`?i=`).
    async fn fetch_title(&self, imdb_id: &str) -> Result<TitleDetail>;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: Option<String>,
}

/// Raw detail payload. Every field may be missing or carry the literal
/// `"N/A"`; [`map`] is responsible for turning that into typed values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TitleDetail {
    pub title: Option<String>,
    pub year: Option<String>,
    pub released: Option<String>,
    pub runtime: Option<String>,
    pub genre: Option<String>,
    pub director: Option<String>,
    pub actors: Option<String>,
    pub plot: Option<String>,
    pub language: Option<String>,
    pub poster: Option<String>,
    pub production: Option<String>,
    #[serde(rename = "imdbRating")]
    pub imdb_rating: Option<String>,
    #[serde(rename = "imdbVotes")]
    pub imdb_votes: Option<String>,
    #[serde(rename = "imdbID")]
    pub imdb_id: Option<String>,
}
