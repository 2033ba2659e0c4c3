use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::models::{Movie, MovieId};
use crate::{query, slug};

/// The bundled movie dataset, loaded once and shared read-only.
#[derive(Debug, Clone)]
pub struct Catalog {
    movies: Vec<Movie>,
    fingerprint: String,
}

impl Catalog {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read movie dataset {}", path.display()))?;
        let catalog = Self::from_json(&bytes)
            .with_context(|| format!("Invalid movie dataset {}", path.display()))?;
        info!(
            "Loaded {} movies from {} (fingerprint {})",
            catalog.len(),
            path.display(),
            &catalog.fingerprint[..12]
        );
        Ok(catalog)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let movies: Vec<Movie> =
            serde_json::from_slice(bytes).context("JSON parse failed")?;
        Ok(Self::build(movies, fingerprint_of(bytes)))
    }

    pub fn from_movies(movies: Vec<Movie>) -> Self {
        let encoded = serde_json::to_vec(&movies).unwrap_or_default();
        Self::build(movies, fingerprint_of(&encoded))
    }

    fn build(mut movies: Vec<Movie>, fingerprint: String) -> Self {
        for movie in movies.iter_mut() {
            let rating = movie.vote_average;
            if movie.normalize() && movie.vote_average != rating {
                warn!(
                    "Movie {} '{}' has rating {} outside 0-10, treating as unknown",
                    movie.id, movie.title, rating
                );
            }
        }
        Self {
            movies,
            fingerprint,
        }
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&Movie> {
        let id = MovieId::Local(id);
        self.movies.iter().find(|m| m.id == id)
    }

    /// SHA-256 (hex) of the document the catalog was built from.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn genres(&self) -> Vec<String> {
        query::all_genres(&self.movies)
    }

    pub fn find_genre_by_slug(&self, slug: &str) -> Option<String> {
        slug::find_genre_by_slug(slug, &self.genres())
    }
}

fn fingerprint_of(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"[
        {"id": 1, "title": "Alpha", "releaseDate": "2001-05-01", "genres": ["Drama"], "voteAverage": 7.5},
        {"id": 2, "title": "Beta", "year": 1984, "decade": 1980, "genres": [" science fiction ", "Action"]}
    ]"#;

    #[test]
    fn loads_document_and_derives_missing_years() {
        let catalog = Catalog::from_json(DOC.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 2);
        let alpha = catalog.get(1).unwrap();
        assert_eq!(alpha.year, Some(2001));
        assert_eq!(alpha.decade, Some(2000));
        assert!(catalog.get(3).is_none());
    }

    #[test]
    fn fingerprint_tracks_document_bytes() {
        let a = Catalog::from_json(DOC.as_bytes()).unwrap();
        let b = Catalog::from_json(DOC.as_bytes()).unwrap();
        let c = Catalog::from_json(DOC.replace("Alpha", "Gamma").as_bytes()).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn rejects_malformed_document() {
        assert!(Catalog::from_json(b"{\"id\": 1}").is_err());
    }

    #[test]
    fn resolves_genre_slugs_against_dataset() {
        let catalog = Catalog::from_json(DOC.as_bytes()).unwrap();
        assert_eq!(catalog.genres(), vec!["Action", "Drama", "science fiction"]);
        assert_eq!(
            catalog.find_genre_by_slug("science-fiction").as_deref(),
            Some("science fiction")
        );
        assert_eq!(catalog.find_genre_by_slug("noir"), None);
    }

    #[test]
    fn bundled_dataset_is_valid() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/movies.json");
        let catalog = Catalog::load(path).unwrap();
        assert!(!catalog.is_empty());
        assert!(catalog
            .movies()
            .iter()
            .all(|m| m.id.is_local() && (0.0..=10.0).contains(&m.vote_average)));
    }
}
