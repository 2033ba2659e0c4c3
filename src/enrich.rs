//! Best-effort supplementation of the local catalog from OMDb.
//!
//! Both entry points fail soft: a missing credential, a failed search or a
//! failed detail lookup only shrinks the result, it never surfaces as an
//! error, because callers always have the local catalog to fall back on.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::models::Movie;
use crate::omdb::{map, OmdbApi, SearchHit};
use crate::query::normalize;

/// Delay before each detail lookup, to stay inside the provider's rate limit.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(200);
pub const GENRE_TARGET: usize = 12;
const TERMS_PER_GENRE: usize = 2;
const DETAILS_PER_TERM: usize = 20;

static GENRE_SEARCH_TERMS: Lazy<HashMap<&'static str, Vec<&'static str>>> =
    Lazy::new(|| {
        HashMap::from([
            ("drama", vec!["drama", "emotional", "serious"]),
            ("action", vec!["action", "thriller", "adventure"]),
            ("comedy", vec!["comedy", "funny", "humor"]),
            ("horror", vec!["horror", "scary", "thriller"]),
            ("romance", vec!["romance", "love", "romantic"]),
            ("sci fi", vec!["sci-fi", "science fiction", "space"]),
            ("science fiction", vec!["sci-fi", "science fiction", "space"]),
            ("thriller", vec!["thriller", "suspense", "mystery"]),
            ("fantasy", vec!["fantasy", "magic", "wizard"]),
            ("animation", vec!["animation", "animated", "cartoon"]),
            ("crime", vec!["crime", "gangster", "mafia"]),
            ("documentary", vec!["documentary", "documentary film"]),
            ("family", vec!["family", "kids", "children"]),
            ("mystery", vec!["mystery", "detective", "investigation"]),
            ("war", vec!["war", "military", "soldier"]),
            ("western", vec!["western", "cowboy", "frontier"]),
            ("musical", vec!["musical", "music", "song"]),
            ("sport", vec!["sport", "sports", "athlete"]),
            ("biography", vec!["biography", "biographical", "true story"]),
            ("history", vec!["history", "historical", "period"]),
            ("adventure", vec!["adventure", "journey", "quest"]),
        ])
    });

/// Lowercased words of a genre name; hyphens count as spaces so "Sci-Fi"
/// and a "sci-fi" slug turned back into "Sci Fi" compare equal.
fn genre_key(genre: &str) -> String {
    genre
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Search terms used to find movies of `genre`; unmapped genres search for
/// themselves.
pub fn search_terms_for(genre: &str) -> Vec<String> {
    match GENRE_SEARCH_TERMS.get(genre_key(genre).as_str()) {
        Some(terms) => terms.iter().map(|t| t.to_string()).collect(),
        None => vec![normalize(genre)],
    }
}

fn is_sci_fi(key: &str) -> bool {
    key == "sci fi" || key == "science fiction"
}

/// Loose genre comparison for provider records: equality, containment in
/// either direction, or the sci-fi / science fiction equivalence.
pub fn genre_matches(wanted: &str, candidate: &str) -> bool {
    let wanted = genre_key(wanted);
    let candidate = genre_key(candidate);
    if wanted.is_empty() || candidate.is_empty() {
        return false;
    }
    wanted == candidate
        || candidate.contains(&wanted)
        || wanted.contains(&candidate)
        || (is_sci_fi(&wanted) && is_sci_fi(&candidate))
}

#[derive(Clone)]
pub struct Enricher {
    api: Option<Arc<dyn OmdbApi>>,
    throttle: Duration,
}

impl Enricher {
    pub fn new(api: Arc<dyn OmdbApi>, throttle: Duration) -> Self {
        Self {
            api: Some(api),
            throttle,
        }
    }

    /// Enrichment switched off; every lookup returns an empty list.
    pub fn disabled() -> Self {
        Self {
            api: None,
            throttle: DEFAULT_THROTTLE,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.api.is_some()
    }

    fn api(&self) -> Option<&Arc<dyn OmdbApi>> {
        if self.api.is_none() {
            debug!("OMDB_API_KEY not set, skipping remote enrichment");
        }
        self.api.as_ref()
    }

    async fn fetch_detail(&self, api: &Arc<dyn OmdbApi>, hit: &SearchHit) -> Option<Movie> {
        if !self.throttle.is_zero() {
            tokio::time::sleep(self.throttle).await;
        }
        match api.fetch_title(&hit.imdb_id).await {
            Ok(detail) => Some(map::to_movie(hit, &detail)),
            Err(e) => {
                warn!("Error fetching OMDb details for {}: {:#}", hit.imdb_id, e);
                None
            }
        }
    }

    /// Up to [`GENRE_TARGET`] provider movies whose genres match `genre`.
    pub async fn fetch_by_genre(&self, genre: &str) -> Vec<Movie> {
        let Some(api) = self.api() else {
            return Vec::new();
        };

        let mut found: Vec<Movie> = Vec::new();
        for term in search_terms_for(genre).iter().take(TERMS_PER_GENRE) {
            let hits = match api.search_titles(term).await {
                Ok(hits) => hits,
                Err(e) => {
                    warn!(
                        "Error searching OMDb for genre '{}' with term '{}': {:#}",
                        genre, term, e
                    );
                    continue;
                }
            };
            for hit in hits.iter().take(DETAILS_PER_TERM) {
                let Some(movie) = self.fetch_detail(api, hit).await else {
                    continue;
                };
                if movie.genres.iter().any(|g| genre_matches(genre, g)) {
                    found.push(movie);
                    if found.len() >= GENRE_TARGET {
                        break;
                    }
                }
            }
            if found.len() >= GENRE_TARGET {
                break;
            }
        }

        info!("Found {} OMDb movies for genre '{}'", found.len(), genre);
        found
    }

    /// Provider movies for a free-text query, at most `limit`.
    pub async fn search_by_query(&self, query: &str, limit: usize) -> Vec<Movie> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let Some(api) = self.api() else {
            return Vec::new();
        };

        let hits = match api.search_titles(query).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!("Error searching OMDb for query '{}': {:#}", query, e);
                return Vec::new();
            }
        };

        let mut found = Vec::new();
        for hit in hits.iter().take(limit) {
            if let Some(movie) = self.fetch_detail(api, hit).await {
                found.push(movie);
            }
        }
        debug!("OMDb returned {} movies for '{}'", found.len(), query);
        found
    }
}
