//! View assembly for the browse and search endpoints.
//!
//! Everything here reads the catalog through [`crate::query`] and only
//! reaches for the [`Enricher`] when the local data comes up short.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

use crate::artwork::{self, BackdropSize, PosterSize};
use crate::catalog::Catalog;
use crate::enrich::Enricher;
use crate::models::Movie;
use crate::query::{self, FilterOptions, SortOrder};
use crate::slug;

/// Remote results requested per search.
pub const REMOTE_SEARCH_LIMIT: usize = 10;
pub const HOME_TOP_RATED: usize = 18;
const PERMUTATION_POOL: usize = 10;
const MAX_PERMUTATIONS: usize = 10;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub query: String,
    pub local_count: usize,
    pub omdb_count: usize,
    pub total_count: usize,
    pub movies: Vec<Movie>,
}

/// Appends `remote` to `local`, dropping any record whose trimmed,
/// lowercased title is already present. Local records always win.
pub fn merge_results(local: Vec<Movie>, remote: Vec<Movie>) -> Vec<Movie> {
    let mut seen: HashSet<String> = local.iter().map(Movie::title_key).collect();
    let mut merged = local;
    for movie in remote {
        if seen.insert(movie.title_key()) {
            merged.push(movie);
        }
    }
    merged
}

pub async fn search(catalog: &Catalog, enricher: &Enricher, text: &str) -> SearchResults {
    let text = text.trim();
    let local: Vec<Movie> = query::search(catalog.movies(), text)
        .into_iter()
        .cloned()
        .collect();
    let remote = enricher.search_by_query(text, REMOTE_SEARCH_LIMIT).await;

    let local_count = local.len();
    let omdb_count = remote.len();
    let movies = merge_results(local, remote);
    info!(
        "Search '{}': {} local, {} remote, {} merged",
        text,
        local_count,
        omdb_count,
        movies.len()
    );
    SearchResults {
        query: text.to_string(),
        local_count,
        omdb_count,
        total_count: movies.len(),
        movies,
    }
}

/// Authoritative genre name for a slug, or its title-cased form when the
/// catalog has no such genre.
pub fn resolve_genre(catalog: &Catalog, genre_slug: &str) -> String {
    catalog
        .find_genre_by_slug(genre_slug)
        .unwrap_or_else(|| slug::slug_to_genre(genre_slug.trim()))
}

/// Provider-only movies for a genre slug.
pub async fn movies_by_genre(catalog: &Catalog, enricher: &Enricher, genre_slug: &str) -> Vec<Movie> {
    let genre = resolve_genre(catalog, genre_slug);
    enricher.fetch_by_genre(&genre).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Local,
    Remote,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenrePage {
    pub genre: String,
    pub slug: String,
    pub source: Source,
    pub count: usize,
    pub movies: Vec<Movie>,
}

/// Local movies for the genre, or provider movies when the catalog has
/// none. `None` when neither source has anything.
pub async fn genre_page(
    catalog: &Catalog,
    enricher: &Enricher,
    genre_slug: &str,
) -> Option<GenrePage> {
    let genre = resolve_genre(catalog, genre_slug);
    let local: Vec<Movie> = query::by_genre(catalog.movies(), &genre)
        .into_iter()
        .cloned()
        .collect();

    let (source, movies) = if local.is_empty() {
        info!("No local movies for '{}', asking OMDb", genre);
        (Source::Remote, enricher.fetch_by_genre(&genre).await)
    } else {
        (Source::Local, local)
    };
    if movies.is_empty() {
        return None;
    }
    Some(GenrePage {
        slug: slug::genre_to_slug(&genre),
        genre,
        source,
        count: movies.len(),
        movies,
    })
}

/// Query string of the listing endpoint. List parameters may repeat.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingQuery {
    pub genre: Vec<String>,
    pub actor: Vec<String>,
    pub director: Vec<String>,
    pub year: Vec<String>,
    pub decade: Vec<String>,
    pub min_rating: Option<String>,
    pub min_vote_count: Option<String>,
    pub sort: Option<String>,
}

fn non_blank(values: &[String]) -> impl Iterator<Item = &str> {
    values.iter().map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl ListingQuery {
    /// Genre slugs resolve to catalog names where possible; numbers that do
    /// not parse are dropped.
    pub fn to_filter(&self, catalog: &Catalog) -> FilterOptions {
        FilterOptions {
            genres: non_blank(&self.genre)
                .map(|g| catalog.find_genre_by_slug(g).unwrap_or_else(|| g.to_string()))
                .collect(),
            actors: non_blank(&self.actor).map(str::to_string).collect(),
            directors: non_blank(&self.director).map(str::to_string).collect(),
            years: non_blank(&self.year).filter_map(|y| y.parse().ok()).collect(),
            decades: non_blank(&self.decade).filter_map(|d| d.parse().ok()).collect(),
            min_rating: self
                .min_rating
                .as_deref()
                .and_then(|r| r.trim().parse::<f64>().ok())
                .filter(|r| r.is_finite()),
            min_vote_count: self
                .min_vote_count
                .as_deref()
                .and_then(|c| c.trim().parse().ok()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Permutation {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub title: String,
    pub sort: &'static str,
    pub count: usize,
    pub movies: Vec<Movie>,
    pub permutations: Vec<Permutation>,
}

/// "A", "A & B", "A, B & C"
fn join_names<T: AsRef<str>>(items: &[T]) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [init @ .., last] => format!(
            "{} & {}",
            init.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(", "),
            last.as_ref()
        ),
    }
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Headline for a filtered listing, e.g. "Best Action & Thriller Movies
/// Featuring Tom Hanks" or "Best Movies From The 1990s".
pub fn page_title(filter: &FilterOptions) -> String {
    let genre_part = (!filter.genres.is_empty()).then(|| join_names(&filter.genres));

    let mut rest: Vec<String> = Vec::new();
    if !filter.actors.is_empty() {
        rest.push(format!("featuring {}", join_names(&filter.actors)));
    }
    if !filter.directors.is_empty() {
        rest.push(format!("by {}", join_names(&filter.directors)));
    }
    if !filter.years.is_empty() {
        let years: Vec<String> = filter.years.iter().map(|y| y.to_string()).collect();
        rest.push(format!("from {}", years.join(", ")));
    }
    if !filter.decades.is_empty() {
        let decades: Vec<String> = filter.decades.iter().map(|d| format!("{d}s")).collect();
        rest.push(format!("from the {}", decades.join(", ")));
    }

    let mut title = String::from("Best");
    if let Some(genres) = genre_part {
        title.push(' ');
        title.push_str(&capitalize(&genres));
    }
    title.push_str(" Movies");
    for part in rest {
        title.push(' ');
        title.push_str(&capitalize(&part));
    }
    title
}

fn listing_href(genres: &[&str], actors: &[&str], directors: &[&str]) -> String {
    let mut params: Vec<String> = Vec::new();
    params.extend(genres.iter().map(|g| format!("genre={}", slug::genre_to_slug(g))));
    params.extend(actors.iter().map(|a| format!("actor={}", urlencoding::encode(a))));
    params.extend(
        directors
            .iter()
            .map(|d| format!("director={}", urlencoding::encode(d))),
    );
    format!("/api/movies?{}", params.join("&"))
}

/// Suggested filter combinations built from the most common genres, actors
/// and directors: three single genres, two adjacent genre pairs, two actors,
/// genre + actor, a director, genre + director.
pub fn permutations(genres: &[String], actors: &[String], directors: &[String]) -> Vec<Permutation> {
    let genres: Vec<&str> = genres.iter().map(String::as_str).collect();
    let actors: Vec<&str> = actors.iter().map(String::as_str).collect();
    let directors: Vec<&str> = directors.iter().map(String::as_str).collect();

    let mut out = Vec::new();
    let mut push = |label: String, href: String| out.push(Permutation { label, href });

    for &g in genres.iter().take(3) {
        push(format!("Best {g} Movies"), listing_href(&[g], &[], &[]));
    }
    for pair in genres.windows(2).take(2) {
        let (a, b) = (pair[0], pair[1]);
        push(
            format!("Best {a} & {b} Movies"),
            listing_href(&[a, b], &[], &[]),
        );
    }
    for &a in actors.iter().take(2) {
        push(
            format!("Best Movies featuring {a}"),
            listing_href(&[], &[a], &[]),
        );
    }
    if let (Some(&g), Some(&a)) = (genres.first(), actors.first()) {
        push(
            format!("Best {g} Movies featuring {a}"),
            listing_href(&[g], &[a], &[]),
        );
    }
    if let Some(&d) = directors.first() {
        push(format!("Best Movies by {d}"), listing_href(&[], &[], &[d]));
        if let Some(&g) = genres.first() {
            push(
                format!("Best {g} Movies by {d}"),
                listing_href(&[g], &[], &[d]),
            );
        }
    }

    out.truncate(MAX_PERMUTATIONS);
    out
}

/// The filtered listing, `None` when criteria were given but nothing
/// matched.
pub fn listing(catalog: &Catalog, filter: &FilterOptions, sort: SortOrder) -> Option<Listing> {
    let movies = catalog.movies();
    let mut matched = query::filter(movies, filter);
    if matched.is_empty() && !filter.is_empty() {
        return None;
    }
    sort.sort(&mut matched);

    let title = if filter.is_empty() {
        "Best Movies".to_string()
    } else {
        page_title(filter)
    };
    let permutations = permutations(
        &query::popular_genres(movies, PERMUTATION_POOL),
        &query::popular_actors(movies, PERMUTATION_POOL),
        &query::popular_directors(movies, PERMUTATION_POOL),
    );
    Some(Listing {
        title,
        sort: sort.as_str(),
        count: matched.len(),
        movies: matched.into_iter().cloned().collect(),
        permutations,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct GenreTile {
    pub name: String,
    pub slug: String,
    pub count: usize,
    pub image: String,
}

pub fn genre_tiles(catalog: &Catalog) -> Vec<GenreTile> {
    let movies = catalog.movies();
    catalog
        .genres()
        .into_iter()
        .map(|name| GenreTile {
            slug: slug::genre_to_slug(&name),
            count: query::by_genre(movies, &name).len(),
            image: artwork::genre_image(movies, &name),
            name,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub total: usize,
    pub genres: usize,
    pub years: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Home {
    pub stats: Stats,
    pub top_rated: Vec<Movie>,
    pub genres: Vec<GenreTile>,
}

pub fn home(catalog: &Catalog) -> Home {
    let movies = catalog.movies();
    let genres = genre_tiles(catalog);
    let years = match query::year_range(movies) {
        None => "N/A".to_string(),
        Some((lo, hi)) if lo == hi => lo.to_string(),
        Some((lo, hi)) => format!("{lo}-{hi}"),
    };
    Home {
        stats: Stats {
            total: movies.len(),
            genres: genres.len(),
            years,
        },
        top_rated: query::top_rated(movies, HOME_TOP_RATED)
            .into_iter()
            .cloned()
            .collect(),
        genres,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetail {
    #[serde(flatten)]
    pub movie: Movie,
    pub poster_url: String,
    pub backdrop_url: String,
}

pub fn movie_detail(catalog: &Catalog, id: u64) -> Option<MovieDetail> {
    let movie = catalog.get(id)?.clone();
    Some(MovieDetail {
        poster_url: artwork::poster_url(movie.poster_path.as_deref(), PosterSize::W500),
        backdrop_url: artwork::backdrop_url(movie.backdrop_path.as_deref(), BackdropSize::W1280),
        movie,
    })
}
