//! Filtering, ranking and enumeration over a slice of movies.
//!
//! Genre matching is exact after trimming and lowercasing. Actor, director and
//! free-text matching are case-insensitive substring checks. Every function
//! returns a fresh vector and leaves its input untouched.

use anyhow::anyhow;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use crate::models::Movie;

pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

fn normalized_terms(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| normalize(v))
        .filter(|v| !v.is_empty())
        .collect()
}

fn has_genre(movie: &Movie, genre: &str) -> bool {
    movie.genres.iter().any(|g| normalize(g) == genre)
}

fn features_actor(movie: &Movie, actor: &str) -> bool {
    movie
        .cast
        .iter()
        .any(|c| c.name.to_lowercase().contains(actor))
}

fn directed_by(movie: &Movie, director: &str) -> bool {
    movie
        .director
        .as_deref()
        .is_some_and(|d| d.to_lowercase().contains(director))
}

pub fn by_genre<'a>(movies: &'a [Movie], genre: &str) -> Vec<&'a Movie> {
    let genre = normalize(genre);
    if genre.is_empty() {
        return Vec::new();
    }
    movies.iter().filter(|m| has_genre(m, &genre)).collect()
}

/// Movies carrying every one of `genres`.
pub fn by_genres<'a>(movies: &'a [Movie], genres: &[String]) -> Vec<&'a Movie> {
    let genres = normalized_terms(genres);
    if genres.is_empty() {
        return Vec::new();
    }
    movies
        .iter()
        .filter(|m| genres.iter().all(|g| has_genre(m, g)))
        .collect()
}

pub fn by_actor<'a>(movies: &'a [Movie], actor: &str) -> Vec<&'a Movie> {
    let actor = normalize(actor);
    if actor.is_empty() {
        return Vec::new();
    }
    movies.iter().filter(|m| features_actor(m, &actor)).collect()
}

pub fn by_director<'a>(movies: &'a [Movie], director: &str) -> Vec<&'a Movie> {
    let director = normalize(director);
    if director.is_empty() {
        return Vec::new();
    }
    movies.iter().filter(|m| directed_by(m, &director)).collect()
}

pub fn by_year(movies: &[Movie], year: i32) -> Vec<&Movie> {
    movies.iter().filter(|m| m.year == Some(year)).collect()
}

pub fn by_decade(movies: &[Movie], decade: i32) -> Vec<&Movie> {
    movies.iter().filter(|m| m.decade == Some(decade)).collect()
}

/// Criteria for [`filter`]. Empty lists and `None` impose no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    /// Every genre must be present.
    pub genres: Vec<String>,
    /// Every actor must appear in the cast.
    pub actors: Vec<String>,
    /// Any one director is enough.
    pub directors: Vec<String>,
    pub years: Vec<i32>,
    pub decades: Vec<i32>,
    pub min_rating: Option<f64>,
    pub min_vote_count: Option<u64>,
}

impl FilterOptions {
    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
            && self.actors.is_empty()
            && self.directors.is_empty()
            && self.years.is_empty()
            && self.decades.is_empty()
            && self.min_rating.is_none()
            && self.min_vote_count.is_none()
    }
}

pub fn filter<'a>(movies: &'a [Movie], options: &FilterOptions) -> Vec<&'a Movie> {
    let genres = normalized_terms(&options.genres);
    let actors = normalized_terms(&options.actors);
    let directors = normalized_terms(&options.directors);

    movies
        .iter()
        .filter(|m| genres.iter().all(|g| has_genre(m, g)))
        .filter(|m| actors.iter().all(|a| features_actor(m, a)))
        .filter(|m| directors.is_empty() || directors.iter().any(|d| directed_by(m, d)))
        .filter(|m| {
            options.years.is_empty() || m.year.is_some_and(|y| options.years.contains(&y))
        })
        .filter(|m| {
            options.decades.is_empty() || m.decade.is_some_and(|d| options.decades.contains(&d))
        })
        .filter(|m| options.min_rating.map_or(true, |r| m.vote_average >= r))
        .filter(|m| options.min_vote_count.map_or(true, |c| m.vote_count >= c))
        .collect()
}

fn by_rating_desc(a: &Movie, b: &Movie) -> Ordering {
    b.vote_average
        .total_cmp(&a.vote_average)
        .then_with(|| b.vote_count.cmp(&a.vote_count))
        .then_with(|| a.id.cmp(&b.id))
}

/// Highest `voteAverage` first; ties fall back to vote count, then id.
pub fn top_rated(movies: &[Movie], limit: usize) -> Vec<&Movie> {
    let mut ranked: Vec<&Movie> = movies.iter().collect();
    ranked.sort_by(|a, b| by_rating_desc(a, b));
    ranked.truncate(limit);
    ranked
}

pub fn search<'a>(movies: &'a [Movie], text: &str) -> Vec<&'a Movie> {
    let needle = normalize(text);
    if needle.is_empty() {
        return Vec::new();
    }
    movies
        .iter()
        .filter(|m| {
            m.title.to_lowercase().contains(&needle)
                || m.overview.to_lowercase().contains(&needle)
                || directed_by(m, &needle)
                || features_actor(m, &needle)
        })
        .collect()
}

/// Unique names ordered case-insensitively. Names differing only in case
/// collapse into the first spelling seen.
fn unique_sorted<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut unique: BTreeMap<String, String> = BTreeMap::new();
    for name in names.map(str::trim).filter(|n| !n.is_empty()) {
        unique
            .entry(name.to_lowercase())
            .or_insert_with(|| name.to_string());
    }
    unique.into_values().collect()
}

pub fn all_genres(movies: &[Movie]) -> Vec<String> {
    unique_sorted(movies.iter().flat_map(|m| m.genres.iter().map(String::as_str)))
}

pub fn all_actors(movies: &[Movie]) -> Vec<String> {
    unique_sorted(movies.iter().flat_map(|m| m.cast.iter().map(|c| c.name.as_str())))
}

pub fn all_directors(movies: &[Movie]) -> Vec<String> {
    unique_sorted(movies.iter().filter_map(|m| m.director.as_deref()))
}

/// Counted case-insensitively under the first spelling seen.
fn most_frequent<'a>(names: impl Iterator<Item = &'a str>, limit: usize) -> Vec<String> {
    let mut counts: HashMap<String, (&str, usize)> = HashMap::new();
    for name in names.map(str::trim).filter(|n| !n.is_empty()) {
        counts.entry(name.to_lowercase()).or_insert((name, 0)).1 += 1;
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_values().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(limit)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Genres by number of movies, most common first, ties alphabetical.
pub fn popular_genres(movies: &[Movie], limit: usize) -> Vec<String> {
    most_frequent(
        movies.iter().flat_map(|m| m.genres.iter().map(String::as_str)),
        limit,
    )
}

pub fn popular_actors(movies: &[Movie], limit: usize) -> Vec<String> {
    most_frequent(
        movies.iter().flat_map(|m| m.cast.iter().map(|c| c.name.as_str())),
        limit,
    )
}

pub fn popular_directors(movies: &[Movie], limit: usize) -> Vec<String> {
    most_frequent(movies.iter().filter_map(|m| m.director.as_deref()), limit)
}

pub fn year_range(movies: &[Movie]) -> Option<(i32, i32)> {
    let years = movies.iter().filter_map(|m| m.year);
    let (min, max) = years.fold((i32::MAX, i32::MIN), |(lo, hi), y| (lo.min(y), hi.max(y)));
    (min <= max).then_some((min, max))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    RatingDesc,
    RatingAsc,
    PopularityDesc,
    PopularityAsc,
    YearDesc,
    YearAsc,
    TitleAsc,
    TitleDesc,
    VoteCountDesc,
    VoteCountAsc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::RatingDesc => "rating-desc",
            SortOrder::RatingAsc => "rating-asc",
            SortOrder::PopularityDesc => "popularity-desc",
            SortOrder::PopularityAsc => "popularity-asc",
            SortOrder::YearDesc => "year-desc",
            SortOrder::YearAsc => "year-asc",
            SortOrder::TitleAsc => "title-asc",
            SortOrder::TitleDesc => "title-desc",
            SortOrder::VoteCountDesc => "vote-count-desc",
            SortOrder::VoteCountAsc => "vote-count-asc",
        }
    }

    fn compare(&self, a: &Movie, b: &Movie) -> Ordering {
        match self {
            SortOrder::RatingDesc => b.vote_average.total_cmp(&a.vote_average),
            SortOrder::RatingAsc => a.vote_average.total_cmp(&b.vote_average),
            SortOrder::PopularityDesc => b.popularity.total_cmp(&a.popularity),
            SortOrder::PopularityAsc => a.popularity.total_cmp(&b.popularity),
            SortOrder::YearDesc => b.year.unwrap_or(0).cmp(&a.year.unwrap_or(0)),
            SortOrder::YearAsc => a.year.unwrap_or(0).cmp(&b.year.unwrap_or(0)),
            SortOrder::TitleAsc => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortOrder::TitleDesc => b.title.to_lowercase().cmp(&a.title.to_lowercase()),
            SortOrder::VoteCountDesc => b.vote_count.cmp(&a.vote_count),
            SortOrder::VoteCountAsc => a.vote_count.cmp(&b.vote_count),
        }
    }

    /// Stable sort: equal keys keep their incoming order.
    pub fn sort(&self, movies: &mut [&Movie]) {
        movies.sort_by(|a, b| self.compare(a, b));
    }
}

impl FromStr for SortOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let order = match s.trim().to_lowercase().as_str() {
            "rating-desc" => SortOrder::RatingDesc,
            "rating-asc" => SortOrder::RatingAsc,
            "popularity-desc" => SortOrder::PopularityDesc,
            "popularity-asc" => SortOrder::PopularityAsc,
            "year-desc" => SortOrder::YearDesc,
            "year-asc" => SortOrder::YearAsc,
            "title-asc" => SortOrder::TitleAsc,
            "title-desc" => SortOrder::TitleDesc,
            "vote-count-desc" => SortOrder::VoteCountDesc,
            "vote-count-asc" => SortOrder::VoteCountAsc,
            other => return Err(anyhow!("unknown sort order '{}'", other)),
        };
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CastMember, MovieId};

    fn movie(id: u64, title: &str, rating: f64) -> Movie {
        let mut m = Movie::new(MovieId::Local(id), title);
        m.vote_average = rating;
        m
    }

    fn abc() -> Vec<Movie> {
        vec![movie(1, "A", 8.5), movie(2, "B", 9.2), movie(3, "C", 7.0)]
    }

    fn ids(movies: &[&Movie]) -> Vec<MovieId> {
        movies.iter().map(|m| m.id.clone()).collect()
    }

    fn sample() -> Vec<Movie> {
        let mut heat = movie(10, "Heat", 7.9);
        heat.genres = vec!["Action".into(), " Crime ".into(), "Drama".into()];
        heat.cast = vec![CastMember::named("Al Pacino"), CastMember::named("Robert De Niro")];
        heat.director = Some("Michael Mann".into());
        heat.year = Some(1995);
        heat.decade = Some(1990);
        heat.vote_count = 6000;

        let mut godfather = movie(11, "The Godfather", 8.7);
        godfather.genres = vec!["drama".into(), "CRIME".into()];
        godfather.cast = vec![CastMember::named("Marlon Brando"), CastMember::named("Al Pacino")];
        godfather.director = Some("Francis Ford Coppola".into());
        godfather.year = Some(1972);
        godfather.decade = Some(1970);
        godfather.vote_count = 18000;
        godfather.overview = "Spanning the years 1945 to 1955, a chronicle of a crime family.".into();

        let mut collateral = movie(12, "Collateral", 7.3);
        collateral.genres = vec!["Thriller".into(), "Crime".into()];
        collateral.cast = vec![CastMember::named("Tom Cruise")];
        collateral.director = Some("Michael Mann".into());
        collateral.year = Some(2004);
        collateral.decade = Some(2000);
        collateral.vote_count = 5000;

        let mut unknown = movie(13, "Untitled", 0.0);
        unknown.genres = vec!["Documentary".into()];

        vec![heat, godfather, collateral, unknown]
    }

    #[test]
    fn top_rated_orders_by_rating() {
        let movies = abc();
        assert_eq!(
            ids(&top_rated(&movies, 2)),
            vec![MovieId::Local(2), MovieId::Local(1)]
        );
        assert_eq!(top_rated(&movies, 10).len(), 3);
    }

    #[test]
    fn top_rated_breaks_ties_by_votes_then_id() {
        let mut movies = vec![movie(5, "E", 8.0), movie(4, "D", 8.0), movie(6, "F", 8.0)];
        movies[2].vote_count = 10;
        assert_eq!(
            ids(&top_rated(&movies, 3)),
            vec![MovieId::Local(6), MovieId::Local(4), MovieId::Local(5)]
        );
    }

    #[test]
    fn min_rating_keeps_matching_movies() {
        let movies = abc();
        let options = FilterOptions {
            min_rating: Some(8.0),
            ..Default::default()
        };
        let mut found = ids(&filter(&movies, &options));
        found.sort();
        assert_eq!(found, vec![MovieId::Local(1), MovieId::Local(2)]);
    }

    #[test]
    fn empty_filter_returns_everything_in_order() {
        let movies = sample();
        let all = filter(&movies, &FilterOptions::default());
        assert_eq!(ids(&all), movies.iter().map(|m| m.id.clone()).collect::<Vec<_>>());
    }

    #[test]
    fn genre_match_is_exact_after_normalization() {
        let movies = sample();
        assert_eq!(by_genre(&movies, "  crime").len(), 3);
        assert_eq!(by_genre(&movies, "Crim").len(), 0);
        assert!(by_genre(&movies, "   ").is_empty());
    }

    #[test]
    fn actor_and_director_match_substrings() {
        let movies = sample();
        assert_eq!(
            ids(&by_actor(&movies, "pacino")),
            vec![MovieId::Local(10), MovieId::Local(11)]
        );
        assert_eq!(
            ids(&by_director(&movies, "MANN")),
            vec![MovieId::Local(10), MovieId::Local(12)]
        );
        assert!(by_director(&movies, "").is_empty());
        // the documentary has no director and never matches
        assert!(!by_director(&movies, "a").iter().any(|m| m.id == MovieId::Local(13)));
    }

    #[test]
    fn genre_filter_is_intersection_of_single_genres() {
        let movies = sample();
        let options = FilterOptions {
            genres: vec!["Crime".into(), "Drama".into()],
            ..Default::default()
        };
        let combined = ids(&filter(&movies, &options));
        let crime = ids(&by_genre(&movies, "Crime"));
        let drama = ids(&by_genre(&movies, "Drama"));
        let intersection: Vec<MovieId> = crime.into_iter().filter(|id| drama.contains(id)).collect();
        assert_eq!(combined, intersection);
        assert_eq!(ids(&by_genres(&movies, &options.genres)), intersection);
        assert!(by_genres(&movies, &[]).is_empty());
    }

    #[test]
    fn actors_are_and_directors_are_or() {
        let movies = sample();
        let both_actors = FilterOptions {
            actors: vec!["Pacino".into(), "De Niro".into()],
            ..Default::default()
        };
        assert_eq!(ids(&filter(&movies, &both_actors)), vec![MovieId::Local(10)]);

        let either_director = FilterOptions {
            directors: vec!["Coppola".into(), "Mann".into()],
            ..Default::default()
        };
        assert_eq!(filter(&movies, &either_director).len(), 3);
    }

    #[test]
    fn years_decades_and_votes_filter_independently() {
        let movies = sample();
        let options = FilterOptions {
            decades: vec![1990, 1970],
            min_vote_count: Some(10_000),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&movies, &options)), vec![MovieId::Local(11)]);

        let years = FilterOptions {
            years: vec![2004],
            ..Default::default()
        };
        assert_eq!(ids(&filter(&movies, &years)), vec![MovieId::Local(12)]);
        assert_eq!(ids(&by_year(&movies, 1995)), vec![MovieId::Local(10)]);
        assert_eq!(ids(&by_decade(&movies, 2000)), vec![MovieId::Local(12)]);
    }

    #[test]
    fn blank_list_entries_are_ignored() {
        let movies = sample();
        let options = FilterOptions {
            actors: vec!["  ".into()],
            ..Default::default()
        };
        assert_eq!(filter(&movies, &options).len(), movies.len());
    }

    #[test]
    fn search_covers_title_overview_director_and_cast() {
        let movies = sample();
        assert_eq!(ids(&search(&movies, "godfather")), vec![MovieId::Local(11)]);
        assert_eq!(ids(&search(&movies, "1945")), vec![MovieId::Local(11)]);
        assert_eq!(ids(&search(&movies, "cruise")), vec![MovieId::Local(12)]);
        assert_eq!(search(&movies, "michael mann").len(), 2);
        assert!(search(&movies, " ").is_empty());
    }

    #[test]
    fn popularity_counts_break_ties_alphabetically() {
        let movies = sample();
        // "Crime", " Crime " and "CRIME" count together, as do "Drama" and "drama"
        assert_eq!(popular_genres(&movies, 2), vec!["Crime", "Drama"]);
        assert_eq!(popular_actors(&movies, 2), vec!["Al Pacino", "Marlon Brando"]);
        assert_eq!(
            popular_directors(&movies, 5),
            vec!["Michael Mann", "Francis Ford Coppola"]
        );
    }

    #[test]
    fn enumerations_are_unique_and_sorted() {
        let movies = sample();
        assert_eq!(
            all_genres(&movies),
            vec!["Action", "Crime", "Documentary", "Drama", "Thriller"]
        );
        assert_eq!(all_directors(&movies).len(), 2);
        assert_eq!(all_actors(&movies).len(), 4);
        assert_eq!(year_range(&movies), Some((1972, 2004)));
        assert_eq!(year_range(&[]), None);
    }

    #[test]
    fn sort_orders_round_trip_their_names() {
        for name in ["rating-asc", "title-desc", "vote-count-desc", "year-asc"] {
            assert_eq!(name.parse::<SortOrder>().unwrap().as_str(), name);
        }
        assert!("newest".parse::<SortOrder>().is_err());
    }

    #[test]
    fn sorting_by_year_treats_unknown_as_zero() {
        let movies = sample();
        let mut refs: Vec<&Movie> = movies.iter().collect();
        SortOrder::YearAsc.sort(&mut refs);
        assert_eq!(refs.first().map(|m| m.title.as_str()), Some("Untitled"));
        SortOrder::TitleAsc.sort(&mut refs);
        assert_eq!(refs.last().map(|m| m.title.as_str()), Some("Untitled"));
    }
}
