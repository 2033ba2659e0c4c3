//! Translation of OMDb payloads into catalog records.
//!
//! OMDb reports unknown values as the literal `"N/A"`. Each parser here
//! returns `None` for that sentinel (and for anything unparseable); only
//! [`to_movie`] decides what an unknown value becomes in a [`Movie`].

use chrono::NaiveDate;

use super::{SearchHit, TitleDetail};
use crate::models::{decade_of, CastMember, Movie, MovieId};

const MAX_CAST: usize = 5;

/// `None` for missing, blank or `"N/A"` values.
pub fn available(raw: Option<&str>) -> Option<&str> {
    let value = raw?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("N/A") {
        None
    } else {
        Some(value)
    }
}

pub fn parse_rating(raw: Option<&str>) -> Option<f64> {
    let rating: f64 = available(raw)?.parse().ok()?;
    (rating.is_finite() && (0.0..=10.0).contains(&rating)).then_some(rating)
}

/// "2,600,000" -> 2600000
pub fn parse_votes(raw: Option<&str>) -> Option<u64> {
    available(raw)?.replace(',', "").parse().ok()
}

/// "148 min" -> 148
pub fn parse_runtime(raw: Option<&str>) -> Option<u32> {
    available(raw)?
        .trim_end_matches("min")
        .trim()
        .parse()
        .ok()
}

/// First year of "2010" or a range such as "2008–2013".
pub fn parse_year(raw: Option<&str>) -> Option<i32> {
    let value = available(raw)?;
    let digits: String = value.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() == 4 {
        digits.parse().ok()
    } else {
        None
    }
}

/// "16 Jul 2010" -> 2010-07-16
pub fn parse_released(raw: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(available(raw)?, "%d %b %Y").ok()
}

pub fn split_list(raw: Option<&str>) -> Vec<String> {
    available(raw)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn release_date(detail: &TitleDetail) -> String {
    if let Some(date) = parse_released(detail.released.as_deref()) {
        return date.format("%Y-%m-%d").to_string();
    }
    available(detail.released.as_deref())
        .or_else(|| available(detail.year.as_deref()))
        .unwrap_or_default()
        .to_string()
}

pub fn to_movie(hit: &SearchHit, detail: &TitleDetail) -> Movie {
    let title = available(detail.title.as_deref())
        .unwrap_or(hit.title.trim())
        .to_string();
    let imdb_id = available(detail.imdb_id.as_deref())
        .unwrap_or(hit.imdb_id.trim())
        .to_string();
    let year = parse_year(detail.year.as_deref()).or_else(|| parse_year(hit.year.as_deref()));
    let poster = available(detail.poster.as_deref()).map(str::to_string);

    let mut movie = Movie::new(MovieId::Remote(imdb_id), title);
    movie.overview = available(detail.plot.as_deref())
        .unwrap_or_default()
        .to_string();
    movie.release_date = release_date(detail);
    movie.vote_average = parse_rating(detail.imdb_rating.as_deref()).unwrap_or(0.0);
    movie.vote_count = parse_votes(detail.imdb_votes.as_deref()).unwrap_or(0);
    movie.runtime = parse_runtime(detail.runtime.as_deref()).unwrap_or(0);
    movie.original_language = split_list(detail.language.as_deref())
        .into_iter()
        .next()
        .unwrap_or_else(|| "en".to_string());
    movie.status = "Released".to_string();
    movie.genres = split_list(detail.genre.as_deref());
    movie.production_companies = split_list(detail.production.as_deref());
    movie.backdrop_path = poster.clone();
    movie.poster_path = poster;
    movie.cast = split_list(detail.actors.as_deref())
        .into_iter()
        .take(MAX_CAST)
        .map(CastMember::named)
        .collect();
    movie.director = available(detail.director.as_deref()).map(str::to_string);
    movie.year = year;
    movie.decade = year.map(decade_of);
    movie
}
