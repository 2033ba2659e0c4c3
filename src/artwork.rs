use crate::models::Movie;
use crate::query;

pub const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";
pub const NO_POSTER: &str = "/no-poster.svg";
pub const NO_BACKDROP: &str = "/no-backdrop.svg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosterSize {
    W200,
    W500,
    Original,
}

impl PosterSize {
    fn as_str(&self) -> &'static str {
        match self {
            PosterSize::W200 => "w200",
            PosterSize::W500 => "w500",
            PosterSize::Original => "original",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackdropSize {
    W780,
    W1280,
    Original,
}

impl BackdropSize {
    fn as_str(&self) -> &'static str {
        match self {
            BackdropSize::W780 => "w780",
            BackdropSize::W1280 => "w1280",
            BackdropSize::Original => "original",
        }
    }
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn resolve(path: Option<&str>, size: &str, placeholder: &str) -> String {
    let path = match path.map(str::trim) {
        Some(p) if !p.is_empty() => p,
        _ => return placeholder.to_string(),
    };
    if is_absolute(path) {
        return path.to_string();
    }
    if path.starts_with('/') {
        format!("{IMAGE_BASE}/{size}{path}")
    } else {
        format!("{IMAGE_BASE}/{size}/{path}")
    }
}

/// Dataset paths are resolved against the image CDN; absolute URLs from
/// remote providers pass through unchanged.
pub fn poster_url(path: Option<&str>, size: PosterSize) -> String {
    resolve(path, size.as_str(), NO_POSTER)
}

pub fn backdrop_url(path: Option<&str>, size: BackdropSize) -> String {
    resolve(path, size.as_str(), NO_BACKDROP)
}

/// 32-bit `hash * 31 + unit` over UTF-16 code units, absolute value.
pub fn genre_hash(name: &str) -> u32 {
    name.encode_utf16()
        .fold(0i32, |hash, unit| {
            hash.wrapping_shl(5)
                .wrapping_sub(hash)
                .wrapping_add(i32::from(unit))
        })
        .unsigned_abs()
}

fn usable(
    path: Option<&str>,
    marker: &str,
    resolved: impl Fn(Option<&str>) -> String,
) -> Option<String> {
    let path = path?.trim();
    if path.is_empty() || path.contains(marker) || path.contains("placeholder") {
        return None;
    }
    let url = resolved(Some(path));
    let ok = is_absolute(&url) && !url.contains(marker) && !url.contains("placeholder");
    ok.then_some(url)
}

/// Picks the image that stands in for `genre` on browse tiles.
///
/// Pure function of the genre name and the dataset: candidates are ordered
/// by rating, popularity and id, the list is rotated by [`genre_hash`], and
/// the first usable poster wins, then the first usable backdrop, then the
/// placeholder.
pub fn genre_image(movies: &[Movie], genre: &str) -> String {
    let mut candidates = query::by_genre(movies, genre);
    if candidates.is_empty() {
        return NO_POSTER.to_string();
    }
    candidates.sort_by(|a, b| {
        b.vote_average
            .total_cmp(&a.vote_average)
            .then_with(|| b.popularity.total_cmp(&a.popularity))
            .then_with(|| a.id.cmp(&b.id))
    });
    let start = genre_hash(genre) as usize % candidates.len();
    candidates.rotate_left(start);

    candidates
        .iter()
        .find_map(|m| {
            usable(m.poster_path.as_deref(), "no-poster", |p| {
                poster_url(p, PosterSize::W500)
            })
        })
        .or_else(|| {
            candidates.iter().find_map(|m| {
                usable(m.backdrop_path.as_deref(), "no-backdrop", |p| {
                    backdrop_url(p, BackdropSize::W780)
                })
            })
        })
        .unwrap_or_else(|| NO_POSTER.to_string())
}
