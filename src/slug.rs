//! Conversion between genre names and URL path tokens.

/// Lowercases, turns each whitespace run into one hyphen and drops anything
/// outside `[a-z0-9-]`.
pub fn genre_to_slug(genre: &str) -> String {
    let lower = genre.to_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut in_space = false;
    for c in lower.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('-');
                in_space = true;
            }
            continue;
        }
        in_space = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            out.push(c);
        }
    }
    out
}

/// Best-effort display name for a slug. Lossy: punctuation and original
/// casing cannot be recovered, use [`find_genre_by_slug`] when the genre is
/// known.
pub fn slug_to_genre(slug: &str) -> String {
    slug.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn hyphenate_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Recovers the authoritative genre name for `slug` from `genres`.
///
/// Tried in order: the genre's own slug, the genre lowercased with
/// whitespace hyphenated, and finally both sides with hyphens and
/// whitespace removed (so "sciencefiction" finds "Science Fiction").
pub fn find_genre_by_slug(slug: &str, genres: &[String]) -> Option<String> {
    let wanted = genre_to_slug(slug.trim());
    if wanted.is_empty() {
        return None;
    }

    if let Some(g) = genres.iter().find(|g| genre_to_slug(g) == wanted) {
        return Some(g.clone());
    }

    if let Some(g) = genres
        .iter()
        .find(|g| hyphenate_whitespace(&g.to_lowercase()) == wanted)
    {
        return Some(g.clone());
    }

    let compact = wanted.replace('-', "");
    genres
        .iter()
        .find(|g| {
            g.to_lowercase()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                == compact
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genres() -> Vec<String> {
        ["Action", "Science Fiction", "TV Movie", "Sci-Fi", "Film-Noir"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn slugs_are_url_safe() {
        assert_eq!(genre_to_slug("Science Fiction"), "science-fiction");
        assert_eq!(genre_to_slug("Sci-Fi"), "sci-fi");
        assert_eq!(genre_to_slug("Action   &  Adventure"), "action--adventure");
        assert_eq!(genre_to_slug("Café"), "caf");
    }

    #[test]
    fn slug_to_genre_title_cases_tokens() {
        assert_eq!(slug_to_genre("science-fiction"), "Science Fiction");
        assert_eq!(slug_to_genre("noir"), "Noir");
        // lossy: "Sci-Fi" cannot be reconstructed
        assert_eq!(slug_to_genre(&genre_to_slug("Sci-Fi")), "Sci Fi");
    }

    #[test]
    fn every_known_genre_round_trips_through_its_slug() {
        let genres = genres();
        for g in &genres {
            assert_eq!(find_genre_by_slug(&genre_to_slug(g), &genres).as_ref(), Some(g));
        }
    }

    #[test]
    fn compressed_slug_finds_spaced_genre() {
        assert_eq!(
            find_genre_by_slug("sciencefiction", &genres()).as_deref(),
            Some("Science Fiction")
        );
        assert_eq!(
            find_genre_by_slug(" TV Movie ", &genres()).as_deref(),
            Some("TV Movie")
        );
    }

    #[test]
    fn unknown_slug_is_none() {
        assert_eq!(find_genre_by_slug("noir", &genres()), None);
        assert_eq!(find_genre_by_slug("", &genres()), None);
    }
}
