use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a movie record.
///
/// Local ids come from the bundled dataset and stay JSON numbers. Remote ids
/// are the provider's own identifier (an IMDb id for OMDb) and serialize as
/// strings, so records from the two sources can never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MovieId {
    Local(u64),
    Remote(String),
}

impl MovieId {
    pub fn is_local(&self) -> bool {
        matches!(self, MovieId::Local(_))
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovieId::Local(id) => write!(f, "{id}"),
            MovieId::Remote(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastMember {
    pub name: String,
    #[serde(default)]
    pub character: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

impl CastMember {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            character: String::new(),
            profile_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub runtime: u32,
    #[serde(default)]
    pub budget: u64,
    #[serde(default)]
    pub revenue: u64,
    #[serde(default)]
    pub original_language: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub production_companies: Vec<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub decade: Option<i32>,
}

pub fn decade_of(year: i32) -> i32 {
    year.div_euclid(10) * 10
}

impl Movie {
    /// Minimal record with every optional field empty.
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            tagline: String::new(),
            overview: String::new(),
            release_date: String::new(),
            popularity: 0.0,
            vote_average: 0.0,
            vote_count: 0,
            runtime: 0,
            budget: 0,
            revenue: 0,
            original_language: String::new(),
            status: String::new(),
            genres: Vec::new(),
            keywords: Vec::new(),
            production_companies: Vec::new(),
            poster_path: None,
            backdrop_path: None,
            cast: Vec::new(),
            director: None,
            year: None,
            decade: None,
        }
    }

    /// Restores the record invariants after deserialization: rating within
    /// 0..=10, year recovered from the release date, decade derived from year.
    /// Returns true if anything was changed.
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;
        if !self.vote_average.is_finite() || !(0.0..=10.0).contains(&self.vote_average) {
            self.vote_average = 0.0;
            changed = true;
        }
        if self.year.is_none() {
            self.year = leading_year(&self.release_date);
            changed |= self.year.is_some();
        }
        let decade = self.year.map(decade_of);
        if self.decade != decade {
            self.decade = decade;
            changed = true;
        }
        changed
    }

    /// Title key used for cross-source de-duplication.
    pub fn title_key(&self) -> String {
        self.title.trim().to_lowercase()
    }
}

fn leading_year(date: &str) -> Option<i32> {
    let digits = date.trim().get(..4)?;
    if digits.chars().all(|c| c.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn local_ids_stay_numeric_and_remote_ids_stay_strings() {
        let local: MovieId = serde_json::from_value(json!(278)).unwrap();
        let remote: MovieId = serde_json::from_value(json!("tt1375666")).unwrap();
        assert_eq!(local, MovieId::Local(278));
        assert_eq!(remote, MovieId::Remote("tt1375666".to_string()));
        assert_eq!(serde_json::to_value(&local).unwrap(), json!(278));
        assert_ne!(
            MovieId::Local(1375666),
            MovieId::Remote("tt1375666".to_string())
        );
    }

    #[test]
    fn deserializes_sparse_record_with_defaults() {
        let movie: Movie = serde_json::from_value(json!({
            "id": 7,
            "title": "Sparse",
            "releaseDate": "1999-03-31",
            "voteAverage": 11.5
        }))
        .unwrap();
        assert!(movie.genres.is_empty());
        assert_eq!(movie.director, None);

        let mut movie = movie;
        assert!(movie.normalize());
        assert_eq!(movie.vote_average, 0.0);
        assert_eq!(movie.year, Some(1999));
        assert_eq!(movie.decade, Some(1990));
    }

    #[test]
    fn normalize_recomputes_inconsistent_decade() {
        let mut movie = Movie::new(MovieId::Local(1), "Odd");
        movie.year = Some(2008);
        movie.decade = Some(1990);
        movie.vote_average = 8.1;
        assert!(movie.normalize());
        assert_eq!(movie.decade, Some(2000));
        assert!(!movie.normalize());
    }

    #[test]
    fn title_key_ignores_case_and_padding() {
        let movie = Movie::new(MovieId::Local(1), "  Inception ");
        assert_eq!(movie.title_key(), "inception");
    }
}
