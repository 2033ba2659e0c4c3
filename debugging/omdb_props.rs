//! Fetch one OMDb title and print both the raw payload and the mapped movie.
//! Usage:
//!   cargo run --bin omdb_props -- <imdb_id>
//!   cargo run --bin omdb_props -- search <term>
//! Requires OMDB_API_KEY in the environment (.env supported).

use anyhow::{Context, Result};
use cinedex::omdb::{map, OmdbApi, OmdbClient, SearchHit};
use dotenvy::dotenv;
use serde_json::json;
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: cargo run --bin omdb_props -- <imdb_id>");
        eprintln!("       cargo run --bin omdb_props -- search <term>");
        std::process::exit(1);
    }

    let api_key = env::var("OMDB_API_KEY").context("OMDB_API_KEY not set")?;
    let client = OmdbClient::new(api_key)?;

    if args[1] == "search" {
        let term = args[2..].join(" ");
        let hits = client.search_titles(&term).await?;
        println!("{} hits for '{}'", hits.len(), term);
        for hit in hits {
            println!(
                "  {}  {} ({})",
                hit.imdb_id,
                hit.title,
                hit.year.as_deref().unwrap_or("?")
            );
        }
        return Ok(());
    }

    let imdb_id = args[1].trim();
    let detail = client.fetch_title(imdb_id).await?;
    let hit = SearchHit {
        imdb_id: imdb_id.to_string(),
        title: detail.title.clone().unwrap_or_default(),
        year: detail.year.clone(),
    };
    let movie = map::to_movie(&hit, &detail);

    let out = json!({
        "raw": {
            "title": detail.title,
            "year": detail.year,
            "released": detail.released,
            "runtime": detail.runtime,
            "genre": detail.genre,
            "imdbRating": detail.imdb_rating,
            "imdbVotes": detail.imdb_votes,
        },
        "mapped": movie,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
