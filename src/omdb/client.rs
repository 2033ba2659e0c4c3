use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{OmdbApi, SearchHit, TitleDetail};

const OMDB_BASE: &str = "https://www.omdbapi.com/";

#[derive(Debug, Clone)]
pub struct OmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(rename = "Search", default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct DetailEnvelope {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(flatten)]
    detail: TitleDetail,
}

impl OmdbClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let user_agent = format!("cinedex/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .user_agent(user_agent)
            .build()
            .context("Failed to build OMDb HTTP client")?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: OMDB_BASE.to_string(),
        })
    }

    /// Points the client at another endpoint; used to exercise transport
    /// failures.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, params: &[(&str, &str)]) -> Result<T> {
        // reqwest errors carry the request url, which holds the key
        let res = self
            .client
            .get(&self.base_url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("OMDb request failed")?;
        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context("reading OMDb body failed")?;
        if !status.is_success() {
            return Err(anyhow!("OMDb {:?} -> {} {}", params, status, text));
        }
        serde_json::from_str(&text).context("OMDb JSON parse failed")
    }
}

fn is_not_found(error: Option<&str>) -> bool {
    error.is_some_and(|e| e.to_ascii_lowercase().contains("not found"))
}

#[async_trait]
impl OmdbApi for OmdbClient {
    async fn search_titles(&self, term: &str) -> Result<Vec<SearchHit>> {
        let params = [("s", term), ("type", "movie"), ("page", "1")];
        let envelope: SearchEnvelope = self.get_json(&params).await?;
        if envelope.response == "True" {
            return Ok(envelope.search);
        }
        if is_not_found(envelope.error.as_deref()) {
            return Ok(Vec::new());
        }
        Err(anyhow!(
            "OMDb search for '{}' failed: {}",
            term,
            envelope.error.unwrap_or_else(|| "unknown error".to_string())
        ))
    }

    async fn fetch_title(&self, imdb_id: &str) -> Result<TitleDetail> {
        let params = [("i", imdb_id), ("plot", "short")];
        let envelope: DetailEnvelope = self.get_json(&params).await?;
        if envelope.response != "True" {
            return Err(anyhow!(
                "OMDb lookup for {} failed: {}",
                imdb_id,
                envelope.error.unwrap_or_else(|| "unknown error".to_string())
            ));
        }
        Ok(envelope.detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn transport_errors_do_not_reveal_the_key() {
        let client = OmdbClient::new("SUPERSECRETKEY")
            .unwrap()
            .with_base_url("http://127.0.0.1:1/");

        let err = client.search_titles("inception").await.unwrap_err();
        let rendered = format!("{:#} {:?}", err, err);
        assert!(!rendered.contains("SUPERSECRETKEY"), "{rendered}");

        let err = client.fetch_title("tt1375666").await.unwrap_err();
        assert!(!format!("{:#} {:?}", err, err).contains("SUPERSECRETKEY"));
    }

    #[test]
    fn parses_search_envelope() {
        let value = json!({
            "Search": [
                { "Title": "Inception", "Year": "2010", "imdbID": "tt1375666", "Type": "movie", "Poster": "N/A" }
            ],
            "totalResults": "1",
            "Response": "True"
        });
        let envelope: SearchEnvelope = serde_json::from_value(value).expect("search envelope");
        assert_eq!(envelope.response, "True");
        assert_eq!(envelope.search[0].imdb_id, "tt1375666");
        assert_eq!(envelope.search[0].year.as_deref(), Some("2010"));
    }

    #[test]
    fn parses_failed_envelopes() {
        let value = json!({ "Response": "False", "Error": "Movie not found!" });
        let envelope: SearchEnvelope = serde_json::from_value(value).expect("search envelope");
        assert!(envelope.search.is_empty());
        assert!(is_not_found(envelope.error.as_deref()));
        assert!(!is_not_found(Some("Invalid API key!")));
    }

    #[test]
    fn flattens_detail_fields() {
        let value = json!({
            "Title": "Inception",
            "Year": "2010",
            "Released": "16 Jul 2010",
            "Genre": "Action, Adventure, Sci-Fi",
            "imdbRating": "8.8",
            "imdbVotes": "2,600,000",
            "imdbID": "tt1375666",
            "Ratings": [{ "Source": "Internet Movie Database", "Value": "8.8/10" }],
            "Response": "True"
        });
        let envelope: DetailEnvelope = serde_json::from_value(value).expect("detail envelope");
        assert_eq!(envelope.detail.title.as_deref(), Some("Inception"));
        assert_eq!(envelope.detail.imdb_votes.as_deref(), Some("2,600,000"));
        assert_eq!(envelope.detail.runtime, None);
    }
}
