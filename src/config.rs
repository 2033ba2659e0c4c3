use anyhow::{Context, Result};
use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

use crate::enrich::DEFAULT_THROTTLE;

pub const DEFAULT_BIND: &str = "0.0.0.0:3146";
pub const DEFAULT_DATA: &str = "data/movies.json";

/// Runtime settings, read from the process environment (and `.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub data_path: PathBuf,
    /// Enrichment is disabled when unset or blank.
    pub omdb_api_key: Option<String>,
    pub omdb_throttle: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = get("CINEDEX_BIND")
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
            .parse::<SocketAddr>()
            .context("CINEDEX_BIND must be a socket address such as 0.0.0.0:3146")?;
        let data_path = PathBuf::from(get("CINEDEX_DATA").unwrap_or_else(|| DEFAULT_DATA.to_string()));
        let omdb_throttle = match get("OMDB_THROTTLE_MS") {
            Some(ms) => Duration::from_millis(
                ms.parse::<u64>()
                    .context("OMDB_THROTTLE_MS must be a whole number of milliseconds")?,
            ),
            None => DEFAULT_THROTTLE,
        };

        Ok(Self {
            bind_addr,
            data_path,
            omdb_api_key: get("OMDB_API_KEY"),
            omdb_throttle,
        })
    }
}
