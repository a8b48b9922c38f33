//! Backpack Exchange public API client — weekly volume leaderboard, no authentication
//!
//! Field normalization rules (first present field wins):
//! - `userAlias` | `user_alias` → user_alias, default ""
//! - `quoteSymbol` | `quote_symbol` → quote_symbol, default "USDC"
//! - `volume` accepts a JSON number or numeric string; anything malformed
//!   coerces to 0, and negative values are clamped to 0

use crate::types::LeaderboardEntry;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str =
    "https://api.backpack.exchange/wapi/v1/statistics/leaderboard/volume/week";

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// A single page fetch failure. Callers decide the policy: the collector
/// treats any of these as "stop here, keep what we have".
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("leaderboard API error {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// One raw leaderboard row as returned by the API, before rank assignment
#[derive(Debug, Deserialize)]
pub(crate) struct RawEntry {
    #[serde(default, alias = "userAlias")]
    pub user_alias: String,

    #[serde(default, deserialize_with = "de_volume")]
    pub volume: f64,

    #[serde(default = "default_quote_symbol", alias = "quoteSymbol")]
    pub quote_symbol: String,
}

fn default_quote_symbol() -> String {
    "USDC".to_string()
}

/// Coerce the volume field to a non-negative f64, defaulting malformed values to 0
fn de_volume<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let volume = match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(volume.max(0.0))
}

impl RawEntry {
    pub(crate) fn into_entry(self, rank: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            rank,
            user_alias: self.user_alias,
            volume: self.volume,
            quote_symbol: self.quote_symbol,
        }
    }
}

/// Backpack leaderboard client
#[derive(Clone)]
pub struct BackpackClient {
    client: Client,
    base_url: String,
}

impl BackpackClient {
    /// Create a client against the given leaderboard endpoint
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into(),
        }
    }

    /// Fetch one page of the leaderboard, assigning ranks `offset + idx + 1`
    pub async fn fetch_page(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<LeaderboardEntry>, FetchError> {
        let url = format!("{}?limit={}&offset={}", self.base_url, limit, offset);
        debug!(limit, offset, "Fetching leaderboard page");

        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let raw: Vec<RawEntry> = resp.json().await?;
        let entries: Vec<LeaderboardEntry> = raw
            .into_iter()
            .enumerate()
            .map(|(idx, entry)| entry.into_entry(offset + idx as u32 + 1))
            .collect();

        debug!(count = entries.len(), "Leaderboard page fetched");
        Ok(entries)
    }
}

impl Default for BackpackClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
