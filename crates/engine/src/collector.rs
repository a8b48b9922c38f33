//! Paginated leaderboard collector
//!
//! Fetches the full leaderboard page by page with partial-success semantics:
//! a failed page terminates the run with whatever was accumulated so far.
//! No retries, no backoff.

use crate::analyzer;
use crate::api::{BackpackClient, FetchError};
use crate::types::{Collection, LeaderboardEntry};
use async_trait::async_trait;
use chrono::{Datelike, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_BATCH_SIZE: u32 = 100;

#[derive(Error, Debug)]
pub enum CollectError {
    #[error("no leaderboard entries could be fetched")]
    NoData,
}

/// Seam between the pagination loop and the HTTP client
#[async_trait]
pub trait LeaderboardSource: Send + Sync {
    async fn fetch_page(&self, limit: u32, offset: u32)
        -> Result<Vec<LeaderboardEntry>, FetchError>;
}

#[async_trait]
impl LeaderboardSource for BackpackClient {
    async fn fetch_page(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<LeaderboardEntry>, FetchError> {
        BackpackClient::fetch_page(self, limit, offset).await
    }
}

/// Fetch up to `max_entries` entries in pages of `batch_size`.
///
/// Stops on: a short page (end of data), an empty page, `max_entries`
/// reached, or a page error. A page error is logged and the accumulated
/// entries are kept — the run is not fatal.
pub async fn fetch_full(
    source: &dyn LeaderboardSource,
    max_entries: u32,
    batch_size: u32,
) -> Vec<LeaderboardEntry> {
    let mut all_entries = Vec::new();
    let mut offset = 0u32;

    info!(max_entries, "Fetching leaderboard");

    while offset < max_entries {
        let page = match source.fetch_page(batch_size, offset).await {
            Ok(page) => page,
            Err(e) => {
                warn!(offset, error = %e, "Page fetch failed, keeping partial results");
                break;
            }
        };

        if page.is_empty() {
            debug!(offset, "No more data available");
            break;
        }

        let short_page = (page.len() as u32) < batch_size;
        all_entries.extend(page);
        offset += batch_size;

        if short_page {
            debug!(total = all_entries.len(), "Reached end of leaderboard");
            break;
        }
    }

    info!(total = all_entries.len(), "Leaderboard fetch complete");
    all_entries
}

/// ISO year-week identifier for the current date, e.g. "2024-W15"
pub fn week_identifier() -> String {
    let week = Utc::now().iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

/// Fetch the leaderboard and summarize it. Fails only when zero entries
/// were fetched.
pub async fn collect_and_summarize(
    source: &dyn LeaderboardSource,
    max_entries: u32,
) -> Result<Collection, CollectError> {
    let entries = fetch_full(source, max_entries, DEFAULT_BATCH_SIZE).await;

    if entries.is_empty() {
        return Err(CollectError::NoData);
    }

    let stats = analyzer::calculate_stats(&entries);

    Ok(Collection {
        entries,
        stats,
        week_identifier: week_identifier(),
    })
}
