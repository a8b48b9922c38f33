//! Volume Tracker Engine — leaderboard collection and farming-difficulty analysis
//!
//! Provides:
//! - Backpack public API client for the weekly volume leaderboard
//! - Paginated collector with partial-success semantics
//! - Descriptive statistics (percentiles, rank thresholds) and comparison
//!   of the current period against stored historical averages

pub mod analyzer;
pub mod api;
pub mod collector;
pub mod types;

// Re-exports for convenience
pub use analyzer::{
    analyze_snapshot, calculate_stats, compare_with_history, historical_average, median,
    percentile, rank_thresholds, trending, TARGET_RANKS,
};
pub use api::{BackpackClient, FetchError, DEFAULT_BASE_URL};
pub use collector::{
    collect_and_summarize, fetch_full, week_identifier, CollectError, LeaderboardSource,
};
pub use types::*;
