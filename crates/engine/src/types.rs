//! Types shared by the collector and analyzer

use persistence::repository::EntryRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A normalized leaderboard entry with its 1-based rank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_alias: String,
    pub volume: f64,
    pub quote_symbol: String,
}

impl From<EntryRecord> for LeaderboardEntry {
    fn from(record: EntryRecord) -> Self {
        Self {
            rank: record.rank.max(0) as u32,
            user_alias: record.user_alias,
            volume: record.volume,
            quote_symbol: record.quote_symbol,
        }
    }
}

impl From<&LeaderboardEntry> for EntryRecord {
    fn from(entry: &LeaderboardEntry) -> Self {
        Self {
            rank: i64::from(entry.rank),
            user_alias: entry.user_alias.clone(),
            volume: entry.volume,
            quote_symbol: entry.quote_symbol.clone(),
        }
    }
}

/// Descriptive statistics over one set of entries (not persisted)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
    pub total_entries: usize,
    pub total_volume: f64,
    pub avg_volume: f64,
    pub median_volume: f64,
    pub min_volume: f64,
    pub max_volume: f64,
    pub percentile_25: Option<f64>,
    pub percentile_50: Option<f64>,
    pub percentile_75: Option<f64>,
}

/// Result of a collection run: entries plus their summary stats
#[derive(Debug, Clone, Serialize)]
pub struct Collection {
    pub entries: Vec<LeaderboardEntry>,
    pub stats: Stats,
    pub week_identifier: String,
}

/// Averages aggregated across all valid (non-empty) historical snapshots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalAverage {
    pub snapshot_count: usize,
    pub avg_total_volume: f64,
    pub avg_avg_volume: f64,
    pub avg_entry_count: f64,
}

/// Qualitative difficulty band derived from the difficulty score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DifficultyBand {
    Good,
    Decent,
    Average,
    Harder,
    VeryHard,
}

impl DifficultyBand {
    /// Band boundaries are inclusive-exclusive: 80.0 is Decent, 120.0 is VeryHard
    pub fn from_score(score: f64) -> Self {
        if score < 80.0 {
            Self::Good
        } else if score < 95.0 {
            Self::Decent
        } else if score < 105.0 {
            Self::Average
        } else if score < 120.0 {
            Self::Harder
        } else {
            Self::VeryHard
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::Good => "GOOD TIME TO FARM - Volume is significantly below average",
            Self::Decent => "DECENT TIME TO FARM - Volume is below average",
            Self::Average => "AVERAGE CONDITIONS - Volume is near historical average",
            Self::Harder => "HARDER THAN USUAL - Volume is above average",
            Self::VeryHard => "VERY HARD TO FARM - Volume is significantly above average",
        }
    }

    pub fn comparison(&self) -> &'static str {
        match self {
            Self::Good => "Current volume is LOW compared to historical average",
            Self::Decent => "Current volume is SLIGHTLY LOW compared to historical average",
            Self::Average => "Current volume is SIMILAR to historical average",
            Self::Harder => "Current volume is SLIGHTLY HIGH compared to historical average",
            Self::VeryHard => "Current volume is HIGH compared to historical average",
        }
    }
}

/// Scored comparison of the current period against historical averages
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub difficulty_score: f64,
    pub total_volume_change: f64,
    pub avg_volume_change: f64,
    pub band: DifficultyBand,
    pub historical: HistoricalAverage,
    pub current: Stats,
}

/// Outcome of a historical comparison
#[derive(Debug, Clone, Serialize)]
pub enum Comparison {
    /// Fewer than 2 valid historical snapshots — no meaningful score yet
    NeedMoreData { snapshot_count: usize },
    Report(ComparisonReport),
}

/// Full analysis of one persisted snapshot
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotAnalysis {
    pub snapshot_id: i64,
    pub stats: Stats,
    pub rank_thresholds: BTreeMap<u32, f64>,
}
