//! Descriptive statistics and historical comparison
//!
//! Computes percentiles, rank thresholds, and the farming-difficulty score
//! (baseline 100) that compares the current period against the average of
//! all stored snapshots.

use crate::types::{
    Comparison, ComparisonReport, DifficultyBand, HistoricalAverage, LeaderboardEntry,
    SnapshotAnalysis, Stats,
};
use persistence::repository::{SnapshotRepository, SnapshotSummary};
use persistence::DbResult;
use std::collections::BTreeMap;

/// Leaderboard positions for which minimum-volume thresholds are reported
pub const TARGET_RANKS: [u32; 6] = [10, 50, 100, 250, 500, 1000];

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted
}

/// Linear-interpolation percentile: fractional index `p/100 * (n-1)`,
/// interpolated between the floor and ceil neighbors. Empty input yields 0.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let sorted = sorted_copy(values);
    let index = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] + (sorted[upper] - sorted[lower]) * (index - lower as f64)
    }
}

/// Median with the standard even/odd-length averaging rule
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let sorted = sorted_copy(values);
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Summary statistics for a set of entries
pub fn calculate_stats(entries: &[LeaderboardEntry]) -> Stats {
    if entries.is_empty() {
        return Stats {
            total_entries: 0,
            total_volume: 0.0,
            avg_volume: 0.0,
            median_volume: 0.0,
            min_volume: 0.0,
            max_volume: 0.0,
            percentile_25: None,
            percentile_50: None,
            percentile_75: None,
        };
    }

    let volumes: Vec<f64> = entries.iter().map(|e| e.volume).collect();
    let total_volume: f64 = volumes.iter().sum();

    Stats {
        total_entries: entries.len(),
        total_volume,
        avg_volume: total_volume / volumes.len() as f64,
        median_volume: median(&volumes),
        min_volume: volumes.iter().cloned().fold(f64::INFINITY, f64::min),
        max_volume: volumes.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        percentile_25: Some(percentile(&volumes, 25.0)),
        percentile_50: Some(percentile(&volumes, 50.0)),
        percentile_75: Some(percentile(&volumes, 75.0)),
    }
}

/// Volume thresholds at the target leaderboard positions.
///
/// For each target: the volume of the entry whose rank equals the target;
/// otherwise, when at least `target` entries exist, the `target`-th entry
/// after sorting by rank (1-based positional fallback); otherwise the
/// target is omitted.
pub fn rank_thresholds(entries: &[LeaderboardEntry]) -> BTreeMap<u32, f64> {
    let mut thresholds = BTreeMap::new();
    if entries.is_empty() {
        return thresholds;
    }

    let mut sorted: Vec<&LeaderboardEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.rank);

    for target in TARGET_RANKS {
        if let Some(exact) = sorted.iter().find(|e| e.rank == target) {
            thresholds.insert(target, exact.volume);
        } else if sorted.len() >= target as usize {
            thresholds.insert(target, sorted[target as usize - 1].volume);
        }
    }

    thresholds
}

/// Averages across all historical snapshots with at least one entry.
/// Zero-entry snapshots are treated as corrupted and excluded.
pub fn historical_average(snapshots: &[SnapshotSummary]) -> HistoricalAverage {
    let valid: Vec<&SnapshotSummary> = snapshots.iter().filter(|s| s.entry_count > 0).collect();

    if valid.is_empty() {
        return HistoricalAverage {
            snapshot_count: 0,
            avg_total_volume: 0.0,
            avg_avg_volume: 0.0,
            avg_entry_count: 0.0,
        };
    }

    let n = valid.len() as f64;
    HistoricalAverage {
        snapshot_count: valid.len(),
        avg_total_volume: valid.iter().map(|s| s.total_volume).sum::<f64>() / n,
        avg_avg_volume: valid.iter().map(|s| s.avg_volume).sum::<f64>() / n,
        avg_entry_count: valid.iter().map(|s| s.entry_count as f64).sum::<f64>() / n,
    }
}

/// Compare current stats against the historical average.
///
/// Difficulty score = mean of the total-volume and avg-volume ratios, times
/// 100. A zero historical denominator makes its ratio 1.0. Requires at least
/// 2 valid snapshots; otherwise returns `Comparison::NeedMoreData`.
pub fn compare_with_history(current: &Stats, snapshots: &[SnapshotSummary]) -> Comparison {
    let historical = historical_average(snapshots);

    if historical.snapshot_count < 2 {
        return Comparison::NeedMoreData {
            snapshot_count: historical.snapshot_count,
        };
    }

    let total_volume_ratio = if historical.avg_total_volume > 0.0 {
        current.total_volume / historical.avg_total_volume
    } else {
        1.0
    };
    let avg_volume_ratio = if historical.avg_avg_volume > 0.0 {
        current.avg_volume / historical.avg_avg_volume
    } else {
        1.0
    };

    let difficulty_score = round2((total_volume_ratio + avg_volume_ratio) / 2.0 * 100.0);

    Comparison::Report(ComparisonReport {
        difficulty_score,
        total_volume_change: round2((total_volume_ratio - 1.0) * 100.0),
        avg_volume_change: round2((avg_volume_ratio - 1.0) * 100.0),
        band: DifficultyBand::from_score(difficulty_score),
        historical,
        current: current.clone(),
    })
}

/// The most recent `limit` snapshot summaries (input is newest-first)
pub fn trending(snapshots: &[SnapshotSummary], limit: usize) -> Vec<SnapshotSummary> {
    snapshots.iter().take(limit).cloned().collect()
}

/// Analyze one persisted snapshot. Returns `None` when the snapshot has no
/// entries (unknown id or corrupted capture).
pub async fn analyze_snapshot(
    repo: &SnapshotRepository<'_>,
    snapshot_id: i64,
) -> DbResult<Option<SnapshotAnalysis>> {
    let records = repo.get_snapshot_data(snapshot_id).await?;

    if records.is_empty() {
        return Ok(None);
    }

    let entries: Vec<LeaderboardEntry> = records.into_iter().map(LeaderboardEntry::from).collect();

    Ok(Some(SnapshotAnalysis {
        snapshot_id,
        stats: calculate_stats(&entries),
        rank_thresholds: rank_thresholds(&entries),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_entry(rank: u32, volume: f64) -> LeaderboardEntry {
        LeaderboardEntry {
            rank,
            user_alias: format!("user{rank}"),
            volume,
            quote_symbol: "USDC".to_string(),
        }
    }

    fn make_summary(id: i64, entry_count: i64, total_volume: f64) -> SnapshotSummary {
        SnapshotSummary {
            id,
            timestamp: "2024-04-08T00:00:00+00:00".to_string(),
            week_identifier: "2024-W15".to_string(),
            entry_count,
            total_volume,
            avg_volume: if entry_count > 0 {
                total_volume / entry_count as f64
            } else {
                0.0
            },
        }
    }

    #[test]
    fn test_percentile_interpolation() {
        assert_eq!(percentile(&[1.0, 2.0, 3.0, 4.0], 50.0), 2.5);
        assert_eq!(percentile(&[1.0, 2.0, 3.0, 4.0, 5.0], 50.0), 3.0);
        assert_eq!(percentile(&[1.0, 2.0, 3.0, 4.0], 25.0), 1.75);
    }

    #[test]
    fn test_percentile_endpoints() {
        assert_eq!(percentile(&[5.0], 0.0), 5.0);
        assert_eq!(percentile(&[5.0], 100.0), 5.0);
        assert_eq!(percentile(&[3.0, 1.0, 2.0], 0.0), 1.0);
        assert_eq!(percentile(&[3.0, 1.0, 2.0], 100.0), 3.0);
        assert_eq!(percentile(&[], 50.0), 0.0);
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[5.0, 1.0, 3.0]), 3.0);
        assert_eq!(median(&[7.0]), 7.0);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn test_calculate_stats() {
        let entries: Vec<LeaderboardEntry> =
            (1..=4).map(|r| make_entry(r, r as f64 * 10.0)).collect();
        let stats = calculate_stats(&entries);

        assert_eq!(stats.total_entries, 4);
        assert_eq!(stats.total_volume, 100.0);
        assert_eq!(stats.avg_volume, 25.0);
        assert_eq!(stats.median_volume, 25.0);
        assert_eq!(stats.min_volume, 10.0);
        assert_eq!(stats.max_volume, 40.0);
        assert_eq!(stats.percentile_50, Some(25.0));
    }

    #[test]
    fn test_calculate_stats_empty() {
        let stats = calculate_stats(&[]);
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.total_volume, 0.0);
        assert_eq!(stats.percentile_50, None);
    }

    #[test]
    fn test_rank_thresholds_exact_match() {
        let entries: Vec<LeaderboardEntry> =
            (1..=100).map(|r| make_entry(r, 1000.0 - r as f64)).collect();
        let thresholds = rank_thresholds(&entries);

        assert_eq!(thresholds.get(&10), Some(&990.0));
        assert_eq!(thresholds.get(&50), Some(&950.0));
        assert_eq!(thresholds.get(&100), Some(&900.0));
        // Fewer than 250 entries and no exact match: omitted
        assert!(!thresholds.contains_key(&250));
        assert!(!thresholds.contains_key(&1000));
    }

    #[test]
    fn test_rank_thresholds_positional_fallback() {
        // Rank 10 is missing, but 100 entries exist: fall back to the
        // 10th entry after sorting by rank (which now has rank 11)
        let entries: Vec<LeaderboardEntry> = (1..=101)
            .filter(|&r| r != 10)
            .map(|r| make_entry(r, 1000.0 - r as f64))
            .collect();
        let thresholds = rank_thresholds(&entries);

        assert_eq!(thresholds.get(&10), Some(&989.0));
        assert_eq!(thresholds.get(&50), Some(&950.0));
    }

    #[test]
    fn test_rank_thresholds_duplicates_and_gaps() {
        // Duplicate and gap-ridden ranks must never panic
        let entries = vec![
            make_entry(1, 500.0),
            make_entry(1, 450.0),
            make_entry(7, 300.0),
            make_entry(7, 250.0),
            make_entry(90, 100.0),
        ];
        let thresholds = rank_thresholds(&entries);
        assert!(thresholds.is_empty());

        assert!(rank_thresholds(&[]).is_empty());
    }

    #[test]
    fn test_historical_average_excludes_empty_snapshots() {
        let snapshots = vec![
            make_summary(3, 100, 10_000.0),
            make_summary(2, 0, 0.0),
            make_summary(1, 50, 20_000.0),
        ];
        let hist = historical_average(&snapshots);

        assert_eq!(hist.snapshot_count, 2);
        assert_eq!(hist.avg_total_volume, 15_000.0);
        assert_eq!(hist.avg_entry_count, 75.0);
    }

    #[test]
    fn test_compare_needs_two_snapshots() {
        let current = calculate_stats(&[make_entry(1, 100.0)]);

        let one = vec![make_summary(1, 10, 1000.0)];
        assert!(matches!(
            compare_with_history(&current, &one),
            Comparison::NeedMoreData { snapshot_count: 1 }
        ));

        // An empty snapshot does not count as valid history
        let one_valid = vec![make_summary(2, 0, 0.0), make_summary(1, 10, 1000.0)];
        assert!(matches!(
            compare_with_history(&current, &one_valid),
            Comparison::NeedMoreData { snapshot_count: 1 }
        ));
    }

    #[test]
    fn test_compare_difficulty_score() {
        // Historical average: total 1000, avg 10. Current: total 1500, avg 15.
        let snapshots = vec![make_summary(2, 100, 1000.0), make_summary(1, 100, 1000.0)];
        let entries: Vec<LeaderboardEntry> = (1..=100).map(|r| make_entry(r, 15.0)).collect();
        let current = calculate_stats(&entries);

        match compare_with_history(&current, &snapshots) {
            Comparison::Report(report) => {
                assert_eq!(report.difficulty_score, 150.0);
                assert_eq!(report.total_volume_change, 50.0);
                assert_eq!(report.avg_volume_change, 50.0);
                assert_eq!(report.band, DifficultyBand::VeryHard);
            }
            Comparison::NeedMoreData { .. } => panic!("expected a scored report"),
        }
    }

    #[test]
    fn test_compare_zero_denominator_guards() {
        // Two valid snapshots whose volumes are all zero: both ratios
        // default to 1.0, scoring exactly 100
        let snapshots = vec![make_summary(2, 10, 0.0), make_summary(1, 10, 0.0)];
        let current = calculate_stats(&[make_entry(1, 100.0)]);

        match compare_with_history(&current, &snapshots) {
            Comparison::Report(report) => {
                assert_eq!(report.difficulty_score, 100.0);
                assert_eq!(report.band, DifficultyBand::Average);
            }
            Comparison::NeedMoreData { .. } => panic!("expected a scored report"),
        }
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(DifficultyBand::from_score(79.99), DifficultyBand::Good);
        assert_eq!(DifficultyBand::from_score(80.0), DifficultyBand::Decent);
        assert_eq!(DifficultyBand::from_score(94.99), DifficultyBand::Decent);
        assert_eq!(DifficultyBand::from_score(95.0), DifficultyBand::Average);
        assert_eq!(DifficultyBand::from_score(104.99), DifficultyBand::Average);
        assert_eq!(DifficultyBand::from_score(105.0), DifficultyBand::Harder);
        assert_eq!(DifficultyBand::from_score(119.99), DifficultyBand::Harder);
        assert_eq!(DifficultyBand::from_score(120.0), DifficultyBand::VeryHard);
    }

    #[test]
    fn test_trending_takes_most_recent() {
        let snapshots: Vec<SnapshotSummary> =
            (1..=5).rev().map(|i| make_summary(i, 10, 100.0)).collect();
        let recent = trending(&snapshots, 3);

        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].id, 5);
        assert_eq!(recent[2].id, 3);
    }

    #[tokio::test]
    async fn test_analyze_snapshot_round_trip() {
        use persistence::repository::EntryRecord;
        use persistence::Database;

        let db = Database::in_memory().await.unwrap();
        let repo = SnapshotRepository::new(db.pool());

        let id = repo.create_snapshot("2024-W15").await.unwrap();
        let records: Vec<EntryRecord> = (1..=20)
            .map(|r| EntryRecord {
                rank: r,
                user_alias: format!("user{r}"),
                volume: 100.0 * r as f64,
                quote_symbol: "USDC".to_string(),
            })
            .collect();
        repo.insert_entries(id, &records).await.unwrap();

        let analysis = analyze_snapshot(&repo, id).await.unwrap().unwrap();
        assert_eq!(analysis.snapshot_id, id);
        assert_eq!(analysis.stats.total_entries, 20);
        assert_eq!(analysis.rank_thresholds.get(&10), Some(&1000.0));

        // Unknown id yields None, not an error
        assert!(analyze_snapshot(&repo, 999).await.unwrap().is_none());
    }
}
