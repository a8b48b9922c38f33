//! Human-readable table output for the CLI
//!
//! Pure formatting — all values arrive pre-computed from the engine.

use chrono::DateTime;
use engine::{Comparison, Stats};
use persistence::repository::SnapshotSummary;
use std::collections::BTreeMap;

/// Format a number with thousands separators
pub fn format_number(num: f64, decimals: usize) -> String {
    let formatted = format!("{num:.decimals$}");
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let negative = int_part.starts_with('-');
    let digits = int_part.trim_start_matches('-');

    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Format a volume as $X.XXM / $X.XXK / $X.XX
pub fn format_volume(volume: f64) -> String {
    if volume >= 1_000_000.0 {
        format!("${:.2}M", volume / 1_000_000.0)
    } else if volume >= 1_000.0 {
        format!("${:.2}K", volume / 1_000.0)
    } else {
        format!("${volume:.2}")
    }
}

/// Format a percentage with an explicit sign
pub fn format_percentage(value: f64) -> String {
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{sign}{value:.2}%")
}

pub fn section_header(title: &str) {
    println!("\n{}", "=".repeat(70));
    println!("  {title}");
    println!("{}", "=".repeat(70));
}

fn print_row(metric: &str, value: &str) {
    println!("  {metric:<22} {value:>16}");
}

pub fn print_stats_table(stats: &Stats) {
    print_row("Total Entries", &format_number(stats.total_entries as f64, 0));
    print_row("Total Volume", &format_volume(stats.total_volume));
    print_row("Average Volume", &format_volume(stats.avg_volume));
    print_row("Median Volume", &format_volume(stats.median_volume));
    print_row("Min Volume", &format_volume(stats.min_volume));
    print_row("Max Volume", &format_volume(stats.max_volume));

    if let (Some(p25), Some(p50), Some(p75)) =
        (stats.percentile_25, stats.percentile_50, stats.percentile_75)
    {
        print_row("25th Percentile", &format_volume(p25));
        print_row("50th Percentile", &format_volume(p50));
        print_row("75th Percentile", &format_volume(p75));
    }
}

pub fn print_comparison(comparison: &Comparison) {
    section_header("COMPARISON WITH HISTORICAL DATA");

    match comparison {
        Comparison::NeedMoreData { snapshot_count } => {
            println!(
                "\nCollect more snapshots over time for historical comparison \
                 (have {snapshot_count}, need 2+).\n"
            );
        }
        Comparison::Report(report) => {
            println!("\nHistorical Averages:");
            print_row(
                "Snapshots Analyzed",
                &format_number(report.historical.snapshot_count as f64, 0),
            );
            print_row(
                "Avg Total Volume",
                &format_volume(report.historical.avg_total_volume),
            );
            print_row(
                "Avg User Volume",
                &format_volume(report.historical.avg_avg_volume),
            );

            println!("\nCurrent vs Historical:");
            print_row(
                "Total Volume Change",
                &format_percentage(report.total_volume_change),
            );
            print_row(
                "Avg Volume Change",
                &format_percentage(report.avg_volume_change),
            );
            print_row(
                "Difficulty Score",
                &format!("{}/100", report.difficulty_score),
            );
            println!("\n  {}", report.band.comparison());

            section_header("RECOMMENDATION");
            println!("\n{}\n", report.band.recommendation());
        }
    }
}

pub fn print_rank_thresholds(thresholds: &BTreeMap<u32, f64>) {
    section_header("RANK THRESHOLDS");

    println!("  {:<12} {:>20}", "Rank", "Min Volume Required");
    for (rank, volume) in thresholds {
        println!("  {:<12} {:>20}", format!("Top {rank}"), format_volume(*volume));
    }
}

pub fn print_history_table(snapshots: &[SnapshotSummary]) {
    println!(
        "  {:<5} {:<10} {:<17} {:>8} {:>13} {:>11}",
        "ID", "Week", "Timestamp", "Entries", "Total Volume", "Avg Volume"
    );

    for snapshot in snapshots {
        let formatted_time = DateTime::parse_from_rfc3339(&snapshot.timestamp)
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|_| snapshot.timestamp.clone());

        println!(
            "  {:<5} {:<10} {:<17} {:>8} {:>13} {:>11}",
            snapshot.id,
            snapshot.week_identifier,
            formatted_time,
            format_number(snapshot.entry_count as f64, 0),
            format_volume(snapshot.total_volume),
            format_volume(snapshot.avg_volume),
        );
    }
}

pub fn print_success(message: &str) {
    println!("\n✓ {message}\n");
}

pub fn print_error(message: &str) {
    eprintln!("\n✗ Error: {message}\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_groups_thousands() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(-1234.5, 1), "-1,234.5");
    }

    #[test]
    fn test_format_volume_scales() {
        assert_eq!(format_volume(2_500_000.0), "$2.50M");
        assert_eq!(format_volume(12_345.0), "$12.35K");
        assert_eq!(format_volume(42.5), "$42.50");
    }

    #[test]
    fn test_format_percentage_sign() {
        assert_eq!(format_percentage(12.345), "+12.35%");
        assert_eq!(format_percentage(-3.2), "-3.20%");
        assert_eq!(format_percentage(0.0), "+0.00%");
    }
}
