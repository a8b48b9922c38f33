//! Volume Tracker — track exchange leaderboard volume to find good farming windows
//!
//! Usage:
//!   volume-tracker collect                  — Collect current data
//!   volume-tracker analyze                  — Analyze current vs historical
//!   volume-tracker history                  — View all snapshots
//!   volume-tracker inspect 5                — Inspect snapshot #5
//!   volume-tracker report                   — Collect + analyze, JSON on stdout

mod display;

use anyhow::bail;
use chrono::Utc;
use clap::{Parser, Subcommand};
use engine::{
    analyze_snapshot, collect_and_summarize, compare_with_history, rank_thresholds, trending,
    BackpackClient, Comparison,
};
use persistence::repository::{EntryRecord, SnapshotRepository};
use persistence::Database;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "volume-tracker")]
#[command(about = "Track and analyze exchange leaderboard volume", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect current leaderboard data and store a snapshot
    Collect {
        /// Maximum number of entries to collect
        #[arg(long, default_value_t = 1000)]
        max_entries: u32,
    },
    /// Analyze current conditions against stored history
    Analyze {
        /// Maximum number of entries to analyze
        #[arg(long, default_value_t = 1000)]
        max_entries: u32,
    },
    /// View historical snapshots
    History {
        /// Show only the N most recent snapshots (0 = all)
        #[arg(long, default_value_t = 0)]
        limit: usize,
    },
    /// Inspect a specific snapshot
    Inspect {
        /// Snapshot ID to inspect
        snapshot_id: i64,
    },
    /// Collect + analyze in one run, emitting a single JSON object on stdout
    Report {
        /// Maximum number of entries to collect
        #[arg(long, default_value_t = 1000)]
        max_entries: u32,
    },
}

/// Runtime configuration, resolved once from the environment
struct Config {
    db_path: String,
    api_url: String,
}

impl Config {
    fn from_env() -> Self {
        Self {
            db_path: std::env::var("TRACKER_DB_PATH")
                .unwrap_or_else(|_| "data/tracker.db".to_string()),
            api_url: std::env::var("TRACKER_API_URL")
                .unwrap_or_else(|_| engine::DEFAULT_BASE_URL.to_string()),
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug,engine=debug,persistence=debug")
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        EnvFilter::new("info,engine=info,persistence=info")
    };

    // Logs go to stderr so the report path keeps stdout machine-readable
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .compact()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let quiet = matches!(&cli.command, Commands::Report { .. });
    init_logging(cli.verbose, quiet);

    let config = Config::from_env();

    let result = match cli.command {
        Commands::Collect { max_entries } => cmd_collect(&config, max_entries).await,
        Commands::Analyze { max_entries } => cmd_analyze(&config, max_entries).await,
        Commands::History { limit } => cmd_history(&config, limit).await,
        Commands::Inspect { snapshot_id } => cmd_inspect(&config, snapshot_id).await,
        Commands::Report { max_entries } => return cmd_report(&config, max_entries).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display::print_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// Collect — fetch the leaderboard and persist one snapshot
// ============================================================================

async fn cmd_collect(config: &Config, max_entries: u32) -> anyhow::Result<()> {
    let db = Database::new(&config.db_path).await?;
    let repo = SnapshotRepository::new(db.pool());
    let client = BackpackClient::new(&config.api_url);

    display::section_header("COLLECTING LEADERBOARD DATA");

    let collection = collect_and_summarize(&client, max_entries).await?;

    println!("\nCurrent Week Statistics:");
    display::print_stats_table(&collection.stats);

    println!(
        "\nStoring data in database (week: {})...",
        collection.week_identifier
    );
    let snapshot_id = repo.create_snapshot(&collection.week_identifier).await?;
    let records: Vec<EntryRecord> = collection.entries.iter().map(EntryRecord::from).collect();
    repo.insert_entries(snapshot_id, &records).await?;

    display::print_success(&format!(
        "Successfully stored {} entries (Snapshot ID: {snapshot_id})",
        collection.entries.len()
    ));

    Ok(())
}

// ============================================================================
// Analyze — compare a fresh fetch against stored history (nothing persisted)
// ============================================================================

async fn cmd_analyze(config: &Config, max_entries: u32) -> anyhow::Result<()> {
    let db = Database::new(&config.db_path).await?;
    let repo = SnapshotRepository::new(db.pool());
    let client = BackpackClient::new(&config.api_url);

    display::section_header("ANALYZING CURRENT CONDITIONS");

    if repo.get_snapshot_count().await? == 0 {
        bail!("No historical data available. Run 'collect' first.");
    }

    println!("\nFetching current leaderboard data...");
    let collection = collect_and_summarize(&client, max_entries).await?;

    display::section_header("CURRENT WEEK STATISTICS");
    display::print_stats_table(&collection.stats);

    let thresholds = rank_thresholds(&collection.entries);
    if !thresholds.is_empty() {
        display::print_rank_thresholds(&thresholds);
    }

    let snapshots = repo.get_all_snapshots().await?;
    let comparison = compare_with_history(&collection.stats, &snapshots);
    display::print_comparison(&comparison);

    Ok(())
}

// ============================================================================
// History — list stored snapshots, newest first
// ============================================================================

async fn cmd_history(config: &Config, limit: usize) -> anyhow::Result<()> {
    let db = Database::new(&config.db_path).await?;
    let repo = SnapshotRepository::new(db.pool());

    display::section_header("HISTORICAL SNAPSHOTS");

    let snapshots = repo.get_all_snapshots().await?;

    if snapshots.is_empty() {
        println!("\nNo historical data available yet.");
        println!("Run 'volume-tracker collect' to start collecting data.\n");
        return Ok(());
    }

    println!("\nTotal snapshots: {}\n", snapshots.len());
    let shown = if limit > 0 {
        trending(&snapshots, limit)
    } else {
        snapshots
    };
    display::print_history_table(&shown);
    println!();

    Ok(())
}

// ============================================================================
// Inspect — stats and thresholds for one stored snapshot
// ============================================================================

async fn cmd_inspect(config: &Config, snapshot_id: i64) -> anyhow::Result<()> {
    let db = Database::new(&config.db_path).await?;
    let repo = SnapshotRepository::new(db.pool());

    display::section_header(&format!("SNAPSHOT #{snapshot_id} DETAILS"));

    let Some(analysis) = analyze_snapshot(&repo, snapshot_id).await? else {
        bail!("Snapshot #{snapshot_id} not found");
    };

    println!("\nStatistics:");
    display::print_stats_table(&analysis.stats);

    if !analysis.rank_thresholds.is_empty() {
        display::print_rank_thresholds(&analysis.rank_thresholds);
    }

    println!();
    Ok(())
}

// ============================================================================
// Report — automation entry point: collect + persist + analyze, JSON out
// ============================================================================

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

async fn cmd_report(config: &Config, max_entries: u32) -> ExitCode {
    match run_report(config, max_entries).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
            ExitCode::SUCCESS
        }
        Err(e) => {
            // Structured error only — never a backtrace on stdout
            let error = serde_json::json!({
                "status": "error",
                "message": format!("{e:#}"),
                "timestamp": Utc::now().to_rfc3339(),
            });
            println!("{}", serde_json::to_string_pretty(&error).unwrap_or_default());
            ExitCode::FAILURE
        }
    }
}

async fn run_report(config: &Config, max_entries: u32) -> anyhow::Result<serde_json::Value> {
    let db = Database::new(&config.db_path).await?;
    let repo = SnapshotRepository::new(db.pool());
    let client = BackpackClient::new(&config.api_url);

    let collection = collect_and_summarize(&client, max_entries).await?;

    let snapshot_id = repo.create_snapshot(&collection.week_identifier).await?;
    let records: Vec<EntryRecord> = collection.entries.iter().map(EntryRecord::from).collect();
    repo.insert_entries(snapshot_id, &records).await?;

    let thresholds = rank_thresholds(&collection.entries);
    let snapshots = repo.get_all_snapshots().await?;
    let snapshot_count = repo.get_snapshot_count().await?;

    let analysis = match compare_with_history(&collection.stats, &snapshots) {
        Comparison::Report(report) => serde_json::json!({
            "difficulty_score": report.difficulty_score,
            "total_volume_change": report.total_volume_change,
            "avg_volume_change": report.avg_volume_change,
            "comparison": report.band.comparison(),
            "recommendation": report.band.recommendation(),
        }),
        Comparison::NeedMoreData { .. } => serde_json::json!({
            "difficulty_score": 0,
            "total_volume_change": 0,
            "avg_volume_change": 0,
            "comparison": "Need more historical data",
            "recommendation": format!(
                "Snapshot {snapshot_count} collected. Need 2+ snapshots for analysis."
            ),
        }),
    };

    let threshold_at = |rank: u32| round2(thresholds.get(&rank).copied().unwrap_or(0.0));
    let stats = &collection.stats;

    Ok(serde_json::json!({
        "status": "success",
        "timestamp": Utc::now().to_rfc3339(),
        "snapshot_id": snapshot_id,
        "week_identifier": collection.week_identifier,
        "current_stats": {
            "total_entries": stats.total_entries,
            "total_volume": round2(stats.total_volume),
            "avg_volume": round2(stats.avg_volume),
            "median_volume": round2(stats.median_volume),
            "min_volume": round2(stats.min_volume),
            "max_volume": round2(stats.max_volume),
        },
        "rank_thresholds": {
            "top_10": threshold_at(10),
            "top_50": threshold_at(50),
            "top_100": threshold_at(100),
            "top_250": threshold_at(250),
            "top_500": threshold_at(500),
            "top_1000": threshold_at(1000),
        },
        "analysis": analysis,
        "historical_snapshots": snapshot_count,
    }))
}
