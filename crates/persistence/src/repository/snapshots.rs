//! Snapshot repository — persistence for leaderboard snapshots and their entries

use crate::DbResult;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// A snapshot header row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SnapshotRecord {
    pub id: i64,
    pub timestamp: String,
    pub week_identifier: String,
}

/// A single persisted leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct EntryRecord {
    pub rank: i64,
    pub user_alias: String,
    pub volume: f64,
    pub quote_symbol: String,
}

/// A snapshot header joined with its aggregate entry stats
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SnapshotSummary {
    pub id: i64,
    pub timestamp: String,
    pub week_identifier: String,
    pub entry_count: i64,
    pub total_volume: f64,
    pub avg_volume: f64,
}

/// Repository for snapshot headers and per-rank entries
pub struct SnapshotRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SnapshotRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new snapshot header and return its id
    pub async fn create_snapshot(&self, week_identifier: &str) -> DbResult<i64> {
        let timestamp = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO snapshots (timestamp, week_identifier) VALUES (?1, ?2)",
        )
        .bind(&timestamp)
        .bind(week_identifier)
        .execute(self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Bulk-insert entries for a snapshot. All rows go in one transaction,
    /// so a failed call leaves nothing behind.
    pub async fn insert_entries(&self, snapshot_id: i64, entries: &[EntryRecord]) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        for entry in entries {
            sqlx::query(
                r#"INSERT INTO leaderboard_entries
                    (snapshot_id, rank, user_alias, volume, quote_symbol)
                   VALUES (?1, ?2, ?3, ?4, ?5)"#,
            )
            .bind(snapshot_id)
            .bind(entry.rank)
            .bind(&entry.user_alias)
            .bind(entry.volume)
            .bind(&entry.quote_symbol)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Get all entries for a snapshot, ordered by rank ascending
    pub async fn get_snapshot_data(&self, snapshot_id: i64) -> DbResult<Vec<EntryRecord>> {
        let records = sqlx::query_as::<_, EntryRecord>(
            r#"SELECT rank, user_alias, volume, quote_symbol
               FROM leaderboard_entries
               WHERE snapshot_id = ?1
               ORDER BY rank ASC"#,
        )
        .bind(snapshot_id)
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    /// Get all snapshot headers with aggregate stats, newest first
    pub async fn get_all_snapshots(&self) -> DbResult<Vec<SnapshotSummary>> {
        let records = sqlx::query_as::<_, SnapshotSummary>(
            r#"SELECT
                   s.id,
                   s.timestamp,
                   s.week_identifier,
                   COUNT(l.id) AS entry_count,
                   COALESCE(SUM(l.volume), 0.0) AS total_volume,
                   COALESCE(AVG(l.volume), 0.0) AS avg_volume
               FROM snapshots s
               LEFT JOIN leaderboard_entries l ON s.id = l.snapshot_id
               GROUP BY s.id
               ORDER BY s.id DESC"#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    /// Get the most recent snapshot header, if any
    pub async fn get_latest_snapshot(&self) -> DbResult<Option<SnapshotRecord>> {
        let record = sqlx::query_as::<_, SnapshotRecord>(
            "SELECT id, timestamp, week_identifier FROM snapshots ORDER BY id DESC LIMIT 1",
        )
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// Get total number of snapshots
    pub async fn get_snapshot_count(&self) -> DbResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM snapshots")
            .fetch_one(self.pool)
            .await?;

        Ok(row.0)
    }
}
