//! Database schema definitions

/// SQL to create all tables
pub const CREATE_TABLES: &str = r#"
-- Snapshot headers: one row per collection run
CREATE TABLE IF NOT EXISTS snapshots (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    week_identifier TEXT NOT NULL
);

-- Per-rank leaderboard entries, owned by their snapshot
CREATE TABLE IF NOT EXISTS leaderboard_entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    snapshot_id INTEGER NOT NULL,
    rank INTEGER NOT NULL,
    user_alias TEXT NOT NULL,
    volume REAL NOT NULL,
    quote_symbol TEXT NOT NULL,
    FOREIGN KEY (snapshot_id) REFERENCES snapshots (id)
);

-- ========== INDEXES ==========

CREATE INDEX IF NOT EXISTS idx_snapshot_week ON snapshots(week_identifier);
CREATE INDEX IF NOT EXISTS idx_entries_snapshot ON leaderboard_entries(snapshot_id)
"#;
