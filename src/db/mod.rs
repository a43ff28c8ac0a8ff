use anyhow::Result;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub mod models;
use models::{MatchRecord, MatchStatus};

use crate::predictor::Outcome;

/// Thread-safe SQLite connection (single connection with mutex).
///
/// This is the match repository: the prediction pipeline only ever reads
/// from it; writes come from the ingestion job.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the SQLite database at the given path
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// In-memory database for tests
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Run schema migrations (idempotent)
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    // ── Matches ───────────────────────────────────────────────────────────────

    /// Insert or refresh a match, keyed by (home_team, away_team, date).
    /// Re-fetching the same fixture updates its score and status in place.
    pub fn upsert_match(&self, m: &MatchRecord) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO matches (
                home_team, away_team, home_goals, away_goals, matchday,
                date, competition, season, status, outcome, fetched_at
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)
             ON CONFLICT(home_team, away_team, date) DO UPDATE SET
                home_goals=excluded.home_goals,
                away_goals=excluded.away_goals,
                matchday=excluded.matchday,
                competition=excluded.competition,
                season=excluded.season,
                status=excluded.status,
                outcome=excluded.outcome,
                fetched_at=excluded.fetched_at",
            params![
                m.home_team,
                m.away_team,
                m.home_goals,
                m.away_goals,
                m.matchday,
                m.date,
                m.competition,
                m.season,
                m.status.as_str(),
                m.outcome.map(|o| o.to_string()),
                m.fetched_at,
            ],
        )?;
        Ok(())
    }

    /// List stored matches, newest first
    pub fn list_matches(&self, limit: i64) -> Result<Vec<MatchRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches ORDER BY date DESC LIMIT ?1"
        ))?;
        let matches = stmt
            .query_map(params![limit], map_match)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(matches)
    }

    /// Finished matches with full scores, in chronological order.
    ///
    /// Training consumes this ordering directly: the evaluation split is
    /// temporal, so the oldest matches form the training portion.
    pub fn list_finished_matches(&self) -> Result<Vec<MatchRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches
             WHERE status='FINISHED' AND home_goals IS NOT NULL AND away_goals IS NOT NULL
             ORDER BY date ASC"
        ))?;
        let matches = stmt
            .query_map([], map_match)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(matches)
    }

    /// Finished matches in which the given team played on either side
    pub fn list_finished_matches_for_team(&self, team: &str) -> Result<Vec<MatchRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches
             WHERE status='FINISHED' AND home_goals IS NOT NULL AND away_goals IS NOT NULL
               AND (home_team=?1 OR away_team=?1)
             ORDER BY date ASC"
        ))?;
        let matches = stmt
            .query_map(params![team], map_match)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(matches)
    }

    /// Total number of stored matches
    pub fn count_matches(&self) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM matches", [], |r| r.get(0))?;
        Ok(n)
    }
}

// ── SQL helpers ────────────────────────────────────────────────────────────────

const MATCH_COLUMNS: &str = "id, home_team, away_team, home_goals, away_goals, matchday, \
                             date, competition, season, status, outcome, fetched_at";

fn map_match(row: &rusqlite::Row) -> rusqlite::Result<MatchRecord> {
    let status: String = row.get(9)?;
    let outcome: Option<String> = row.get(10)?;
    Ok(MatchRecord {
        id: row.get(0)?,
        home_team: row.get(1)?,
        away_team: row.get(2)?,
        home_goals: row.get(3)?,
        away_goals: row.get(4)?,
        matchday: row.get(5)?,
        date: row.get(6)?,
        competition: row.get(7)?,
        season: row.get(8)?,
        status: MatchStatus::parse(&status),
        outcome: outcome.as_deref().and_then(Outcome::parse),
        fetched_at: row.get(11)?,
    })
}

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS matches (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    home_team   TEXT    NOT NULL,
    away_team   TEXT    NOT NULL,
    home_goals  INTEGER,
    away_goals  INTEGER,
    matchday    INTEGER NOT NULL DEFAULT 0,
    date        TEXT    NOT NULL,
    competition TEXT    NOT NULL,
    season      TEXT    NOT NULL,
    status      TEXT    NOT NULL DEFAULT 'SCHEDULED',
    outcome     TEXT,
    fetched_at  TEXT    NOT NULL,
    UNIQUE(home_team, away_team, date)
);

CREATE INDEX IF NOT EXISTS idx_matches_status ON matches(status);
CREATE INDEX IF NOT EXISTS idx_matches_home ON matches(home_team);
CREATE INDEX IF NOT EXISTS idx_matches_away ON matches(away_team);
"#;
