//! SQLite-backed prediction store.
//!
//! Records are append-only: one `INSERT` per pipeline run, never `REPLACE`.
//! `specs` is stored as JSON text and `created_at` as RFC 3339 with
//! microseconds, so lexical order is chronological order.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OpenFlags};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use specscan_core::{PredictionRecord, PredictionStore, SpecificationResult};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS predictions (
         id          TEXT PRIMARY KEY,
         filename    TEXT NOT NULL,
         specs       TEXT NOT NULL,
         created_at  TEXT NOT NULL
     );
     CREATE INDEX IF NOT EXISTS idx_predictions_created ON predictions(created_at);";

pub struct SqlitePredictionStore {
    conn: Mutex<Connection>,
}

impl SqlitePredictionStore {
    /// Create or open a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("Failed to open prediction database at {:?}", path.as_ref()))?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to enable WAL journal")?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize predictions schema")?;

        info!("Prediction store opened at {:?}", path.as_ref());
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an in-memory database (for tests).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory SQLite")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an existing database without creating it or touching its journal mode.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open prediction database at {:?} read-only", path.as_ref()))?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open from a connection string: `:memory:`, `sqlite://<path>`, or a bare path.
    pub fn connect(url: &str) -> Result<Self> {
        match database_file(url) {
            Some(path) => Self::open(path),
            None => Self::in_memory(),
        }
    }

    /// Like [`connect`](Self::connect), but never creates or alters the file.
    pub fn connect_read_only(url: &str) -> Result<Self> {
        match database_file(url) {
            Some(path) => Self::open_read_only(path),
            None => Self::in_memory(),
        }
    }

    pub async fn count(&self) -> Result<usize> {
        let conn = self.conn.lock().await;
        let count: usize = conn.query_row("SELECT COUNT(*) FROM predictions", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Most recent records first.
    pub async fn recent(&self, limit: usize) -> Result<Vec<PredictionRecord>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, filename, specs, created_at
             FROM predictions ORDER BY created_at DESC, rowid DESC LIMIT ?1",
        )?;

        let records = stmt
            .query_map(params![limit], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }
}

#[async_trait]
impl PredictionStore for SqlitePredictionStore {
    async fn save(&self, record: &PredictionRecord) -> Result<()> {
        let specs_json = serde_json::to_string(&record.specs)?;
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO predictions (id, filename, specs, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.id.to_string(),
                record.filename,
                specs_json,
                record.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            ],
        )
        .with_context(|| format!("Failed to insert prediction {}", record.id))?;
        debug!(id = %record.id, filename = %record.filename, "Stored prediction");
        Ok(())
    }
}

/// File path named by a connection string, or `None` for `:memory:`.
pub fn database_file(url: &str) -> Option<&str> {
    let target = url.strip_prefix("sqlite://").unwrap_or(url);
    (target != ":memory:").then_some(target)
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<PredictionRecord> {
    let id: String = row.get(0)?;
    let filename: String = row.get(1)?;
    let specs_json: String = row.get(2)?;
    let created_at: String = row.get(3)?;

    let id = Uuid::parse_str(&id)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e)))?;
    let specs_value: serde_json::Value = serde_json::from_str(&specs_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e)))?;
    let specs = SpecificationResult::from_value(specs_value)
        .map_err(|_| rusqlite::Error::InvalidColumnType(2, "specs".into(), rusqlite::types::Type::Text))?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e)))?
        .with_timezone(&Utc);

    Ok(PredictionRecord { id, filename, specs, created_at })
}
