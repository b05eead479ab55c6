//! SQLite-backed ledger implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{Ledger, LedgerError, LedgerRecord, Outcome};

/// SQLite-backed ledger.
pub struct SqliteLedger {
    conn: Mutex<Connection>,
}

impl SqliteLedger {
    /// Create a new SQLite ledger, creating the database file and table if needed.
    pub fn new(path: &Path) -> Result<Self, LedgerError> {
        let conn = Connection::open(path).map_err(|e| LedgerError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite ledger (useful for testing).
    pub fn in_memory() -> Result<Self, LedgerError> {
        let conn =
            Connection::open_in_memory().map_err(|e| LedgerError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), LedgerError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                id INTEGER PRIMARY KEY,
                status TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| LedgerError::Database(e.to_string()))?;

        Ok(())
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<LedgerRecord> {
        let order_id: u64 = row.get(0)?;
        let status: String = row.get(1)?;
        let updated_at_str: String = row.get(2)?;

        // Timestamp parsing only fails on a corrupted row; fall back to now.
        let recorded_at = DateTime::parse_from_rfc3339(&updated_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(LedgerRecord {
            order_id,
            outcome: Outcome::parse(&status).unwrap_or(Outcome::PermanentFailure),
            recorded_at,
        })
    }
}

impl Ledger for SqliteLedger {
    fn lookup(&self, order_id: u64) -> Result<Option<LedgerRecord>, LedgerError> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT id, status, updated_at FROM orders WHERE id = ?",
            params![order_id],
            Self::row_to_record,
        )
        .optional()
        .map_err(|e| LedgerError::Database(e.to_string()))
    }

    fn upsert(&self, order_id: u64, outcome: Outcome) -> Result<LedgerRecord, LedgerError> {
        let conn = self.conn.lock().unwrap();

        let now = Utc::now();

        // The conditional update keeps `success` sticky: reprocessing an
        // already-produced order can never downgrade its record.
        conn.execute(
            "INSERT INTO orders (id, status, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 status = excluded.status,
                 updated_at = excluded.updated_at
             WHERE orders.status != 'success'",
            params![order_id, outcome.as_str(), now.to_rfc3339()],
        )
        .map_err(|e| LedgerError::Database(e.to_string()))?;

        conn.query_row(
            "SELECT id, status, updated_at FROM orders WHERE id = ?",
            params![order_id],
            Self::row_to_record,
        )
        .map_err(|e| LedgerError::Database(e.to_string()))
    }
}
