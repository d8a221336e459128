//! redb-based local persistence
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `offline_queue` | `u64` sequence | JSON `AttendanceEvent` | Pending submissions (FIFO by key) |
//! | `meta` | `&str` | JSON blob | Rate window, cached session credential |
//!
//! # Durability
//!
//! redb commits with `Durability::Immediate` by default: copy-on-write with
//! an atomic pointer swap, so the file stays consistent through power loss
//! or a forced app kill, the situations an offline attendance queue exists
//! to survive.
//!
//! The store is an explicitly-owned object constructed once at process start
//! and injected into the engine, never a hidden singleton. A single logical
//! writer (one foreground user session) is assumed.

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
};
use shared::types::AttendanceEvent;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Pending submissions: key = monotone sequence, value = JSON-serialized AttendanceEvent
const QUEUE_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("offline_queue");

/// Small JSON blobs keyed by name
const META_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("meta");

const RATE_WINDOW_KEY: &str = "rate_window";
const SESSION_TOKEN_KEY: &str = "session_token";

/// Persisted fixed-window rate limiter state
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct RateWindow {
    pub count: u32,
    pub window_start_at: i64,
}

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Attendance client storage backed by redb
#[derive(Clone)]
pub struct AttendanceStore {
    db: Arc<Database>,
}

impl AttendanceStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        // Create tables up front so reads never hit a missing table
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(QUEUE_TABLE)?;
            let _ = write_txn.open_table(META_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    // ========== Offline Queue ==========

    /// Append an event to the back of the queue, returning its sequence
    pub fn queue_push(&self, event: &AttendanceEvent) -> StorageResult<u64> {
        let bytes = serde_json::to_vec(event)?;
        let txn = self.db.begin_write()?;
        let seq;
        {
            let mut table = txn.open_table(QUEUE_TABLE)?;
            seq = table.last()?.map(|(k, _)| k.value() + 1).unwrap_or(1);
            table.insert(seq, bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(seq)
    }

    /// Peek the front entry without removing it
    pub fn queue_front(&self) -> StorageResult<Option<(u64, AttendanceEvent)>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(QUEUE_TABLE)?;
        match table.first()? {
            Some((key, value)) => {
                let event: AttendanceEvent = serde_json::from_slice(value.value())?;
                Ok(Some((key.value(), event)))
            }
            None => Ok(None),
        }
    }

    /// Remove one entry by sequence (after a confirmed successful replay)
    pub fn queue_remove(&self, seq: u64) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(QUEUE_TABLE)?;
            table.remove(seq)?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Discard the entire queue, returning how many entries were dropped
    pub fn queue_clear(&self) -> StorageResult<u64> {
        let txn = self.db.begin_write()?;
        let dropped;
        {
            let mut table = txn.open_table(QUEUE_TABLE)?;
            dropped = table.len()?;
            table.retain(|_, _| false)?;
        }
        txn.commit()?;
        Ok(dropped)
    }

    /// Number of queued entries
    pub fn queue_len(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(QUEUE_TABLE)?;
        Ok(table.len()?)
    }

    /// All queued events in FIFO order
    pub fn queue_entries(&self) -> StorageResult<Vec<AttendanceEvent>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(QUEUE_TABLE)?;
        let mut entries = Vec::new();
        for item in table.range::<u64>(..)? {
            let (_, value) = item?;
            entries.push(serde_json::from_slice(value.value())?);
        }
        Ok(entries)
    }

    // ========== Rate Window ==========

    pub fn rate_window_get(&self) -> StorageResult<Option<RateWindow>> {
        self.meta_get(RATE_WINDOW_KEY)
    }

    pub fn rate_window_set(&self, window: &RateWindow) -> StorageResult<()> {
        self.meta_set(RATE_WINDOW_KEY, window)
    }

    // ========== Session Credential ==========
    //
    // Consumed, not owned, by this subsystem: written by the auth layer,
    // cleared here as a side effect of queue invalidation.

    pub fn session_token_get(&self) -> StorageResult<Option<String>> {
        self.meta_get(SESSION_TOKEN_KEY)
    }

    pub fn session_token_set(&self, token: &str) -> StorageResult<()> {
        self.meta_set(SESSION_TOKEN_KEY, &token.to_string())
    }

    pub fn session_token_clear(&self) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(META_TABLE)?;
            table.remove(SESSION_TOKEN_KEY)?;
        }
        txn.commit()?;
        Ok(())
    }

    // ========== Meta Helpers ==========

    fn meta_get<T: serde::de::DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(META_TABLE)?;
        match table.get(key)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn meta_set<T: serde::Serialize>(&self, key: &str, value: &T) -> StorageResult<()> {
        let bytes = serde_json::to_vec(value)?;
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(META_TABLE)?;
            table.insert(key, bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }
}
