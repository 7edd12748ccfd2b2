use std::collections::HashMap;
use std::path::Path;

use itertools::Itertools;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::catalog::SubTest;
use crate::error::{Error, Result};
use crate::session::SessionRecord;

/// Key under which the whole session collection is stored
pub const SESSIONS_KEY: &str = "cognitiveTestSessions";

/// Persistence boundary: a string-valued key/value store
pub trait KeyValueStore {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

/// SQLite-backed key/value store
#[derive(Debug)]
pub struct SqliteKvStore {
    conn: Connection,
}

impl SqliteKvStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        debug!(path = %path.display(), "opening session database");
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteKvStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, CURRENT_TIMESTAMP)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
            "#,
            params![key, value],
        )?;
        Ok(())
    }
}

/// In-memory key/value store
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    entries: HashMap<String, String>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.entries.insert(key.to_string(), value.to_string());
        store
    }
}

impl KeyValueStore for MemoryKvStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Result of the most recent load from the persistence boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing stored yet
    Empty,
    Loaded(usize),
    /// Stored payload could not be parsed; history treated as empty
    Corrupt { reason: String },
    /// The backend itself failed to read. History is shown as empty and
    /// nothing is written until a later [`SessionStore::load_all`] succeeds.
    Unreadable { reason: String },
}

/// Append-only session history persisted as a single JSON payload.
///
/// Loading never fails: missing or unparseable data yields an empty history
/// and is reported through [`SessionStore::load_outcome`]. A corrupt payload
/// is copied to `<key>.corrupt` before it is first overwritten. After a backend
/// read error the stored payload is unknown, so writes are refused with
/// [`Error::HistoryUnavailable`] until a reload succeeds.
///
/// All mutation goes through `&mut self`, so a store shared across threads
/// must sit behind a single lock covering both the collection and its
/// persistence round-trip.
#[derive(Debug)]
pub struct SessionStore<S: KeyValueStore> {
    backend: S,
    sessions: Vec<SessionRecord>,
    load_outcome: LoadOutcome,
    corrupt_payload: Option<String>,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn open(backend: S) -> Self {
        let mut store = Self {
            backend,
            sessions: Vec::new(),
            load_outcome: LoadOutcome::Empty,
            corrupt_payload: None,
        };
        store.load_all();
        store
    }

    /// Reload the history from the backend, oldest first
    pub fn load_all(&mut self) -> &[SessionRecord] {
        let raw = match self.backend.read(SESSIONS_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "failed to read session history; saving is blocked until a reload succeeds");
                self.sessions.clear();
                self.load_outcome = LoadOutcome::Unreadable {
                    reason: e.to_string(),
                };
                return &self.sessions;
            }
        };

        match raw {
            None => {
                self.sessions.clear();
                self.load_outcome = LoadOutcome::Empty;
            }
            Some(payload) => match serde_json::from_str::<Vec<SessionRecord>>(&payload) {
                Ok(sessions) => {
                    debug!(count = sessions.len(), "loaded session history");
                    self.load_outcome = LoadOutcome::Loaded(sessions.len());
                    self.sessions = sessions;
                }
                Err(e) => {
                    warn!(error = %e, "stored session history is corrupt; treating as empty");
                    self.sessions.clear();
                    self.load_outcome = LoadOutcome::Corrupt {
                        reason: e.to_string(),
                    };
                    self.corrupt_payload = Some(payload);
                }
            },
        }
        &self.sessions
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    /// All sessions in insertion (chronological) order
    pub fn sessions(&self) -> &[SessionRecord] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn last(&self) -> Option<&SessionRecord> {
        self.sessions.last()
    }

    /// Add a record and persist the full collection.
    ///
    /// On a write failure the record stays in memory and the error is returned.
    pub fn append(&mut self, record: SessionRecord) -> Result<()> {
        info!(
            sub_test = %record.sub_test(),
            score = record.score(),
            "appending session"
        );
        self.sessions.push(record);
        self.persist()
    }

    /// Drop every record and persist the empty collection
    pub fn clear_all(&mut self) -> Result<()> {
        info!(count = self.sessions.len(), "clearing session history");
        self.sessions.clear();
        self.persist()
    }

    /// Sessions newest first by date and time, leaving stored order untouched
    pub fn history(&self) -> Vec<&SessionRecord> {
        self.sessions
            .iter()
            .sorted_by(|a, b| b.timestamp().cmp(&a.timestamp()))
            .collect()
    }

    pub fn for_sub_test(&self, sub_test: SubTest) -> Vec<&SessionRecord> {
        self.sessions
            .iter()
            .filter(|s| s.sub_test() == sub_test)
            .collect()
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    fn persist(&mut self) -> Result<()> {
        if let LoadOutcome::Unreadable { reason } = &self.load_outcome {
            warn!(%reason, "refusing to overwrite session history that was never read");
            return Err(Error::HistoryUnavailable(reason.clone()));
        }
        if let Some(payload) = self.corrupt_payload.take() {
            let backup_key = format!("{SESSIONS_KEY}.corrupt");
            if let Err(e) = self.backend.write(&backup_key, &payload) {
                warn!(error = %e, "failed to back up corrupt session history");
                self.corrupt_payload = Some(payload);
                return Err(e);
            }
            info!(key = %backup_key, "backed up corrupt session history");
        }
        let payload = serde_json::to_string(&self.sessions)?;
        self.backend.write(SESSIONS_KEY, &payload)
    }
}
