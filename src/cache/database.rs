//! SQLite-backed image metadata store.
//!
//! Every operation opens its own connection, runs a single transaction and
//! closes the connection again. The store itself only remembers where the
//! database file lives, so a [`MetadataStore`] can be cloned and passed around
//! freely.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use super::entry::{CacheEntry, EntryMetadata, NO_ENTRY};
use super::error::{CacheError, CacheResult};
use super::hasher::is_digest;

/// How long a connection waits on a lock held by another connection.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const CREATE_SCHEMA_SQL: &str = "
    CREATE TABLE IF NOT EXISTS apod_image (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        title       TEXT NOT NULL,
        explanation TEXT NOT NULL,
        path        TEXT NOT NULL,
        sha256      TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_apod_image_sha256 ON apod_image (sha256);
";

/// Persistent table of cached images keyed by content digest.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    db_path: PathBuf,
}

impl MetadataStore {
    /// Create a handle for the database at `db_path` without touching it.
    #[must_use]
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Create a handle and make sure the schema exists.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] if the file is not a usable SQLite
    /// database or cannot be created.
    pub fn open(db_path: impl Into<PathBuf>) -> CacheResult<Self> {
        let store = Self::new(db_path);
        store.ensure_schema()?;
        Ok(store)
    }

    /// Path of the backing database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> CacheResult<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    /// Create the `apod_image` table and its digest index if absent.
    ///
    /// Safe to call on every start; existing rows are left untouched.
    pub fn ensure_schema(&self) -> CacheResult<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        tx.execute_batch(CREATE_SCHEMA_SQL)?;
        tx.commit()?;
        log::trace!("Schema ensured for {}", self.db_path.display());
        Ok(())
    }

    /// Insert a row for `digest` unless one already exists.
    ///
    /// Returns the id of the new row, or the id of the existing row carrying
    /// the same digest. The lookup and the insert share one immediate
    /// transaction, so concurrent writers cannot both insert the same digest.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidEntry`] for empty fields or a digest not
    /// shaped like [`super::hasher::digest`] output,
    /// [`CacheError::NonUtf8Path`] for a path that cannot be stored as text,
    /// and [`CacheError::Database`] if the write fails.
    pub fn insert(
        &self,
        title: &str,
        explanation: &str,
        file_path: &Path,
        digest: &str,
    ) -> CacheResult<i64> {
        validate_fields(title, explanation)?;
        let path_text = file_path
            .to_str()
            .ok_or_else(|| CacheError::NonUtf8Path(file_path.to_path_buf()))?;
        if path_text.is_empty() {
            return Err(CacheError::InvalidEntry("path"));
        }
        if !is_digest(digest) {
            return Err(CacheError::InvalidEntry("sha256"));
        }

        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if let Some(existing) = select_id_by_digest(&tx, digest)? {
            log::debug!("Digest {} already stored as id {}", digest, existing);
            return Ok(existing);
        }

        tx.execute(
            "INSERT INTO apod_image (title, explanation, path, sha256) VALUES (?1, ?2, ?3, ?4)",
            params![title, explanation, path_text, digest],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        log::debug!("Inserted cache entry {} for {}", id, path_text);
        Ok(id)
    }

    /// Id of the row with `digest`, or [`NO_ENTRY`] if there is none.
    pub fn find_id_by_digest(&self, digest: &str) -> CacheResult<i64> {
        let conn = self.connect()?;
        Ok(select_id_by_digest(&conn, digest)?.unwrap_or(NO_ENTRY))
    }

    /// Metadata for the row with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::NotFound`] if no such row exists.
    pub fn get(&self, id: i64) -> CacheResult<EntryMetadata> {
        let conn = self.connect()?;
        conn.query_row(
            "SELECT title, explanation, path FROM apod_image WHERE id = ?1",
            params![id],
            |row| {
                let path: String = row.get(2)?;
                Ok(EntryMetadata {
                    title: row.get(0)?,
                    explanation: row.get(1)?,
                    file_path: PathBuf::from(path),
                })
            },
        )
        .optional()?
        .ok_or(CacheError::NotFound(id))
    }

    /// Every stored title, in storage order.
    pub fn list_all_titles(&self) -> CacheResult<Vec<String>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT title FROM apod_image ORDER BY id")?;
        let titles = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(titles)
    }

    /// Every stored entry, in storage order.
    pub fn entries(&self) -> CacheResult<Vec<CacheEntry>> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare("SELECT id, title, explanation, path, sha256 FROM apod_image ORDER BY id")?;
        let entries = stmt
            .query_map([], |row| {
                let path: String = row.get(3)?;
                Ok(CacheEntry {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    explanation: row.get(2)?,
                    file_path: PathBuf::from(path),
                    content_digest: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Number of stored entries.
    pub fn len(&self) -> CacheResult<usize> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM apod_image", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> CacheResult<bool> {
        Ok(self.len()? == 0)
    }
}

/// Reject a title or explanation that cannot be stored.
///
/// Called by [`MetadataStore::insert`], and by the orchestrator before it
/// writes any file for the entry.
pub(crate) fn validate_fields(title: &str, explanation: &str) -> CacheResult<()> {
    if title.trim().is_empty() {
        return Err(CacheError::InvalidEntry("title"));
    }
    if explanation.trim().is_empty() {
        return Err(CacheError::InvalidEntry("explanation"));
    }
    Ok(())
}

fn select_id_by_digest(conn: &Connection, digest: &str) -> rusqlite::Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM apod_image WHERE sha256 = ?1 ORDER BY id LIMIT 1",
        params![digest],
        |row| row.get(0),
    )
    .optional()
}
