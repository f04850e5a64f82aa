/// Disk persistence layer backed by redb.
///
/// Uses a single redb database file with two tables:
/// - `history`: stores serialized `LayerState` snapshots keyed by
///   `"{doc_id}#{index:020}"`
/// - `meta`: stores per-document metadata keyed by `doc_id`
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use crate::layer::LayerState;

/// History table: composite string key → bincode-serialized LayerState.
const HISTORY_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("history");

/// Metadata table: doc_id → bincode-serialized DocumentMeta.
const META_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("meta");

/// Per-document metadata persisted alongside history.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct DocumentMeta {
    state_count: u64,
}

/// Formats a history table key from doc_id and snapshot index.
///
/// The index is zero-padded to 20 digits to ensure correct lexicographic
/// ordering in the B-tree.
fn history_key(doc_id: &str, index: u64) -> String {
    format!("{doc_id}#{index:020}")
}

/// Returns the exclusive range bounds for all history entries of a document.
///
/// Uses `#` as separator and `$` (one ASCII codepoint above `#`) as the
/// exclusive upper bound, ensuring the range captures exactly the entries
/// for the given doc_id.
fn doc_range(doc_id: &str) -> (String, String) {
    let start = format!("{doc_id}#");
    let end = format!("{doc_id}$");
    (start, end)
}

/// Persistence layer for layer-state history backed by redb.
///
/// Thread-safe: redb supports concurrent readers and serialized writers.
/// Shared across documents via `Arc<PersistenceLayer>`.
pub struct PersistenceLayer {
    db: Database,
}

impl std::fmt::Debug for PersistenceLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceLayer").finish()
    }
}

impl PersistenceLayer {
    /// Opens or creates the history database in the given directory.
    ///
    /// Creates the directory and database file if they don't exist.
    /// Initializes tables on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the database
    /// cannot be opened.
    pub fn open(data_dir: &Path) -> Result<Arc<Self>> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = data_dir.join("history.redb");
        let db = Database::create(&db_path)
            .with_context(|| format!("Failed to open history database: {}", db_path.display()))?;

        // Ensure tables exist
        let write_txn = db
            .begin_write()
            .context("Failed to begin initial write transaction")?;
        {
            let _ = write_txn
                .open_table(HISTORY_TABLE)
                .context("Failed to create history table")?;
            let _ = write_txn
                .open_table(META_TABLE)
                .context("Failed to create meta table")?;
        }
        write_txn
            .commit()
            .context("Failed to commit initial transaction")?;

        Ok(Arc::new(Self { db }))
    }

    /// Replaces all stored snapshots for a document with `states`.
    ///
    /// Wholesale replacement rather than upsert: pushing after undo
    /// truncates the redo branch, so previously stored snapshots past the
    /// new end would otherwise linger with stale indices.
    ///
    /// # Errors
    ///
    /// Returns an error if the write transaction fails.
    pub fn replace_states(&self, doc_id: &str, states: &[LayerState]) -> Result<()> {
        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;
        {
            let mut table = write_txn
                .open_table(HISTORY_TABLE)
                .context("Failed to open history table")?;

            let (start, end) = doc_range(doc_id);
            let stale_keys: Vec<String> = table
                .range::<&str>(start.as_str()..end.as_str())
                .context("Failed to range query history table")?
                .filter_map(|entry| entry.ok().map(|(k, _)| k.value().to_string()))
                .collect();
            for key in &stale_keys {
                table
                    .remove(key.as_str())
                    .context("Failed to remove stale entry")?;
            }

            for (index, state) in states.iter().enumerate() {
                let key = history_key(doc_id, index as u64);
                let bytes = bincode::serialize(state).context("Failed to serialize snapshot")?;
                table
                    .insert(key.as_str(), bytes.as_slice())
                    .context("Failed to insert snapshot")?;
            }
        }
        write_txn
            .commit()
            .context("Failed to commit write transaction")?;
        Ok(())
    }

    /// Reads all snapshots for a document, ordered oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the read transaction or deserialization fails.
    pub fn read_states(&self, doc_id: &str) -> Result<Vec<LayerState>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(HISTORY_TABLE)
            .context("Failed to open history table")?;

        let (start, end) = doc_range(doc_id);
        let mut states = Vec::new();

        for entry in table
            .range::<&str>(start.as_str()..end.as_str())
            .context("Failed to range query history table")?
        {
            let (_, value_guard) = entry.context("Failed to read history entry")?;
            let state: LayerState = bincode::deserialize(value_guard.value())
                .context("Failed to deserialize snapshot")?;
            states.push(state);
        }

        Ok(states)
    }

    /// Counts the number of snapshots stored for a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the read transaction fails.
    pub fn count_states(&self, doc_id: &str) -> Result<usize> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(HISTORY_TABLE)
            .context("Failed to open history table")?;

        let (start, end) = doc_range(doc_id);
        let count = table
            .range::<&str>(start.as_str()..end.as_str())
            .context("Failed to range query for count")?
            .count();

        Ok(count)
    }

    /// Removes all history and metadata for a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the write transaction fails.
    pub fn delete_document(&self, doc_id: &str) -> Result<()> {
        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;
        {
            let mut table = write_txn
                .open_table(HISTORY_TABLE)
                .context("Failed to open history table")?;

            let (start, end) = doc_range(doc_id);
            let keys_to_remove: Vec<String> = table
                .range::<&str>(start.as_str()..end.as_str())
                .context("Failed to range query for deletion")?
                .filter_map(|entry| entry.ok().map(|(k, _)| k.value().to_string()))
                .collect();

            for key in &keys_to_remove {
                table
                    .remove(key.as_str())
                    .context("Failed to remove entry")?;
            }
        }
        {
            let mut meta_table = write_txn
                .open_table(META_TABLE)
                .context("Failed to open meta table")?;
            let _ = meta_table.remove(doc_id);
        }
        write_txn.commit().context("Failed to commit deletion")?;
        Ok(())
    }

    /// Saves the stored snapshot count for a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the write transaction fails.
    pub fn save_meta(&self, doc_id: &str, state_count: u64) -> Result<()> {
        let meta = DocumentMeta { state_count };
        let bytes = bincode::serialize(&meta).context("Failed to serialize document metadata")?;

        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;
        {
            let mut table = write_txn
                .open_table(META_TABLE)
                .context("Failed to open meta table")?;
            table
                .insert(doc_id, bytes.as_slice())
                .context("Failed to insert metadata")?;
        }
        write_txn.commit().context("Failed to commit metadata")?;
        Ok(())
    }

    /// Loads the stored snapshot count for a document.
    ///
    /// Returns `None` if no history exists for this document.
    ///
    /// # Errors
    ///
    /// Returns an error if the read transaction or deserialization fails.
    pub fn load_meta(&self, doc_id: &str) -> Result<Option<u64>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(META_TABLE)
            .context("Failed to open meta table")?;

        match table.get(doc_id).context("Failed to read metadata")? {
            Some(guard) => {
                let meta: DocumentMeta = bincode::deserialize(guard.value())
                    .context("Failed to deserialize metadata")?;
                Ok(Some(meta.state_count))
            }
            None => Ok(None),
        }
    }

    /// Lists all document IDs that have stored metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the read transaction fails.
    pub fn list_documents(&self) -> Result<Vec<String>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(META_TABLE)
            .context("Failed to open meta table")?;

        let mut doc_ids = Vec::new();
        for entry in table.iter().context("Failed to iterate meta table")? {
            let (key_guard, _) = entry.context("Failed to read meta entry")?;
            doc_ids.push(key_guard.value().to_string());
        }
        Ok(doc_ids)
    }
}
