/// Cursor-based snapshot history with optional disk persistence.
///
/// The history is a linear sequence of layer-state snapshots plus a
/// cursor marking the active one. Undo and redo move the cursor; pushing
/// a new snapshot truncates everything past the cursor first, so a new
/// edit after undo discards the redo branch.
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::HistoryConfig;
use crate::layer::LayerState;
use crate::persistence::PersistenceLayer;

/// Manages the layer-state history for a single document.
///
/// Each document gets its own `LayerStateHistory` with an independent
/// snapshot sequence. The history can optionally persist its undo side
/// to disk via a shared `PersistenceLayer`; the redo branch (snapshots
/// past the cursor) is never persisted.
///
/// Invariants: the sequence is never empty (seeded with one empty
/// snapshot at construction) and the cursor always indexes into it.
pub struct LayerStateHistory {
    /// Snapshot sequence, oldest first. Never empty.
    states: Vec<LayerState>,
    /// Index of the active snapshot. Always < `states.len()`.
    cursor: usize,
    /// Document identifier used as the persistence key.
    doc_id: String,
    /// Configuration parameters.
    config: HistoryConfig,
    /// Optional disk persistence (None = in-memory only).
    persistence: Option<Arc<PersistenceLayer>>,
    /// Whether in-memory state has changed since the last flush.
    dirty: bool,
}

impl std::fmt::Debug for LayerStateHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerStateHistory")
            .field("doc_id", &self.doc_id)
            .field("state_count", &self.states.len())
            .field("cursor", &self.cursor)
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl LayerStateHistory {
    /// Creates a new history seeded with a single empty snapshot.
    ///
    /// Pass `persistence: None` for in-memory-only mode (useful in tests
    /// or for documents that don't need disk persistence).
    pub fn new(
        doc_id: String,
        config: HistoryConfig,
        persistence: Option<Arc<PersistenceLayer>>,
    ) -> Self {
        Self {
            states: vec![LayerState::new()],
            cursor: 0,
            doc_id,
            config,
            persistence,
            dirty: false,
        }
    }

    /// Creates an in-memory-only history with default config.
    ///
    /// Convenience constructor for tests and simple usage.
    pub fn in_memory() -> Self {
        Self::new(String::from("test"), HistoryConfig::default(), None)
    }

    /// Loads existing history from disk, or creates a fresh one.
    ///
    /// Restores the stored undo snapshots with the cursor at the most
    /// recent one. If no history exists on disk, behaves like `new()`.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistence layer fails to read.
    pub fn load_or_new(
        doc_id: String,
        config: HistoryConfig,
        persistence: Option<Arc<PersistenceLayer>>,
    ) -> Result<Self> {
        let mut states = match &persistence {
            Some(pl) => {
                let stored = pl
                    .load_meta(&doc_id)
                    .context("Failed to load document metadata")?;
                match stored {
                    Some(_) => {
                        let all = pl
                            .read_states(&doc_id)
                            .context("Failed to load history from disk")?;
                        let cap = config.max_history_depth.max(1);
                        let skip = all.len().saturating_sub(cap);
                        all.into_iter().skip(skip).collect()
                    }
                    None => Vec::new(),
                }
            }
            None => Vec::new(),
        };

        if states.is_empty() {
            states.push(LayerState::new());
        }
        let cursor = states.len() - 1;

        Ok(Self {
            states,
            cursor,
            doc_id,
            config,
            persistence,
            dirty: false,
        })
    }

    /// Returns the document ID.
    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    /// Returns the snapshot at the cursor. Never fails.
    pub fn current_state(&self) -> &LayerState {
        &self.states[self.cursor]
    }

    /// Returns the number of snapshots in the sequence.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Whether undo is available (the cursor is past the first snapshot).
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether redo is available (the cursor is before the last snapshot).
    pub fn can_redo(&self) -> bool {
        self.cursor < self.states.len() - 1
    }

    /// Moves the cursor one snapshot back.
    ///
    /// Returns whether the cursor moved; a no-op at the boundary.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        self.dirty = true;
        true
    }

    /// Moves the cursor one snapshot forward.
    ///
    /// Returns whether the cursor moved; a no-op at the boundary.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        self.dirty = true;
        true
    }

    /// Appends a new snapshot after the cursor and makes it current.
    ///
    /// Snapshots past the cursor (the redo branch) are discarded first,
    /// so redo becomes unavailable after every push. This is the sole
    /// mutation entry point used by operations.
    pub fn push(&mut self, state: LayerState) {
        self.states.truncate(self.cursor + 1);
        self.states.push(state);
        self.cursor += 1;
        self.dirty = true;

        // Enforce the depth limit by dropping the oldest snapshots.
        // The cursor sits at the new last index, so it stays valid.
        let cap = self.config.max_history_depth.max(1);
        if self.states.len() > cap {
            let excess = self.states.len() - cap;
            self.states.drain(..excess);
            self.cursor -= excess;
        }

        if self.persistence.is_some() {
            if let Err(e) = self.flush() {
                tracing::warn!("Failed to persist history for {}: {e}", self.doc_id);
            }
        }
    }

    /// Resets the history to a single empty snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if disk cleanup fails.
    pub fn clear(&mut self) -> Result<()> {
        self.states = vec![LayerState::new()];
        self.cursor = 0;
        self.dirty = false;

        if let Some(pl) = &self.persistence {
            pl.delete_document(&self.doc_id)
                .context("Failed to clear history from disk")?;
        }
        Ok(())
    }

    /// Flushes the undo side of the history to disk.
    ///
    /// Because pushing after undo truncates the redo branch, the stored
    /// snapshots are replaced wholesale rather than upserted. No-op if
    /// the history is in-memory-only or nothing has changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the disk write fails.
    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(pl) = &self.persistence {
            let undo_side = &self.states[..=self.cursor];
            pl.replace_states(&self.doc_id, undo_side)
                .context("Failed to flush history to disk")?;
            pl.save_meta(&self.doc_id, undo_side.len() as u64)
                .context("Failed to save history metadata")?;
            self.dirty = false;
        }
        Ok(())
    }

    /// Deletes all persisted history for this document.
    ///
    /// Called when a document is explicitly closed.
    ///
    /// # Errors
    ///
    /// Returns an error if disk cleanup fails.
    pub fn delete_history(&mut self) -> Result<()> {
        self.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{Layer, LayerKind};
    use crate::operation::LayerOperation;
    use tempfile::TempDir;

    fn state_with(kinds: &[LayerKind]) -> LayerState {
        let mut state = LayerState::new();
        for &kind in kinds {
            state.layers.push(Layer::new(kind));
        }
        state
    }

    fn small_config(dir: &std::path::Path) -> HistoryConfig {
        HistoryConfig {
            max_history_depth: 20,
            data_dir: dir.to_path_buf(),
        }
    }

    fn persistent_history(dir: &std::path::Path) -> (LayerStateHistory, Arc<PersistenceLayer>) {
        let pl = PersistenceLayer::open(dir).expect("open db");
        let history = LayerStateHistory::new(
            "test-doc".to_string(),
            small_config(dir),
            Some(Arc::clone(&pl)),
        );
        (history, pl)
    }

    // --- Basic cursor semantics (in-memory) ---

    #[test]
    fn test_seeded_with_empty_snapshot() {
        let history = LayerStateHistory::in_memory();
        assert_eq!(history.state_count(), 1);
        assert_eq!(history.current_state().layer_count(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_push_advances_cursor() {
        let mut history = LayerStateHistory::in_memory();
        history.push(state_with(&[LayerKind::Device]));
        assert_eq!(history.cursor, 1);
        assert_eq!(history.state_count(), 2);
        assert_eq!(history.current_state().layer_count(), 1);
    }

    #[test]
    fn test_undo_redo_restore_state_by_value() {
        let mut history = LayerStateHistory::in_memory();
        history.push(state_with(&[LayerKind::Device]));
        let snapshot = history.current_state().clone();
        history.push(state_with(&[LayerKind::Device, LayerKind::Text]));
        let top = history.current_state().clone();

        assert!(history.undo());
        assert_eq!(history.current_state(), &snapshot);

        assert!(history.redo());
        assert_eq!(history.current_state(), &top);
    }

    #[test]
    fn test_undo_at_start_is_noop() {
        let mut history = LayerStateHistory::in_memory();
        assert!(!history.undo());
        assert_eq!(history.cursor, 0);
        assert_eq!(history.state_count(), 1);
    }

    #[test]
    fn test_redo_at_end_is_noop() {
        let mut history = LayerStateHistory::in_memory();
        history.push(state_with(&[LayerKind::Content]));
        assert!(!history.redo());
        assert_eq!(history.cursor, 1);
    }

    #[test]
    fn test_can_undo_iff_cursor_past_start() {
        let mut history = LayerStateHistory::in_memory();
        assert!(!history.can_undo());
        history.push(state_with(&[LayerKind::Content]));
        assert!(history.can_undo());
        history.undo();
        assert!(!history.can_undo());
    }

    #[test]
    fn test_can_redo_iff_cursor_before_end() {
        let mut history = LayerStateHistory::in_memory();
        history.push(state_with(&[LayerKind::Content]));
        assert!(!history.can_redo());
        history.undo();
        assert!(history.can_redo());
        history.redo();
        assert!(!history.can_redo());
    }

    #[test]
    fn test_push_after_undo_discards_redo_branch() {
        let mut history = LayerStateHistory::in_memory();
        history.push(state_with(&[LayerKind::Device]));
        history.push(state_with(&[LayerKind::Device, LayerKind::Text]));

        history.undo();
        assert!(history.can_redo());

        history.push(state_with(&[LayerKind::Device, LayerKind::Content]));
        assert!(!history.can_redo());
        assert_eq!(history.state_count(), 3);
        assert_eq!(history.cursor, 2);
    }

    #[test]
    fn test_branch_scenario() {
        // [] -> AddDevice -> AddText -> undo -> AddContent
        let mut history = LayerStateHistory::in_memory();
        assert_eq!(history.cursor, 0);

        LayerOperation::AddDevice.apply(&mut history);
        assert_eq!(history.cursor, 1);
        let device_only = history.current_state().clone();

        LayerOperation::AddText.apply(&mut history);
        assert_eq!(history.cursor, 2);

        history.undo();
        assert_eq!(history.current_state(), &device_only);

        LayerOperation::AddContent.apply(&mut history);
        assert_eq!(history.cursor, 2);
        assert_eq!(history.state_count(), 3);
        assert!(!history.can_redo());

        let kinds: Vec<LayerKind> = history
            .current_state()
            .layers
            .iter()
            .map(|l| l.kind)
            .collect();
        assert_eq!(kinds, vec![LayerKind::Device, LayerKind::Content]);
    }

    #[test]
    fn test_clear_resets_to_seed() {
        let mut history = LayerStateHistory::in_memory();
        history.push(state_with(&[LayerKind::Content]));
        history.push(state_with(&[LayerKind::Content, LayerKind::Text]));

        history.clear().expect("clear");
        assert_eq!(history.state_count(), 1);
        assert_eq!(history.current_state().layer_count(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_doc_id() {
        let history =
            LayerStateHistory::new("my-doc".to_string(), HistoryConfig::default(), None);
        assert_eq!(history.doc_id(), "my-doc");
    }

    // --- Depth limit ---

    #[test]
    fn test_max_depth_drops_oldest() {
        let config = HistoryConfig {
            max_history_depth: 5,
            data_dir: std::path::PathBuf::from("."),
        };
        let mut history = LayerStateHistory::new("test".to_string(), config, None);

        for i in 0..10 {
            let kinds = vec![LayerKind::Content; i + 1];
            history.push(state_with(&kinds));
        }

        assert_eq!(history.state_count(), 5);
        assert_eq!(history.cursor, 4);
        // Most recent snapshot survives; the seed and early pushes are gone
        assert_eq!(history.current_state().layer_count(), 10);
        // Undoing to the oldest retained snapshot works
        while history.undo() {}
        assert_eq!(history.current_state().layer_count(), 6);
    }

    // --- Persistence ---

    #[test]
    fn test_push_persists_undo_side() {
        let dir = TempDir::new().expect("create temp dir");
        let (mut history, pl) = persistent_history(dir.path());

        history.push(state_with(&[LayerKind::Device]));

        let stored = pl.read_states("test-doc").expect("read");
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1].layer_count(), 1);
    }

    #[test]
    fn test_flush_noop_when_not_dirty() {
        let dir = TempDir::new().expect("create temp dir");
        let (mut history, pl) = persistent_history(dir.path());

        history.flush().expect("flush");
        assert!(pl.load_meta("test-doc").expect("meta").is_none());
    }

    #[test]
    fn test_flush_after_undo_drops_redo_branch_from_disk() {
        let dir = TempDir::new().expect("create temp dir");
        let (mut history, pl) = persistent_history(dir.path());

        history.push(state_with(&[LayerKind::Device]));
        history.push(state_with(&[LayerKind::Device, LayerKind::Text]));
        assert_eq!(pl.count_states("test-doc").expect("count"), 3);

        history.undo();
        history.flush().expect("flush");
        assert_eq!(pl.count_states("test-doc").expect("count"), 2);
    }

    #[test]
    fn test_load_or_new_restores_history() {
        let dir = TempDir::new().expect("create temp dir");
        let config = small_config(dir.path());

        {
            let pl = PersistenceLayer::open(dir.path()).expect("open");
            let mut history = LayerStateHistory::new(
                "restore-doc".to_string(),
                config.clone(),
                Some(Arc::clone(&pl)),
            );
            history.push(state_with(&[LayerKind::Content]));
            history.push(state_with(&[LayerKind::Content, LayerKind::Device]));
            history.flush().expect("flush");
        }

        {
            let pl = PersistenceLayer::open(dir.path()).expect("reopen");
            let mut history =
                LayerStateHistory::load_or_new("restore-doc".to_string(), config, Some(pl))
                    .expect("load");

            assert_eq!(history.state_count(), 3);
            assert_eq!(history.current_state().layer_count(), 2);
            assert!(history.can_undo());
            assert!(!history.can_redo());

            history.undo();
            assert_eq!(history.current_state().layer_count(), 1);
            history.undo();
            assert_eq!(history.current_state().layer_count(), 0);
            assert!(!history.can_undo());
        }
    }

    #[test]
    fn test_load_or_new_fresh_document() {
        let dir = TempDir::new().expect("create temp dir");
        let pl = PersistenceLayer::open(dir.path()).expect("open");

        let history =
            LayerStateHistory::load_or_new("new-doc".to_string(), small_config(dir.path()), Some(pl))
                .expect("load");

        assert_eq!(history.state_count(), 1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_delete_history_clears_disk() {
        let dir = TempDir::new().expect("create temp dir");
        let (mut history, pl) = persistent_history(dir.path());

        history.push(state_with(&[LayerKind::Text]));
        assert!(pl.count_states("test-doc").expect("count") > 0);

        history.delete_history().expect("delete");
        assert_eq!(pl.count_states("test-doc").expect("count"), 0);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_multiple_documents_independent() {
        let dir = TempDir::new().expect("create temp dir");
        let pl = PersistenceLayer::open(dir.path()).expect("open");
        let config = small_config(dir.path());

        let mut history_a = LayerStateHistory::new(
            "doc-a".to_string(),
            config.clone(),
            Some(Arc::clone(&pl)),
        );
        let mut history_b =
            LayerStateHistory::new("doc-b".to_string(), config, Some(Arc::clone(&pl)));

        history_a.push(state_with(&[LayerKind::Content]));
        history_b.push(state_with(&[LayerKind::Device]));

        history_a.delete_history().expect("delete a");

        assert_eq!(pl.count_states("doc-a").expect("count"), 0);
        assert_eq!(pl.count_states("doc-b").expect("count"), 2);
        assert!(!history_a.can_undo());
        assert!(history_b.can_undo());
    }
}
