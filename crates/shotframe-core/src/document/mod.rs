//! Document model combining the layer stack, history, and metadata.
//!
//! A `Document` owns a `LayerStateHistory` and exposes the user-facing
//! edit intents (add content/device/text, remove layer, undo, redo) as
//! methods. Every successful mutation bumps the state version and fires
//! the view-state-changed notification; failed edits (protected or
//! out-of-range removals, boundary undo/redo) leave the document
//! untouched and fire nothing. Project file I/O is in the `io` submodule.

mod io;

use std::path::PathBuf;
use std::sync::Arc;

use crate::history::{
    generate_unsaved_id, HistoryConfig, LayerOperation, LayerState, LayerStateHistory,
    PersistenceLayer,
};
use crate::notify::{SubscriptionId, ViewStateCallback, ViewStateNotifier};

/// A single screenshot project with its layer stack, history, and metadata.
pub struct Document {
    /// Undo/redo layer-state history.
    pub history: LayerStateHistory,
    /// File path on disk, if any.
    pub file_path: Option<PathBuf>,
    /// Display name for the document.
    pub title: String,
    /// Whether the document has been modified since last save.
    pub modified: bool,
    /// Timestamp of the last successful save to disk.
    pub last_saved_at: Option<chrono::DateTime<chrono::Local>>,
    /// Monotonically increasing version counter, bumped on every
    /// layer-state mutation. Lets UI caches detect changes without
    /// comparing layer lists.
    pub state_version: u64,
    /// View-state-changed subscribers.
    notifier: ViewStateNotifier,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("history", &self.history)
            .field("file_path", &self.file_path)
            .field("title", &self.title)
            .field("modified", &self.modified)
            .field("state_version", &self.state_version)
            .finish_non_exhaustive()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a new empty document with in-memory-only history.
    pub fn new() -> Self {
        Self::new_internal(None)
    }

    /// Creates a new empty document with persistent history.
    pub fn with_persistence(persistence: Arc<PersistenceLayer>, config: &HistoryConfig) -> Self {
        Self::new_internal(Some((persistence, config)))
    }

    /// Internal constructor shared by `new()` and `with_persistence()`.
    fn new_internal(persistence: Option<(Arc<PersistenceLayer>, &HistoryConfig)>) -> Self {
        let history = match persistence {
            Some((pl, config)) => {
                let doc_id = generate_unsaved_id();
                LayerStateHistory::new(doc_id, config.clone(), Some(pl))
            }
            None => LayerStateHistory::in_memory(),
        };
        Self {
            history,
            file_path: None,
            title: "Untitled".to_string(),
            modified: false,
            last_saved_at: None,
            state_version: 0,
            notifier: ViewStateNotifier::new(),
        }
    }

    /// Returns the active layer-state snapshot.
    pub fn current_state(&self) -> &LayerState {
        self.history.current_state()
    }

    /// Appends a content layer. Always succeeds.
    pub fn add_content_layer(&mut self) {
        self.apply_operation(LayerOperation::AddContent);
    }

    /// Appends a device-frame layer. Always succeeds.
    pub fn add_device_layer(&mut self) {
        self.apply_operation(LayerOperation::AddDevice);
    }

    /// Appends a text layer. Always succeeds.
    pub fn add_text_layer(&mut self) {
        self.apply_operation(LayerOperation::AddText);
    }

    /// Removes the layer at `index`.
    ///
    /// Returns `false` without touching the document when the index is
    /// out of range or targets the protected bottom layer.
    pub fn remove_layer(&mut self, index: usize) -> bool {
        self.apply_operation(LayerOperation::RemoveLayer { index })
    }

    /// Applies an operation, notifying observers if a snapshot was pushed.
    pub fn apply_operation(&mut self, op: LayerOperation) -> bool {
        if op.apply(&mut self.history) {
            self.touch();
            true
        } else {
            false
        }
    }

    /// Whether undo is available.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether redo is available.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Steps the history back one snapshot.
    ///
    /// Returns whether anything changed; a no-op at the boundary.
    pub fn undo(&mut self) -> bool {
        if self.history.undo() {
            self.touch();
            true
        } else {
            false
        }
    }

    /// Steps the history forward one snapshot.
    ///
    /// Returns whether anything changed; a no-op at the boundary.
    pub fn redo(&mut self) -> bool {
        if self.history.redo() {
            self.touch();
            true
        } else {
            false
        }
    }

    /// Registers a view-state observer.
    ///
    /// The callback runs synchronously after every successful mutation
    /// with the new state version.
    pub fn subscribe(&mut self, callback: ViewStateCallback) -> SubscriptionId {
        self.notifier.subscribe(callback)
    }

    /// Removes a view-state observer. Returns whether it existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Returns the document's history identifier.
    pub fn doc_id(&self) -> &str {
        self.history.doc_id()
    }

    /// Marks the document dirty and publishes the change.
    fn touch(&mut self) {
        self.modified = true;
        self.state_version += 1;
        self.notifier.notify(self.state_version);
    }
}
