//! Project file I/O for documents.
//!
//! A project file is the current layer state plus the document title,
//! saved as pretty-printed JSON. Only the active snapshot is saved; the
//! edit history lives in the separate history database and is keyed by
//! the project's path once it has one.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::history::{doc_id_for_path, HistoryConfig, LayerState, LayerStateHistory, PersistenceLayer};
use crate::notify::ViewStateNotifier;

use super::Document;

/// On-disk project file contents.
#[derive(Debug, Serialize, Deserialize)]
struct ProjectFile {
    title: String,
    state: LayerState,
}

impl Document {
    /// Opens a project file with in-memory-only history.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_internal(path, None)
    }

    /// Opens a project file with persistent history.
    ///
    /// Loads existing undo history from disk if available; the loaded
    /// project state becomes the current snapshot either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read/parsed or history
    /// loading fails.
    pub fn open_with_persistence(
        path: &Path,
        persistence: Arc<PersistenceLayer>,
        config: &HistoryConfig,
    ) -> Result<Self> {
        Self::open_internal(path, Some((persistence, config)))
    }

    /// Internal open shared by `open()` and `open_with_persistence()`.
    fn open_internal(
        path: &Path,
        persistence: Option<(Arc<PersistenceLayer>, &HistoryConfig)>,
    ) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read project file: {}", path.display()))?;
        let project: ProjectFile = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse project file: {}", path.display()))?;

        let mut history = match persistence {
            Some((pl, config)) => {
                let doc_id = doc_id_for_path(path);
                LayerStateHistory::load_or_new(doc_id, config.clone(), Some(pl))
                    .context("failed to load undo history")?
            }
            None => LayerStateHistory::in_memory(),
        };

        // The file's state becomes current. When stored history already
        // ends at this state (normal save-then-reopen), don't push a
        // duplicate snapshot.
        if history.current_state() != &project.state {
            history.push(project.state);
        }

        Ok(Self {
            history,
            file_path: Some(path.to_path_buf()),
            title: project.title,
            modified: false,
            last_saved_at: None,
            state_version: 0,
            notifier: ViewStateNotifier::new(),
        })
    }

    /// Saves the document to its file path.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is set or the file cannot be written.
    pub fn save(&mut self) -> Result<()> {
        let path = self
            .file_path
            .as_ref()
            .context("no file path set for this document")?
            .clone();
        self.save_to(&path)
    }

    /// Saves the document to a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the file write fails.
    pub fn save_to(&mut self, path: &Path) -> Result<()> {
        let project = ProjectFile {
            title: self.title.clone(),
            state: self.current_state().clone(),
        };
        let json =
            serde_json::to_string_pretty(&project).context("failed to serialize project")?;

        std::fs::write(path, json)
            .with_context(|| format!("failed to write project file: {}", path.display()))?;

        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        self.last_saved_at = Some(chrono::Local::now());

        self.flush_history()
    }

    /// Flushes the undo history to disk.
    ///
    /// No-op if using in-memory-only history.
    ///
    /// # Errors
    ///
    /// Returns an error if the disk write fails.
    pub fn flush_history(&mut self) -> Result<()> {
        self.history.flush()
    }

    /// Deletes all persisted undo history for this document.
    ///
    /// Called when a document is explicitly closed.
    ///
    /// # Errors
    ///
    /// Returns an error if disk cleanup fails.
    pub fn delete_history(&mut self) -> Result<()> {
        self.history.delete_history()
    }
}
