/// Layer-state history management for screenshot documents.
///
/// Provides a `LayerStateHistory` that keeps an ordered sequence of
/// layer-stack snapshots with a cursor for undo/redo, and can optionally
/// persist the undo side of the history to an embedded key-value store
/// (redb) so it survives across application sessions.
pub mod config;
pub mod layer;
pub mod manager;
pub mod operation;
pub mod persistence;

pub use config::HistoryConfig;
pub use layer::{Layer, LayerKind, LayerState};
pub use manager::LayerStateHistory;
pub use operation::LayerOperation;
pub use persistence::PersistenceLayer;
