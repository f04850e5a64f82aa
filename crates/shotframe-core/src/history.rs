// Re-exports from shotframe-mod-history so downstream code only needs
// the core crate in scope.
pub use shotframe_mod_history::config::{doc_id_for_path, generate_unsaved_id};
pub use shotframe_mod_history::{
    HistoryConfig, Layer, LayerKind, LayerOperation, LayerState, LayerStateHistory,
    PersistenceLayer,
};
