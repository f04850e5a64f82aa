/// Edit commands applied against the layer-state history.
use serde::{Deserialize, Serialize};

use crate::layer::{Layer, LayerKind};
use crate::manager::LayerStateHistory;

/// A single discrete edit intent against the layer stack.
///
/// Operations are transient values: the caller constructs one per user
/// action, applies it, and drops it. Applying reads the current snapshot,
/// derives a new one, and pushes it onto the history, so the history
/// stays a plain append-only log of states with no inverse-operation
/// bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerOperation {
    /// Append a content (screenshot image) layer.
    AddContent,
    /// Append a device-frame layer.
    AddDevice,
    /// Append a text caption layer.
    AddText,
    /// Remove the layer at the given index, if allowed.
    RemoveLayer { index: usize },
}

impl LayerOperation {
    /// Applies this operation, pushing a new snapshot on success.
    ///
    /// Returns `false` and leaves the history untouched when a removal
    /// targets an out-of-range or protected index. Callers use the return
    /// value to decide whether observers need notifying.
    pub fn apply(&self, history: &mut LayerStateHistory) -> bool {
        let current = history.current_state();
        let next = match *self {
            LayerOperation::AddContent => {
                Some(current.with_layer_added(Layer::new(LayerKind::Content)))
            }
            LayerOperation::AddDevice => {
                Some(current.with_layer_added(Layer::new(LayerKind::Device)))
            }
            LayerOperation::AddText => Some(current.with_layer_added(Layer::new(LayerKind::Text))),
            LayerOperation::RemoveLayer { index } => current.with_layer_removed(index),
        };

        match next {
            Some(state) => {
                history.push(state);
                true
            }
            None => false,
        }
    }
}
