/// Core types for layers and layer-stack snapshots.
use serde::{Deserialize, Serialize};

/// The kind of visual element a layer contributes to the composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerKind {
    /// A screenshot or other content image.
    Content,
    /// A device frame the content is composed into.
    Device,
    /// A text caption.
    Text,
}

impl LayerKind {
    /// Default display title for a freshly added layer of this kind.
    pub fn default_title(self) -> &'static str {
        match self {
            LayerKind::Content => "Content",
            LayerKind::Device => "Device",
            LayerKind::Text => "Text",
        }
    }
}

/// One visual element in the composed screenshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    /// Display title shown in the layer list.
    pub title: String,
    /// Type tag for the layer.
    pub kind: LayerKind,
}

impl Layer {
    /// Creates a layer of the given kind with its default title.
    pub fn new(kind: LayerKind) -> Self {
        Self {
            title: kind.default_title().to_string(),
            kind,
        }
    }

    /// Creates a layer of the given kind with an explicit title.
    pub fn with_title(kind: LayerKind, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind,
        }
    }
}

/// Snapshot of the full ordered layer list at one point in edit history.
///
/// Snapshots have value semantics: cloning produces fully owned data, so
/// deriving a new state from the current one can never alias or disturb
/// states already recorded in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerState {
    /// Layers in composition order. Index 0 is the bottom (background).
    pub layers: Vec<Layer>,
    /// Whether the layer at index 0 is protected from removal.
    ///
    /// The bottom layer anchors the composition; while this is set,
    /// removal requests targeting index 0 are ignored.
    #[serde(default = "default_root_locked")]
    pub root_locked: bool,
}

fn default_root_locked() -> bool {
    true
}

impl Default for LayerState {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerState {
    /// Creates an empty layer state with root protection enabled.
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            root_locked: true,
        }
    }

    /// Returns the number of layers in this snapshot.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Whether the layer at `index` may be removed.
    ///
    /// False when the index is out of range, or when it targets the
    /// protected bottom layer.
    pub fn is_removable(&self, index: usize) -> bool {
        index < self.layers.len() && !(index == 0 && self.root_locked)
    }

    /// Returns a new snapshot with `layer` appended on top.
    pub fn with_layer_added(&self, layer: Layer) -> Self {
        let mut next = self.clone();
        next.layers.push(layer);
        next
    }

    /// Returns a new snapshot with the layer at `index` removed.
    ///
    /// Returns `None` (no new snapshot) when `index` is not removable.
    pub fn with_layer_removed(&self, index: usize) -> Option<Self> {
        if !self.is_removable(index) {
            return None;
        }
        let mut next = self.clone();
        next.layers.remove(index);
        Some(next)
    }
}
