//! Document model for shotframe.
//!
//! A `Document` ties together the layer-state history, project metadata,
//! and view-state change notification. The GUI layer sits on top of this
//! crate: it constructs operations from user intents, applies them through
//! the document, and re-reads the current layer state to refresh itself.
pub mod document;
pub mod history;
pub mod notify;

pub use document::Document;
pub use notify::{SubscriptionId, ViewStateCallback, ViewStateNotifier};
