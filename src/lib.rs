// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. store::StoreError)
    clippy::module_name_repetitions
)]

//! # Livemark
//!
//! A terminal live markdown editor with a synchronized preview pane.
//!
//! Livemark shows the markdown source on the left and the rendered
//! document on the right:
//! - Preview updates on every keystroke
//! - Proportional scroll sync between the two panes
//! - Debounced autosave and theme persistence to a JSON store
//! - Pickup of edits made by another running instance
//! - List-aware Tab / Shift+Tab / Enter handling
//!
//! ## Architecture
//!
//! Livemark uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`editor`]: Text buffer and list continuation
//! - [`preview`]: Markdown rendering to styled lines
//! - [`store`]: Persisted key-value store
//! - [`sync`]: Scroll synchronization between panes
//! - [`highlight`]: Syntax highlighting
//! - [`ui`]: Terminal UI components

pub mod app;
pub mod editor;
pub mod highlight;
pub mod preview;
pub mod store;
pub mod sync;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::editor::EditorBuffer;
    pub use crate::preview::Preview;
    pub use crate::store::{FileStore, KvStore, MemoryStore};
    pub use crate::ui::viewport::Viewport;
}
