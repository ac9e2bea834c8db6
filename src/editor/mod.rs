//! Text editing: the rope-backed buffer and list-aware key handling.

mod buffer;
pub mod list;

pub use buffer::{Cursor, Direction, EditorBuffer};
