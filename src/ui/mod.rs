//! Terminal UI components.
//!
//! - [`viewport`]: Scroll position and visible range management
//! - [`style`]: Theming and colors
//! - rendering of the split editor/preview layout and the status bar

pub mod style;
pub mod viewport;

mod render;

pub use render::render;

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::sync::Pane;

pub const EDITOR_WIDTH_PERCENT: u16 = 50;
pub const PREVIEW_WIDTH_PERCENT: u16 = 50;

/// Split the full terminal into the pane row and the status bar row.
pub fn split_chrome(area: Rect) -> (Rect, Rect) {
    let main = Rect {
        height: area.height.saturating_sub(1),
        ..area
    };
    let status = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: 1,
        ..area
    };
    (main, status)
}

/// Split the main row into the editor and preview pane rects.
pub fn split_panes(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(EDITOR_WIDTH_PERCENT),
            Constraint::Percentage(PREVIEW_WIDTH_PERCENT),
        ])
        .split(area);
    (chunks[0], chunks[1])
}

/// The content area inside a pane's border.
pub fn pane_inner(area: Rect) -> Rect {
    Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}

/// Content areas for both panes plus the status row, for a terminal size.
///
/// The model sizes its viewports from this so they always agree with what
/// the renderer draws.
pub fn layout_areas(width: u16, height: u16) -> (Rect, Rect, Rect) {
    let area = Rect::new(0, 0, width, height);
    let (main, status) = split_chrome(area);
    let (editor, preview) = split_panes(main);
    (pane_inner(editor), pane_inner(preview), status)
}

/// Which pane a terminal column falls into.
pub fn pane_at_column(column: u16, width: u16, height: u16) -> Pane {
    let (_, preview_area, _) = layout_areas(width, height);
    if column >= preview_area.x.saturating_sub(1) {
        Pane::Preview
    } else {
        Pane::Editor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_reserves_status_row() {
        let (editor, preview, status) = layout_areas(80, 24);
        assert_eq!(status.y, 23);
        assert_eq!(status.height, 1);
        assert_eq!(editor.height, preview.height);
        assert_eq!(editor.height, 21); // 24 - status - 2 border rows
    }

    #[test]
    fn test_panes_split_the_width() {
        let (editor, preview, _) = layout_areas(80, 24);
        assert!(editor.x < preview.x);
        assert!(editor.width > 0 && preview.width > 0);
    }

    #[test]
    fn test_pane_at_column() {
        assert_eq!(pane_at_column(0, 80, 24), Pane::Editor);
        assert_eq!(pane_at_column(10, 80, 24), Pane::Editor);
        assert_eq!(pane_at_column(60, 80, 24), Pane::Preview);
        assert_eq!(pane_at_column(79, 80, 24), Pane::Preview);
    }

    #[test]
    fn test_tiny_terminal_does_not_underflow() {
        let (editor, preview, status) = layout_areas(2, 1);
        assert_eq!(editor.height, 0);
        assert_eq!(preview.height, 0);
        assert_eq!(status.height, 1);
    }
}
