use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use unicode_width::UnicodeWidthChar;

use crate::app::{App, Message, Model};
use crate::editor::Direction;
use crate::sync::Pane;
use crate::ui;

use super::event_loop::ResizeDebouncer;

/// Lines moved per mouse wheel notch.
const WHEEL_SCROLL_LINES: usize = 3;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Resize(w, h) => {
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            _ => None,
        }
    }

    fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        // The import prompt captures everything except Ctrl+Q.
        if model.prompt_active() {
            return match key.code {
                KeyCode::Char('q') if ctrl => Some(Message::Quit),
                KeyCode::Esc => Some(Message::PromptCancel),
                KeyCode::Enter => Some(Message::PromptSubmit),
                KeyCode::Backspace => Some(Message::PromptBackspace),
                KeyCode::Char(ch) if !ctrl => Some(Message::PromptInput(ch)),
                _ => None,
            };
        }

        if ctrl {
            return match key.code {
                KeyCode::Char('q') => Some(Message::Quit),
                KeyCode::Char('t') => Some(Message::ToggleTheme),
                KeyCode::Char('o') => Some(Message::OpenImportPrompt),
                KeyCode::Char('e') => Some(Message::Export),
                KeyCode::Char('p') => Some(Message::SwitchFocus),
                KeyCode::Home => Some(Message::MoveToStart),
                KeyCode::End => Some(Message::MoveToEnd),
                _ => None,
            };
        }

        match model.focus {
            Pane::Editor => Self::handle_editor_key(key),
            Pane::Preview => Self::handle_preview_key(key),
        }
    }

    fn handle_editor_key(key: KeyEvent) -> Option<Message> {
        match key.code {
            KeyCode::Char(ch) => Some(Message::InsertChar(ch)),
            KeyCode::Enter => Some(Message::InsertNewline),
            KeyCode::Tab => Some(Message::InsertIndent),
            KeyCode::BackTab => Some(Message::Outdent),
            KeyCode::Backspace => Some(Message::DeleteBack),
            KeyCode::Delete => Some(Message::DeleteForward),
            KeyCode::Up => Some(Message::MoveCursor(Direction::Up)),
            KeyCode::Down => Some(Message::MoveCursor(Direction::Down)),
            KeyCode::Left => Some(Message::MoveCursor(Direction::Left)),
            KeyCode::Right => Some(Message::MoveCursor(Direction::Right)),
            KeyCode::Home => Some(Message::MoveHome),
            KeyCode::End => Some(Message::MoveEnd),
            KeyCode::PageUp => Some(Message::PageUp),
            KeyCode::PageDown => Some(Message::PageDown),
            _ => None,
        }
    }

    fn handle_preview_key(key: KeyEvent) -> Option<Message> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(Message::ScrollUp(Pane::Preview, 1)),
            KeyCode::Down | KeyCode::Char('j') => Some(Message::ScrollDown(Pane::Preview, 1)),
            KeyCode::PageUp => Some(Message::PageUp),
            KeyCode::PageDown => Some(Message::PageDown),
            KeyCode::Home | KeyCode::Char('g') => Some(Message::ScrollUp(Pane::Preview, usize::MAX)),
            KeyCode::End | KeyCode::Char('G') => {
                Some(Message::ScrollDown(Pane::Preview, usize::MAX))
            }
            _ => None,
        }
    }

    fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        let (width, height) = model.terminal_size;
        let pane = ui::pane_at_column(mouse.column, width, height);

        match mouse.kind {
            MouseEventKind::ScrollUp => Some(Message::ScrollUp(pane, WHEEL_SCROLL_LINES)),
            MouseEventKind::ScrollDown => Some(Message::ScrollDown(pane, WHEEL_SCROLL_LINES)),
            MouseEventKind::Down(MouseButton::Left) if pane == Pane::Editor => {
                let (editor_area, _, _) = ui::layout_areas(width, height);
                let in_pane = mouse.column >= editor_area.x
                    && mouse.column < editor_area.x + editor_area.width
                    && mouse.row >= editor_area.y
                    && mouse.row < editor_area.y + editor_area.height;
                if !in_pane {
                    return None;
                }
                let line =
                    model.editor_viewport.offset() + (mouse.row - editor_area.y) as usize;
                let display_col = (mouse.column - editor_area.x) as usize;
                let text = model.buffer.line_at(line).unwrap_or_default();
                Some(Message::MoveTo(line, byte_col_at_display_col(&text, display_col)))
            }
            _ => None,
        }
    }
}

/// Byte offset of the character occupying `display_col` terminal cells
/// into `line`, past the end for clicks beyond the text.
fn byte_col_at_display_col(line: &str, display_col: usize) -> usize {
    let mut width = 0;
    for (idx, ch) in line.char_indices() {
        let w = ch.width().unwrap_or(0);
        if display_col < width + w {
            return idx;
        }
        width += w;
    }
    line.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_col_maps_ascii_one_to_one() {
        assert_eq!(byte_col_at_display_col("hello", 0), 0);
        assert_eq!(byte_col_at_display_col("hello", 3), 3);
        assert_eq!(byte_col_at_display_col("hello", 99), 5);
    }

    #[test]
    fn test_display_col_accounts_for_multibyte() {
        // 'é' is 2 bytes but 1 cell wide.
        assert_eq!(byte_col_at_display_col("héllo", 2), 3);
        assert_eq!(byte_col_at_display_col("héllo", 1), 1);
    }

    #[test]
    fn test_display_col_accounts_for_wide_chars() {
        // '漢' is 3 bytes and 2 cells wide; both cells select it.
        assert_eq!(byte_col_at_display_col("a漢b", 1), 1);
        assert_eq!(byte_col_at_display_col("a漢b", 2), 1);
        assert_eq!(byte_col_at_display_col("a漢b", 3), 4);
    }

    #[test]
    fn test_click_on_multibyte_line_places_cursor_at_cell() {
        let model = crate::app::Model::new("héllo".to_string(), crate::ui::style::Theme::Dark, (80, 24));
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 3, // pane inner starts at x=1; third text cell
            row: 1,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(
            App::handle_mouse(click, &model),
            Some(Message::MoveTo(0, 3))
        );
    }
}
