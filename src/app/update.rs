use crate::app::model::{Model, ToastLevel};
use crate::editor::{Direction, list};
use crate::sync::Pane;
use crate::ui::style::Theme;

/// All possible events and actions in the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Editing
    /// Insert a character at the cursor
    InsertChar(char),
    /// Enter: split the line, continuing or ending a list as needed
    InsertNewline,
    /// Tab: insert the soft indent
    InsertIndent,
    /// Shift+Tab: remove one soft indent from the line start
    Outdent,
    /// Delete character before cursor (Backspace)
    DeleteBack,
    /// Delete character at cursor (Delete)
    DeleteForward,

    // Cursor movement
    /// Move cursor in a direction
    MoveCursor(Direction),
    /// Move cursor to beginning of line (Home)
    MoveHome,
    /// Move cursor to end of line (End)
    MoveEnd,
    /// Move cursor to start of buffer (Ctrl+Home)
    MoveToStart,
    /// Move cursor to end of buffer (Ctrl+End)
    MoveToEnd,
    /// Move cursor to absolute position, e.g. from a mouse click
    MoveTo(usize, usize),

    // Scrolling
    /// Scroll a pane up by n lines
    ScrollUp(Pane, usize),
    /// Scroll a pane down by n lines
    ScrollDown(Pane, usize),
    /// Scroll the focused pane up one page
    PageUp,
    /// Scroll the focused pane down one page
    PageDown,

    // Chrome
    /// Switch keyboard focus between the panes
    SwitchFocus,
    /// Flip between the light and dark theme
    ToggleTheme,

    // Store sync
    /// Another instance changed the stored document (`None`: key cleared)
    ExternalDocument(Option<String>),
    /// Another instance changed the stored theme (`None`: key cleared)
    ExternalTheme(Option<Theme>),

    // Import / export
    /// Open the import path prompt
    OpenImportPrompt,
    /// Type a character into the prompt
    PromptInput(char),
    /// Delete the last prompt character
    PromptBackspace,
    /// Close the prompt without importing
    PromptCancel,
    /// Submit the prompt path for import
    PromptSubmit,
    /// Write the document to the export file
    Export,

    // Window
    /// Terminal resized
    Resize(u16, u16),

    // Application
    /// Quit the application
    Quit,
}

impl Message {
    /// Whether this message modifies the document and should arm the
    /// autosave. External store changes deliberately do not: echoing them
    /// back would ping-pong writes between instances.
    pub const fn edits_document(&self) -> bool {
        matches!(
            self,
            Self::InsertChar(_)
                | Self::InsertNewline
                | Self::InsertIndent
                | Self::Outdent
                | Self::DeleteBack
                | Self::DeleteForward
                | Self::PromptSubmit
        )
    }
}

/// Pure function that updates the model based on a message.
///
/// This is the core of TEA: all state transitions happen here, side
/// effects are applied afterwards by the event loop.
pub fn update(mut model: Model, msg: Message) -> Model {
    if model.read_only && msg.edits_document() {
        model.show_toast(ToastLevel::Warning, "Read-only session");
        return model;
    }

    match msg {
        // Editing
        Message::InsertChar(ch) => {
            model.buffer.insert_char(ch);
            model.after_edit();
        }
        Message::InsertNewline => {
            match list::enter_action(&model.buffer.line_before_cursor()) {
                list::EnterAction::PlainBreak => model.buffer.split_line(),
                list::EnterAction::ContinueList { insert } => model.buffer.insert_str(&insert),
                list::EnterAction::TerminateList { indent } => {
                    model.buffer.replace_line_to_cursor(&indent);
                }
            }
            model.after_edit();
        }
        Message::InsertIndent => {
            model.buffer.insert_str(list::INDENT);
            model.after_edit();
        }
        Message::Outdent => {
            let line = model
                .buffer
                .line_at(model.buffer.cursor().line)
                .unwrap_or_default();
            let width = list::outdent_width(&line);
            if width > 0 {
                model.buffer.remove_line_prefix(width);
                model.after_edit();
            }
        }
        Message::DeleteBack => {
            if model.buffer.delete_back() {
                model.after_edit();
            }
        }
        Message::DeleteForward => {
            if model.buffer.delete_forward() {
                model.after_edit();
            }
        }

        // Cursor movement
        Message::MoveCursor(direction) => {
            model.buffer.move_cursor(direction);
            model
                .editor_viewport
                .ensure_visible(model.buffer.cursor().line);
        }
        Message::MoveHome => model.buffer.move_home(),
        Message::MoveEnd => model.buffer.move_end(),
        Message::MoveToStart => {
            model.buffer.move_to_start();
            model.editor_viewport.go_to_top();
        }
        Message::MoveToEnd => {
            model.buffer.move_to_end();
            model
                .editor_viewport
                .ensure_visible(model.buffer.cursor().line);
        }
        Message::MoveTo(line, col) => {
            model.focus = Pane::Editor;
            model.buffer.move_to(line, col);
        }

        // Scrolling
        Message::ScrollUp(pane, n) => model.viewport_mut(pane).scroll_up(n),
        Message::ScrollDown(pane, n) => model.viewport_mut(pane).scroll_down(n),
        Message::PageUp => model.viewport_mut(model.focus).page_up(),
        Message::PageDown => model.viewport_mut(model.focus).page_down(),

        // Chrome
        Message::SwitchFocus => model.focus = model.focus.other(),
        Message::ToggleTheme => {
            model.theme = model.theme.toggled();
            model.refresh_preview();
        }

        // Store sync
        Message::ExternalDocument(text) => {
            let text = text.unwrap_or_else(|| crate::app::DEFAULT_DOCUMENT.to_string());
            model.buffer.set_text(&text);
            model.buffer.mark_clean();
            model.refresh_preview();
            model.editor_viewport.go_to_top();
            model.show_toast(ToastLevel::Info, "Document updated by another instance");
        }
        Message::ExternalTheme(theme) => {
            // A cleared key resets to the session default (the detected
            // terminal preference), not to a fixed theme.
            model.theme = theme.unwrap_or(model.default_theme);
            model.refresh_preview();
        }

        // Import / export
        Message::OpenImportPrompt => {
            if model.read_only {
                model.show_toast(ToastLevel::Warning, "Read-only session");
            } else {
                model.import_prompt = Some(String::new());
            }
        }
        Message::PromptInput(ch) => {
            if let Some(ref mut input) = model.import_prompt {
                input.push(ch);
            }
        }
        Message::PromptBackspace => {
            if let Some(ref mut input) = model.import_prompt {
                input.pop();
            }
        }
        Message::PromptCancel => model.import_prompt = None,
        Message::PromptSubmit => {
            // The file read happens in the effects layer.
            if let Some(input) = model.import_prompt.take() {
                let trimmed = input.trim().to_string();
                if trimmed.is_empty() {
                    model.show_toast(ToastLevel::Warning, "No file given");
                } else {
                    model.pending_import = Some(trimmed);
                }
            }
        }
        Message::Export => {}

        // Window
        Message::Resize(width, height) => model.apply_resize(width, height),

        // Application
        Message::Quit => model.should_quit = true,
    }

    model
}
