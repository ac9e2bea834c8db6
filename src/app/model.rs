use std::time::{Duration, Instant};

use crate::editor::EditorBuffer;
use crate::preview::Preview;
use crate::sync::{LATCH_WINDOW_MS, Pane, ScrollSync};
use crate::ui;
use crate::ui::style::Theme;
use crate::ui::viewport::Viewport;

/// Severity of a transient status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

/// A transient status message shown in the footer.
#[derive(Debug, Clone)]
pub struct Toast {
    pub level: ToastLevel,
    pub text: String,
    shown_at: Instant,
}

const TOAST_DURATION: Duration = Duration::from_secs(3);

/// The complete application state.
#[derive(Debug)]
pub struct Model {
    /// The markdown source being edited
    pub buffer: EditorBuffer,
    /// Rendered preview of the buffer
    pub preview: Preview,
    /// Current color theme
    pub theme: Theme,
    /// Theme to fall back to when the stored theme key is cleared
    pub default_theme: Theme,
    /// Which pane keyboard input targets
    pub focus: Pane,
    /// Scroll state of the editor pane
    pub editor_viewport: Viewport,
    /// Scroll state of the preview pane
    pub preview_viewport: Viewport,
    /// Proportional scroll mirroring between the panes
    pub sync: ScrollSync,
    /// Import prompt input, `Some` while the prompt is open
    pub import_prompt: Option<String>,
    /// Path submitted from the import prompt, consumed by effects
    pub pending_import: Option<String>,
    /// Transient footer message
    pub toast: Option<Toast>,
    /// Edits are rejected when set
    pub read_only: bool,
    /// Terminal size
    pub terminal_size: (u16, u16),
    /// Counts document edits so the autosave flushes the latest text
    pub revision: u64,
    /// Set by the Quit message, breaks the event loop
    pub should_quit: bool,
}

impl Default for Model {
    fn default() -> Self {
        Self::new(String::new(), Theme::Dark, (80, 24))
    }
}

impl Model {
    /// Create the initial model from the persisted document and theme.
    pub fn new(text: String, theme: Theme, terminal_size: (u16, u16)) -> Self {
        let buffer = EditorBuffer::from_text(&text);
        let (editor_area, preview_area, _) = ui::layout_areas(terminal_size.0, terminal_size.1);
        let preview = Preview::render(&text, preview_area.width, theme);
        let editor_viewport =
            Viewport::new(editor_area.width, editor_area.height, buffer.line_count());
        let preview_viewport = Viewport::new(
            preview_area.width,
            preview_area.height,
            preview.line_count(),
        );

        Self {
            buffer,
            preview,
            theme,
            default_theme: theme,
            focus: Pane::Editor,
            editor_viewport,
            preview_viewport,
            sync: ScrollSync::new(LATCH_WINDOW_MS),
            import_prompt: None,
            pending_import: None,
            toast: None,
            read_only: false,
            terminal_size,
            revision: 0,
            should_quit: false,
        }
    }

    /// Re-render the preview and refresh both viewports' content lengths.
    ///
    /// Called after every buffer change and on theme or size changes.
    pub fn refresh_preview(&mut self) {
        self.preview = Preview::render(
            &self.buffer.text(),
            self.preview_viewport.width(),
            self.theme,
        );
        self.editor_viewport
            .set_total_lines(self.buffer.line_count());
        self.preview_viewport
            .set_total_lines(self.preview.line_count());
    }

    /// Record a document edit and keep the cursor on screen.
    pub fn after_edit(&mut self) {
        self.revision = self.revision.wrapping_add(1);
        self.refresh_preview();
        self.editor_viewport
            .ensure_visible(self.buffer.cursor().line);
    }

    /// Apply the new terminal size to the pane layout.
    pub fn apply_resize(&mut self, width: u16, height: u16) {
        self.terminal_size = (width, height);
        let (editor_area, preview_area, _) = ui::layout_areas(width, height);
        self.editor_viewport
            .resize(editor_area.width, editor_area.height);
        self.preview_viewport
            .resize(preview_area.width, preview_area.height);
        self.refresh_preview();
    }

    /// The viewport for a pane.
    pub const fn viewport(&self, pane: Pane) -> &Viewport {
        match pane {
            Pane::Editor => &self.editor_viewport,
            Pane::Preview => &self.preview_viewport,
        }
    }

    /// The viewport for a pane, mutably.
    pub const fn viewport_mut(&mut self, pane: Pane) -> &mut Viewport {
        match pane {
            Pane::Editor => &mut self.editor_viewport,
            Pane::Preview => &mut self.preview_viewport,
        }
    }

    pub fn show_toast(&mut self, level: ToastLevel, text: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            text: text.into(),
            shown_at: Instant::now(),
        });
    }

    /// Drop an expired toast. Returns `true` if one was removed.
    pub fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|t| now.duration_since(t.shown_at) >= TOAST_DURATION)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub const fn prompt_active(&self) -> bool {
        self.import_prompt.is_some()
    }
}
