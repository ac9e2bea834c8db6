use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::{App, AUTOSAVE_DELAY_MS, DEFAULT_DOCUMENT, Message, Model, ToastLevel, update};
use crate::store::{self, DOCUMENT_KEY, FileStore, StoreWatcher, THEME_KEY};
use crate::sync::Pane;
use crate::ui;

/// Store watch debounce, absorbs partial-write event bursts.
const STORE_WATCH_DEBOUNCE: Duration = Duration::from_millis(200);

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Trailing-edge debounce for document persistence.
///
/// Every edit re-queues; the write happens only after the delay passes
/// with no further edits.
pub(super) struct AutosaveDebouncer {
    delay_ms: u64,
    queued_at: Option<u64>,
}

impl AutosaveDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            queued_at: None,
        }
    }

    pub(super) const fn queue(&mut self, now_ms: u64) {
        self.queued_at = Some(now_ms);
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> bool {
        let Some(queued_at) = self.queued_at else {
            return false;
        };
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.queued_at = None;
            true
        } else {
            false
        }
    }

    pub(super) const fn cancel(&mut self) {
        self.queued_at = None;
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.queued_at.is_some()
    }
}

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal initialization fails or the event
    /// loop encounters an I/O failure. Store trouble never aborts the
    /// session; it degrades to defaults with a warning.
    pub fn run(&mut self) -> Result<()> {
        let store_path = match self.store_path.take() {
            Some(path) => path,
            None => store::default_store_path(),
        };
        let mut file_store = FileStore::new(&store_path);

        // Startup catch-up: whatever the store holds right now wins over
        // defaults, including writes made while no instance was running.
        // A file named on the command line outranks both.
        let document = match self.initial_file.take() {
            Some(path) => match std::fs::read_to_string(&path) {
                Ok(raw) => super::effects::normalize_line_endings(&raw),
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "could not open file, falling back to store");
                    store::read(&file_store, DOCUMENT_KEY, DEFAULT_DOCUMENT.to_string())
                }
            },
            None => store::read(&file_store, DOCUMENT_KEY, DEFAULT_DOCUMENT.to_string()),
        };
        let theme = self.theme_override.map_or_else(
            || store::read(&file_store, THEME_KEY, self.default_theme),
            |theme| theme,
        );

        let store_watcher = match StoreWatcher::new(&store_path, STORE_WATCH_DEBOUNCE) {
            Ok(watcher) => Some(watcher),
            Err(err) => {
                tracing::warn!(%err, path = %store_path.display(), "store watch unavailable");
                None
            }
        };

        let mut terminal = ratatui::try_init()
            .context("failed to initialize terminal; livemark requires an interactive terminal")?;
        execute!(stdout(), EnableMouseCapture)?;
        let size = terminal.size()?;

        let mut model = Model::new(document, theme, (size.width, size.height));
        model.default_theme = self.theme_override.unwrap_or(self.default_theme);
        model.read_only = self.read_only;
        if store_watcher.is_none() {
            model.show_toast(ToastLevel::Warning, "Store watch unavailable");
        }

        let result = Self::event_loop(&mut terminal, &mut model, &mut file_store, store_watcher);

        let _ = execute!(stdout(), DisableMouseCapture);
        ratatui::restore();
        result
    }

    fn event_loop(
        terminal: &mut DefaultTerminal,
        model: &mut Model,
        file_store: &mut FileStore,
        mut store_watcher: Option<StoreWatcher>,
    ) -> Result<()> {
        let start = Instant::now();
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut autosave = AutosaveDebouncer::new(AUTOSAVE_DELAY_MS);
        let mut needs_render = true;

        loop {
            let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                *model = update(std::mem::take(model), Message::Resize(width, height));
                needs_render = true;
            }

            if autosave.take_ready(now_ms) {
                Self::flush_document(model, file_store);
                needs_render = true;
            }

            if let Some(ref mut watcher) = store_watcher
                && let Some(change) = watcher.take_external_change(file_store.last_written_hash())
            {
                needs_render |= Self::apply_external_change(model, &change, autosave.is_pending());
            }

            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            let poll_ms = if needs_render {
                0
            } else if resize_debouncer.is_pending() || autosave.is_pending() {
                10
            } else {
                50
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                let event_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                if let Some(msg) =
                    Self::handle_event(&event::read()?, model, event_ms, &mut resize_debouncer)
                {
                    Self::apply_message(model, file_store, &mut autosave, msg, event_ms);
                    needs_render = true;
                }

                // Coalesce key repeat bursts into a single render.
                while event::poll(Duration::from_millis(0))? {
                    let drain_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    if let Some(msg) =
                        Self::handle_event(&event::read()?, model, drain_ms, &mut resize_debouncer)
                    {
                        Self::apply_message(model, file_store, &mut autosave, msg, drain_ms);
                        needs_render = true;
                    }
                }
            }

            if needs_render {
                terminal.draw(|frame| ui::render(model, frame))?;
                needs_render = false;
            }

            if model.should_quit {
                // Pending saves die with the session; quitting mid-debounce
                // must not write.
                autosave.cancel();
                model.sync.cancel();
                break;
            }
        }
        Ok(())
    }

    /// Run one message through update, side effects, autosave arming, and
    /// scroll mirroring.
    fn apply_message(
        model: &mut Model,
        file_store: &mut FileStore,
        autosave: &mut AutosaveDebouncer,
        msg: Message,
        now_ms: u64,
    ) {
        let revision_before = model.revision;
        let editor_offset = model.editor_viewport.offset();
        let preview_offset = model.preview_viewport.offset();

        let side_msg = msg.clone();
        *model = update(std::mem::take(model), msg);
        Self::handle_message_side_effects(model, file_store, &side_msg);

        if model.revision != revision_before && !model.read_only {
            autosave.queue(now_ms);
        }

        let scrolled = if model.editor_viewport.offset() != editor_offset {
            Some(Pane::Editor)
        } else if model.preview_viewport.offset() != preview_offset {
            Some(Pane::Preview)
        } else {
            None
        };
        if let Some(source) = scrolled {
            Self::mirror_scroll(model, source, now_ms);
        }
    }

    fn mirror_scroll(model: &mut Model, source: Pane, now_ms: u64) {
        let src = model.viewport(source).clone();
        let dst = model.viewport(source.other()).clone();
        if let Some(offset) = model.sync.mirror(source, &src, &dst, now_ms) {
            model.viewport_mut(source.other()).go_to_line(offset);
        }
    }

    fn flush_document(model: &mut Model, file_store: &mut FileStore) {
        store::write(file_store, DOCUMENT_KEY, &model.buffer.text());
        model.buffer.mark_clean();
    }

    /// Fold an external store change into the model.
    ///
    /// Returns `true` when anything visible changed. A pending local save
    /// outranks an external document edit: the last local write wins and
    /// will overwrite it when the debounce fires.
    fn apply_external_change(
        model: &mut Model,
        change: &crate::store::ExternalChange,
        save_pending: bool,
    ) -> bool {
        let mut changed = false;
        for (key, value) in &change.entries {
            match key.as_str() {
                DOCUMENT_KEY => {
                    if save_pending {
                        tracing::debug!("external document change ignored, local save pending");
                        continue;
                    }
                    let text = value
                        .as_ref()
                        .and_then(|v| v.as_str().map(str::to_string));
                    *model = update(std::mem::take(model), Message::ExternalDocument(text));
                    changed = true;
                }
                THEME_KEY => {
                    let theme = value
                        .as_ref()
                        .and_then(|v| serde_json::from_value(v.clone()).ok());
                    *model = update(std::mem::take(model), Message::ExternalTheme(theme));
                    changed = true;
                }
                other => {
                    tracing::debug!(key = other, "ignoring unknown store key change");
                }
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_autosave_waits_out_the_delay() {
        let mut autosave = AutosaveDebouncer::new(500);
        autosave.queue(0);
        assert!(!autosave.take_ready(499));
        assert!(autosave.take_ready(500));
        assert!(!autosave.is_pending());
    }

    #[test]
    fn test_autosave_requeue_replaces_pending() {
        // Edits at t=0, 100, 200: nothing may fire before 700.
        let mut autosave = AutosaveDebouncer::new(500);
        autosave.queue(0);
        autosave.queue(100);
        autosave.queue(200);
        assert!(!autosave.take_ready(500));
        assert!(!autosave.take_ready(699));
        assert!(autosave.take_ready(700));
    }

    #[test]
    fn test_autosave_cancel_discards_pending() {
        let mut autosave = AutosaveDebouncer::new(500);
        autosave.queue(0);
        autosave.cancel();
        assert!(!autosave.take_ready(10_000));
    }

    #[test]
    fn test_resize_debouncer_keeps_latest() {
        let mut debouncer = ResizeDebouncer::new(100);
        debouncer.queue(80, 24, 0);
        debouncer.queue(120, 40, 50);
        assert_eq!(debouncer.take_ready(150), Some((120, 40)));
        assert!(!debouncer.is_pending());
    }
}
