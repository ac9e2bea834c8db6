use crate::app::{App, EXPORT_FILENAME, Message, Model, ToastLevel};
use crate::store::{self, FileStore, THEME_KEY};

impl App {
    /// Apply the side effects a message carries after its pure update.
    ///
    /// Everything that touches the file system lives here so [`update`]
    /// stays pure and testable.
    ///
    /// [`update`]: crate::app::update
    pub(super) fn handle_message_side_effects(
        model: &mut Model,
        file_store: &mut FileStore,
        msg: &Message,
    ) {
        match msg {
            Message::ToggleTheme => {
                // Theme changes persist immediately, unlike the debounced
                // document.
                if !model.read_only {
                    store::write(file_store, THEME_KEY, &model.theme);
                }
            }
            Message::Export => {
                match std::fs::write(EXPORT_FILENAME, model.buffer.text()) {
                    Ok(()) => model.show_toast(
                        ToastLevel::Info,
                        format!("Exported to {EXPORT_FILENAME}"),
                    ),
                    Err(err) => {
                        model.show_toast(ToastLevel::Error, format!("Export failed: {err}"));
                    }
                }
            }
            Message::PromptSubmit => {
                if let Some(path) = model.pending_import.take() {
                    Self::import_file(model, &path);
                }
            }
            _ => {}
        }
    }

    fn import_file(model: &mut Model, path: &str) {
        if !is_markdown_path(path) {
            model.show_toast(
                ToastLevel::Warning,
                "Only .md / .markdown files can be imported",
            );
            return;
        }
        match std::fs::read_to_string(path) {
            Ok(raw) => {
                let text = normalize_line_endings(&raw);
                model.buffer.set_text(&text);
                model.after_edit();
                model.editor_viewport.go_to_top();
                model.preview_viewport.go_to_top();
                model.show_toast(ToastLevel::Info, format!("Imported {path}"));
            }
            Err(err) => {
                model.show_toast(ToastLevel::Error, format!("Import failed: {err}"));
            }
        }
    }
}

fn is_markdown_path(path: &str) -> bool {
    std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            ext == "md" || ext == "markdown"
        })
}

/// Imported files may carry CRLF or bare CR endings; the buffer expects
/// `\n` only.
pub(super) fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::{is_markdown_path, normalize_line_endings};

    #[test]
    fn test_normalize_crlf_and_cr() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\nd"), "a\nb\nc\nd");
    }

    #[test]
    fn test_markdown_extension_filter() {
        assert!(is_markdown_path("notes.md"));
        assert!(is_markdown_path("REPORT.MARKDOWN"));
        assert!(!is_markdown_path("image.png"));
        assert!(!is_markdown_path("no-extension"));
    }
}
