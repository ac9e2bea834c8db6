//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering and persistence

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Model, Toast, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;

use crate::ui::style::Theme;

/// Filename Ctrl+E writes into the working directory.
pub const EXPORT_FILENAME: &str = "markdown-export.md";

/// The document shown on first launch, before anything was persisted.
pub const DEFAULT_DOCUMENT: &str = include_str!("welcome.md");

/// How long an edit burst must be quiet before the document is persisted.
pub const AUTOSAVE_DELAY_MS: u64 = 500;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    initial_file: Option<PathBuf>,
    store_path: Option<PathBuf>,
    theme_override: Option<Theme>,
    default_theme: Theme,
    read_only: bool,
}

impl App {
    pub const fn new() -> Self {
        Self {
            initial_file: None,
            store_path: None,
            theme_override: None,
            default_theme: Theme::Dark,
            read_only: false,
        }
    }

    /// Open a markdown file instead of the stored document.
    pub fn with_initial_file(mut self, path: Option<PathBuf>) -> Self {
        self.initial_file = path;
        self
    }

    /// Use a specific store file instead of the default location.
    pub fn with_store_path(mut self, path: Option<PathBuf>) -> Self {
        self.store_path = path;
        self
    }

    /// Force a theme, overriding the persisted one and terminal detection.
    pub const fn with_theme(mut self, theme: Option<Theme>) -> Self {
        self.theme_override = theme;
        self
    }

    /// Theme used when the store has no persisted choice, e.g. the one
    /// detected from the terminal background.
    pub const fn with_default_theme(mut self, theme: Theme) -> Self {
        self.default_theme = theme;
        self
    }

    /// Reject edits; useful for viewing a store another instance owns.
    pub const fn with_read_only(mut self, enabled: bool) -> Self {
        self.read_only = enabled;
        self
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
