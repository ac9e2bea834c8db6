//! Theming and color definitions.
//!
//! The application theme is a two-state toggle persisted to the store.
//! Styles use semantic ANSI colors on dark terminals and darker indexed
//! colors on light ones so both stay readable.

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

use crate::preview::{InlineColor, InlineStyle, LineKind};

/// The application color theme.
///
/// Serialized as `"light"` / `"dark"` in the store so other instances
/// (and hand-edited store files) read naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// The opposite theme, for the toggle action.
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub const fn is_light(self) -> bool {
        matches!(self, Self::Light)
    }

    /// Display name for the status bar.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Base style for a preview line kind.
pub fn style_for_line_kind(theme: Theme, kind: LineKind) -> Style {
    let light = theme.is_light();
    match kind {
        LineKind::Heading(1) => Style::default()
            .fg(if light { Color::Indexed(24) } else { Color::Cyan })
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        LineKind::Heading(2) => Style::default()
            .fg(if light { Color::Indexed(22) } else { Color::Green })
            .add_modifier(Modifier::BOLD),
        LineKind::Heading(3) => Style::default()
            .fg(if light { Color::Indexed(58) } else { Color::Yellow })
            .add_modifier(Modifier::BOLD),
        LineKind::Heading(_) => Style::default()
            .fg(if light { Color::Indexed(24) } else { Color::Blue })
            .add_modifier(Modifier::BOLD),
        LineKind::CodeBlock => Style::default().fg(if light {
            Color::Indexed(238)
        } else {
            Color::Indexed(245)
        }),
        LineKind::BlockQuote => Style::default()
            .fg(if light { Color::Indexed(24) } else { Color::Blue })
            .add_modifier(Modifier::ITALIC),
        LineKind::Rule => Style::default()
            .fg(if light {
                Color::Indexed(241)
            } else {
                Color::Indexed(240)
            })
            .add_modifier(Modifier::DIM),
        LineKind::ListItem(_) | LineKind::Paragraph | LineKind::Empty => Style::default(),
    }
}

/// Style for an inline span, merged with the base line style.
pub fn style_for_inline(theme: Theme, base: Style, inline: InlineStyle) -> Style {
    let light = theme.is_light();
    let mut style = base;

    if let Some(fg) = inline.fg {
        style = style
            .fg(fg_color_for_terminal(fg))
            .remove_modifier(Modifier::DIM);
    }

    if inline.italic {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if inline.bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if inline.strikethrough {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    if inline.link {
        style = style.add_modifier(Modifier::UNDERLINED);
        if inline.fg.is_none() {
            style = style.fg(if light { Color::Blue } else { Color::LightBlue });
        }
    }
    if inline.code && inline.fg.is_none() {
        style = style
            .fg(if light { Color::Indexed(88) } else { Color::Red })
            .add_modifier(Modifier::BOLD);
    }

    style
}

/// Status bar colors for the theme.
pub const fn status_colors(theme: Theme) -> (Color, Color) {
    match theme {
        Theme::Dark => (Color::Indexed(252), Color::Indexed(236)),
        Theme::Light => (Color::Indexed(235), Color::Indexed(252)),
    }
}

fn fg_color_for_terminal(fg: InlineColor) -> Color {
    if supports_truecolor() {
        Color::Rgb(fg.r, fg.g, fg.b)
    } else {
        Color::Indexed(rgb_to_xterm_256(fg.r, fg.g, fg.b))
    }
}

fn supports_truecolor() -> bool {
    supports_truecolor_from_env(
        std::env::var("COLORTERM").ok().as_deref(),
        std::env::var("TERM").ok().as_deref(),
    )
}

fn supports_truecolor_from_env(colorterm: Option<&str>, term: Option<&str>) -> bool {
    if let Some(ct) = colorterm {
        let lower = ct.to_ascii_lowercase();
        if lower.contains("truecolor") || lower.contains("24bit") {
            return true;
        }
    }
    if let Some(t) = term {
        let lower = t.to_ascii_lowercase();
        if lower.contains("direct") || lower.contains("truecolor") {
            return true;
        }
    }
    false
}

fn rgb_to_xterm_256(r: u8, g: u8, b: u8) -> u8 {
    // Result is always 0-5, fits in u8
    #[allow(clippy::cast_possible_truncation)]
    let to_cube = |v: u8| ((u16::from(v) * 5) / 255) as u8;
    16 + (36 * to_cube(r)) + (6 * to_cube(g)) + to_cube(b)
}
