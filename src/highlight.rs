//! Syntax highlighting for fenced code blocks.
//!
//! Uses syntect with the bundled Sublime Text syntax definitions. The
//! syntax set and both color themes are loaded once and cached; which one
//! applies is decided per call from the application theme.

use std::sync::OnceLock;

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme as SyntectTheme, ThemeSet};
use syntect::parsing::SyntaxSet;

use crate::preview::{InlineColor, InlineStyle, Span};
use crate::ui::style::Theme;

/// Highlight a code block into per-line styled spans.
///
/// Unknown or missing languages fall back to plain code-styled text.
pub fn highlight_code(language: Option<&str>, code: &str, theme: Theme) -> Vec<Vec<Span>> {
    let syntax_set = syntax_set();
    let syntax = language
        .and_then(|lang| syntax_set.find_syntax_by_token(lang))
        .or_else(|| language.and_then(|lang| syntax_set.find_syntax_by_name(lang)));

    let Some(syntax) = syntax else {
        return code
            .lines()
            .map(|line| {
                let style = InlineStyle {
                    code: true,
                    ..InlineStyle::default()
                };
                vec![Span::new(line.to_string(), style)]
            })
            .collect();
    };

    let mut highlighter = HighlightLines::new(syntax, syntect_theme(theme));
    let mut lines = Vec::new();
    for line in code.lines() {
        let ranges = highlighter
            .highlight_line(line, syntax_set)
            .unwrap_or_default();
        let mut spans = Vec::new();
        for (style, text) in ranges {
            let inline_style = InlineStyle {
                code: true,
                fg: Some(InlineColor {
                    r: style.foreground.r,
                    g: style.foreground.g,
                    b: style.foreground.b,
                }),
                ..InlineStyle::default()
            };
            spans.push(Span::new(text.to_string(), inline_style));
        }
        lines.push(spans);
    }
    lines
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn syntect_theme(theme: Theme) -> &'static SyntectTheme {
    static DARK: OnceLock<SyntectTheme> = OnceLock::new();
    static LIGHT: OnceLock<SyntectTheme> = OnceLock::new();

    let (cell, preferred): (&OnceLock<SyntectTheme>, &[&str]) = match theme {
        Theme::Dark => (
            &DARK,
            &["Monokai Extended", "Solarized (dark)", "base16-ocean.dark"],
        ),
        Theme::Light => (
            &LIGHT,
            &["InspiredGitHub", "Solarized (light)", "base16-ocean.light"],
        ),
    };

    cell.get_or_init(|| {
        let theme_set = ThemeSet::load_defaults();
        for name in preferred {
            if let Some(theme) = theme_set.themes.get(*name) {
                return theme.clone();
            }
        }
        theme_set
            .themes
            .values()
            .next()
            .cloned()
            .unwrap_or_default()
    })
}
