//! List-aware Enter handling and indent helpers.
//!
//! Pressing Enter inside a markdown list continues the list: the new line
//! starts with the same marker (unordered) or the next number (ordered).
//! Pressing Enter on an empty item ends the list instead, stripping the
//! marker from the current line. Everything here is a pure decision over
//! the text of the current line to the left of the cursor; the buffer
//! applies the result.

use std::sync::OnceLock;

use regex::Regex;

/// The soft indent unit inserted by Tab and removed by Shift+Tab.
pub const INDENT: &str = "  ";

/// What Enter should do, decided from the current line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnterAction {
    /// Not in a list: split the line as usual.
    PlainBreak,
    /// Continue the list: insert this text at the cursor. Starts with a
    /// newline, followed by the indent and the next marker.
    ContinueList { insert: String },
    /// The item was empty: replace the line up to the cursor with its bare
    /// indentation and do not open a new line.
    TerminateList { indent: String },
}

fn unordered_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\s*)([-*+]) (.*)$").expect("valid regex"))
}

fn ordered_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\s*)(\d+)\. (.*)$").expect("valid regex"))
}

/// Decide what Enter does given the current line up to the cursor.
///
/// Text to the right of the cursor never affects the decision; it simply
/// moves to the new line when one is opened.
pub fn enter_action(line_before_cursor: &str) -> EnterAction {
    if let Some(caps) = unordered_re().captures(line_before_cursor) {
        let indent = &caps[1];
        let marker = &caps[2];
        let content = &caps[3];
        if content.trim().is_empty() {
            return EnterAction::TerminateList {
                indent: indent.to_string(),
            };
        }
        return EnterAction::ContinueList {
            insert: format!("\n{indent}{marker} "),
        };
    }

    if let Some(caps) = ordered_re().captures(line_before_cursor) {
        let indent = &caps[1];
        let content = &caps[3];
        if content.trim().is_empty() {
            return EnterAction::TerminateList {
                indent: indent.to_string(),
            };
        }
        // Numbers too large to parse fall back to a plain break.
        let Ok(n) = caps[2].parse::<u64>() else {
            return EnterAction::PlainBreak;
        };
        return EnterAction::ContinueList {
            insert: format!("\n{indent}{}. ", n.saturating_add(1)),
        };
    }

    EnterAction::PlainBreak
}

/// How many characters Shift+Tab removes from the start of `line`.
///
/// Only an exact two-space prefix outdents; a tab or single space at the
/// line start is left alone.
pub fn outdent_width(line: &str) -> usize {
    if line.starts_with(INDENT) {
        INDENT.len()
    } else {
        0
    }
}
