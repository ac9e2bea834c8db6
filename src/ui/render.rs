use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::app::{Model, ToastLevel};
use crate::sync::Pane;

use super::style::{status_colors, style_for_inline, style_for_line_kind};
use super::{pane_inner, split_chrome, split_panes};

/// Render the complete UI: editor pane, preview pane, status bar.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let (main, status_area) = split_chrome(area);
    let (editor_rect, preview_rect) = split_panes(main);

    render_editor(model, frame, editor_rect);
    render_preview(model, frame, preview_rect);
    render_status(model, frame, status_area);
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

fn render_editor(model: &Model, frame: &mut Frame, area: Rect) {
    let focused = model.focus == Pane::Editor;
    let block = pane_block(" Editor ", focused);
    let inner = pane_inner(area);

    let range = model.editor_viewport.visible_range();
    let lines: Vec<Line> = range
        .clone()
        .map(|idx| Line::raw(model.buffer.line_at(idx).unwrap_or_default()))
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);

    // Terminal cursor follows the buffer cursor while the editor has focus.
    let cursor = model.buffer.cursor();
    if focused && !model.prompt_active() && range.contains(&cursor.line) {
        let line = model.buffer.line_at(cursor.line).unwrap_or_default();
        // Cursor column is a byte offset on a char boundary.
        let col = line[..cursor.col.min(line.len())].width();
        let x = inner.x + u16::try_from(col).unwrap_or(u16::MAX);
        let y = inner.y + u16::try_from(cursor.line - range.start).unwrap_or(u16::MAX);
        if x < inner.x + inner.width && y < inner.y + inner.height {
            frame.set_cursor_position((x, y));
        }
    }
}

fn render_preview(model: &Model, frame: &mut Frame, area: Rect) {
    let block = pane_block(" Preview ", model.focus == Pane::Preview);

    let range = model.preview_viewport.visible_range();
    let lines: Vec<Line> = model.preview.lines()[range]
        .iter()
        .map(|line| {
            let base = style_for_line_kind(model.theme, line.kind());
            let spans: Vec<Span> = line
                .spans()
                .iter()
                .map(|s| {
                    Span::styled(
                        s.text().to_string(),
                        style_for_inline(model.theme, base, s.style()),
                    )
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status(model: &Model, frame: &mut Frame, area: Rect) {
    let (fg, bg) = status_colors(model.theme);
    let base = Style::default().fg(fg).bg(bg);

    if let Some(ref input) = model.import_prompt {
        let prompt = format!("Import file: {input}  (Enter to load, Esc to cancel)");
        frame.render_widget(Paragraph::new(prompt).style(base), area);
        let x = area.x + u16::try_from("Import file: ".len() + input.width()).unwrap_or(u16::MAX);
        if x < area.x + area.width {
            frame.set_cursor_position((x, area.y));
        }
        return;
    }

    let left = if let Some(ref toast) = model.toast {
        let toast_style = match toast.level {
            ToastLevel::Info => base,
            ToastLevel::Warning => base.fg(Color::Yellow),
            ToastLevel::Error => base.fg(Color::Red),
        };
        Span::styled(format!(" {} ", toast.text), toast_style)
    } else {
        let cursor = model.buffer.cursor();
        let dirty = if model.buffer.is_dirty() { "*" } else { " " };
        Span::styled(
            format!(
                " {}:{}{} │ {} │ {}%",
                cursor.line + 1,
                cursor.col + 1,
                dirty,
                model.theme.name(),
                model.viewport(model.focus).scroll_percent(),
            ),
            base,
        )
    };

    let hints = " ^Q quit  ^T theme  ^O import  ^E export  ^P focus ";
    let pad_width = (area.width as usize)
        .saturating_sub(left.content.width())
        .saturating_sub(hints.width());
    let line = Line::from(vec![
        left,
        Span::styled(" ".repeat(pad_width), base),
        Span::styled(hints, base),
    ]);
    frame.render_widget(Paragraph::new(line).style(base), area);
}
