//! Markdown rendering for the preview pane.
//!
//! The editor's text is parsed with comrak and flattened into styled
//! lines sized to the preview pane's width. Rendering is pure: the same
//! source, width and theme always produce the same lines, so the pane
//! re-renders on every edit without bookkeeping.

use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::{Arena, Options, parse_document};
use unicode_width::UnicodeWidthStr;

use crate::highlight;
use crate::ui::style::Theme;

/// RGB foreground from the syntax highlighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Inline formatting flags for a span of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InlineStyle {
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
    pub strikethrough: bool,
    pub link: bool,
    pub fg: Option<InlineColor>,
}

/// A run of text with one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    text: String,
    style: InlineStyle,
}

impl Span {
    pub const fn new(text: String, style: InlineStyle) -> Self {
        Self { text, style }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: InlineStyle::default(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn style(&self) -> InlineStyle {
        self.style
    }
}

/// Block-level kind of a rendered line, used for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Paragraph,
    Heading(u8),
    CodeBlock,
    BlockQuote,
    /// List item with nesting depth.
    ListItem(usize),
    Rule,
    Empty,
}

/// One display line of the rendered preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    spans: Vec<Span>,
    kind: LineKind,
}

impl Line {
    const fn new(spans: Vec<Span>, kind: LineKind) -> Self {
        Self { spans, kind }
    }

    fn empty() -> Self {
        Self::new(Vec::new(), LineKind::Empty)
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub const fn kind(&self) -> LineKind {
        self.kind
    }

    /// The line's text with styling stripped.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// A rendered markdown document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preview {
    lines: Vec<Line>,
}

impl Preview {
    /// Render markdown source into display lines wrapped to `width`.
    pub fn render(source: &str, width: u16, theme: Theme) -> Self {
        let arena = Arena::new();
        let options = create_options();
        let root = parse_document(&arena, source, &options);

        let wrap_width = (width.max(1) as usize).max(8);
        let mut renderer = Renderer {
            lines: Vec::new(),
            wrap_width,
            theme,
        };
        renderer.block(root, 0);

        // Trim the trailing blank separator so short documents measure
        // their real height.
        while renderer.lines.last().is_some_and(|l| l.kind == LineKind::Empty) {
            renderer.lines.pop();
        }
        Self {
            lines: renderer.lines,
        }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

fn create_options() -> Options {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options
}

struct Renderer {
    lines: Vec<Line>,
    wrap_width: usize,
    theme: Theme,
}

impl Renderer {
    fn block<'a>(&mut self, node: &'a AstNode<'a>, depth: usize) {
        match &node.data.borrow().value {
            NodeValue::Document => {
                for child in node.children() {
                    self.block(child, depth);
                }
            }

            NodeValue::Heading(heading) => {
                let mut spans = collect_inline_spans(node);
                for span in &mut spans {
                    span.style.bold = true;
                }
                let prefix = format!("{} ", "#".repeat(heading.level as usize));
                let style = InlineStyle {
                    bold: true,
                    ..InlineStyle::default()
                };
                spans.insert(0, Span::new(prefix, style));
                self.push_wrapped(spans, LineKind::Heading(heading.level), "", "");
                self.blank();
            }

            NodeValue::Paragraph => {
                let spans = collect_inline_spans(node);
                self.push_wrapped(spans, LineKind::Paragraph, "", "");
                self.blank();
            }

            NodeValue::CodeBlock(code_block) => {
                let language = code_block
                    .info
                    .split_whitespace()
                    .next()
                    .filter(|s| !s.is_empty());
                for line_spans in
                    highlight::highlight_code(language, &code_block.literal, self.theme)
                {
                    self.lines.push(Line::new(line_spans, LineKind::CodeBlock));
                }
                self.blank();
            }

            NodeValue::List(list) => {
                let list_depth = depth + 1;
                let start = list.start;
                for (index, child) in node.children().enumerate() {
                    let marker = match &child.data.borrow().value {
                        NodeValue::TaskItem(symbol) => {
                            if symbol.is_some() { "✓ " } else { "☐ " }.to_string()
                        }
                        _ => match list.list_type {
                            ListType::Bullet => "• ".to_string(),
                            ListType::Ordered => format!("{}. ", start + index),
                        },
                    };
                    self.list_item(child, list_depth, &marker);
                }
                if depth == 0 {
                    self.blank();
                }
            }

            NodeValue::BlockQuote => {
                for child in node.children() {
                    if matches!(child.data.borrow().value, NodeValue::Paragraph) {
                        let spans = collect_inline_spans(child);
                        self.push_wrapped(spans, LineKind::BlockQuote, "▎ ", "▎ ");
                    } else {
                        self.block(child, depth);
                    }
                }
                self.blank();
            }

            NodeValue::ThematicBreak => {
                let rule = "─".repeat(self.wrap_width.min(40));
                self.lines
                    .push(Line::new(vec![Span::plain(rule)], LineKind::Rule));
                self.blank();
            }

            NodeValue::Table(_) => {
                // Tables render row text verbatim; column layout is out of
                // scope for the live preview.
                for row in node.children() {
                    let mut cells = Vec::new();
                    for cell in row.children() {
                        cells.push(extract_text(cell));
                    }
                    let content = cells.join(" │ ");
                    self.lines.push(Line::new(
                        vec![Span::plain(content)],
                        LineKind::Paragraph,
                    ));
                }
                self.blank();
            }

            _ => {
                for child in node.children() {
                    self.block(child, depth);
                }
            }
        }
    }

    fn list_item<'a>(&mut self, item: &'a AstNode<'a>, depth: usize, marker: &str) {
        let indent = "  ".repeat(depth.saturating_sub(1));
        let first = format!("{indent}{marker}");
        let cont = format!("{indent}{}", " ".repeat(marker.width()));

        for (i, child) in item.children().enumerate() {
            match &child.data.borrow().value {
                NodeValue::Paragraph => {
                    let spans = collect_inline_spans(child);
                    let (first_prefix, next_prefix) =
                        if i == 0 { (first.as_str(), cont.as_str()) } else { (cont.as_str(), cont.as_str()) };
                    self.push_wrapped(spans, LineKind::ListItem(depth), first_prefix, next_prefix);
                }
                NodeValue::List(_) => self.block(child, depth),
                _ => self.block(child, depth),
            }
        }
        if item.children().next().is_none() {
            self.lines.push(Line::new(
                vec![Span::plain(first)],
                LineKind::ListItem(depth),
            ));
        }
    }

    fn push_wrapped(&mut self, spans: Vec<Span>, kind: LineKind, first: &str, next: &str) {
        for line_spans in wrap_spans(&spans, self.wrap_width, first, next) {
            self.lines.push(Line::new(line_spans, kind));
        }
    }

    fn blank(&mut self) {
        if !self.lines.last().is_some_and(|l| l.kind == LineKind::Empty) {
            self.lines.push(Line::empty());
        }
    }
}

/// Collect the styled inline spans under a block node.
fn collect_inline_spans<'a>(node: &'a AstNode<'a>) -> Vec<Span> {
    let mut spans = Vec::new();
    for child in node.children() {
        collect_inline(child, InlineStyle::default(), &mut spans);
    }
    spans
}

fn collect_inline<'a>(node: &'a AstNode<'a>, inherited: InlineStyle, spans: &mut Vec<Span>) {
    match &node.data.borrow().value {
        NodeValue::Text(text) => {
            spans.push(Span::new(text.clone(), inherited));
        }
        NodeValue::Code(code) => {
            let mut style = inherited;
            style.code = true;
            spans.push(Span::new(code.literal.clone(), style));
        }
        NodeValue::Emph => {
            let mut style = inherited;
            style.italic = true;
            for child in node.children() {
                collect_inline(child, style, spans);
            }
        }
        NodeValue::Strong => {
            let mut style = inherited;
            style.bold = true;
            for child in node.children() {
                collect_inline(child, style, spans);
            }
        }
        NodeValue::Strikethrough => {
            let mut style = inherited;
            style.strikethrough = true;
            for child in node.children() {
                collect_inline(child, style, spans);
            }
        }
        NodeValue::Link(_) => {
            let mut style = inherited;
            style.link = true;
            for child in node.children() {
                collect_inline(child, style, spans);
            }
        }
        NodeValue::Image(image) => {
            let alt = extract_text(node);
            let label = if alt.is_empty() { &image.url } else { &alt };
            let mut style = inherited;
            style.italic = true;
            spans.push(Span::new(format!("[Image: {label}]"), style));
        }
        NodeValue::SoftBreak | NodeValue::LineBreak => {
            spans.push(Span::new(" ".to_string(), inherited));
        }
        _ => {
            for child in node.children() {
                collect_inline(child, inherited, spans);
            }
        }
    }
}

fn extract_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    extract_text_into(node, &mut text);
    text
}

fn extract_text_into<'a>(node: &'a AstNode<'a>, out: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(t) => out.push_str(t),
        NodeValue::Code(c) => out.push_str(&c.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => out.push(' '),
        _ => {
            for child in node.children() {
                extract_text_into(child, out);
            }
        }
    }
}

/// Greedy word wrap over styled spans.
///
/// `first` prefixes the first output line, `next` the continuation lines.
fn wrap_spans(spans: &[Span], width: usize, first: &str, next: &str) -> Vec<Vec<Span>> {
    let mut lines: Vec<Vec<Span>> = Vec::new();
    let mut current: Vec<Span> = vec![Span::plain(first)];
    let mut current_width = first.width();

    let mut flush = |current: &mut Vec<Span>, current_width: &mut usize, lines: &mut Vec<Vec<Span>>| {
        lines.push(std::mem::replace(current, vec![Span::plain(next)]));
        *current_width = next.width();
    };

    for span in spans {
        for word in split_words(&span.text) {
            let word_width = word.width();
            let is_space = word.chars().all(char::is_whitespace);
            if current_width + word_width > width && current_width > next.width().max(first.width())
            {
                flush(&mut current, &mut current_width, &mut lines);
                if is_space {
                    // Whitespace that caused the break is swallowed.
                    continue;
                }
            }
            current.push(Span::new(word.to_string(), span.style));
            current_width += word_width;
        }
    }

    if current.iter().any(|s| !s.text.trim().is_empty()) || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Split text into alternating word and whitespace chunks.
fn split_words(text: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut in_space = None;
    for (idx, ch) in text.char_indices() {
        let space = ch.is_whitespace();
        if in_space != Some(space) {
            if idx > start {
                chunks.push(&text[start..idx]);
            }
            start = idx;
            in_space = Some(space);
        }
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}
