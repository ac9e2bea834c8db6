use ropey::Rope;

/// Cursor position in the editor buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column (byte offset within the line).
    pub col: usize,
    /// Remembered column for vertical movement (sticky column).
    col_memory: usize,
}

impl Cursor {
    /// Create a cursor at line 0, column 0.
    pub const fn new() -> Self {
        Self {
            line: 0,
            col: 0,
            col_memory: 0,
        }
    }

    /// Create a cursor at a specific position.
    pub const fn at(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            col_memory: col,
        }
    }

    /// Update column and reset column memory to match.
    const fn set_col(&mut self, col: usize) {
        self.col = col;
        self.col_memory = col;
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Direction for cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// The markdown source buffer, backed by a rope.
///
/// All edits go through here; the cursor tracks the current editing
/// position. Lines are separated by `\n` exclusively; imports normalize
/// line endings before text reaches the buffer.
pub struct EditorBuffer {
    rope: Rope,
    cursor: Cursor,
    dirty: bool,
}

impl EditorBuffer {
    /// Create a new buffer from a string.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Cursor::new(),
            dirty: false,
        }
    }

    /// Create an empty buffer.
    pub fn empty() -> Self {
        Self::from_text("")
    }

    /// The current cursor position.
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Whether the buffer has been modified since creation or the last
    /// persisted snapshot.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the buffer as clean (e.g. after the autosave flushed).
    pub const fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Content of a line (without trailing newline).
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let line = self.rope.line(line_idx);
        let s = line.to_string();
        Some(s.trim_end_matches('\n').trim_end_matches('\r').to_string())
    }

    /// Length of a line in bytes (without trailing newline).
    pub fn line_len(&self, line_idx: usize) -> usize {
        self.line_at(line_idx).map_or(0, |s| s.len())
    }

    /// The cursor's line up to (not including) the cursor column.
    ///
    /// This is what the list-continuation handler inspects: the original
    /// line content only matters to the left of the insertion point.
    pub fn line_before_cursor(&self) -> String {
        let line = self.line_at(self.cursor.line).unwrap_or_default();
        let col = self.cursor.col.min(line.len());
        line[..col].to_string()
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Replace the entire content, moving the cursor to the start.
    ///
    /// Used by import and by external store changes; both replace the
    /// document wholesale rather than merging.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.cursor = Cursor::new();
        self.dirty = true;
    }

    /// Insert a character at the cursor position.
    pub fn insert_char(&mut self, ch: char) {
        let char_idx = self.cursor_char_idx();
        self.rope.insert_char(char_idx, ch);
        self.cursor.set_col(self.cursor.col + ch.len_utf8());
        self.dirty = true;
    }

    /// Insert a string at the cursor position.
    ///
    /// The cursor lands at the end of the inserted text; any text that was
    /// to the right of the cursor follows it. List continuation relies on
    /// this: inserting `"\n- "` mid-line leaves the tail on the new line
    /// after the marker.
    pub fn insert_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        let char_idx = self.cursor_char_idx();
        self.rope.insert(char_idx, s);

        let lines: Vec<&str> = s.split('\n').collect();
        if lines.len() > 1 {
            self.cursor.line += lines.len() - 1;
            self.cursor.set_col(lines.last().map_or(0, |l| l.len()));
        } else {
            self.cursor.set_col(self.cursor.col + s.len());
        }
        self.dirty = true;
    }

    /// Split the current line at the cursor (plain Enter).
    pub fn split_line(&mut self) {
        let char_idx = self.cursor_char_idx();
        self.rope.insert_char(char_idx, '\n');
        self.cursor.line += 1;
        self.cursor.set_col(0);
        self.dirty = true;
    }

    /// Replace everything from the start of the current line up to the
    /// cursor with `replacement` (single-line).
    ///
    /// Terminating an empty list item is the one caller: `"- "` collapses
    /// to its leading indentation, cursor at the end of it.
    pub fn replace_line_to_cursor(&mut self, replacement: &str) {
        debug_assert!(!replacement.contains('\n'));
        let line_start = self.rope.line_to_char(self.cursor.line);
        let cursor_idx = self.cursor_char_idx();
        self.rope.remove(line_start..cursor_idx);
        self.rope.insert(line_start, replacement);
        self.cursor.set_col(replacement.len());
        self.dirty = true;
    }

    /// Remove `count` ASCII characters from the start of the current line,
    /// pulling the cursor back by the same amount (clamped to line start).
    pub fn remove_line_prefix(&mut self, count: usize) {
        let count = count.min(self.line_len(self.cursor.line));
        if count == 0 {
            return;
        }
        let line_start = self.rope.line_to_char(self.cursor.line);
        self.rope.remove(line_start..line_start + count);
        self.cursor.set_col(self.cursor.col.saturating_sub(count));
        self.dirty = true;
    }

    /// Delete the character before the cursor (Backspace).
    ///
    /// Returns `true` if a character was deleted.
    pub fn delete_back(&mut self) -> bool {
        if self.cursor.col == 0 && self.cursor.line == 0 {
            return false;
        }

        if self.cursor.col == 0 {
            // Join with previous line
            let prev_line_len = self.line_len(self.cursor.line - 1);
            let char_idx = self.cursor_char_idx();
            self.rope.remove(char_idx - 1..char_idx);
            self.cursor.line -= 1;
            self.cursor.set_col(prev_line_len);
        } else {
            let char_idx = self.cursor_char_idx();
            let line = self.rope.line(self.cursor.line);
            let line_str = line.to_string();
            let before = &line_str[..self.cursor.col];
            let prev_char_len = before.chars().next_back().map_or(1, char::len_utf8);
            self.rope.remove(char_idx - 1..char_idx);
            self.cursor.set_col(self.cursor.col - prev_char_len);
        }
        self.dirty = true;
        true
    }

    /// Delete the character at the cursor (Delete key).
    ///
    /// Returns `true` if a character was deleted.
    pub fn delete_forward(&mut self) -> bool {
        let line_len = self.line_len(self.cursor.line);

        if self.cursor.col >= line_len && self.cursor.line + 1 >= self.line_count() {
            return false;
        }

        let char_idx = self.cursor_char_idx();
        self.rope.remove(char_idx..=char_idx);
        self.dirty = true;
        true
    }

    /// Move the cursor in the given direction.
    pub fn move_cursor(&mut self, direction: Direction) {
        match direction {
            Direction::Left => self.move_left(),
            Direction::Right => self.move_right(),
            Direction::Up => self.move_up(),
            Direction::Down => self.move_down(),
        }
    }

    /// Move cursor to the beginning of the line (Home).
    pub const fn move_home(&mut self) {
        self.cursor.set_col(0);
    }

    /// Move cursor to the end of the line (End).
    pub fn move_end(&mut self) {
        let len = self.line_len(self.cursor.line);
        self.cursor.set_col(len);
    }

    /// Move cursor to a specific line and column, clamping both and
    /// snapping the column to a char boundary.
    pub fn move_to(&mut self, line: usize, col: usize) {
        let max_line = self.line_count().saturating_sub(1);
        self.cursor.line = line.min(max_line);
        let target = self.line_at(self.cursor.line).unwrap_or_default();
        self.cursor.set_col(snap_to_char_boundary(&target, col));
    }

    /// Move cursor to the start of the buffer (Ctrl+Home).
    pub const fn move_to_start(&mut self) {
        self.cursor.line = 0;
        self.cursor.set_col(0);
    }

    /// Move cursor to the end of the buffer (Ctrl+End).
    pub fn move_to_end(&mut self) {
        let last_line = self.line_count().saturating_sub(1);
        self.cursor.line = last_line;
        self.cursor.set_col(self.line_len(last_line));
    }

    // --- Private helpers ---

    /// Convert cursor position to a ropey char index.
    fn cursor_char_idx(&self) -> usize {
        let line_start = self.rope.line_to_char(self.cursor.line);
        let line = self.rope.line(self.cursor.line);
        let line_str: String = line.chars().collect();
        // Convert byte offset to char offset within the line
        let byte_col = snap_to_char_boundary(&line_str, self.cursor.col);
        let char_offset = line_str[..byte_col].chars().count();
        line_start + char_offset
    }

    fn move_left(&mut self) {
        if self.cursor.col > 0 {
            let line = self.line_at(self.cursor.line).unwrap_or_default();
            let before = &line[..self.cursor.col];
            let prev_char_len = before.chars().next_back().map_or(1, char::len_utf8);
            self.cursor.set_col(self.cursor.col - prev_char_len);
        } else if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.cursor.set_col(self.line_len(self.cursor.line));
        }
    }

    fn move_right(&mut self) {
        let line_len = self.line_len(self.cursor.line);
        if self.cursor.col < line_len {
            let line = self.line_at(self.cursor.line).unwrap_or_default();
            let next_char_len = line[self.cursor.col..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
            self.cursor.set_col(self.cursor.col + next_char_len);
        } else if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            self.cursor.set_col(0);
        }
    }

    fn move_up(&mut self) {
        if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.restore_col_memory();
        }
    }

    fn move_down(&mut self) {
        if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            self.restore_col_memory();
        }
    }

    /// Re-apply the remembered column on the new line, snapped to a char
    /// boundary since the byte offset came from a different line.
    fn restore_col_memory(&mut self) {
        let line = self.line_at(self.cursor.line).unwrap_or_default();
        self.cursor.col = snap_to_char_boundary(&line, self.cursor.col_memory);
    }
}

fn snap_to_char_boundary(line: &str, col: usize) -> usize {
    let mut col = col.min(line.len());
    while col > 0 && !line.is_char_boundary(col) {
        col -= 1;
    }
    col
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field(
                "rope",
                &format_args!("Rope({} lines)", self.rope.len_lines()),
            )
            .field("cursor", &self.cursor)
            .field("dirty", &self.dirty)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer_has_one_line() {
        let buf = EditorBuffer::empty();
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line_at(0), Some(String::new()));
    }

    #[test]
    fn test_from_text_preserves_content() {
        let buf = EditorBuffer::from_text("hello\nworld");
        assert_eq!(buf.line_count(), 2);
        assert_eq!(buf.line_at(0), Some("hello".to_string()));
        assert_eq!(buf.line_at(1), Some("world".to_string()));
    }

    #[test]
    fn test_text_roundtrip() {
        let content = "line one\nline two\nline three";
        let buf = EditorBuffer::from_text(content);
        assert_eq!(buf.text(), content);
    }

    #[test]
    fn test_set_text_replaces_and_resets_cursor() {
        let mut buf = EditorBuffer::from_text("old");
        buf.move_end();
        buf.set_text("brand\nnew");
        assert_eq!(buf.text(), "brand\nnew");
        assert_eq!(buf.cursor(), Cursor::at(0, 0));
        assert!(buf.is_dirty());
    }

    #[test]
    fn test_insert_marks_dirty_and_mark_clean_resets() {
        let mut buf = EditorBuffer::from_text("hello");
        assert!(!buf.is_dirty());
        buf.insert_char('!');
        assert!(buf.is_dirty());
        buf.mark_clean();
        assert!(!buf.is_dirty());
    }

    #[test]
    fn test_insert_char_in_middle() {
        let mut buf = EditorBuffer::from_text("hllo");
        buf.move_cursor(Direction::Right); // after 'h'
        buf.insert_char('e');
        assert_eq!(buf.line_at(0), Some("hello".to_string()));
        assert_eq!(buf.cursor(), Cursor::at(0, 2));
    }

    #[test]
    fn test_insert_str_multiline_moves_cursor_to_tail() {
        let mut buf = EditorBuffer::from_text("ab");
        buf.move_to(0, 1);
        buf.insert_str("\n- ");
        assert_eq!(buf.line_at(0), Some("a".to_string()));
        assert_eq!(buf.line_at(1), Some("- b".to_string()));
        assert_eq!(buf.cursor(), Cursor::at(1, 2));
    }

    #[test]
    fn test_line_before_cursor() {
        let mut buf = EditorBuffer::from_text("- item\nnext");
        buf.move_to(0, 3);
        assert_eq!(buf.line_before_cursor(), "- i");
        buf.move_to(0, 6);
        assert_eq!(buf.line_before_cursor(), "- item");
    }

    #[test]
    fn test_replace_line_to_cursor_strips_marker() {
        let mut buf = EditorBuffer::from_text("  - \ntail");
        buf.move_to(0, 4);
        buf.replace_line_to_cursor("  ");
        assert_eq!(buf.line_at(0), Some("  ".to_string()));
        assert_eq!(buf.line_at(1), Some("tail".to_string()));
        assert_eq!(buf.cursor(), Cursor::at(0, 2));
    }

    #[test]
    fn test_remove_line_prefix_pulls_cursor_back() {
        let mut buf = EditorBuffer::from_text("  code");
        buf.move_to(0, 6);
        buf.remove_line_prefix(2);
        assert_eq!(buf.line_at(0), Some("code".to_string()));
        assert_eq!(buf.cursor(), Cursor::at(0, 4));
    }

    #[test]
    fn test_remove_line_prefix_clamps_cursor_to_line_start() {
        let mut buf = EditorBuffer::from_text("  x");
        buf.move_to(0, 1); // inside the indent
        buf.remove_line_prefix(2);
        assert_eq!(buf.line_at(0), Some("x".to_string()));
        assert_eq!(buf.cursor(), Cursor::at(0, 0));
    }

    #[test]
    fn test_split_line_in_middle() {
        let mut buf = EditorBuffer::from_text("hello world");
        buf.move_to(0, 5);
        buf.split_line();
        assert_eq!(buf.line_at(0), Some("hello".to_string()));
        assert_eq!(buf.line_at(1), Some(" world".to_string()));
        assert_eq!(buf.cursor(), Cursor::at(1, 0));
    }

    #[test]
    fn test_delete_back_joins_lines() {
        let mut buf = EditorBuffer::from_text("hello\nworld");
        buf.move_to(1, 0);
        buf.delete_back();
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line_at(0), Some("helloworld".to_string()));
        assert_eq!(buf.cursor(), Cursor::at(0, 5));
    }

    #[test]
    fn test_delete_back_at_start_is_noop() {
        let mut buf = EditorBuffer::from_text("hello");
        assert!(!buf.delete_back());
        assert_eq!(buf.text(), "hello");
    }

    #[test]
    fn test_delete_forward_joins_lines() {
        let mut buf = EditorBuffer::from_text("hello\nworld");
        buf.move_to(0, 5);
        buf.delete_forward();
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line_at(0), Some("helloworld".to_string()));
    }

    #[test]
    fn test_move_left_wraps_to_prev_line() {
        let mut buf = EditorBuffer::from_text("hello\nworld");
        buf.move_to(1, 0);
        buf.move_cursor(Direction::Left);
        assert_eq!(buf.cursor(), Cursor::at(0, 5));
    }

    #[test]
    fn test_move_right_wraps_to_next_line() {
        let mut buf = EditorBuffer::from_text("hello\nworld");
        buf.move_to(0, 5);
        buf.move_cursor(Direction::Right);
        assert_eq!(buf.cursor(), Cursor::at(1, 0));
    }

    #[test]
    fn test_column_memory_across_short_line() {
        let mut buf = EditorBuffer::from_text("hello\nhi\nworld");
        buf.move_to(0, 4);
        buf.move_cursor(Direction::Down); // "hi" → col 2
        assert_eq!(buf.cursor().col, 2);
        buf.move_cursor(Direction::Down); // "world" → col 4 (restored)
        assert_eq!(buf.cursor().col, 4);
    }

    #[test]
    fn test_move_to_clamps_line_and_col() {
        let mut buf = EditorBuffer::from_text("hello");
        buf.move_to(100, 100);
        assert_eq!(buf.cursor().line, 0);
        assert_eq!(buf.cursor().col, 5);
    }

    #[test]
    fn test_move_to_start_and_end() {
        let mut buf = EditorBuffer::from_text("hello\nworld");
        buf.move_to_end();
        assert_eq!(buf.cursor(), Cursor::at(1, 5));
        buf.move_to_start();
        assert_eq!(buf.cursor(), Cursor::at(0, 0));
    }

    #[test]
    fn test_vertical_move_snaps_to_char_boundary() {
        let mut buf = EditorBuffer::from_text("ab\nhéllo");
        buf.move_to(0, 2);
        buf.move_cursor(Direction::Down); // byte 2 splits 'é'; snap to 1
        assert_eq!(buf.cursor().col, 1);
        buf.insert_char('x');
        assert_eq!(buf.line_at(1), Some("hxéllo".to_string()));
    }

    #[test]
    fn test_move_to_mid_char_snaps_back() {
        let mut buf = EditorBuffer::from_text("héllo");
        buf.move_to(0, 2);
        assert_eq!(buf.cursor().col, 1);
    }

    #[test]
    fn test_multibyte_navigation_and_delete() {
        let mut buf = EditorBuffer::from_text("café");
        buf.move_end();
        assert_eq!(buf.cursor().col, 5); // 'é' is 2 bytes
        buf.move_cursor(Direction::Left);
        assert_eq!(buf.cursor().col, 3);
        buf.move_end();
        buf.delete_back();
        assert_eq!(buf.line_at(0), Some("caf".to_string()));
    }
}
