//! Viewport management for scrolling.
//!
//! Each pane owns a [`Viewport`] tracking its visible slice of lines.
//! The scroll synchronizer reads offsets and ranges from here.

use std::ops::Range;

/// Manages the visible portion of a pane's content.
///
/// Tracks pane dimensions, the scroll offset in lines, and the total
/// content length. Offsets are always clamped to the scrollable range.
///
/// # Example
///
/// ```
/// use livemark::ui::viewport::Viewport;
///
/// let mut vp = Viewport::new(80, 24, 100);
/// assert_eq!(vp.visible_range(), 0..24);
///
/// vp.scroll_down(10);
/// assert_eq!(vp.visible_range(), 10..34);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    width: u16,
    height: u16,
    offset: usize,
    total_lines: usize,
}

impl Viewport {
    /// Create a new viewport.
    ///
    /// # Arguments
    ///
    /// * `width` - Pane width in columns
    /// * `height` - Pane height in rows
    /// * `total_lines` - Total lines of content
    pub const fn new(width: u16, height: u16, total_lines: usize) -> Self {
        Self {
            width,
            height,
            offset: 0,
            total_lines,
        }
    }

    /// Current scroll offset in lines.
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Pane width in columns.
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Pane height in rows.
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Total lines of content.
    pub const fn total_lines(&self) -> usize {
        self.total_lines
    }

    /// The scrollable range: content length minus the pane height.
    ///
    /// Zero when the content fits in the pane.
    pub const fn max_offset(&self) -> usize {
        self.total_lines.saturating_sub(self.height as usize)
    }

    /// The range of visible lines, clamped to the content bounds.
    pub fn visible_range(&self) -> Range<usize> {
        let start = self.offset;
        let end = (self.offset + self.height as usize).min(self.total_lines);
        start..end
    }

    /// Scroll position as a percentage (0-100) for the status bar.
    pub fn scroll_percent(&self) -> u8 {
        let max_offset = self.max_offset();
        if max_offset == 0 {
            return 100;
        }
        // Percentage value always 0-100
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        {
            ((self.offset as f64 / max_offset as f64) * 100.0).round() as u8
        }
    }

    /// Check if we can scroll up.
    pub const fn can_scroll_up(&self) -> bool {
        self.offset > 0
    }

    /// Check if we can scroll down.
    pub const fn can_scroll_down(&self) -> bool {
        self.offset < self.max_offset()
    }

    /// Scroll up by n lines.
    pub const fn scroll_up(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
    }

    /// Scroll down by n lines.
    pub fn scroll_down(&mut self, n: usize) {
        self.offset = self.offset.saturating_add(n).min(self.max_offset());
    }

    /// Scroll up one page.
    pub const fn page_up(&mut self) {
        self.scroll_up(self.height as usize);
    }

    /// Scroll down one page.
    pub fn page_down(&mut self) {
        self.scroll_down(self.height as usize);
    }

    /// Go to the top of the content.
    pub const fn go_to_top(&mut self) {
        self.offset = 0;
    }

    /// Go to the bottom of the content.
    pub const fn go_to_bottom(&mut self) {
        self.offset = self.max_offset();
    }

    /// Put a specific line at the top of the pane.
    pub fn go_to_line(&mut self, line: usize) {
        self.offset = line.min(self.max_offset());
    }

    /// Scroll the least amount needed to bring `line` into view.
    pub fn ensure_visible(&mut self, line: usize) {
        let height = self.height as usize;
        if height == 0 {
            self.go_to_line(line);
            return;
        }
        if line < self.offset {
            self.offset = line;
        } else if line >= self.offset + height {
            self.offset = (line + 1 - height).min(self.max_offset());
        }
    }

    /// Resize the pane.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        // Clamp offset if content is now shorter than the pane
        self.offset = self.offset.min(self.max_offset());
    }

    /// Update the content length (e.g. after an edit re-renders the preview).
    pub fn set_total_lines(&mut self, total: usize) {
        self.total_lines = total;
        self.offset = self.offset.min(self.max_offset());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_viewport_starts_at_top() {
        let vp = Viewport::new(80, 24, 100);
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn test_visible_range_at_bottom() {
        let mut vp = Viewport::new(80, 24, 100);
        vp.go_to_bottom();
        assert_eq!(vp.visible_range(), 76..100);
    }

    #[test]
    fn test_visible_range_with_short_content() {
        let vp = Viewport::new(80, 24, 10);
        assert_eq!(vp.visible_range(), 0..10);
    }

    #[test]
    fn test_scroll_down_clamps_to_max() {
        let mut vp = Viewport::new(80, 24, 100);
        vp.scroll_down(1000);
        assert_eq!(vp.offset(), 76); // 100 - 24 = 76
    }

    #[test]
    fn test_scroll_up_clamps_to_zero() {
        let mut vp = Viewport::new(80, 24, 100);
        vp.scroll_down(10);
        vp.scroll_up(100);
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn test_page_up_and_down() {
        let mut vp = Viewport::new(80, 24, 100);
        vp.page_down();
        assert_eq!(vp.offset(), 24);
        vp.page_up();
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn test_go_to_line_clamps() {
        let mut vp = Viewport::new(80, 24, 100);
        vp.go_to_line(1000);
        assert_eq!(vp.offset(), 76);
    }

    #[test]
    fn test_max_offset_zero_when_content_fits() {
        let vp = Viewport::new(80, 24, 10);
        assert_eq!(vp.max_offset(), 0);
        assert!(!vp.can_scroll_down());
    }

    #[test]
    fn test_ensure_visible_scrolls_down_minimally() {
        let mut vp = Viewport::new(80, 24, 100);
        vp.ensure_visible(30);
        assert_eq!(vp.offset(), 7); // 30 + 1 - 24
    }

    #[test]
    fn test_ensure_visible_scrolls_up_to_line() {
        let mut vp = Viewport::new(80, 24, 100);
        vp.go_to_line(50);
        vp.ensure_visible(10);
        assert_eq!(vp.offset(), 10);
    }

    #[test]
    fn test_ensure_visible_noop_when_in_view() {
        let mut vp = Viewport::new(80, 24, 100);
        vp.go_to_line(10);
        vp.ensure_visible(20);
        assert_eq!(vp.offset(), 10);
    }

    #[test]
    fn test_scroll_percent_bounds() {
        let mut vp = Viewport::new(80, 24, 100);
        assert_eq!(vp.scroll_percent(), 0);
        vp.go_to_bottom();
        assert_eq!(vp.scroll_percent(), 100);
    }

    #[test]
    fn test_scroll_percent_short_content() {
        let vp = Viewport::new(80, 24, 10);
        assert_eq!(vp.scroll_percent(), 100);
    }

    #[test]
    fn test_resize_keeps_valid_offset() {
        let mut vp = Viewport::new(80, 24, 100);
        vp.scroll_down(50);
        vp.resize(80, 60);
        assert_eq!(vp.offset(), 40); // max_offset is now 40
    }

    #[test]
    fn test_set_total_lines_adjusts_offset() {
        let mut vp = Viewport::new(80, 24, 100);
        vp.scroll_down(80);
        vp.set_total_lines(50);
        assert_eq!(vp.offset(), 26); // max_offset is now 26
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn scroll_never_exceeds_bounds(
                total_lines in 1..10000usize,
                height in 1..100u16,
                scroll_amount in 0..10000usize,
            ) {
                let mut vp = Viewport::new(80, height, total_lines);
                vp.scroll_down(scroll_amount);

                let max = total_lines.saturating_sub(height as usize);
                prop_assert!(vp.offset() <= max);
            }

            #[test]
            fn visible_range_within_bounds(
                total_lines in 0..10000usize,
                height in 1..100u16,
                offset in 0..10000usize,
            ) {
                let mut vp = Viewport::new(80, height, total_lines);
                vp.scroll_down(offset);

                let range = vp.visible_range();
                prop_assert!(range.start <= range.end);
                prop_assert!(range.end <= total_lines);
            }

            #[test]
            fn ensure_visible_always_shows_line(
                total_lines in 1..10000usize,
                height in 1..100u16,
                line in 0..10000usize,
            ) {
                let mut vp = Viewport::new(80, height, total_lines);
                let line = line.min(total_lines - 1);
                vp.ensure_visible(line);
                prop_assert!(vp.visible_range().contains(&line));
            }
        }
    }
}
