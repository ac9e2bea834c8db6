//! Scroll synchronization between the editor and preview panes.
//!
//! The two panes show the same document at different heights, so scroll
//! positions are mirrored proportionally: a pane scrolled halfway through
//! its own range puts the other pane halfway through its range. A
//! time-boxed latch keeps the mirrored assignment from re-triggering the
//! synchronizer from the other side.

use crate::ui::viewport::Viewport;

/// How long the mirrored pane stays latched after an assignment.
pub const LATCH_WINDOW_MS: u64 = 100;

/// The two scrollable panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Editor,
    Preview,
}

impl Pane {
    /// The pane on the other side of the split.
    pub const fn other(self) -> Self {
        match self {
            Self::Editor => Self::Preview,
            Self::Preview => Self::Editor,
        }
    }
}

/// Mirrors scroll positions between two viewports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollSync {
    hold_ms: u64,
    latched: Option<(Pane, u64)>,
}

impl ScrollSync {
    /// Create a synchronizer with the given latch window.
    pub const fn new(hold_ms: u64) -> Self {
        Self {
            hold_ms,
            latched: None,
        }
    }

    /// Whether scroll events from `pane` are currently suppressed.
    pub fn is_latched(&self, pane: Pane, now_ms: u64) -> bool {
        self.latched
            .is_some_and(|(held, until)| held == pane && now_ms < until)
    }

    /// Compute the offset the opposite pane should take after `source`
    /// scrolled.
    ///
    /// Returns `None` when:
    /// - `source` is latched (its scroll is the echo of a mirror we just
    ///   applied), or
    /// - the source pane has no overflow, where the ratio would divide by
    ///   zero.
    ///
    /// A `Some` result latches the opposite pane for the hold window; the
    /// caller is expected to apply the offset to it.
    pub fn mirror(
        &mut self,
        source: Pane,
        src: &Viewport,
        dst: &Viewport,
        now_ms: u64,
    ) -> Option<usize> {
        if self.is_latched(source, now_ms) {
            return None;
        }
        let ratio = scroll_ratio(src)?;
        self.latched = Some((source.other(), now_ms + self.hold_ms));
        Some(apply_ratio(dst, ratio))
    }

    /// Drop any held latch, e.g. at teardown.
    pub const fn cancel(&mut self) {
        self.latched = None;
    }
}

/// A pane's scroll position as a fraction of its scrollable range.
///
/// `None` when content fits the viewport: there is no range to take a
/// fraction of, and the division would produce NaN.
fn scroll_ratio(vp: &Viewport) -> Option<f64> {
    let range = vp.max_offset();
    if range == 0 {
        return None;
    }
    // Offsets are clamped to the range, so the ratio stays within 0..=1.
    #[allow(clippy::cast_precision_loss)]
    Some(vp.offset() as f64 / range as f64)
}

/// Map a ratio into a viewport's scrollable range.
fn apply_ratio(vp: &Viewport, ratio: f64) -> usize {
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let target = (vp.max_offset() as f64 * ratio).round() as usize;
    target.min(vp.max_offset())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(height: u16, total: usize, offset: usize) -> Viewport {
        let mut vp = Viewport::new(80, height, total);
        vp.go_to_line(offset);
        vp
    }

    #[test]
    fn test_mirror_maps_halfway_to_halfway() {
        // Editor: 1000 lines, 200 visible, offset 400 → ratio 0.5 of range 800.
        // Preview: 2000 lines, 400 visible, range 1600 → offset 800.
        let mut sync = ScrollSync::new(LATCH_WINDOW_MS);
        let src = viewport(200, 1000, 400);
        let dst = viewport(400, 2000, 0);
        assert_eq!(sync.mirror(Pane::Editor, &src, &dst, 0), Some(800));
    }

    #[test]
    fn test_mirror_top_and_bottom_are_exact() {
        let mut sync = ScrollSync::new(LATCH_WINDOW_MS);
        let dst = viewport(400, 2000, 0);

        let top = viewport(200, 1000, 0);
        assert_eq!(sync.mirror(Pane::Editor, &top, &dst, 0), Some(0));

        sync.cancel();
        let bottom = viewport(200, 1000, 800);
        assert_eq!(sync.mirror(Pane::Editor, &bottom, &dst, 0), Some(1600));
    }

    #[test]
    fn test_no_overflow_source_is_noop() {
        let mut sync = ScrollSync::new(LATCH_WINDOW_MS);
        // 10 lines in a 24-row pane: nothing to scroll, ratio undefined.
        let src = viewport(24, 10, 0);
        let dst = viewport(400, 2000, 0);
        assert_eq!(sync.mirror(Pane::Editor, &src, &dst, 0), None);
        assert!(!sync.is_latched(Pane::Preview, 0), "no-op must not latch");
    }

    #[test]
    fn test_mirror_latches_the_target_pane() {
        let mut sync = ScrollSync::new(LATCH_WINDOW_MS);
        let src = viewport(200, 1000, 400);
        let dst = viewport(400, 2000, 0);
        sync.mirror(Pane::Editor, &src, &dst, 1000).unwrap();

        // The preview's echoed scroll inside the window is suppressed...
        assert!(sync.is_latched(Pane::Preview, 1050));
        assert_eq!(sync.mirror(Pane::Preview, &dst, &src, 1050), None);
        // ...but the editor side keeps working.
        assert_eq!(sync.mirror(Pane::Editor, &src, &dst, 1050), Some(800));
    }

    #[test]
    fn test_latch_releases_after_window() {
        let mut sync = ScrollSync::new(LATCH_WINDOW_MS);
        let src = viewport(200, 1000, 400);
        let dst = viewport(400, 2000, 800);
        sync.mirror(Pane::Editor, &src, &dst, 1000).unwrap();

        assert!(!sync.is_latched(Pane::Preview, 1100));
        assert_eq!(sync.mirror(Pane::Preview, &dst, &src, 1100), Some(400));
    }

    #[test]
    fn test_cancel_releases_latch() {
        let mut sync = ScrollSync::new(LATCH_WINDOW_MS);
        let src = viewport(200, 1000, 400);
        let dst = viewport(400, 2000, 0);
        sync.mirror(Pane::Editor, &src, &dst, 0).unwrap();
        sync.cancel();
        assert!(!sync.is_latched(Pane::Preview, 10));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn mirrored_offset_stays_in_target_range(
                src_total in 1..5000usize,
                src_height in 1..200u16,
                src_offset in 0..5000usize,
                dst_total in 1..5000usize,
                dst_height in 1..200u16,
            ) {
                let src = {
                    let mut vp = Viewport::new(80, src_height, src_total);
                    vp.go_to_line(src_offset);
                    vp
                };
                let dst = Viewport::new(80, dst_height, dst_total);
                let mut sync = ScrollSync::new(LATCH_WINDOW_MS);
                if let Some(offset) = sync.mirror(Pane::Editor, &src, &dst, 0) {
                    prop_assert!(offset <= dst.max_offset());
                }
            }

            #[test]
            fn round_trip_mirror_is_stable(
                total in 300..5000usize,
                offset in 0..5000usize,
            ) {
                // Mirroring editor→preview and back (after the latch expires)
                // must return to the same editor offset when both panes share
                // line counts.
                let mut editor = Viewport::new(80, 100, total);
                editor.go_to_line(offset);
                let mut preview = Viewport::new(80, 100, total);

                let mut sync = ScrollSync::new(LATCH_WINDOW_MS);
                if let Some(mirrored) = sync.mirror(Pane::Editor, &editor, &preview, 0) {
                    preview.go_to_line(mirrored);
                    let back = sync
                        .mirror(Pane::Preview, &preview, &editor, LATCH_WINDOW_MS)
                        .unwrap();
                    prop_assert_eq!(back, editor.offset());
                }
            }
        }
    }
}
