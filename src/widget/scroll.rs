//! Scroll state for viewports and the metrics their scrollbars display.
//!
//! [`ScrollState`] tracks the content size of a viewport, its visible size and
//! the current shift. The shift is freely writable; it is only clamped into
//! `[0, content - visible]` by [`ScrollState::adjust_shift`], which the draw
//! pass runs once per frame. [`ScrollbarState`] is the per-axis snapshot a
//! scrollbar renders and drags with.

use crate::geometry::{Offset, Rect, Size};

// ---------------------------------------------------------------------------
// Axis
// ---------------------------------------------------------------------------

/// Scroll direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// The component of `offset` along this axis.
    pub fn of_offset(self, offset: Offset) -> i32 {
        match self {
            Axis::Horizontal => offset.x,
            Axis::Vertical => offset.y,
        }
    }

    /// The component of `size` along this axis.
    pub fn of_size(self, size: Size) -> i32 {
        match self {
            Axis::Horizontal => size.width,
            Axis::Vertical => size.height,
        }
    }

    /// An offset of `amount` along this axis and zero on the other.
    pub fn offset(self, amount: i32) -> Offset {
        match self {
            Axis::Horizontal => Offset::new(amount, 0),
            Axis::Vertical => Offset::new(0, amount),
        }
    }
}

// ---------------------------------------------------------------------------
// ScrollState
// ---------------------------------------------------------------------------

/// Scroll bookkeeping for a viewport.
///
/// The effective content size is never smaller than the visible size.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScrollState {
    /// Top-left of the visible window inside the content.
    pub shift: Offset,
    applied: Offset,
    requested: Size,
    visible: Size,
}

impl ScrollState {
    /// Create a scroll state with zero shift and no content.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a content size. Returns `true` if the effective size changed.
    pub fn set_content_size(&mut self, size: Size) -> bool {
        let before = self.content_size();
        self.requested = size;
        self.content_size() != before
    }

    /// Update the visible size. Returns `true` if the effective content size changed.
    pub fn set_visible_size(&mut self, size: Size) -> bool {
        let before = self.content_size();
        self.visible = size;
        self.content_size() != before
    }

    /// Effective content size: the requested size grown to at least the visible size.
    pub fn content_size(&self) -> Size {
        self.requested.max(self.visible)
    }

    pub fn visible_size(&self) -> Size {
        self.visible
    }

    /// The largest valid shift on each axis.
    pub fn max_shift(&self) -> Offset {
        let content = self.content_size();
        Offset::new(
            (content.width - self.visible.width).max(0),
            (content.height - self.visible.height).max(0),
        )
    }

    /// Set the shift without clamping.
    pub fn scroll_to(&mut self, shift: Offset) {
        self.shift = shift;
    }

    /// Move the shift by a delta without clamping.
    pub fn scroll_by(&mut self, delta: Offset) {
        self.shift = self.shift + delta;
    }

    /// Clamp the shift into range.
    ///
    /// Returns `true` if the clamped shift differs from the one applied on the
    /// previous call.
    pub fn adjust_shift(&mut self) -> bool {
        let max = self.max_shift();
        self.shift = Offset::new(self.shift.x.clamp(0, max.x), self.shift.y.clamp(0, max.y));
        if self.shift == self.applied {
            return false;
        }
        self.applied = self.shift;
        true
    }

    /// The part of the content currently shown.
    pub fn visible_window(&self) -> Rect {
        Rect::new(self.shift.x, self.shift.y, self.visible.width, self.visible.height)
    }

    /// Whether there is anything to scroll along `axis`.
    pub fn is_scrollable(&self, axis: Axis) -> bool {
        axis.of_size(self.content_size()) > axis.of_size(self.visible)
    }
}

// ---------------------------------------------------------------------------
// ScrollbarState
// ---------------------------------------------------------------------------

/// What a scrollbar shows for one axis, in content pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollbarState {
    /// Visible extent (the thumb's share of the track).
    pub bar: i32,
    /// Content extent (the whole track).
    pub range: i32,
    /// Current shift (the thumb's start).
    pub position: i32,
}

impl ScrollbarState {
    /// Snapshot `state` along `axis`.
    pub fn from_scroll_state(state: &ScrollState, axis: Axis) -> Self {
        Self {
            bar: axis.of_size(state.visible_size()),
            range: axis.of_size(state.content_size()),
            position: axis.of_offset(state.shift),
        }
    }

    /// Whether a bar should be shown at all.
    pub fn is_needed(&self) -> bool {
        self.bar < self.range
    }

    /// Thumb start and length on a track of `track` pixels.
    pub fn thumb(&self, track: i32) -> (i32, i32) {
        if self.range <= 0 {
            return (0, track);
        }
        let scale = |v: i32| (i64::from(v) * i64::from(track) / i64::from(self.range)) as i32;
        (scale(self.position), scale(self.bar))
    }

    /// Shift delta produced by dragging the thumb `pixels` along the track.
    pub fn drag_delta(&self, pixels: i32) -> i32 {
        if self.bar <= 0 {
            return 0;
        }
        (i64::from(pixels) * i64::from(self.range) / i64::from(self.bar)) as i32
    }
}

// ===========================================================================
// Tests
// ===========================================================================
