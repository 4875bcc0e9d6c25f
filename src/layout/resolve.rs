//! Declarative position/size specs resolved into pixel rectangles.
//!
//! A [`GeometryResolver`] holds one [`PositionSpec`] and one [`SizeSpec`] per
//! axis plus four border insets. Resolution happens against the parent's
//! current size: width/height first, then the origin (which depends on the
//! resolved size for the centered and far-edge modes). The result is cached
//! until any input changes.

use crate::error::LayoutError;
use crate::geometry::{Insets, Rect, Size};

// ---------------------------------------------------------------------------
// Modes and specs
// ---------------------------------------------------------------------------

/// How a position value is interpreted along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PositionMode {
    /// Pixels from the near (left/top) edge.
    #[default]
    Absolute,
    /// Pixels between the far (right/bottom) edge and the far side of the rect.
    FromFarEdge,
    /// Percentage of the free space `parent - size`.
    Percent,
    /// Centered in the parent; the value is ignored.
    Centered,
}

/// How a size value is interpreted along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SizeMode {
    /// Exactly `value` pixels.
    Absolute,
    /// The parent dimension minus `value` pixels.
    FromFarEdge,
    /// `value` percent of the parent dimension.
    #[default]
    Percent,
}

impl TryFrom<PositionMode> for SizeMode {
    type Error = LayoutError;

    fn try_from(mode: PositionMode) -> Result<Self, Self::Error> {
        match mode {
            PositionMode::Absolute => Ok(SizeMode::Absolute),
            PositionMode::FromFarEdge => Ok(SizeMode::FromFarEdge),
            PositionMode::Percent => Ok(SizeMode::Percent),
            PositionMode::Centered => Err(LayoutError::CenteredSize),
        }
    }
}

/// Position along a single axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PositionSpec {
    pub mode: PositionMode,
    pub value: i32,
}

impl PositionSpec {
    /// `value` pixels from the near edge.
    pub const fn px(value: i32) -> Self {
        Self { mode: PositionMode::Absolute, value }
    }

    /// `value` pixels away from the far edge.
    pub const fn from_far_edge(value: i32) -> Self {
        Self { mode: PositionMode::FromFarEdge, value }
    }

    /// `value` percent of the free space.
    pub const fn percent(value: i32) -> Self {
        Self { mode: PositionMode::Percent, value }
    }

    /// Centered in the parent.
    pub const fn centered() -> Self {
        Self { mode: PositionMode::Centered, value: 0 }
    }

    fn resolve(self, parent: i32, size: i32) -> i32 {
        let free = parent - size;
        let pos = match self.mode {
            PositionMode::Absolute => self.value,
            PositionMode::FromFarEdge => free - self.value,
            PositionMode::Percent => percent_of(free, self.value),
            PositionMode::Centered => free / 2,
        };
        pos.clamp(0, free.max(0))
    }
}

/// Size along a single axis. Cannot be centered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SizeSpec {
    pub mode: SizeMode,
    pub value: i32,
}

impl Default for SizeSpec {
    fn default() -> Self {
        Self::full()
    }
}

impl SizeSpec {
    /// Exactly `value` pixels.
    pub const fn px(value: i32) -> Self {
        Self { mode: SizeMode::Absolute, value }
    }

    /// The parent dimension minus `value`.
    pub const fn from_far_edge(value: i32) -> Self {
        Self { mode: SizeMode::FromFarEdge, value }
    }

    /// `value` percent of the parent dimension.
    pub const fn percent(value: i32) -> Self {
        Self { mode: SizeMode::Percent, value }
    }

    /// The whole parent dimension.
    pub const fn full() -> Self {
        Self::percent(100)
    }

    /// Build a size spec from a mode chosen at runtime.
    ///
    /// Rejects [`PositionMode::Centered`] with [`LayoutError::CenteredSize`].
    pub fn try_new(mode: PositionMode, value: i32) -> Result<Self, LayoutError> {
        Ok(Self { mode: SizeMode::try_from(mode)?, value })
    }

    fn resolve(self, parent: i32) -> i32 {
        let size = match self.mode {
            SizeMode::Absolute => self.value,
            SizeMode::FromFarEdge => parent - self.value,
            SizeMode::Percent => percent_of(parent, self.value),
        };
        size.clamp(0, parent.max(0))
    }
}

fn percent_of(total: i32, percent: i32) -> i32 {
    (f64::from(total) * f64::from(percent) / 100.0).round() as i32
}

// ---------------------------------------------------------------------------
// Resolved
// ---------------------------------------------------------------------------

/// The two rectangles produced by a resolution, relative to the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolved {
    /// Position and size before border insets.
    pub outer: Rect,
    /// Outer rectangle minus border insets, floored at zero size.
    pub inner: Rect,
}

impl Resolved {
    /// Pick one of the two rectangles.
    pub fn rect(&self, outer: bool) -> Rect {
        if outer {
            self.outer
        } else {
            self.inner
        }
    }
}

// ---------------------------------------------------------------------------
// GeometryResolver
// ---------------------------------------------------------------------------

/// Converts per-axis position/size specs into concrete rectangles.
///
/// Defaults: origin at `(0, 0)`, size 100% x 100%, no border.
#[derive(Debug, Clone, Default)]
pub struct GeometryResolver {
    parent: Option<Size>,
    x: PositionSpec,
    y: PositionSpec,
    width: SizeSpec,
    height: SizeSpec,
    border: Insets,
    cache: Option<Resolved>,
}

impl GeometryResolver {
    /// Create a resolver with default specs and no parent size yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the horizontal and vertical position (builder).
    pub fn with_position(mut self, x: PositionSpec, y: PositionSpec) -> Self {
        self.set_position(x, y);
        self
    }

    /// Set width and height (builder).
    pub fn with_size(mut self, width: SizeSpec, height: SizeSpec) -> Self {
        self.set_size(width, height);
        self
    }

    /// Set the border insets (builder).
    pub fn with_border(mut self, border: Insets) -> Self {
        self.set_border(border);
        self
    }

    /// Set the parent size (builder).
    pub fn with_parent_size(mut self, parent: Size) -> Self {
        self.set_parent_size(parent);
        self
    }

    // ── Setters ──────────────────────────────────────────────────────

    /// Update the parent size. Returns `true` if it changed.
    pub fn set_parent_size(&mut self, parent: Size) -> bool {
        if self.parent == Some(parent) {
            return false;
        }
        self.parent = Some(parent);
        self.cache = None;
        true
    }

    pub fn set_x(&mut self, x: PositionSpec) {
        self.x = x;
        self.cache = None;
    }

    pub fn set_y(&mut self, y: PositionSpec) {
        self.y = y;
        self.cache = None;
    }

    /// Set both position axes.
    pub fn set_position(&mut self, x: PositionSpec, y: PositionSpec) {
        self.set_x(x);
        self.set_y(y);
    }

    pub fn set_width(&mut self, width: SizeSpec) {
        self.width = width;
        self.cache = None;
    }

    pub fn set_height(&mut self, height: SizeSpec) {
        self.height = height;
        self.cache = None;
    }

    /// Set both size axes.
    pub fn set_size(&mut self, width: SizeSpec, height: SizeSpec) {
        self.set_width(width);
        self.set_height(height);
    }

    /// Replace all four border insets.
    pub fn set_border(&mut self, border: Insets) {
        self.border = border;
        self.cache = None;
    }

    /// Set all four border insets to `value`.
    pub fn set_border_all(&mut self, value: i32) {
        self.set_border(Insets::all(value));
    }

    pub fn set_border_top(&mut self, value: i32) {
        self.border.top = value;
        self.cache = None;
    }

    pub fn set_border_bottom(&mut self, value: i32) {
        self.border.bottom = value;
        self.cache = None;
    }

    pub fn set_border_left(&mut self, value: i32) {
        self.border.left = value;
        self.cache = None;
    }

    pub fn set_border_right(&mut self, value: i32) {
        self.border.right = value;
        self.cache = None;
    }

    // ── Getters ──────────────────────────────────────────────────────

    pub fn parent_size(&self) -> Option<Size> {
        self.parent
    }

    pub fn position(&self) -> (PositionSpec, PositionSpec) {
        (self.x, self.y)
    }

    pub fn size(&self) -> (SizeSpec, SizeSpec) {
        (self.width, self.height)
    }

    pub fn border(&self) -> Insets {
        self.border
    }

    /// Whether the next resolution will recompute instead of using the cache.
    pub fn is_dirty(&self) -> bool {
        self.cache.is_none()
    }

    // ── Resolution ───────────────────────────────────────────────────

    /// Resolve against the stored parent size.
    ///
    /// Fails with [`LayoutError::ParentSizeUnset`] if no parent size was set.
    pub fn resolve(&mut self) -> Result<Resolved, LayoutError> {
        let parent = self.parent.ok_or(LayoutError::ParentSizeUnset)?;
        Ok(self.resolve_with(parent))
    }

    /// Resolve one rectangle: `outer = true` for the border box.
    pub fn rect(&mut self, outer: bool) -> Result<Rect, LayoutError> {
        self.resolve().map(|r| r.rect(outer))
    }

    /// Update the parent size and resolve. Never fails.
    pub fn resolve_with(&mut self, parent: Size) -> Resolved {
        self.set_parent_size(parent);
        if let Some(cached) = self.cache {
            return cached;
        }
        let resolved = compute(parent, self.x, self.y, self.width, self.height, self.border);
        self.cache = Some(resolved);
        resolved
    }
}

fn compute(
    parent: Size,
    x: PositionSpec,
    y: PositionSpec,
    width: SizeSpec,
    height: SizeSpec,
    border: Insets,
) -> Resolved {
    let max_w = parent.width.max(0);
    let max_h = parent.height.max(0);

    let w = width.resolve(max_w);
    let h = height.resolve(max_h);
    let outer = Rect::new(x.resolve(max_w, w), y.resolve(max_h, h), w, h);

    let mut inner = outer.shrink(border);
    inner.x = inner.x.min(max_w);
    inner.y = inner.y.min(max_h);

    Resolved { outer, inner }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn resolver(parent: Size) -> GeometryResolver {
        GeometryResolver::new().with_parent_size(parent)
    }

    #[test]
    fn defaults_fill_parent() {
        let mut g = resolver(Size::new(200, 100));
        assert_eq!(g.rect(true).unwrap(), Rect::new(0, 0, 200, 100));
    }

    #[test]
    fn resolving_twice_is_identical() {
        let mut g = resolver(Size::new(640, 480))
            .with_position(PositionSpec::centered(), PositionSpec::from_far_edge(7))
            .with_size(SizeSpec::percent(33), SizeSpec::px(90))
            .with_border(Insets::new(1, 2, 3, 4));
        let first = g.resolve().unwrap();
        assert!(!g.is_dirty());
        let second = g.resolve().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn border_inset_example() {
        let mut g = resolver(Size::new(100, 100)).with_border(Insets::all(10));
        let r = g.resolve().unwrap();
        assert_eq!(r.outer, Rect::new(0, 0, 100, 100));
        assert_eq!(r.inner, Rect::new(10, 10, 80, 80));
    }

    #[test]
    fn oversized_border_floors_inner_at_zero() {
        let mut g = resolver(Size::new(100, 100))
            .with_size(SizeSpec::px(10), SizeSpec::px(10))
            .with_border(Insets::all(20));
        let inner = g.rect(false).unwrap();
        assert_eq!(inner.width, 0);
        assert_eq!(inner.height, 0);
        assert!(inner.x <= 100 && inner.y <= 100);
    }

    #[test]
    fn percent_size_rounds_and_clamps() {
        let mut g = resolver(Size::new(101, 50)).with_size(SizeSpec::percent(50), SizeSpec::percent(150));
        let r = g.rect(true).unwrap();
        assert_eq!(r.width, 51);
        assert_eq!(r.height, 50);
    }

    #[test]
    fn far_edge_size_and_position() {
        let mut g = resolver(Size::new(300, 200))
            .with_size(SizeSpec::from_far_edge(100), SizeSpec::px(20))
            .with_position(PositionSpec::px(0), PositionSpec::from_far_edge(0));
        assert_eq!(g.rect(true).unwrap(), Rect::new(0, 180, 200, 20));
    }

    #[test]
    fn centered_position() {
        let mut g = resolver(Size::new(300, 200))
            .with_size(SizeSpec::px(100), SizeSpec::px(50))
            .with_position(PositionSpec::centered(), PositionSpec::centered());
        assert_eq!(g.rect(true).unwrap(), Rect::new(100, 75, 100, 50));
    }

    #[test]
    fn absolute_position_clamps_into_parent() {
        let mut g = resolver(Size::new(100, 100))
            .with_size(SizeSpec::px(40), SizeSpec::px(40))
            .with_position(PositionSpec::px(90), PositionSpec::px(-15));
        assert_eq!(g.rect(true).unwrap(), Rect::new(60, 0, 40, 40));
    }

    #[test]
    fn percent_position_uses_free_space() {
        let mut g = resolver(Size::new(200, 100))
            .with_size(SizeSpec::px(100), SizeSpec::px(100))
            .with_position(PositionSpec::percent(100), PositionSpec::percent(50));
        assert_eq!(g.rect(true).unwrap(), Rect::new(100, 0, 100, 100));
    }

    #[test]
    fn outer_rect_always_inside_parent() {
        let positions = [
            PositionSpec::px(-50),
            PositionSpec::px(0),
            PositionSpec::px(75),
            PositionSpec::px(500),
            PositionSpec::from_far_edge(-20),
            PositionSpec::from_far_edge(30),
            PositionSpec::percent(-10),
            PositionSpec::percent(60),
            PositionSpec::percent(250),
            PositionSpec::centered(),
        ];
        let sizes = [
            SizeSpec::px(-5),
            SizeSpec::px(40),
            SizeSpec::px(1000),
            SizeSpec::from_far_edge(10),
            SizeSpec::from_far_edge(-10),
            SizeSpec::percent(0),
            SizeSpec::percent(70),
            SizeSpec::percent(300),
        ];
        for parent in [Size::new(0, 0), Size::new(1, 3), Size::new(120, 80)] {
            for &pos in &positions {
                for &size in &sizes {
                    let mut g = resolver(parent).with_position(pos, pos).with_size(size, size);
                    let r = g.rect(true).unwrap();
                    assert!(r.x >= 0 && r.right() <= parent.width, "{pos:?} {size:?} {parent:?} -> {r:?}");
                    assert!(r.y >= 0 && r.bottom() <= parent.height, "{pos:?} {size:?} {parent:?} -> {r:?}");
                }
            }
        }
    }

    #[test]
    fn parent_change_invalidates_cache() {
        let mut g = resolver(Size::new(100, 100)).with_size(SizeSpec::percent(50), SizeSpec::percent(50));
        assert_eq!(g.rect(true).unwrap().width, 50);
        assert!(!g.set_parent_size(Size::new(100, 100)));
        assert!(!g.is_dirty());
        assert!(g.set_parent_size(Size::new(300, 100)));
        assert!(g.is_dirty());
        assert_eq!(g.rect(true).unwrap().width, 150);
    }

    #[test]
    fn setters_invalidate_cache() {
        let mut g = resolver(Size::new(100, 100));
        g.resolve().unwrap();
        g.set_border_left(5);
        assert!(g.is_dirty());
        assert_eq!(g.rect(false).unwrap(), Rect::new(5, 0, 95, 100));
    }

    #[test]
    fn missing_parent_size_is_an_error() {
        let mut g = GeometryResolver::new();
        assert_eq!(g.resolve(), Err(LayoutError::ParentSizeUnset));
    }

    #[test]
    fn centered_size_is_rejected() {
        assert_eq!(
            SizeSpec::try_new(PositionMode::Centered, 10),
            Err(LayoutError::CenteredSize)
        );
        assert_eq!(
            SizeSpec::try_new(PositionMode::Percent, 10),
            Ok(SizeSpec::percent(10))
        );
    }
}
