//! Node types: NodeId, NodeData.

use slotmap::new_key_type;

use crate::geometry::Insets;
use crate::layout::resolve::{GeometryResolver, PositionSpec, SizeSpec};
use crate::render::surface::{Color, Surface};
use crate::widget::scroll::ScrollState;

new_key_type! {
    /// Unique identifier for a tree node. Copy, lightweight (u64).
    pub struct NodeId;
}

/// Scroll state and backing surface of a viewport node.
#[derive(Debug, Default)]
pub(crate) struct ViewportData {
    pub(crate) scroll: ScrollState,
    pub(crate) content: Option<Surface>,
}

/// State of a single node.
///
/// Fields are only mutated through [`Tree`](super::Tree) so that every change
/// goes through the dirty-marking paths. Build one with the `with_*` methods
/// before inserting it.
#[derive(Debug)]
pub struct NodeData {
    pub(crate) geometry: GeometryResolver,
    pub(crate) fill: Option<Color>,
    pub(crate) border_color: Option<Color>,
    pub(crate) visible: bool,
    pub(crate) interactive: bool,
    pub(crate) has_focus: bool,
    pub(crate) self_changed: bool,
    pub(crate) child_changed: bool,
    /// Drew something during the current frame.
    pub(crate) updated: bool,
    pub(crate) focus_child: Option<super::NodeId>,
    pub(crate) tick_enabled: bool,
    pub(crate) viewport: Option<ViewportData>,
}

impl Default for NodeData {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeData {
    /// A visible, interactive node filling its parent. Starts dirty.
    pub fn new() -> Self {
        Self {
            geometry: GeometryResolver::new(),
            fill: None,
            border_color: None,
            visible: true,
            interactive: true,
            has_focus: false,
            self_changed: true,
            child_changed: true,
            updated: false,
            focus_child: None,
            tick_enabled: false,
            viewport: None,
        }
    }

    /// A viewport node: children are laid out on an oversized content
    /// surface of which only a shifted window is shown.
    pub fn viewport() -> Self {
        Self {
            viewport: Some(ViewportData::default()),
            ..Self::new()
        }
    }

    // ── Builders ─────────────────────────────────────────────────────

    pub fn with_position(mut self, x: PositionSpec, y: PositionSpec) -> Self {
        self.geometry.set_position(x, y);
        self
    }

    pub fn with_size(mut self, width: SizeSpec, height: SizeSpec) -> Self {
        self.geometry.set_size(width, height);
        self
    }

    pub fn with_border(mut self, border: Insets, color: Color) -> Self {
        self.geometry.set_border(border);
        self.border_color = Some(color);
        self
    }

    pub fn with_fill(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn non_interactive(mut self) -> Self {
        self.interactive = false;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    /// Own content must be recomposed.
    pub fn is_self_changed(&self) -> bool {
        self.self_changed
    }

    /// Some descendant must be recomposed.
    pub fn is_child_changed(&self) -> bool {
        self.child_changed
    }

    /// Whether the node drew anything during the most recent draw pass.
    pub fn is_updated(&self) -> bool {
        self.updated
    }

    pub fn focus_child(&self) -> Option<super::NodeId> {
        self.focus_child
    }

    pub fn is_tick_enabled(&self) -> bool {
        self.tick_enabled
    }

    pub fn is_viewport(&self) -> bool {
        self.viewport.is_some()
    }

    pub fn fill(&self) -> Option<Color> {
        self.fill
    }

    pub fn border_color(&self) -> Option<Color> {
        self.border_color
    }

    pub fn geometry(&self) -> &GeometryResolver {
        &self.geometry
    }

    /// Scroll state, for viewport nodes.
    pub fn scroll(&self) -> Option<&ScrollState> {
        self.viewport.as_ref().map(|v| &v.scroll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_defaults() {
        let data = NodeData::new();
        assert!(data.is_visible());
        assert!(data.is_interactive());
        assert!(!data.has_focus());
        assert!(data.is_self_changed());
        assert!(data.focus_child().is_none());
        assert!(!data.is_viewport());
    }

    #[test]
    fn builders() {
        let data = NodeData::viewport()
            .with_fill(Color::GREY)
            .with_border(Insets::all(3), Color::RED)
            .hidden()
            .non_interactive();
        assert!(data.is_viewport());
        assert_eq!(data.fill(), Some(Color::GREY));
        assert_eq!(data.border_color(), Some(Color::RED));
        assert_eq!(data.geometry().border(), Insets::all(3));
        assert!(!data.is_visible());
        assert!(!data.is_interactive());
        assert!(data.scroll().is_some());
    }
}
