//! ScrollView: a viewport with a vertical and a horizontal scrollbar.

use std::any::Any;

use crate::layout::resolve::{PositionSpec, SizeSpec};
use crate::render::surface::Color;
use crate::tree::{NodeData, NodeId, Tree};
use crate::widget::scroll::Axis;
use crate::widget::traits::Widget;
use crate::widgets::scrollbar::{Scrollbar, BAR_THICKNESS};

/// Colour of the scrollbar track behind the thumb.
pub const TRACK_COLOR: Color = Color::DARK_GREY;

/// Container whose first child is a full-size viewport, overlaid by a
/// vertical bar along the right edge and a horizontal bar along the bottom.
///
/// Content goes under [`viewport`](Self::viewport); attach a widget to the
/// viewport with [`Tree::set_widget`] to make it scroll-aware.
pub struct ScrollView {
    viewport: NodeId,
    vertical: NodeId,
    horizontal: NodeId,
}

impl ScrollView {
    /// Build the container, viewport and bars under `parent`. Returns the
    /// container node.
    pub fn insert(tree: &mut Tree, parent: NodeId, data: NodeData) -> NodeId {
        let container = tree.add_node(parent, data);
        let viewport = tree.add_node(container, NodeData::viewport());
        let vertical = tree.add(
            container,
            NodeData::new()
                .with_position(PositionSpec::from_far_edge(0), PositionSpec::px(0))
                .with_size(SizeSpec::px(BAR_THICKNESS), SizeSpec::from_far_edge(BAR_THICKNESS))
                .with_fill(TRACK_COLOR),
            Scrollbar::new(viewport, Axis::Vertical),
        );
        let horizontal = tree.add(
            container,
            NodeData::new()
                .with_position(PositionSpec::px(0), PositionSpec::from_far_edge(0))
                .with_size(SizeSpec::from_far_edge(BAR_THICKNESS), SizeSpec::px(BAR_THICKNESS))
                .with_fill(TRACK_COLOR),
            Scrollbar::new(viewport, Axis::Horizontal),
        );
        tree.set_widget(
            container,
            Box::new(ScrollView {
                viewport,
                vertical,
                horizontal,
            }),
        );
        container
    }

    pub fn viewport(&self) -> NodeId {
        self.viewport
    }

    /// The bar for `axis`.
    pub fn scrollbar(&self, axis: Axis) -> NodeId {
        match axis {
            Axis::Vertical => self.vertical,
            Axis::Horizontal => self.horizontal,
        }
    }
}

impl Widget for ScrollView {
    fn widget_type(&self) -> &str {
        "ScrollView"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ===========================================================================
// Tests
// ===========================================================================
