//! Scrollbar widget bound to a viewport node.
//!
//! The bar mirrors the viewport's scroll state along one axis. It refreshes
//! its metrics whenever the draw pass reaches it, hides itself when there is
//! nothing to scroll and turns pointer drags into shift changes on the
//! viewport.

use std::any::Any;

use crate::event::input::{MouseButton, PointerAction, PointerEvent};
use crate::geometry::Rect;
use crate::render::surface::{Canvas, Color};
use crate::tree::{NodeData, NodeId, Tree};
use crate::widget::scroll::{Axis, ScrollbarState};
use crate::widget::traits::Widget;

/// Default bar thickness in pixels.
pub const BAR_THICKNESS: i32 = 20;

/// A proportional scrollbar for one axis of a viewport.
pub struct Scrollbar {
    viewport: NodeId,
    axis: Axis,
    state: ScrollbarState,
    color: Color,
}

impl Scrollbar {
    pub fn new(viewport: NodeId, axis: Axis) -> Self {
        Self {
            viewport,
            axis,
            state: ScrollbarState::default(),
            color: Color::RED,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn viewport(&self) -> NodeId {
        self.viewport
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// The metrics shown during the last draw.
    pub fn state(&self) -> ScrollbarState {
        self.state
    }
}

impl Widget for Scrollbar {
    fn widget_type(&self) -> &str {
        "Scrollbar"
    }

    fn before_draw(&mut self, tree: &mut Tree, id: NodeId, _parent_changed: bool) {
        let state = tree
            .get(self.viewport)
            .and_then(NodeData::scroll)
            .map(|s| ScrollbarState::from_scroll_state(s, self.axis))
            .unwrap_or_default();
        if state != self.state {
            self.state = state;
            tree.mark_dirty(id);
        }
        tree.set_visible(id, state.is_needed());
    }

    fn compose(&mut self, _node: &NodeData, canvas: &mut Canvas<'_>) -> bool {
        let size = canvas.size();
        let (start, len) = self.state.thumb(self.axis.of_size(size));
        let thumb = match self.axis {
            Axis::Vertical => Rect::new(0, start, size.width, len.max(1)),
            Axis::Horizontal => Rect::new(start, 0, len.max(1), size.height),
        };
        canvas.fill_rect(thumb, self.color);
        true
    }

    fn on_pointer_event(&mut self, tree: &mut Tree, _id: NodeId, event: &PointerEvent) -> bool {
        match event.action {
            PointerAction::Motion {
                held: Some(MouseButton::Left),
                rel,
            } => {
                let delta = self.state.drag_delta(self.axis.of_offset(rel));
                if delta != 0 {
                    tree.scroll_by(self.viewport, self.axis.offset(delta));
                }
                true
            }
            PointerAction::Down(MouseButton::Left) | PointerAction::Up(MouseButton::Left) => true,
            _ => false,
        }
    }

    // A click on the bar must not take focus away from the scrolled content.
    fn on_focus_changed(&mut self, tree: &mut Tree, _id: NodeId, focused: bool) {
        if focused {
            tree.set_focus(self.viewport, true);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
