//! Widget trait: the behaviour attached to a tree node.
//!
//! A node without a widget is a plain panel: it fills, draws its border and
//! forwards events to its children. Attaching a [`Widget`] lets a node compose
//! its own pixels, intercept events before its children see them, refresh its
//! subtree right before a draw and react to ticks and focus changes.
//!
//! Hooks that receive `&mut Tree` run while the widget is detached from the
//! tree, so a widget can freely mutate nodes (including its own) but will not
//! see its own hooks re-entered.

use std::any::Any;

use crate::event::input::{Event, PointerEvent};
use crate::geometry::Rect;
use crate::render::surface::Canvas;
use crate::tree::{NodeData, NodeId, Tree};

// ---------------------------------------------------------------------------
// Widget trait
// ---------------------------------------------------------------------------

/// Behaviour hooks for one node.
///
/// All hooks have no-op defaults except the downcast helpers.
pub trait Widget {
    /// Type name used in logs and debug output.
    fn widget_type(&self) -> &str;

    /// Runs whenever the draw pass reaches the node, before visibility is
    /// checked and before geometry is resolved.
    ///
    /// `parent_changed` is `true` when the node will be recomposed because
    /// something underneath it was redrawn.
    fn before_draw(&mut self, _tree: &mut Tree, _id: NodeId, _parent_changed: bool) {}

    /// Paint the node's content into its inner rectangle.
    ///
    /// Returns `true` if pixels were written.
    fn compose(&mut self, _node: &NodeData, _canvas: &mut Canvas<'_>) -> bool {
        false
    }

    /// Paint the border ring into the outer rectangle.
    ///
    /// Returns `true` if pixels were written.
    fn compose_border(&mut self, node: &NodeData, canvas: &mut Canvas<'_>) -> bool {
        draw_border(node, canvas)
    }

    /// A non-positional event travelling down the focus chain.
    ///
    /// Return `true` to consume it; otherwise it continues to the focus child.
    fn on_focus_event(&mut self, _tree: &mut Tree, _id: NodeId, _event: &Event) -> bool {
        false
    }

    /// A pointer event over this node. `event.pos` is relative to the node's
    /// inner rectangle (content coordinates for viewports).
    ///
    /// Return `true` to consume it; otherwise it is hit-tested against the children.
    fn on_pointer_event(&mut self, _tree: &mut Tree, _id: NodeId, _event: &PointerEvent) -> bool {
        false
    }

    /// The node gained or lost focus.
    fn on_focus_changed(&mut self, _tree: &mut Tree, _id: NodeId, _focused: bool) {}

    /// Per-frame callback, only delivered while ticks are enabled for the node.
    fn on_tick(&mut self, _tree: &mut Tree, _id: NodeId, _elapsed_ms: u64) {}

    /// Downcast to `&dyn Any` for runtime type inspection.
    fn as_any(&self) -> &dyn Any;

    /// Downcast to `&mut dyn Any` for mutable runtime type inspection.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

// ---------------------------------------------------------------------------
// Border painting
// ---------------------------------------------------------------------------

/// Paint the four border strips of `node` onto a canvas covering its outer
/// rectangle. Returns `false` if the node has no border colour or no insets.
pub fn draw_border(node: &NodeData, canvas: &mut Canvas<'_>) -> bool {
    let Some(color) = node.border_color() else {
        return false;
    };
    let insets = node.geometry().border();
    let size = canvas.size();
    let mut drawn = false;

    if insets.top > 0 {
        canvas.fill_rect(Rect::new(0, 0, size.width, insets.top), color);
        drawn = true;
    }
    if insets.left > 0 {
        canvas.fill_rect(Rect::new(0, 0, insets.left, size.height), color);
        drawn = true;
    }
    if insets.right > 0 {
        canvas.fill_rect(Rect::new(size.width - insets.right, 0, insets.right, size.height), color);
        drawn = true;
    }
    if insets.bottom > 0 {
        canvas.fill_rect(Rect::new(0, size.height - insets.bottom, size.width, insets.bottom), color);
        drawn = true;
    }
    drawn
}

// ===========================================================================
// Tests
// ===========================================================================
