//! Incremental draw pass.
//!
//! Nodes paint directly into their host surface (the display, or the content
//! surface of the nearest viewport ancestor). A node is recomposed when it is
//! dirty itself or when something underneath it was just redrawn; its children
//! are visited when any of them is dirty. Dirty bits are only cleared on nodes
//! that actually drew this frame.

use super::node::NodeId;
use super::tree::Tree;
use crate::geometry::{Offset, Rect, Size};
use crate::render::surface::{Color, Surface};
use crate::widget::draw_border;

impl Tree {
    /// Redraw every dirty part of the tree onto `target`.
    ///
    /// A target whose size differs from the display size resizes the tree
    /// first, which forces a full redraw. Returns `true` if any pixel may have
    /// changed.
    pub fn draw(&mut self, target: &mut Surface) -> bool {
        if target.size() != self.display {
            self.resize(target.size());
        }
        let root = self.root();
        let display = self.display;
        self.draw_node(root, target, Offset::ZERO, display, false)
    }

    fn draw_node(
        &mut self,
        id: NodeId,
        host: &mut Surface,
        origin: Offset,
        space: Size,
        parent_changed: bool,
    ) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        node.updated = false;
        self.with_widget(id, |w, tree| w.before_draw(tree, id, parent_changed));

        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        if !node.visible {
            return false;
        }
        let resolved = node.geometry.resolve_with(space);
        let outer = resolved.outer.translate(origin);
        let inner = resolved.inner.translate(origin);
        let is_viewport = node.viewport.is_some();
        if is_viewport {
            self.prepare_viewport(id, resolved.inner.size());
        }

        let recompose = self.nodes[id].self_changed || parent_changed;
        if recompose && self.recompose(id, host, outer, inner) {
            self.mark_dirty(id);
        }

        let node = &self.nodes[id];
        let visit_children = node.child_changed || node.self_changed || parent_changed;
        let mut updated = recompose;

        if visit_children && !self.children(id).is_empty() {
            if is_viewport {
                updated |= self.draw_viewport_children(id, recompose);
            } else {
                updated |= self.draw_children(id, host, inner.origin(), resolved.inner.size(), recompose);
            }
        }

        if is_viewport && updated {
            self.present_viewport(id, host, inner.origin());
        }

        let node = &mut self.nodes[id];
        if updated {
            node.self_changed = false;
            node.child_changed = false;
        }
        node.updated = updated;
        updated
    }

    /// Draw the children of `id` in z-order. A child is forced to recompose
    /// when `base` is set or when an earlier sibling that redrew this frame
    /// overlaps it.
    fn draw_children(&mut self, id: NodeId, host: &mut Surface, origin: Offset, space: Size, base: bool) -> bool {
        let children = self.children(id).to_vec();
        let mut redrawn: Vec<Rect> = Vec::new();
        let mut any = false;

        for child in children {
            let Some(node) = self.nodes.get_mut(child) else {
                continue;
            };
            let rect = node.geometry.resolve_with(space).outer;
            let overlapped = redrawn.iter().any(|r| r.overlaps(rect));
            if self.draw_node(child, host, origin, space, base || overlapped) {
                any = true;
                redrawn.push(self.nodes[child].geometry.resolve_with(space).outer);
            }
        }
        any
    }

    fn draw_viewport_children(&mut self, id: NodeId, base: bool) -> bool {
        let Some(vp) = self.nodes[id].viewport.as_mut() else {
            return false;
        };
        let space = vp.scroll.content_size();
        let Some(mut content) = vp.content.take() else {
            return false;
        };
        let any = self.draw_children(id, &mut content, Offset::ZERO, space, base);
        if let Some(vp) = self.nodes.get_mut(id).and_then(|n| n.viewport.as_mut()) {
            vp.content = Some(content);
        }
        any
    }

    /// Copy the visible window of a viewport's content onto its host.
    fn present_viewport(&mut self, id: NodeId, host: &mut Surface, at: Offset) {
        if let Some(vp) = self.nodes[id].viewport.as_ref() {
            if let Some(content) = vp.content.as_ref() {
                host.blit(content, vp.scroll.visible_window(), at);
            }
        }
    }

    /// Sync a viewport's scroll state with its frame and make sure its content
    /// surface matches the content size. Any change marks the viewport dirty.
    fn prepare_viewport(&mut self, id: NodeId, visible: Size) {
        let Some(vp) = self.nodes[id].viewport.as_mut() else {
            return;
        };
        let mut dirty = vp.scroll.set_visible_size(visible);
        dirty |= vp.scroll.adjust_shift();
        let content_size = vp.scroll.content_size();
        if vp.content.as_ref().map(Surface::size) != Some(content_size) {
            vp.content = Some(Surface::new(content_size));
            dirty = true;
        }
        if dirty {
            self.mark_dirty(id);
        }
    }

    /// Fill, compose and border one node. Returns `true` if any hook wrote pixels.
    fn recompose(&mut self, id: NodeId, host: &mut Surface, outer: Rect, inner: Rect) -> bool {
        let mut widget = self.widgets.remove(id);
        let mut content = self.nodes[id].viewport.as_mut().and_then(|vp| vp.content.take());
        let node = &self.nodes[id];
        let mut mutated = false;

        if let Some(fill) = node.fill {
            host.canvas_at(outer).fill(fill);
            mutated = true;
        }
        match content.as_mut() {
            Some(surface) => {
                surface.fill(node.fill.unwrap_or(Color::TRANSPARENT));
                if let Some(w) = widget.as_mut() {
                    mutated |= w.compose(node, &mut surface.canvas());
                }
            }
            None => {
                if let Some(w) = widget.as_mut() {
                    mutated |= w.compose(node, &mut host.canvas_at(inner));
                }
            }
        }
        let mut ring = host.canvas_at(outer);
        mutated |= match widget.as_mut() {
            Some(w) => w.compose_border(node, &mut ring),
            None => draw_border(node, &mut ring),
        };

        if let Some(vp) = self.nodes[id].viewport.as_mut() {
            vp.content = content;
        }
        if let Some(w) = widget {
            self.widgets.insert(id, w);
        }
        mutated
    }
}

// ===========================================================================
// Tests
// ===========================================================================
