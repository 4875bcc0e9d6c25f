//! The node arena: structure, geometry, dirty marking, focus and visibility.

use std::collections::VecDeque;

use slotmap::{SecondaryMap, SlotMap};

use super::node::{NodeData, NodeId};
use crate::geometry::{Insets, Offset, Rect, Size};
use crate::layout::resolve::{PositionSpec, Resolved, SizeSpec};
use crate::render::surface::Color;
use crate::widget::Widget;

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[NodeId] = &[];

/// The retained node tree, backed by a slotmap arena.
///
/// The root always exists, always has focus and is sized to the display.
/// Children are ordered: later children are drawn on top and hit-tested first.
pub struct Tree {
    pub(crate) nodes: SlotMap<NodeId, NodeData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
    pub(crate) widgets: SecondaryMap<NodeId, Box<dyn Widget>>,
    root: NodeId,
    pub(super) display: Size,
}

impl Tree {
    /// Create a tree whose root fills a display of `display` pixels.
    pub fn new(display: Size) -> Self {
        let mut nodes = SlotMap::with_key();
        let mut root_data = NodeData::new();
        root_data.has_focus = true;
        let root = nodes.insert(root_data);
        let mut children = SecondaryMap::new();
        children.insert(root, Vec::new());
        Self {
            nodes,
            children,
            parent: SecondaryMap::new(),
            widgets: SecondaryMap::new(),
            root,
            display,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn display_size(&self) -> Size {
        self.display
    }

    /// Change the display size and force a full redraw.
    pub fn resize(&mut self, display: Size) {
        self.display = display;
        self.mark_dirty(self.root);
    }

    // ── Structure ────────────────────────────────────────────────────

    /// Insert a plain node as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not exist in the tree.
    pub fn add_node(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        assert!(self.nodes.contains_key(parent), "parent node does not exist");
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        self.parent.insert(id, parent);
        self.children[parent].push(id);
        self.mark_dirty(id);
        id
    }

    /// Insert a node with a widget attached as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not exist in the tree.
    pub fn add<W: Widget + 'static>(&mut self, parent: NodeId, data: NodeData, widget: W) -> NodeId {
        let id = self.add_node(parent, data);
        self.widgets.insert(id, Box::new(widget));
        id
    }

    /// Attach or replace the widget of an existing node.
    pub fn set_widget(&mut self, id: NodeId, widget: Box<dyn Widget>) {
        if self.nodes.contains_key(id) {
            self.widgets.insert(id, widget);
            self.mark_dirty(id);
        }
    }

    /// Remove a node and its whole subtree.
    ///
    /// Focus is dropped first so no focus reference can dangle, and the parent
    /// is marked dirty so the freed area is recomposed. Removing the root or an
    /// unknown node is a no-op.
    pub fn remove(&mut self, id: NodeId) {
        if id == self.root || !self.nodes.contains_key(id) {
            return;
        }
        self.set_interactive(id, false);

        if let Some(parent_id) = self.parent.remove(id) {
            if let Some(siblings) = self.children.get_mut(parent_id) {
                siblings.retain(|&child| child != id);
            }
            if self.nodes[parent_id].focus_child == Some(id) {
                self.nodes[parent_id].focus_child = None;
            }
            self.mark_dirty(parent_id);
        }

        let mut to_remove = VecDeque::from([id]);
        while let Some(current) = to_remove.pop_front() {
            if let Some(kids) = self.children.remove(current) {
                to_remove.extend(kids);
            }
            self.parent.remove(current);
            self.widgets.remove(current);
            self.nodes.remove(current);
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: the root cannot be removed.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    /// Children in z-order. Empty for unknown nodes.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(EMPTY_CHILDREN)
    }

    /// Ancestors from the immediate parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent(current) {
            result.push(p);
            current = p;
        }
        result
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    /// Node data for a node that must exist.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not in the tree.
    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id]
    }

    /// Downcast the widget attached to `id`.
    ///
    /// Returns `None` while that widget's own hook is running.
    pub fn widget<W: Widget + 'static>(&self, id: NodeId) -> Option<&W> {
        self.widgets.get(id)?.as_any().downcast_ref::<W>()
    }

    /// Mutable variant of [`widget`](Self::widget).
    pub fn widget_mut<W: Widget + 'static>(&mut self, id: NodeId) -> Option<&mut W> {
        self.widgets.get_mut(id)?.as_any_mut().downcast_mut::<W>()
    }

    /// Run `f` with the widget of `id` detached from the tree.
    pub(crate) fn with_widget<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut dyn Widget, &mut Tree) -> R,
    ) -> Option<R> {
        let mut widget = self.widgets.remove(id)?;
        let result = f(widget.as_mut(), self);
        if self.nodes.contains_key(id) && !self.widgets.contains_key(id) {
            self.widgets.insert(id, widget);
        }
        Some(result)
    }

    // ── Dirty marking ────────────────────────────────────────────────

    /// Mark `id` for recomposition and flag every ancestor up to the root as
    /// having a dirty descendant.
    pub fn mark_dirty(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.self_changed = true;
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            self.nodes[p].child_changed = true;
            current = p;
        }
    }

    // ── Geometry ─────────────────────────────────────────────────────

    pub fn set_position(&mut self, id: NodeId, x: PositionSpec, y: PositionSpec) {
        if self.nodes[id].geometry.position() == (x, y) {
            return;
        }
        self.nodes[id].geometry.set_position(x, y);
        self.mark_moved(id);
    }

    pub fn set_size(&mut self, id: NodeId, width: SizeSpec, height: SizeSpec) {
        if self.nodes[id].geometry.size() == (width, height) {
            return;
        }
        self.nodes[id].geometry.set_size(width, height);
        self.mark_moved(id);
    }

    /// Replace the border insets and, if given, the border colour.
    pub fn set_border(&mut self, id: NodeId, border: Insets, color: Option<Color>) {
        let node = &mut self.nodes[id];
        node.geometry.set_border(border);
        if color.is_some() {
            node.border_color = color;
        }
        self.mark_dirty(id);
    }

    pub fn set_fill(&mut self, id: NodeId, fill: Option<Color>) {
        if self.nodes[id].fill != fill {
            self.nodes[id].fill = fill;
            self.mark_dirty(id);
        }
    }

    // A moved or resized node may uncover parts of its parent.
    fn mark_moved(&mut self, id: NodeId) {
        self.mark_dirty(id);
        if let Some(p) = self.parent(id) {
            self.mark_dirty(p);
        }
    }

    /// The size children of `id` are laid out against: the inner rectangle
    /// for plain nodes, the content size for viewports.
    pub fn child_space(&mut self, id: NodeId) -> Size {
        let resolved = self.resolve(id);
        let node = &mut self.nodes[id];
        match node.viewport.as_mut() {
            Some(vp) => {
                vp.scroll.set_visible_size(resolved.inner.size());
                vp.scroll.content_size()
            }
            None => resolved.inner.size(),
        }
    }

    /// Resolve the rectangles of `id`, relative to its parent's child space.
    pub fn resolve(&mut self, id: NodeId) -> Resolved {
        let space = match self.parent(id) {
            Some(p) => self.child_space(p),
            None => self.display,
        };
        self.nodes[id].geometry.resolve_with(space)
    }

    /// Outer (`outer = true`) or inner rectangle of `id` in its parent's child space.
    pub fn rect(&mut self, id: NodeId, outer: bool) -> Rect {
        self.resolve(id).rect(outer)
    }

    // ── Focus ────────────────────────────────────────────────────────

    /// Give or take focus.
    ///
    /// Gaining focus makes the node interactive, focuses every ancestor,
    /// records the node as its parent's focus child and clears focus on its
    /// siblings. Along the node's own remembered focus children, focus is
    /// restored down to the leaf. Losing focus also clears it below the node,
    /// keeping the remembered focus children for later. The root always keeps
    /// focus.
    pub fn set_focus(&mut self, id: NodeId, focus: bool) {
        if !self.nodes.contains_key(id) {
            return;
        }
        if focus {
            self.set_interactive(id, true);
        }
        if id == self.root || self.nodes[id].has_focus == focus {
            return;
        }
        let parent = self.parent(id);

        if focus {
            if let Some(p) = parent {
                self.set_focus(p, true);
                self.nodes[p].focus_child = Some(id);
                let siblings = self.children(p).to_vec();
                for sibling in siblings.into_iter().filter(|&s| s != id) {
                    self.set_focus(sibling, false);
                }
            }
        } else if let Some(p) = parent {
            if self.nodes[p].focus_child == Some(id) {
                self.nodes[p].focus_child = None;
            }
        }

        self.apply_focus(id, focus);
        self.propagate_focus_down(id, focus);
    }

    fn apply_focus(&mut self, id: NodeId, focus: bool) {
        self.nodes[id].has_focus = focus;
        self.mark_dirty(id);
        self.with_widget(id, |w, tree| w.on_focus_changed(tree, id, focus));
    }

    fn propagate_focus_down(&mut self, id: NodeId, focus: bool) {
        let mut current = id;
        while let Some(child) = self.nodes.get(current).and_then(|n| n.focus_child) {
            let Some(node) = self.nodes.get(child) else {
                break;
            };
            if focus && !(node.visible && node.interactive) {
                self.nodes[current].focus_child = None;
                break;
            }
            if node.has_focus != focus {
                self.apply_focus(child, focus);
            }
            current = child;
        }
    }

    /// The focus chain: root first, then each focused focus child.
    pub fn focus_path(&self) -> Vec<NodeId> {
        let mut path = vec![self.root];
        let mut current = self.root;
        while let Some(child) = self.nodes[current].focus_child {
            match self.nodes.get(child) {
                Some(n) if n.has_focus => {
                    path.push(child);
                    current = child;
                }
                _ => break,
            }
        }
        path
    }

    /// The deepest node of the focus chain.
    pub fn focused(&self) -> NodeId {
        self.focus_path().last().copied().unwrap_or(self.root)
    }

    pub fn set_interactive(&mut self, id: NodeId, interactive: bool) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if node.interactive == interactive {
            return;
        }
        node.interactive = interactive;
        if !interactive {
            self.set_focus(id, false);
        }
    }

    // ── Visibility ───────────────────────────────────────────────────

    /// Show or hide a node. Hiding drops focus and marks the parent dirty so
    /// the uncovered area is recomposed.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if node.visible == visible {
            return;
        }
        node.visible = visible;
        if !visible {
            self.set_focus(id, false);
            if let Some(p) = self.parent(id) {
                self.mark_dirty(p);
            }
        }
        self.mark_dirty(id);
    }

    // ── Ticks ────────────────────────────────────────────────────────

    /// Opt a node in or out of per-frame ticks.
    ///
    /// Enabling propagates up to the root; disabling clears an ancestor only
    /// once none of its children still needs ticks.
    pub fn set_tick_enabled(&mut self, id: NodeId, enabled: bool) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if node.tick_enabled == enabled {
            return;
        }
        node.tick_enabled = enabled;
        let Some(p) = self.parent(id) else {
            return;
        };
        if enabled {
            self.set_tick_enabled(p, true);
        } else if !self.children(p).iter().any(|&c| self.nodes[c].tick_enabled) {
            self.set_tick_enabled(p, false);
        }
    }

    // ── Viewports ────────────────────────────────────────────────────

    /// Request the content size of a viewport. It never shrinks below the
    /// visible size. No-op for plain nodes.
    pub fn set_content_size(&mut self, id: NodeId, size: Size) {
        let changed = match self.nodes[id].viewport.as_mut() {
            Some(vp) => vp.scroll.set_content_size(size),
            None => return,
        };
        if changed {
            self.mark_dirty(id);
        }
    }

    /// Current (possibly not yet clamped) shift of a viewport.
    pub fn shift(&self, id: NodeId) -> Offset {
        self.nodes[id].scroll().map(|s| s.shift).unwrap_or_default()
    }

    /// Set the shift of a viewport. Clamping happens on the next draw.
    pub fn scroll_to(&mut self, id: NodeId, shift: Offset) {
        if let Some(vp) = self.nodes[id].viewport.as_mut() {
            vp.scroll.scroll_to(shift);
            self.mark_dirty(id);
        }
    }

    /// Move the shift of a viewport. Clamping happens on the next draw.
    pub fn scroll_by(&mut self, id: NodeId, delta: Offset) {
        let shift = self.shift(id);
        self.scroll_to(id, shift + delta);
    }

    /// Clamp the shift of a viewport into range, marking it dirty if the
    /// clamped shift differs from the previous frame. Returns whether it did.
    pub fn adjust_shift(&mut self, id: NodeId) -> bool {
        let inner = self.resolve(id).inner.size();
        let changed = match self.nodes[id].viewport.as_mut() {
            Some(vp) => {
                vp.scroll.set_visible_size(inner);
                vp.scroll.adjust_shift()
            }
            None => false,
        };
        if changed {
            self.mark_dirty(id);
        }
        changed
    }
}

// ===========================================================================
// Tests
// ===========================================================================
