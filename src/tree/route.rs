//! Event routing and per-tick dispatch.
//!
//! Pointer events are hit-tested from the root down, topmost child first,
//! with the position rewritten into each receiving node's local coordinates.
//! Everything else walks the focus chain. In both cases a node's widget sees
//! the event before its children do.

use super::node::NodeId;
use super::tree::Tree;
use crate::event::input::{Event, PointerAction, PointerEvent};
use crate::geometry::Offset;

/// Pixels scrolled per pixel of touch drag inside a viewport.
const TOUCH_SCROLL_FACTOR: i32 = 5;

impl Tree {
    /// Route one event into the tree. Returns `true` if a node consumed it.
    pub fn route(&mut self, event: &Event) -> bool {
        let root = self.root();
        match event {
            Event::Pointer(p) => {
                let inner = self.resolve(root).inner;
                let mut local = *p;
                local.pos = p.pos - inner.origin();
                self.route_pointer(root, local)
            }
            _ => self.route_focus(root, event),
        }
    }

    /// Route a batch of events in order. Returns the ones nobody consumed.
    pub fn route_all(&mut self, events: &[Event]) -> Vec<Event> {
        events.iter().filter(|e| !self.route(e)).cloned().collect()
    }

    fn route_focus(&mut self, id: NodeId, event: &Event) -> bool {
        if self.with_widget(id, |w, tree| w.on_focus_event(tree, id, event)) == Some(true) {
            return true;
        }
        match self.nodes.get(id).and_then(|n| n.focus_child) {
            Some(child) if self.nodes.get(child).is_some_and(|c| c.visible && c.interactive) => {
                self.route_focus(child, event)
            }
            _ => false,
        }
    }

    fn route_pointer(&mut self, id: NodeId, event: PointerEvent) -> bool {
        if self.with_widget(id, |w, tree| w.on_pointer_event(tree, id, &event)) == Some(true) {
            return true;
        }

        if let PointerAction::Motion { rel, .. } = event.action {
            if event.touch && self.nodes[id].is_viewport() {
                self.scroll_by(id, -Offset::new(rel.x * TOUCH_SCROLL_FACTOR, rel.y * TOUCH_SCROLL_FACTOR));
                return true;
            }
        }

        let Some((child, pos)) = self.hit_child(id, event.pos) else {
            return false;
        };
        if event.takes_focus() {
            self.set_focus(child, true);
        }
        self.route_pointer(child, PointerEvent { pos, ..event })
    }

    /// The topmost visible child of `id` under `pos`, with `pos` translated
    /// into that child's local coordinates. A non-interactive child under the
    /// pointer swallows the hit.
    pub fn hit_child(&mut self, id: NodeId, pos: Offset) -> Option<(NodeId, Offset)> {
        let space = self.child_space(id);
        let children = self.children(id).to_vec();
        for child in children.into_iter().rev() {
            let node = &mut self.nodes[child];
            if !node.visible {
                continue;
            }
            let resolved = node.geometry.resolve_with(space);
            if !resolved.outer.contains(pos) {
                continue;
            }
            if !node.interactive {
                return None;
            }
            let mut local = pos - resolved.inner.origin();
            if let Some(vp) = node.viewport.as_ref() {
                local = local + vp.scroll.shift;
            }
            return Some((child, local));
        }
        None
    }

    /// Deliver a tick to every node that opted in, parents before children.
    pub fn process_tick(&mut self, elapsed_ms: u64) {
        let root = self.root();
        self.tick_node(root, elapsed_ms);
    }

    fn tick_node(&mut self, id: NodeId, elapsed_ms: u64) {
        if !self.nodes.get(id).is_some_and(|n| n.tick_enabled) {
            return;
        }
        self.with_widget(id, |w, tree| w.on_tick(tree, id, elapsed_ms));
        for child in self.children(id).to_vec() {
            self.tick_node(child, elapsed_ms);
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use std::any::Any;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::event::input::{Command, MouseButton, Source};
    use crate::geometry::Size;
    use crate::layout::resolve::{PositionSpec, SizeSpec};
    use crate::tree::NodeData;
    use crate::widget::Widget;

    /// Records what reaches it and optionally consumes it.
    #[derive(Default)]
    struct Probe {
        consume: bool,
        pointer: Vec<Offset>,
        commands: Vec<Command>,
        ticks: Vec<u64>,
    }

    impl Probe {
        fn consuming() -> Self {
            Self { consume: true, ..Self::default() }
        }
    }

    impl Widget for Probe {
        fn widget_type(&self) -> &str {
            "Probe"
        }

        fn on_focus_event(&mut self, _tree: &mut Tree, _id: NodeId, event: &Event) -> bool {
            if let Some(c) = event.as_command() {
                self.commands.push(c);
            }
            self.consume
        }

        fn on_pointer_event(&mut self, _tree: &mut Tree, _id: NodeId, event: &PointerEvent) -> bool {
            self.pointer.push(event.pos);
            self.consume
        }

        fn on_tick(&mut self, _tree: &mut Tree, _id: NodeId, elapsed_ms: u64) {
            self.ticks.push(elapsed_ms);
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn boxed(x: i32, y: i32, w: i32, h: i32) -> NodeData {
        NodeData::new()
            .with_position(PositionSpec::px(x), PositionSpec::px(y))
            .with_size(SizeSpec::px(w), SizeSpec::px(h))
    }

    fn click(x: i32, y: i32) -> Event {
        Event::Pointer(PointerEvent::new(PointerAction::Up(MouseButton::Left), Offset::new(x, y)))
    }

    fn seen(tree: &Tree, id: NodeId) -> Vec<Offset> {
        tree.widget::<Probe>(id).map(|p| p.pointer.clone()).unwrap_or_default()
    }

    // ── Hit-testing ──────────────────────────────────────────────────

    #[test]
    fn topmost_child_wins_with_local_coordinates() {
        let mut tree = Tree::new(Size::new(100, 100));
        let root = tree.root();
        let lower = tree.add(root, boxed(0, 0, 50, 50), Probe::consuming());
        let upper = tree.add(root, boxed(20, 20, 50, 50), Probe::consuming());

        assert!(tree.route(&click(30, 25)));
        assert_eq!(seen(&tree, upper), vec![Offset::new(10, 5)]);
        assert!(seen(&tree, lower).is_empty());
        assert!(tree.node(upper).has_focus());

        tree.route(&click(5, 5));
        assert_eq!(seen(&tree, lower), vec![Offset::new(5, 5)]);
        assert!(tree.node(lower).has_focus());
        assert!(!tree.node(upper).has_focus());
    }

    #[test]
    fn non_interactive_child_blocks_lower_siblings() {
        let mut tree = Tree::new(Size::new(100, 100));
        let root = tree.root();
        let lower = tree.add(root, boxed(0, 0, 50, 50), Probe::consuming());
        tree.add(root, boxed(0, 0, 20, 20).non_interactive(), Probe::consuming());

        assert!(!tree.route(&click(5, 5)));
        assert!(seen(&tree, lower).is_empty());
        assert!(tree.route(&click(30, 30)));
    }

    #[test]
    fn hidden_child_is_transparent_to_hits() {
        let mut tree = Tree::new(Size::new(100, 100));
        let root = tree.root();
        let lower = tree.add(root, boxed(0, 0, 50, 50), Probe::consuming());
        tree.add(root, boxed(0, 0, 50, 50).hidden(), Probe::consuming());
        assert!(tree.route(&click(5, 5)));
        assert_eq!(seen(&tree, lower).len(), 1);
    }

    #[test]
    fn touch_release_does_not_move_focus() {
        let mut tree = Tree::new(Size::new(100, 100));
        let root = tree.root();
        let a = tree.add(root, boxed(0, 0, 50, 50), Probe::consuming());
        let tap = PointerEvent::new(PointerAction::Up(MouseButton::Left), Offset::new(5, 5)).touch();
        tree.route(&Event::Pointer(tap));
        assert!(!tree.node(a).has_focus());
        assert_eq!(seen(&tree, a).len(), 1);
    }

    #[test]
    fn viewport_children_are_hit_in_content_coordinates() {
        let mut tree = Tree::new(Size::new(100, 100));
        let root = tree.root();
        let vp = tree.add_node(root, NodeData::viewport().with_size(SizeSpec::px(50), SizeSpec::px(50)));
        tree.set_content_size(vp, Size::new(50, 200));
        let deep = tree.add(vp, boxed(0, 150, 50, 50), Probe::consuming());
        tree.scroll_to(vp, Offset::new(0, 140));
        tree.adjust_shift(vp);

        assert!(tree.route(&click(10, 20)));
        assert_eq!(seen(&tree, deep), vec![Offset::new(10, 10)]);
    }

    #[test]
    fn touch_drag_scrolls_viewport() {
        let mut tree = Tree::new(Size::new(100, 100));
        let root = tree.root();
        let vp = tree.add_node(root, NodeData::viewport());
        tree.set_content_size(vp, Size::new(100, 400));
        let drag = PointerEvent::new(
            PointerAction::Motion { held: Some(MouseButton::Left), rel: Offset::new(0, -4) },
            Offset::new(10, 10),
        )
        .touch();
        assert!(tree.route(&Event::Pointer(drag)));
        assert_eq!(tree.shift(vp), Offset::new(0, 20));
    }

    // ── Focus routing ────────────────────────────────────────────────

    #[test]
    fn focus_events_reach_parent_before_leaf() {
        let mut tree = Tree::new(Size::new(100, 100));
        let root = tree.root();
        let parent = tree.add(root, NodeData::new(), Probe::default());
        let leaf = tree.add(parent, NodeData::new(), Probe::consuming());
        tree.set_focus(leaf, true);

        let down = Event::command(Command::Down, Source::Button(0));
        assert!(tree.route(&down));
        assert_eq!(tree.widget::<Probe>(parent).map(|p| p.commands.clone()), Some(vec![Command::Down]));
        assert_eq!(tree.widget::<Probe>(leaf).map(|p| p.commands.clone()), Some(vec![Command::Down]));
    }

    #[test]
    fn focus_events_stop_at_non_interactive_child() {
        let mut tree = Tree::new(Size::new(100, 100));
        let root = tree.root();
        let leaf = tree.add(root, NodeData::new(), Probe::consuming());
        tree.set_focus(leaf, true);
        tree.set_interactive(leaf, false);
        assert!(!tree.route(&Event::Quit));
    }

    #[test]
    fn unconsumed_events_are_returned() {
        let mut tree = Tree::new(Size::new(100, 100));
        let root = tree.root();
        let leaf = tree.add(root, NodeData::new(), Probe::default());
        tree.set_focus(leaf, true);
        let rest = tree.route_all(&[Event::Quit, Event::Restored]);
        assert_eq!(rest, vec![Event::Quit, Event::Restored]);
    }

    // ── Ticks ────────────────────────────────────────────────────────

    #[test]
    fn ticks_only_reach_enabled_nodes() {
        let mut tree = Tree::new(Size::new(100, 100));
        let root = tree.root();
        let on = tree.add(root, NodeData::new(), Probe::default());
        let off = tree.add(root, NodeData::new(), Probe::default());
        tree.set_tick_enabled(on, true);
        tree.process_tick(33);
        assert_eq!(tree.widget::<Probe>(on).map(|p| p.ticks.clone()), Some(vec![33]));
        assert_eq!(tree.widget::<Probe>(off).map(|p| p.ticks.len()), Some(0));
    }
}
