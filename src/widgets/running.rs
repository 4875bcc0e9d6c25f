//! RunningPopup: the overlay shown while a launched entry runs.
//!
//! The popup fogs the screen, shows the entry's tile and a cancel button,
//! and polls the library every tick. Cancelling switches to aggressive
//! polling and asks the library to terminate the entry on every tick until
//! it is gone.

use std::any::Any;
use std::rc::Rc;

use log::info;

use crate::event::input::{Command, Event, MouseButton, PointerEvent};
use crate::geometry::Insets;
use crate::layout::resolve::{PositionSpec, SizeSpec};
use crate::render::surface::{Canvas, Color, Surface};
use crate::services::library::Entry;
use crate::tree::{NodeData, NodeId, Tree};
use crate::widget::traits::Widget;
use crate::widgets::game_tile::GameTile;
use crate::widgets::launcher::Launcher;
use crate::widgets::text::TextBlock;

/// Height of the cancel button under the tile.
pub const BUTTON_HEIGHT: i32 = 100;

/// Translucent grey laid over the grid.
pub const FOG: Color = Color::GREY.with_alpha(200);

const CANCEL_TEXT: &str = "Cancel";
const TERMINATING_TEXT: &str = "Terminating ...";

// ---------------------------------------------------------------------------
// RunningPopup
// ---------------------------------------------------------------------------

/// Full-screen overlay tracking the launched entry.
pub struct RunningPopup {
    launcher: Rc<Launcher>,
    entry: Option<Entry>,
    kill_in_progress: bool,
    tile: NodeId,
    button: NodeId,
}

impl RunningPopup {
    /// Build the hidden popup under `parent`.
    pub fn insert(tree: &mut Tree, parent: NodeId, launcher: &Rc<Launcher>) -> NodeId {
        let metrics = launcher.metrics();
        let id = tree.add_node(parent, NodeData::new().hidden());
        tree.add_node(id, NodeData::new().with_fill(FOG).non_interactive());

        let panel = tree.add_node(
            id,
            NodeData::new()
                .with_position(PositionSpec::centered(), PositionSpec::centered())
                .with_size(
                    SizeSpec::px(metrics.width),
                    SizeSpec::px(metrics.height + BUTTON_HEIGHT),
                ),
        );
        let tile = GameTile::insert_passive(
            tree,
            panel,
            PositionSpec::centered(),
            PositionSpec::px(0),
            Entry::new("", ""),
            launcher,
        );
        let button = tree.add(
            panel,
            NodeData::new()
                .with_position(PositionSpec::centered(), PositionSpec::from_far_edge(0))
                .with_size(SizeSpec::full(), SizeSpec::px(BUTTON_HEIGHT))
                .with_border(Insets::new(0, 10, 10, 10), Color::WHITE)
                .with_fill(Color::RED),
            CancelButton::new(id, TextBlock::new(CANCEL_TEXT, launcher.font()).centered(true, true)),
        );
        tree.set_widget(
            id,
            Box::new(RunningPopup {
                launcher: Rc::clone(launcher),
                entry: None,
                kill_in_progress: false,
                tile,
                button,
            }),
        );
        id
    }

    /// The entry being tracked, if any.
    pub fn entry(&self) -> Option<&Entry> {
        self.entry.as_ref()
    }

    pub fn is_kill_in_progress(&self) -> bool {
        self.kill_in_progress
    }

    pub fn button(&self) -> NodeId {
        self.button
    }

    /// Show the popup at `id` for a freshly launched `entry`.
    pub fn show(tree: &mut Tree, id: NodeId, entry: Entry, thumbnail: Option<Rc<Surface>>) {
        let Some(popup) = tree.widget_mut::<RunningPopup>(id) else {
            return;
        };
        popup.entry = Some(entry.clone());
        popup.kill_in_progress = false;
        let (tile, button) = (popup.tile, popup.button);

        tree.set_visible(id, true);
        tree.set_focus(id, true);
        CancelButton::set_label(tree, button, CANCEL_TEXT, Color::RED);
        tree.set_focus(button, true);
        GameTile::set_entry(tree, tile, entry, thumbnail);
        tree.set_tick_enabled(id, true);
    }

    /// Start terminating the tracked entry. Repeated requests are ignored.
    pub fn request_kill(tree: &mut Tree, id: NodeId) {
        let Some(popup) = tree.widget_mut::<RunningPopup>(id) else {
            return;
        };
        if popup.kill_in_progress || popup.entry.is_none() {
            return;
        }
        popup.kill_in_progress = true;
        let button = popup.button;
        if let Some(entry) = &popup.entry {
            info!("terminating {} on request", entry.name);
        }
        CancelButton::set_label(tree, button, TERMINATING_TEXT, Color::YELLOW);
    }
}

impl Widget for RunningPopup {
    fn widget_type(&self) -> &str {
        "RunningPopup"
    }

    fn on_tick(&mut self, tree: &mut Tree, id: NodeId, _elapsed_ms: u64) {
        let Some(entry) = &self.entry else {
            return;
        };
        let library = Rc::clone(self.launcher.library());
        let running = library.borrow_mut().is_running(self.kill_in_progress);
        if running {
            if self.kill_in_progress {
                library.borrow_mut().terminate();
            }
            return;
        }

        info!("{} finished", entry.name);
        self.entry = None;
        self.kill_in_progress = false;
        tree.set_visible(id, false);
        tree.set_tick_enabled(id, false);
        self.launcher.launch_completed(tree);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// CancelButton
// ---------------------------------------------------------------------------

/// The popup's button: BACK, EXIT or a left click request termination.
pub struct CancelButton {
    popup: NodeId,
    label: TextBlock,
}

impl CancelButton {
    pub fn new(popup: NodeId, label: TextBlock) -> Self {
        Self { popup, label }
    }

    pub fn text(&self) -> &str {
        self.label.text()
    }

    /// Change the caption and background of the button at `id`.
    pub fn set_label(tree: &mut Tree, id: NodeId, text: &str, fill: Color) {
        if tree.widget_mut::<CancelButton>(id).is_some_and(|b| b.label.replace_text(text)) {
            tree.mark_dirty(id);
        }
        tree.set_fill(id, Some(fill));
    }
}

impl Widget for CancelButton {
    fn widget_type(&self) -> &str {
        "CancelButton"
    }

    fn compose(&mut self, node: &NodeData, canvas: &mut Canvas<'_>) -> bool {
        self.label.compose(node, canvas)
    }

    fn on_focus_event(&mut self, tree: &mut Tree, _id: NodeId, event: &Event) -> bool {
        match event.as_command() {
            Some(Command::Back | Command::Exit) => {
                RunningPopup::request_kill(tree, self.popup);
                true
            }
            _ => false,
        }
    }

    fn on_pointer_event(&mut self, tree: &mut Tree, _id: NodeId, event: &PointerEvent) -> bool {
        if event.is_release_of(MouseButton::Left) {
            RunningPopup::request_kill(tree, self.popup);
            return true;
        }
        false
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
