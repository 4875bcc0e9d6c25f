//! GameTile widget: one launchable entry in the grid.
//!
//! A tile is a bordered node showing the entry's thumbnail (or a placeholder)
//! with a label strip along its bottom edge. The border is thin and accent
//! coloured while the tile has focus, thick and white otherwise.

use std::any::Any;
use std::rc::Rc;

use crate::event::input::{Command, Event, MouseButton, PointerEvent};
use crate::geometry::{Insets, Rect, Size};
use crate::layout::resolve::{PositionSpec, SizeSpec};
use crate::render::surface::{Canvas, Color, Surface};
use crate::services::library::Entry;
use crate::settings::Settings;
use crate::tree::{NodeData, NodeId, Tree};
use crate::widget::traits::Widget;
use crate::widgets::launcher::Launcher;
use crate::widgets::text::TextBlock;

pub const FOCUSED_BORDER: i32 = 5;
pub const UNFOCUSED_BORDER: i32 = 10;

/// Background of the label strip.
pub const LABEL_FILL: Color = Color::rgba(255, 255, 255, 100);

// ---------------------------------------------------------------------------
// TileMetrics
// ---------------------------------------------------------------------------

/// Tile size and spacing, from the `[game_widget]` settings section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileMetrics {
    pub width: i32,
    /// Always `width * 1.4`.
    pub height: i32,
    pub gap_width: i32,
    pub gap_height: i32,
    pub label_height: i32,
}

impl TileMetrics {
    pub fn new(width: i32) -> Self {
        Self {
            width,
            height: width * 14 / 10,
            gap_width: 10,
            gap_height: 10,
            label_height: 65,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let mut metrics = Self::new(settings.get("game_widget", "width", 240));
        metrics.gap_width = settings.get("game_widget", "distance_width", metrics.gap_width);
        metrics.gap_height = settings.get("game_widget", "distance_height", metrics.gap_height);
        metrics.label_height = settings.get("game_widget", "label_height", metrics.label_height);
        metrics
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl Default for TileMetrics {
    fn default() -> Self {
        Self::new(240)
    }
}

// ---------------------------------------------------------------------------
// GameTile
// ---------------------------------------------------------------------------

/// A tile for one [`Entry`].
///
/// Active tiles launch their entry on ENTER or a left click; a touch tap
/// focuses an unfocused tile first. Passive tiles (the one shown while an
/// entry runs) only display.
pub struct GameTile {
    entry: Entry,
    thumbnail: Option<Rc<Surface>>,
    label: NodeId,
    launcher: Option<Rc<Launcher>>,
}

impl GameTile {
    /// Add an active tile for `entry` under `parent` at `(x, y)`.
    pub fn insert(
        tree: &mut Tree,
        parent: NodeId,
        x: PositionSpec,
        y: PositionSpec,
        entry: Entry,
        launcher: &Rc<Launcher>,
    ) -> NodeId {
        Self::build(tree, parent, NodeData::new().with_position(x, y), entry, launcher, true)
    }

    /// Add a display-only tile for `entry` under `parent` at `(x, y)`.
    pub fn insert_passive(
        tree: &mut Tree,
        parent: NodeId,
        x: PositionSpec,
        y: PositionSpec,
        entry: Entry,
        launcher: &Rc<Launcher>,
    ) -> NodeId {
        let data = NodeData::new().with_position(x, y).non_interactive();
        Self::build(tree, parent, data, entry, launcher, false)
    }

    fn build(
        tree: &mut Tree,
        parent: NodeId,
        data: NodeData,
        entry: Entry,
        launcher: &Rc<Launcher>,
        active: bool,
    ) -> NodeId {
        let metrics = launcher.metrics();
        let data = data
            .with_size(SizeSpec::px(metrics.width), SizeSpec::px(metrics.height))
            .with_border(Insets::all(UNFOCUSED_BORDER), Color::WHITE);
        let id = tree.add_node(parent, data);
        let label = tree.add(
            id,
            NodeData::new()
                .with_position(PositionSpec::centered(), PositionSpec::from_far_edge(0))
                .with_size(SizeSpec::full(), SizeSpec::px(metrics.label_height))
                .with_fill(LABEL_FILL)
                .non_interactive(),
            TextBlock::new(entry.name.clone(), launcher.font())
                .with_color(Color::DARK_GREY)
                .centered(true, true),
        );
        let tile = GameTile {
            thumbnail: launcher.thumbnail(&entry),
            entry,
            label,
            launcher: active.then(|| Rc::clone(launcher)),
        };
        tree.set_widget(id, Box::new(tile));
        id
    }

    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    pub fn label(&self) -> NodeId {
        self.label
    }

    pub fn has_thumbnail(&self) -> bool {
        self.thumbnail.is_some()
    }

    /// Show a different entry on the tile at `id`.
    pub fn set_entry(tree: &mut Tree, id: NodeId, entry: Entry, thumbnail: Option<Rc<Surface>>) {
        let Some(tile) = tree.widget_mut::<GameTile>(id) else {
            return;
        };
        let label = tile.label;
        let name = entry.name.clone();
        tile.entry = entry;
        tile.thumbnail = thumbnail;
        TextBlock::set_text(tree, label, &name);
        tree.mark_dirty(id);
    }

    fn launch(&self, tree: &mut Tree) -> bool {
        match &self.launcher {
            Some(launcher) => {
                launcher.launch(tree, &self.entry);
                true
            }
            None => false,
        }
    }
}

/// Where a `size` image lands inside a tile interior of `area`: scaled to the
/// full height if it is taller than the tile's aspect ratio, to the full
/// width otherwise, and centred.
fn thumbnail_rect(size: Size, area: Size) -> Rect {
    if size.is_empty() || area.is_empty() {
        return Rect::EMPTY;
    }
    let (w, h) = (i64::from(size.width), i64::from(size.height));
    let scaled = if h * 10 > w * 14 {
        Size::new((w * i64::from(area.height) / h) as i32, area.height)
    } else {
        Size::new(area.width, (h * i64::from(area.width) / w) as i32)
    };
    Rect::new(
        (area.width - scaled.width) / 2,
        (area.height - scaled.height) / 2,
        scaled.width,
        scaled.height,
    )
}

impl Widget for GameTile {
    fn widget_type(&self) -> &str {
        "GameTile"
    }

    fn before_draw(&mut self, tree: &mut Tree, id: NodeId, _parent_changed: bool) {
        let node = tree.node(id);
        let (border, color) = if node.has_focus() {
            (Insets::all(FOCUSED_BORDER), Color::ACCENT)
        } else {
            (Insets::all(UNFOCUSED_BORDER), Color::WHITE)
        };
        if node.geometry().border() != border || node.border_color() != Some(color) {
            tree.set_border(id, border, Some(color));
        }
    }

    fn compose(&mut self, node: &NodeData, canvas: &mut Canvas<'_>) -> bool {
        canvas.fill(if node.has_focus() { Color::ACCENT } else { Color::WHITE });
        match &self.thumbnail {
            Some(image) => {
                let rect = thumbnail_rect(image.size(), canvas.size());
                canvas.blit_scaled(image, rect);
            }
            None => canvas.fill(Color::PLACEHOLDER),
        }
        true
    }

    fn on_focus_event(&mut self, tree: &mut Tree, _id: NodeId, event: &Event) -> bool {
        event.as_command() == Some(Command::Enter) && self.launch(tree)
    }

    fn on_pointer_event(&mut self, tree: &mut Tree, id: NodeId, event: &PointerEvent) -> bool {
        if self.launcher.is_none() || !event.is_release_of(MouseButton::Left) {
            return false;
        }
        if event.touch && !tree.node(id).has_focus() {
            tree.set_focus(id, true);
            return true;
        }
        self.launch(tree)
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
