//! GameGrid widget: the scrolling grid of tiles.
//!
//! Attached to a viewport node. Whenever the viewport is redrawn the grid
//! polls the library; if the list or the visible width changed it lays the
//! tiles out again, reusing tiles whose entry name is still present.

use std::any::Any;
use std::rc::Rc;

use log::debug;

use crate::event::input::{Command, Event};
use crate::geometry::{Offset, Size};
use crate::layout::resolve::PositionSpec;
use crate::services::library::Entry;
use crate::tree::{NodeId, Tree};
use crate::widget::traits::Widget;
use crate::widgets::game_tile::{GameTile, TileMetrics};
use crate::widgets::launcher::Launcher;

/// Tile grid over the launcher's library.
pub struct GameGrid {
    launcher: Rc<Launcher>,
    tiles: Vec<NodeId>,
    columns: i32,
    last_width: Option<i32>,
}

impl GameGrid {
    pub fn new(launcher: Rc<Launcher>) -> Self {
        Self {
            launcher,
            tiles: Vec::new(),
            columns: 1,
            last_width: None,
        }
    }

    /// Tiles in list order.
    pub fn tiles(&self) -> &[NodeId] {
        &self.tiles
    }

    pub fn columns(&self) -> i32 {
        self.columns
    }

    /// Index of the focused tile, if any.
    pub fn selected(&self, tree: &Tree, id: NodeId) -> Option<usize> {
        let child = tree.node(id).focus_child()?;
        self.tiles.iter().position(|&t| t == child)
    }

    fn metrics(&self) -> TileMetrics {
        self.launcher.metrics()
    }

    /// Top-left of tile `index` when rows are spaced by `gap` pixels.
    fn tile_origin(&self, index: usize, gap: i32) -> Offset {
        let m = self.metrics();
        let index = index as i32;
        let col = index % self.columns;
        let row = index / self.columns;
        Offset::new(col * (m.width + gap), row * (m.height + m.gap_height))
    }

    /// Poll the library and bring the tiles up to date.
    fn refresh(&mut self, tree: &mut Tree, id: NodeId) {
        let m = self.metrics();
        let visible_width = tree.resolve(id).inner.width;
        let width_changed = self.last_width != Some(visible_width);
        if width_changed {
            self.last_width = Some(visible_width);
            self.columns = (visible_width / (m.width + m.gap_width)).max(1);
        }

        let (entries, list_changed) = self.launcher.library().borrow_mut().list_entries();
        let count = entries.len() as i32;
        let rows = if count == 0 { 0 } else { (count - 1) / self.columns + 1 };
        tree.set_content_size(id, Size::new(m.width, rows * (m.height + m.gap_height)));

        let gap = if self.columns >= count {
            m.gap_width
        } else {
            ((visible_width - self.columns * m.width) as f32 / self.columns as f32).round() as i32
        };

        if self.tiles.is_empty() {
            if entries.is_empty() {
                return;
            }
            for (index, entry) in entries.into_iter().enumerate() {
                let tile = self.new_tile(tree, id, index, gap, entry);
                self.tiles.push(tile);
            }
            self.select(tree, id, Command::Top);
        } else if width_changed || list_changed {
            self.update_tiles(tree, id, entries, gap);
        }
    }

    fn new_tile(&self, tree: &mut Tree, id: NodeId, index: usize, gap: i32, entry: Entry) -> NodeId {
        let at = self.tile_origin(index, gap);
        GameTile::insert(tree, id, PositionSpec::px(at.x), PositionSpec::px(at.y), entry, &self.launcher)
    }

    /// Match the tiles to `entries` by name, keeping existing tiles where
    /// possible, then drop the leftovers.
    fn update_tiles(&mut self, tree: &mut Tree, id: NodeId, entries: Vec<Entry>, gap: i32) {
        let previous = self.selected(tree, id);
        let total = entries.len();

        for (index, entry) in entries.into_iter().enumerate() {
            let found = self.tiles[index.min(self.tiles.len())..]
                .iter()
                .position(|&t| tree.widget::<GameTile>(t).is_some_and(|w| w.entry().name == entry.name))
                .map(|offset| offset + index);

            match found {
                Some(old) => {
                    let tile = self.tiles.remove(old);
                    self.tiles.insert(index, tile);
                    let at = self.tile_origin(index, gap);
                    tree.set_position(tile, PositionSpec::px(at.x), PositionSpec::px(at.y));
                    if tree.widget::<GameTile>(tile).is_some_and(|w| *w.entry() != entry) {
                        let thumbnail = self.launcher.thumbnail(&entry);
                        GameTile::set_entry(tree, tile, entry, thumbnail);
                    }
                }
                None => {
                    let tile = self.new_tile(tree, id, index, gap, entry);
                    self.tiles.insert(index, tile);
                }
            }
        }

        for tile in self.tiles.split_off(total) {
            tree.remove(tile);
        }
        debug!("grid now shows {} entries", self.tiles.len());

        if let Some(previous) = previous {
            if tree.node(id).has_focus() && self.selected(tree, id).is_none() && !self.tiles.is_empty() {
                let index = previous.min(self.tiles.len() - 1);
                tree.set_focus(self.tiles[index], true);
            }
        }
    }

    /// Move the selection for a navigation command. Returns `false` for
    /// commands the grid does not handle.
    pub fn select(&mut self, tree: &mut Tree, id: NodeId, command: Command) -> bool {
        let last = self.tiles.len() as i64 - 1;
        let current = self.selected(tree, id).unwrap_or(0) as i64;
        let columns = i64::from(self.columns);
        let target = match command {
            Command::Top => 0,
            Command::Bottom => last,
            Command::Up => current - columns,
            Command::Down => current + columns,
            Command::Left => current - 1,
            Command::Right => current + 1,
            Command::Reload => {
                self.launcher.library().borrow_mut().mark_changed();
                tree.mark_dirty(id);
                return true;
            }
            _ => return false,
        };
        if last < 0 {
            return true;
        }
        let tile = self.tiles[target.clamp(0, last) as usize];
        tree.set_focus(tile, true);
        self.scroll_into_view(tree, id, tile);
        true
    }

    /// Adjust the vertical shift so `tile` is fully visible.
    fn scroll_into_view(&self, tree: &mut Tree, id: NodeId, tile: NodeId) {
        let rect = tree.rect(tile, true);
        let visible = tree.resolve(id).inner.height;
        let mut shift = tree.shift(id);
        if rect.y < shift.y {
            shift.y = rect.y;
        }
        if rect.bottom() > shift.y + visible {
            shift.y = rect.bottom() - visible;
        }
        if shift != tree.shift(id) {
            tree.scroll_to(id, shift);
        }
    }
}

impl Widget for GameGrid {
    fn widget_type(&self) -> &str {
        "GameGrid"
    }

    fn before_draw(&mut self, tree: &mut Tree, id: NodeId, parent_changed: bool) {
        if parent_changed || tree.node(id).is_self_changed() {
            self.refresh(tree, id);
        }
    }

    fn on_focus_event(&mut self, tree: &mut Tree, id: NodeId, event: &Event) -> bool {
        match event {
            Event::Command(c) => self.select(tree, id, c.command),
            Event::Wheel { dy, .. } => {
                tree.scroll_by(id, Offset::new(0, -dy * self.metrics().height / 4));
                true
            }
            _ => false,
        }
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
