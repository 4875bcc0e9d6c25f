//! The launcher screen: the game grid, the running-game popup and the
//! services they share.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{info, warn};

use crate::render::surface::{Color, Surface};
use crate::services::library::{Entry, Library};
use crate::services::media::{FontService, ImageLoader};
use crate::tree::{NodeData, NodeId, Tree};
use crate::widgets::game_grid::GameGrid;
use crate::widgets::game_tile::TileMetrics;
use crate::widgets::running::RunningPopup;
use crate::widgets::scroll_view::ScrollView;

/// Shared state of the launcher screen.
///
/// Tiles, the grid and the popup each hold an `Rc<Launcher>`; it only refers
/// back to them by [`NodeId`], so there are no reference cycles.
pub struct Launcher {
    library: Rc<RefCell<dyn Library>>,
    images: RefCell<Box<dyn ImageLoader>>,
    font: Rc<dyn FontService>,
    metrics: TileMetrics,
    hide_on_launch: bool,
    grid: Cell<Option<NodeId>>,
    popup: Cell<Option<NodeId>>,
}

impl Launcher {
    pub fn new(
        library: Rc<RefCell<dyn Library>>,
        font: Rc<dyn FontService>,
        images: Box<dyn ImageLoader>,
    ) -> Self {
        Self {
            library,
            images: RefCell::new(images),
            font,
            metrics: TileMetrics::default(),
            hide_on_launch: false,
            grid: Cell::new(None),
            popup: Cell::new(None),
        }
    }

    pub fn with_metrics(mut self, metrics: TileMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Accepted for compatibility with the `[play] hide_on_launch` setting.
    /// The terminal presenter has no window to hide, so it is only logged.
    pub fn with_hide_on_launch(mut self, hide: bool) -> Self {
        self.hide_on_launch = hide;
        self
    }

    /// Build the screen under the root of `tree`: a grey scrolling grid
    /// covering the display and the hidden popup above it.
    pub fn build(self, tree: &mut Tree) -> Rc<Launcher> {
        let launcher = Rc::new(self);
        let root = tree.root();
        tree.set_fill(root, Some(Color::BLACK));

        let view = ScrollView::insert(tree, root, NodeData::new());
        if let Some(viewport) = tree.widget::<ScrollView>(view).map(ScrollView::viewport) {
            tree.set_fill(viewport, Some(Color::GREY));
            tree.set_widget(viewport, Box::new(GameGrid::new(Rc::clone(&launcher))));
        }
        launcher.grid.set(Some(view));
        launcher.popup.set(Some(RunningPopup::insert(tree, root, &launcher)));
        launcher
    }

    pub fn library(&self) -> &Rc<RefCell<dyn Library>> {
        &self.library
    }

    pub fn font(&self) -> Rc<dyn FontService> {
        Rc::clone(&self.font)
    }

    pub fn metrics(&self) -> TileMetrics {
        self.metrics
    }

    /// The scroll view hosting the grid, once built.
    pub fn grid(&self) -> Option<NodeId> {
        self.grid.get()
    }

    /// The grid viewport itself (the node carrying [`GameGrid`]).
    pub fn grid_viewport(&self, tree: &Tree) -> Option<NodeId> {
        let view = self.grid.get()?;
        tree.widget::<ScrollView>(view).map(ScrollView::viewport)
    }

    pub fn popup(&self) -> Option<NodeId> {
        self.popup.get()
    }

    /// The decoded thumbnail of `entry`, if it has a loadable one.
    pub fn thumbnail(&self, entry: &Entry) -> Option<Rc<Surface>> {
        let path = entry.thumbnail.as_deref()?;
        self.images.borrow_mut().load(path)
    }

    /// Start `entry`, lock the grid and show the popup.
    ///
    /// A failed launch is logged and leaves the screen unchanged.
    pub fn launch(&self, tree: &mut Tree, entry: &Entry) {
        if let Err(e) = self.library.borrow_mut().launch(entry) {
            warn!("{e}");
            return;
        }
        if self.hide_on_launch {
            info!("hide_on_launch requested; nothing to hide in a terminal");
        }
        if let Some(grid) = self.grid.get() {
            tree.set_interactive(grid, false);
        }
        if let Some(popup) = self.popup.get() {
            RunningPopup::show(tree, popup, entry.clone(), self.thumbnail(entry));
        }
    }

    /// The launched entry stopped: reload the list and hand focus back to the grid.
    pub fn launch_completed(&self, tree: &mut Tree) {
        self.library.borrow_mut().mark_changed();
        if let Some(grid) = self.grid.get() {
            tree.set_interactive(grid, true);
            tree.set_focus(grid, true);
            if let Some(viewport) = self.grid_viewport(tree) {
                tree.mark_dirty(viewport);
            }
        }
    }
}
