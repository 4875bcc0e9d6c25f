//! Built-in widgets: TextBlock, Scrollbar, ScrollView, and the launcher
//! screen (GameGrid, GameTile, RunningPopup).

pub mod game_grid;
pub mod game_tile;
pub mod launcher;
pub mod running;
pub mod scroll_view;
pub mod scrollbar;
pub mod text;

pub use game_grid::GameGrid;
pub use game_tile::{GameTile, TileMetrics};
pub use launcher::Launcher;
pub use running::{CancelButton, RunningPopup};
pub use scroll_view::ScrollView;
pub use scrollbar::Scrollbar;
pub use text::TextBlock;
