//! Widget system: trait, scrolling.

pub mod scroll;
pub mod traits;

pub use scroll::{Axis, ScrollState, ScrollbarState};
pub use traits::{draw_border, Widget};
