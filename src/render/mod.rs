//! Rendering: pixel surfaces and the terminal presenter.

pub mod driver;
pub mod surface;

pub use driver::Driver;
pub use surface::{Canvas, Color, Surface};
