//! Retained node tree: slotmap arena, dirty-region redraw, focus and event routing.

mod draw;
pub mod node;
mod route;
#[allow(clippy::module_inception)]
mod tree;

pub use node::{NodeData, NodeId};
pub use tree::Tree;
