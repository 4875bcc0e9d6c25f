//! Layout: constraint-based geometry resolution.

pub mod resolve;

pub use resolve::{GeometryResolver, PositionMode, PositionSpec, Resolved, SizeMode, SizeSpec};
