pub mod culling;
pub mod inset;
pub mod merge;

pub use culling::cull_shading;
pub use inset::{inset_rectangle, DEFAULT_AREA_EPSILON};
pub use merge::{simplify_rectangles, MergeOptions, MergeOutcome};
