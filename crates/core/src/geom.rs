//! 2D geometry primitives shared by graph construction, crossing repair,
//! and decoration collision tests.

mod point;
mod rect;
mod segment;

pub use point::Point;
pub use rect::Rect;
pub use segment::{Segment, quads_overlap};
