//! **tactica-core** — geometry primitives shared by the tactica crates.
//!
//! [`Point`] is the integer grid coordinate used for cells, unit positions
//! and path nodes; [`Range`] is the half-open rectangle describing a floor's
//! bounds.

pub mod geom;

pub use geom::{Point, Range, RangeIter};
