//! Pathfinding algorithms for grid-based tactics games.
//!
//! - **Dijkstra** uniform-cost goal search ([`dijkstra`])
//! - **Range flood fill** bounded by cumulative cost ([`dijkstra_range`])
//! - **Bresenham** line rasterization with early abort ([`bresenham`], [`line`])
//!
//! The searches are generic over the node type and take their graph through
//! the [`Pather`] trait, which any `Fn(N, &mut Vec<N>)` closure implements.
//! Every edge costs 1.

mod dijkstra;
mod distance;
mod line;
mod traits;

pub use dijkstra::{PathNode, dijkstra, dijkstra_range};
pub use distance::manhattan;
pub use line::{bresenham, line};
pub use traits::Pather;
