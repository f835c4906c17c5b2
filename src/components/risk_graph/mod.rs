//! Stage-three review graph: a small fixed entity graph with a cooling
//! force layout and node dragging.

mod component;
mod data;
mod render;
mod simulation;

pub use component::RiskGraph;
