mod canvas;
mod component;
mod controller;
mod data;
mod engine;
mod render;
mod state;
mod style;
mod types;

pub use component::KnowledgeGraph;
