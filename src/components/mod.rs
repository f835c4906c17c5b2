pub mod knowledge_graph;
pub mod progress;
pub mod risk_graph;
pub mod wizard;
