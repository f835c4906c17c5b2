#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeCategory {
	#[default]
	NormalUser,
	Fraudster,
	BackgroundNode,
}

impl NodeCategory {
	pub const ALL: [NodeCategory; 3] = [Self::NormalUser, Self::Fraudster, Self::BackgroundNode];

	pub fn label(self) -> &'static str {
		match self {
			Self::NormalUser => "Normal user",
			Self::Fraudster => "Fraudster",
			Self::BackgroundNode => "Background node",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeCategory {
	NormalTx,
	AbnormalTx,
	SuspiciousLink,
}

impl EdgeCategory {
	pub const ALL: [EdgeCategory; 3] = [Self::NormalTx, Self::AbnormalTx, Self::SuspiciousLink];

	pub fn label(self) -> &'static str {
		match self {
			Self::NormalTx => "Normal transaction",
			Self::AbnormalTx => "Abnormal transaction",
			Self::SuspiciousLink => "Suspicious link",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RiskLevel {
	Low,
	High,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub name: String,
	pub category: NodeCategory,
	/// Symbol diameter in pixels.
	pub size: f64,
	pub risk_level: RiskLevel,
	pub status: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
	pub source: String,
	pub target: String,
	pub weight: f64,
	pub category: EdgeCategory,
}

/// Nodes and edges in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
}
