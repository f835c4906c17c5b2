use std::collections::HashSet;

use crate::error::{StudioError, StudioResult};

use super::types::{EdgeCategory, GraphData, GraphEdge, GraphNode, NodeCategory, RiskLevel};

fn node(
	id: &str,
	name: &str,
	category: NodeCategory,
	size: f64,
	risk_level: RiskLevel,
	status: &str,
) -> GraphNode {
	GraphNode {
		id: id.into(),
		name: name.into(),
		category,
		size,
		risk_level,
		status: status.into(),
	}
}

fn edge(source: &str, target: &str, weight: f64, category: EdgeCategory) -> GraphEdge {
	GraphEdge {
		source: source.into(),
		target: target.into(),
		weight,
		category,
	}
}

/// The fraud-network sample shown by the knowledge-graph view.
pub fn get_graph_data() -> GraphData {
	use EdgeCategory::*;
	use NodeCategory::*;

	const DEFAULTED: &str = "Overdue and unreachable";
	const REPAYING: &str = "Repays on time";
	const DORMANT: &str = "Registered, no loans";

	let nodes = vec![
		node("fraud_1", "Fraudster A", Fraudster, 45.0, RiskLevel::High, DEFAULTED),
		node("fraud_2", "Fraudster B", Fraudster, 35.0, RiskLevel::High, DEFAULTED),
		node("normal_1", "User A", NormalUser, 32.0, RiskLevel::Low, REPAYING),
		node("normal_2", "User B", NormalUser, 32.0, RiskLevel::Low, REPAYING),
		node("normal_3", "User C", NormalUser, 30.0, RiskLevel::Low, REPAYING),
		node("bg_1", "Background 1", BackgroundNode, 18.0, RiskLevel::Low, DORMANT),
		node("bg_2", "Background 2", BackgroundNode, 18.0, RiskLevel::Low, DORMANT),
		node("bg_4", "Background 4", BackgroundNode, 18.0, RiskLevel::Low, DORMANT),
	];

	let edges = vec![
		edge("fraud_1", "fraud_2", 8.5, SuspiciousLink),
		edge("fraud_1", "normal_1", 6.2, AbnormalTx),
		edge("fraud_2", "normal_2", 5.8, AbnormalTx),
		edge("normal_1", "normal_2", 2.0, NormalTx),
		edge("normal_2", "normal_3", 1.8, NormalTx),
		edge("bg_1", "fraud_1", 3.0, SuspiciousLink),
		edge("bg_1", "normal_1", 1.5, NormalTx),
		edge("bg_2", "normal_3", 1.2, NormalTx),
		edge("bg_4", "normal_2", 1.0, NormalTx),
		edge("fraud_2", "fraud_1", 2.5, SuspiciousLink),
	];

	GraphData { nodes, edges }
}

impl GraphData {
	/// Checks that every edge endpoint names a declared node.
	pub fn validate(&self) -> StudioResult<()> {
		let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
		match self
			.edges
			.iter()
			.find(|e| !ids.contains(e.source.as_str()) || !ids.contains(e.target.as_str()))
		{
			Some(e) => Err(StudioError::DanglingEdge {
				from: e.source.clone(),
				to: e.target.clone(),
			}),
			None => Ok(()),
		}
	}

	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sample_data_is_referentially_complete() {
		let data = get_graph_data();
		assert_eq!(data.nodes.len(), 8);
		assert_eq!(data.edges.len(), 10);
		assert_eq!(data.validate(), Ok(()));
	}

	#[test]
	fn sample_data_is_deterministic() {
		assert_eq!(get_graph_data(), get_graph_data());
	}

	#[test]
	fn node_ids_are_unique() {
		let data = get_graph_data();
		let ids: HashSet<_> = data.nodes.iter().map(|n| &n.id).collect();
		assert_eq!(ids.len(), data.nodes.len());
	}

	#[test]
	fn edge_order_is_insertion_order() {
		let data = get_graph_data();
		let first = &data.edges[0];
		let last = &data.edges[data.edges.len() - 1];
		assert_eq!((first.source.as_str(), first.target.as_str()), ("fraud_1", "fraud_2"));
		assert_eq!((last.source.as_str(), last.target.as_str()), ("fraud_2", "fraud_1"));
	}

	#[test]
	fn dangling_edge_is_reported() {
		let mut data = get_graph_data();
		data.edges.push(edge("fraud_1", "ghost", 1.0, EdgeCategory::NormalTx));
		assert_eq!(
			data.validate(),
			Err(StudioError::DanglingEdge {
				from: "fraud_1".into(),
				to: "ghost".into(),
			})
		);
	}

	#[test]
	fn every_node_has_positive_size() {
		assert!(get_graph_data().nodes.iter().all(|n| n.size > 0.0));
	}
}
