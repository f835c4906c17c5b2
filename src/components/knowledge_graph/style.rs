//! Visual encoding of the knowledge graph.
//!
//! The controller never edits the engine's own representation; every view
//! mutation rebuilds a complete [`RenderSpec`] from the graph data and the
//! current [`ViewState`], so emphasis flags can't leave stale styles behind.

use super::types::{EdgeCategory, GraphData, GraphEdge, GraphNode, NodeCategory};

pub const GLOW_BLUR: f64 = 30.0;
pub const GLOW_COLOR: &str = "rgba(255, 77, 79, 0.8)";
pub const EDGE_WIDTH: f64 = 2.0;
pub const PATTERN_EDGE_WIDTH: f64 = 5.0;
pub const DIMMED_OPACITY: f64 = 0.15;

pub fn node_color(category: NodeCategory) -> &'static str {
	match category {
		NodeCategory::NormalUser => "#165DFF",
		NodeCategory::Fraudster => "#FF4D4F",
		NodeCategory::BackgroundNode => "#8C8C8C",
	}
}

pub fn edge_color(category: EdgeCategory) -> &'static str {
	match category {
		EdgeCategory::NormalTx => "#165DFF",
		EdgeCategory::AbnormalTx => "#FF9F43",
		EdgeCategory::SuspiciousLink => "#FF4D4F",
	}
}

pub fn is_dashed(category: EdgeCategory) -> bool {
	category == EdgeCategory::AbnormalTx
}

/// Per-view emphasis, zoom and animation state.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
	pub animation_enabled: bool,
	pub risk_highlighted: bool,
	pub patterns_visible: bool,
	pub zoom_factor: f64,
}

impl Default for ViewState {
	fn default() -> Self {
		Self {
			animation_enabled: true,
			risk_highlighted: false,
			patterns_visible: false,
			zoom_factor: 1.0,
		}
	}
}

/// Layout knobs handed to the engine with every spec.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
	pub repulsion: f64,
	pub edge_length: f64,
	pub curveness: f64,
	pub arrow_size: f64,
}

impl Default for LayoutParams {
	fn default() -> Self {
		Self {
			repulsion: 1000.0,
			edge_length: 180.0,
			curveness: 0.2,
			arrow_size: 8.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Glow {
	pub blur: f64,
	pub color: &'static str,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeStyle {
	pub id: String,
	pub label: String,
	pub category: NodeCategory,
	pub status: String,
	pub color: &'static str,
	pub radius: f64,
	pub glow: Option<Glow>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeStyle {
	pub source: String,
	pub target: String,
	pub category: EdgeCategory,
	pub weight: f64,
	pub color: &'static str,
	pub width: f64,
	pub opacity: f64,
	pub dashed: bool,
}

/// Declarative description of one frame of the knowledge graph.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSpec {
	pub nodes: Vec<NodeStyle>,
	pub edges: Vec<EdgeStyle>,
	pub layout: LayoutParams,
	pub layout_animation: bool,
	pub zoom: f64,
}

pub fn node_style(node: &GraphNode, view: &ViewState) -> NodeStyle {
	let glow = (view.risk_highlighted && node.category == NodeCategory::Fraudster).then(|| Glow {
		blur: GLOW_BLUR,
		color: GLOW_COLOR,
	});
	NodeStyle {
		id: node.id.clone(),
		label: node.name.clone(),
		category: node.category,
		status: node.status.clone(),
		color: node_color(node.category),
		radius: node.size / 2.0,
		glow,
	}
}

pub fn edge_style(edge: &GraphEdge, view: &ViewState) -> EdgeStyle {
	let is_pattern = edge.category == EdgeCategory::SuspiciousLink;
	let (width, opacity) = match (view.patterns_visible, is_pattern) {
		(true, true) => (PATTERN_EDGE_WIDTH, 1.0),
		(true, false) => (EDGE_WIDTH, DIMMED_OPACITY),
		(false, _) => (EDGE_WIDTH, 1.0),
	};
	EdgeStyle {
		source: edge.source.clone(),
		target: edge.target.clone(),
		category: edge.category,
		weight: edge.weight,
		color: edge_color(edge.category),
		width,
		opacity,
		dashed: is_dashed(edge.category),
	}
}

/// Projects graph data and view state into a full render spec.
pub fn project(data: &GraphData, view: &ViewState, layout: LayoutParams) -> RenderSpec {
	RenderSpec {
		nodes: data.nodes.iter().map(|n| node_style(n, view)).collect(),
		edges: data.edges.iter().map(|e| edge_style(e, view)).collect(),
		layout,
		layout_animation: view.animation_enabled,
		zoom: view.zoom_factor,
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::super::data::get_graph_data;
	use super::super::types::RiskLevel;
	use super::*;

	fn node_category() -> impl Strategy<Value = NodeCategory> {
		prop::sample::select(NodeCategory::ALL.to_vec())
	}

	fn edge_category() -> impl Strategy<Value = EdgeCategory> {
		prop::sample::select(EdgeCategory::ALL.to_vec())
	}

	fn view_state() -> impl Strategy<Value = ViewState> {
		(any::<bool>(), any::<bool>(), any::<bool>(), 0.01f64..100.0).prop_map(
			|(animation_enabled, risk_highlighted, patterns_visible, zoom_factor)| ViewState {
				animation_enabled,
				risk_highlighted,
				patterns_visible,
				zoom_factor,
			},
		)
	}

	proptest! {
		#[test]
		fn node_color_follows_category(category in node_category(), view in view_state(), size in 1.0f64..80.0) {
			let node = GraphNode {
				id: "n".into(),
				name: "n".into(),
				category,
				size,
				risk_level: RiskLevel::Low,
				status: String::new(),
			};
			let style = node_style(&node, &view);
			prop_assert_eq!(style.color, node_color(category));
			prop_assert_eq!(style.glow.is_some(), view.risk_highlighted && category == NodeCategory::Fraudster);
		}

		#[test]
		fn edge_color_and_dash_follow_category(category in edge_category(), view in view_state()) {
			let edge = GraphEdge {
				source: "a".into(),
				target: "b".into(),
				weight: 1.0,
				category,
			};
			let style = edge_style(&edge, &view);
			prop_assert_eq!(style.color, edge_color(category));
			prop_assert_eq!(style.dashed, category == EdgeCategory::AbnormalTx);
		}
	}

	#[test]
	fn palette_is_bit_exact() {
		assert_eq!(node_color(NodeCategory::NormalUser), "#165DFF");
		assert_eq!(node_color(NodeCategory::Fraudster), "#FF4D4F");
		assert_eq!(node_color(NodeCategory::BackgroundNode), "#8C8C8C");
		assert_eq!(edge_color(EdgeCategory::NormalTx), "#165DFF");
		assert_eq!(edge_color(EdgeCategory::AbnormalTx), "#FF9F43");
		assert_eq!(edge_color(EdgeCategory::SuspiciousLink), "#FF4D4F");
	}

	#[test]
	fn patterns_widen_suspicious_links_and_dim_the_rest() {
		let view = ViewState {
			patterns_visible: true,
			..ViewState::default()
		};
		let spec = project(&get_graph_data(), &view, LayoutParams::default());
		for edge in &spec.edges {
			if edge.category == EdgeCategory::SuspiciousLink {
				assert_eq!((edge.width, edge.opacity), (PATTERN_EDGE_WIDTH, 1.0));
			} else {
				assert_eq!((edge.width, edge.opacity), (EDGE_WIDTH, DIMMED_OPACITY));
			}
		}
	}

	#[test]
	fn hidden_patterns_leave_edges_uniform() {
		let spec = project(&get_graph_data(), &ViewState::default(), LayoutParams::default());
		assert!(spec.edges.iter().all(|e| e.width == EDGE_WIDTH && e.opacity == 1.0));
	}

	#[test]
	fn projection_preserves_edge_order() {
		let data = get_graph_data();
		let spec = project(&data, &ViewState::default(), LayoutParams::default());
		let projected: Vec<_> = spec.edges.iter().map(|e| (&e.source, &e.target)).collect();
		let declared: Vec<_> = data.edges.iter().map(|e| (&e.source, &e.target)).collect();
		assert_eq!(projected, declared);
	}
}
