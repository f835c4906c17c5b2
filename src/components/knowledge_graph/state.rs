use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::style::{EdgeStyle, LayoutParams, NodeStyle, RenderSpec};

pub const HIT_MARGIN: f64 = 4.0;
pub const EDGE_HIT_MARGIN: f64 = 5.0;
const CURVE_SAMPLES: usize = 16;
pub const MIN_ROAM_ZOOM: f64 = 0.1;
pub const MAX_ROAM_ZOOM: f64 = 10.0;

#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub highlight_t: f64,
	pub prev_node: Option<DefaultNodeIdx>,
	pub prev_neighbors: HashSet<DefaultNodeIdx>,
	/// Index into `GraphLayoutState::edges`; only set while no node is hovered.
	pub edge: Option<usize>,
	delay_t: f64,
}

pub struct PlacedEdge {
	pub source: DefaultNodeIdx,
	pub target: DefaultNodeIdx,
	pub style: EdgeStyle,
}

/// Where a node sits this frame, in graph coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeGeometry {
	pub x: f64,
	pub y: f64,
	pub radius: f64,
}

pub type FrameGeometry = HashMap<DefaultNodeIdx, NodeGeometry>;

/// Quadratic edge trimmed to the node rims.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeCurve {
	pub start: (f64, f64),
	pub control: (f64, f64),
	pub end: (f64, f64),
}

impl EdgeCurve {
	pub fn point(&self, t: f64) -> (f64, f64) {
		let u = 1.0 - t;
		(
			u * u * self.start.0 + 2.0 * u * t * self.control.0 + t * t * self.end.0,
			u * u * self.start.1 + 2.0 * u * t * self.control.1 + t * t * self.end.1,
		)
	}

	/// Distance from `p` to the curve, measured on a sampled polyline.
	pub fn distance_to(&self, (px, py): (f64, f64)) -> f64 {
		let mut best = f64::INFINITY;
		let mut prev = self.start;
		for i in 1..=CURVE_SAMPLES {
			let next = self.point(i as f64 / CURVE_SAMPLES as f64);
			best = best.min(segment_distance((px, py), prev, next));
			prev = next;
		}
		best
	}
}

fn segment_distance((px, py): (f64, f64), (ax, ay): (f64, f64), (bx, by): (f64, f64)) -> f64 {
	let (dx, dy) = (bx - ax, by - ay);
	let len2 = dx * dx + dy * dy;
	let t = if len2 > 0.0 {
		(((px - ax) * dx + (py - ay) * dy) / len2).clamp(0.0, 1.0)
	} else {
		0.0
	};
	let (cx, cy) = (ax + t * dx, ay + t * dy);
	((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}

/// Hover card content, anchored in graph coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
	pub anchor: (f64, f64),
	pub title: String,
	pub accent: &'static str,
	pub lines: Vec<String>,
}

/// Layout and roam state of the canvas engine.
pub struct GraphLayoutState {
	pub graph: ForceGraph<NodeStyle, ()>,
	pub edges: Vec<PlacedEdge>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	pub flow_time: f64,
	pub layout: LayoutParams,
	spec_zoom: f64,
	node_ids: Vec<String>,
	id_to_idx: HashMap<String, DefaultNodeIdx>,
}

fn simulation_parameters(layout: &LayoutParams) -> SimulationParameters {
	SimulationParameters {
		force_charge: (layout.repulsion / 4.0) as f32,
		force_spring: 0.05,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: 0.9,
	}
}

impl GraphLayoutState {
	pub fn new(spec: &RenderSpec, width: f64, height: f64) -> Self {
		let mut state = Self {
			graph: ForceGraph::new(simulation_parameters(&spec.layout)),
			edges: Vec::new(),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: spec.zoom,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			animation_running: spec.layout_animation,
			flow_time: 0.0,
			layout: spec.layout,
			spec_zoom: spec.zoom,
			node_ids: Vec::new(),
			id_to_idx: HashMap::new(),
		};
		state.rebuild(spec);
		state
	}

	fn rebuild(&mut self, spec: &RenderSpec) {
		self.graph = ForceGraph::new(simulation_parameters(&spec.layout));
		self.id_to_idx.clear();
		self.hover = HoverState::default();
		self.drag = DragState::default();

		// Start on a ring so the spring length is roughly satisfied.
		let count = spec.nodes.len().max(1) as f64;
		for (i, style) in spec.nodes.iter().enumerate() {
			let angle = (i as f64) * 2.0 * PI / count;
			let idx = self.graph.add_node(NodeData {
				x: (spec.layout.edge_length * angle.cos()) as f32,
				y: (spec.layout.edge_length * angle.sin()) as f32,
				mass: style.radius.max(1.0) as f32,
				is_anchor: false,
				user_data: style.clone(),
			});
			self.id_to_idx.insert(style.id.clone(), idx);
		}
		self.node_ids = spec.nodes.iter().map(|n| n.id.clone()).collect();

		for style in &spec.edges {
			if let (Some(&src), Some(&tgt)) =
				(self.id_to_idx.get(&style.source), self.id_to_idx.get(&style.target))
			{
				self.graph.add_edge(src, tgt, EdgeData::default());
			}
		}
		self.place_edges(spec);
	}

	fn place_edges(&mut self, spec: &RenderSpec) {
		self.hover.edge = None;
		self.edges = spec
			.edges
			.iter()
			.filter_map(|style| {
				let source = *self.id_to_idx.get(&style.source)?;
				let target = *self.id_to_idx.get(&style.target)?;
				Some(PlacedEdge {
					source,
					target,
					style: style.clone(),
				})
			})
			.collect();
	}

	/// Applies a full spec. Positions survive when the node set is unchanged.
	pub fn apply_spec(&mut self, spec: &RenderSpec) {
		let same_nodes = self.node_ids.len() == spec.nodes.len()
			&& self.node_ids.iter().zip(&spec.nodes).all(|(a, b)| *a == b.id);
		if !same_nodes || self.layout != spec.layout {
			self.rebuild(spec);
		} else {
			let styles: HashMap<&str, &NodeStyle> =
				spec.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
			self.graph.visit_nodes_mut(|node| {
				if let Some(style) = styles.get(node.data.user_data.id.as_str()) {
					node.data.user_data = (*style).clone();
				}
			});
			let hovered_edge = self.hover.edge;
			self.place_edges(spec);
			self.hover.edge = hovered_edge.filter(|&i| i < self.edges.len());
		}
		self.layout = spec.layout;

		self.animation_running = spec.layout_animation;

		if spec.zoom != self.spec_zoom && self.spec_zoom > 0.0 {
			let ratio = spec.zoom / self.spec_zoom;
			let (cx, cy) = (self.width / 2.0, self.height / 2.0);
			self.transform.x = cx - (cx - self.transform.x) * ratio;
			self.transform.y = cy - (cy - self.transform.y) * ratio;
			self.transform.k *= ratio;
			self.spec_zoom = spec.zoom;
		}
	}

	/// Drops pan and wheel zoom, keeping the requested zoom.
	pub fn restore(&mut self) {
		self.transform = ViewTransform {
			x: self.width / 2.0,
			y: self.height / 2.0,
			k: self.spec_zoom,
		};
		self.pan = PanState::default();
	}

	#[cfg(test)]
	pub fn positions(&self) -> HashMap<DefaultNodeIdx, (f64, f64)> {
		self.geometry()
			.into_iter()
			.map(|(idx, g)| (idx, (g.x, g.y)))
			.collect()
	}

	/// Snapshot of every node's position and radius for one frame.
	pub fn geometry(&self) -> FrameGeometry {
		let mut out = HashMap::new();
		self.graph.visit_nodes(|node| {
			out.insert(
				node.index(),
				NodeGeometry {
					x: node.x() as f64,
					y: node.y() as f64,
					radius: node.data.user_data.radius,
				},
			);
		});
		out
	}

	/// Curve for `edge`, or `None` when an endpoint is missing or both
	/// endpoints coincide.
	pub fn edge_curve(&self, edge: &PlacedEdge, nodes: &FrameGeometry) -> Option<EdgeCurve> {
		let (a, b) = (nodes.get(&edge.source)?, nodes.get(&edge.target)?);
		let (dx, dy) = (b.x - a.x, b.y - a.y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			return None;
		}
		let (ux, uy) = (dx / dist, dy / dist);
		let (sx, sy) = (a.x + ux * a.radius, a.y + uy * a.radius);
		let (ex, ey) = (b.x - ux * b.radius, b.y - uy * b.radius);
		// Control point offset perpendicular to the chord.
		let c = self.layout.curveness * dist;
		Some(EdgeCurve {
			start: (sx, sy),
			control: ((sx + ex) / 2.0 - uy * c, (sy + ey) / 2.0 + ux * c),
			end: (ex, ey),
		})
	}

	/// Topmost edge under the pointer.
	pub fn edge_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let p = self.screen_to_graph(sx, sy);
		let nodes = self.geometry();
		let margin = EDGE_HIT_MARGIN / self.transform.k;
		self.edges.iter().enumerate().rev().find_map(|(i, edge)| {
			let curve = self.edge_curve(edge, &nodes)?;
			let reach = margin + edge.style.width / 2.0;
			(curve.distance_to(p) <= reach).then_some(i)
		})
	}

	pub fn tooltip(&self, nodes: &FrameGeometry) -> Option<Tooltip> {
		if let Some(idx) = self.hover.node {
			let style = self.node_style(idx)?;
			let g = nodes.get(&idx)?;
			return Some(Tooltip {
				anchor: (g.x, g.y),
				title: style.label,
				accent: style.color,
				lines: vec![
					format!("Category: {}", style.category.label()),
					format!("Status: {}", style.status),
				],
			});
		}
		let edge = self.edges.get(self.hover.edge?)?;
		let curve = self.edge_curve(edge, nodes)?;
		let name = |idx| self.node_style(idx).map(|s| s.label).unwrap_or_default();
		Some(Tooltip {
			anchor: curve.point(0.5),
			title: format!("{} → {}", name(edge.source), name(edge.target)),
			accent: edge.style.color,
			lines: vec![
				format!("Relation: {}", edge.style.category.label()),
				format!("Weight: {}", edge.style.weight),
			],
		})
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			if (dx * dx + dy * dy).sqrt() < node.data.user_data.radius + HIT_MARGIN {
				found = Some(node.index());
			}
		});
		found
	}

	pub fn node_style(&self, idx: DefaultNodeIdx) -> Option<NodeStyle> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some(node.data.user_data.clone());
			}
		});
		found
	}

	pub fn begin_drag(&mut self, x: f64, y: f64) {
		if let Some(idx) = self.node_at_position(x, y) {
			self.drag.active = true;
			self.drag.node_idx = Some(idx);
			self.drag.start_x = x;
			self.drag.start_y = y;
			let drag = &mut self.drag;
			self.graph.visit_nodes(|node| {
				if node.index() == idx {
					drag.node_start_x = node.x();
					drag.node_start_y = node.y();
				}
			});
		} else {
			self.pan.active = true;
			self.pan.start_x = x;
			self.pan.start_y = y;
			self.pan.transform_start_x = self.transform.x;
			self.pan.transform_start_y = self.transform.y;
		}
	}

	pub fn pointer_moved(&mut self, x: f64, y: f64) {
		if !self.drag.active {
			let hovered = self.node_at_position(x, y);
			self.set_hover(hovered);
			self.hover.edge = match hovered {
				None if !self.pan.active => self.edge_at_position(x, y),
				_ => None,
			};
		}

		if self.drag.active {
			if let Some(idx) = self.drag.node_idx {
				let (dx, dy) = (
					(x - self.drag.start_x) / self.transform.k,
					(y - self.drag.start_y) / self.transform.k,
				);
				let (nx, ny) = (
					self.drag.node_start_x + dx as f32,
					self.drag.node_start_y + dy as f32,
				);
				self.graph.visit_nodes_mut(|node| {
					if node.index() == idx {
						node.data.x = nx;
						node.data.y = ny;
						node.data.is_anchor = true;
					}
				});
			}
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
		}
	}

	/// Dropped nodes stay pinned where the user left them.
	pub fn end_drag(&mut self) {
		self.drag = DragState::default();
		self.pan.active = false;
	}

	pub fn pointer_left(&mut self) {
		self.end_drag();
		self.set_hover(None);
		self.hover.edge = None;
	}

	pub fn wheel_zoom(&mut self, x: f64, y: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(MIN_ROAM_ZOOM, MAX_ROAM_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Keep the previous focus around while it fades out.
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for edge in &self.edges {
				if edge.source == idx {
					self.hover.neighbors.insert(edge.target);
				} else if edge.target == idx {
					self.hover.neighbors.insert(edge.source);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	pub fn tick(&mut self, dt: f32) {
		if self.animation_running {
			self.graph.update(dt);
		}
		self.flow_time += dt as f64;

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt as f64).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.transform.x += (width - self.width) / 2.0;
		self.transform.y += (height - self.height) / 2.0;
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use super::super::data::get_graph_data;
	use super::super::style::{ViewState, edge_color, project};
	use super::super::types::EdgeCategory;
	use super::*;

	fn spec(view: &ViewState) -> RenderSpec {
		project(&get_graph_data(), view, LayoutParams::default())
	}

	#[test]
	fn builds_every_declared_edge() {
		let state = GraphLayoutState::new(&spec(&ViewState::default()), 800.0, 600.0);
		assert_eq!(state.edges.len(), get_graph_data().edges.len());
	}

	#[test]
	fn first_frame_carries_edge_styles() {
		let state = GraphLayoutState::new(&spec(&ViewState::default()), 800.0, 600.0);
		let dashed: Vec<_> = state
			.edges
			.iter()
			.filter(|e| e.style.dashed)
			.map(|e| e.style.category)
			.collect();
		assert_eq!(dashed, vec![EdgeCategory::AbnormalTx; 2]);
		assert!(state.edges.iter().all(|e| e.style.color == edge_color(e.style.category)));
	}

	#[test]
	fn geometry_covers_every_node_once() {
		let state = GraphLayoutState::new(&spec(&ViewState::default()), 800.0, 600.0);
		let nodes = state.geometry();
		assert_eq!(nodes.len(), get_graph_data().nodes.len());
		let fraud_1 = nodes[&state.id_to_idx["fraud_1"]];
		assert_eq!(fraud_1.radius, 22.5);
	}

	fn edge_midpoint_on_screen(state: &GraphLayoutState, i: usize) -> (f64, f64) {
		let curve = state.edge_curve(&state.edges[i], &state.geometry()).unwrap();
		let (gx, gy) = curve.point(0.5);
		(
			gx * state.transform.k + state.transform.x,
			gy * state.transform.k + state.transform.y,
		)
	}

	#[test]
	fn hovering_an_edge_shows_relation_and_weight() {
		let mut state = GraphLayoutState::new(&spec(&ViewState::default()), 800.0, 600.0);
		let (x, y) = edge_midpoint_on_screen(&state, 0);
		assert_eq!(state.edge_at_position(x, y), Some(0));

		state.pointer_moved(x, y);
		assert_eq!(state.hover.edge, Some(0));
		let tip = state.tooltip(&state.geometry()).unwrap();
		assert_eq!(tip.title, "Fraudster A → Fraudster B");
		assert_eq!(
			tip.lines,
			vec!["Relation: Suspicious link".to_string(), "Weight: 8.5".to_string()]
		);

		state.pointer_left();
		assert_eq!(state.hover.edge, None);
		assert_eq!(state.tooltip(&state.geometry()), None);
	}

	#[test]
	fn node_hover_wins_over_edges() {
		let mut state = GraphLayoutState::new(&spec(&ViewState::default()), 800.0, 600.0);
		let fraud_1 = state.id_to_idx["fraud_1"];
		let g = state.geometry()[&fraud_1];
		state.pointer_moved(g.x + state.transform.x, g.y + state.transform.y);
		assert_eq!(state.hover.node, Some(fraud_1));
		assert_eq!(state.hover.edge, None);
		let tip = state.tooltip(&state.geometry()).unwrap();
		assert_eq!(tip.title, "Fraudster A");
	}

	#[test]
	fn empty_space_hits_no_edge() {
		let state = GraphLayoutState::new(&spec(&ViewState::default()), 800.0, 600.0);
		assert_eq!(state.edge_at_position(5.0, 5.0), None);
	}

	#[test]
	fn style_change_keeps_positions() {
		let mut state = GraphLayoutState::new(&spec(&ViewState::default()), 800.0, 600.0);
		state.tick(0.016);
		let before = state.positions();
		state.apply_spec(&spec(&ViewState {
			risk_highlighted: true,
			..ViewState::default()
		}));
		assert_eq!(state.positions(), before);
	}

	#[test]
	fn spec_zoom_scales_around_center_and_restore_keeps_it() {
		let mut state = GraphLayoutState::new(&spec(&ViewState::default()), 800.0, 600.0);
		state.wheel_zoom(10.0, 10.0, -1.0);
		state.apply_spec(&spec(&ViewState {
			zoom_factor: 2.0,
			..ViewState::default()
		}));
		state.restore();
		assert_eq!(state.transform.k, 2.0);
		assert_eq!((state.transform.x, state.transform.y), (400.0, 300.0));
	}

	#[test]
	fn resize_is_idempotent() {
		let mut state = GraphLayoutState::new(&spec(&ViewState::default()), 800.0, 600.0);
		state.resize(1024.0, 768.0);
		let once = (state.transform.x, state.transform.y);
		state.resize(1024.0, 768.0);
		assert_eq!((state.transform.x, state.transform.y), once);
	}

	#[test]
	fn hover_collects_neighbors() {
		let mut state = GraphLayoutState::new(&spec(&ViewState::default()), 800.0, 600.0);
		let fraud_1 = state.id_to_idx["fraud_1"];
		state.set_hover(Some(fraud_1));
		// fraud_2, normal_1, bg_1
		assert_eq!(state.hover.neighbors.len(), 3);
		assert!(state.is_hovered(fraud_1));
	}

	#[test]
	fn paused_animation_freezes_layout() {
		let mut state = GraphLayoutState::new(
			&spec(&ViewState {
				animation_enabled: false,
				..ViewState::default()
			}),
			800.0,
			600.0,
		);
		let before = state.positions();
		state.tick(0.016);
		assert_eq!(state.positions(), before);
	}
}
