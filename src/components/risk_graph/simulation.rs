use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::data::{RiskEntity, risk_entities, risk_links};

pub const LINK_DISTANCE: f64 = 120.0;
pub const CHARGE_STRENGTH: f64 = 400.0;
pub const ALPHA_MIN: f64 = 0.001;
pub const DRAG_ALPHA_TARGET: f64 = 0.3;

/// Per-tick decay that takes alpha from 1 to `ALPHA_MIN` in 300 ticks.
pub fn alpha_decay() -> f64 {
	1.0 - ALPHA_MIN.powf(1.0 / 300.0)
}

/// Force layout of the review graph with drag interaction.
///
/// World coordinates are centred on the origin; `width`/`height` only
/// matter for mapping pointer positions.
pub struct RiskGraphSimulation {
	pub graph: ForceGraph<RiskEntity, ()>,
	pub links: Vec<(DefaultNodeIdx, DefaultNodeIdx)>,
	pub width: f64,
	pub height: f64,
	alpha: f64,
	alpha_target: f64,
	dragging: Option<DefaultNodeIdx>,
	ids: HashMap<&'static str, DefaultNodeIdx>,
}

impl RiskGraphSimulation {
	pub fn new(width: f64, height: f64) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: CHARGE_STRENGTH as f32,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});
		let entities = risk_entities();
		let mut ids = HashMap::new();
		let count = entities.len() as f64;

		for (i, entity) in entities.into_iter().enumerate() {
			// User sits at the centre, everything else on a ring one link away.
			let (x, y) = if i == 0 {
				(0.0, 0.0)
			} else {
				let angle = (i as f64) * 2.0 * PI / (count - 1.0);
				(LINK_DISTANCE * angle.cos(), LINK_DISTANCE * angle.sin())
			};
			let id = entity.id;
			let idx = graph.add_node(NodeData {
				x: x as f32,
				y: y as f32,
				mass: entity.kind.radius() as f32,
				is_anchor: false,
				user_data: entity,
			});
			ids.insert(id, idx);
		}

		let mut links = Vec::new();
		for (source, target) in risk_links() {
			if let (Some(&s), Some(&t)) = (ids.get(source), ids.get(target)) {
				graph.add_edge(s, t, EdgeData::default());
				links.push((s, t));
			}
		}

		Self {
			graph,
			links,
			width,
			height,
			alpha: 1.0,
			alpha_target: 0.0,
			dragging: None,
			ids,
		}
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn is_settled(&self) -> bool {
		self.alpha < ALPHA_MIN && self.alpha_target < ALPHA_MIN
	}

	pub fn to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		(sx - self.width / 2.0, sy - self.height / 2.0)
	}

	pub fn to_screen(&self, x: f64, y: f64) -> (f64, f64) {
		(x + self.width / 2.0, y + self.height / 2.0)
	}

	pub fn position(&self, id: &str) -> Option<(f64, f64)> {
		let idx = *self.ids.get(id)?;
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some((node.x() as f64, node.y() as f64));
			}
		});
		found
	}

	pub fn is_pinned(&self, id: &str) -> bool {
		let Some(&idx) = self.ids.get(id) else {
			return false;
		};
		let mut pinned = false;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				pinned = node.data.is_anchor;
			}
		});
		pinned
	}

	/// Advances the layout one frame. Returns false once the layout has cooled.
	pub fn tick(&mut self, dt: f32) -> bool {
		if self.is_settled() {
			return false;
		}
		self.alpha += (self.alpha_target - self.alpha) * alpha_decay();
		// Step size follows alpha so motion fades as the layout cools.
		self.graph.update(dt * self.alpha as f32);
		self.recenter();
		true
	}

	/// Keeps the free nodes' centroid on the origin.
	fn recenter(&mut self) {
		let (mut sx, mut sy, mut n) = (0.0f32, 0.0f32, 0.0f32);
		self.graph.visit_nodes(|node| {
			if !node.data.is_anchor {
				sx += node.x();
				sy += node.y();
				n += 1.0;
			}
		});
		if n == 0.0 {
			return;
		}
		let (mx, my) = (sx / n, sy / n);
		self.graph.visit_nodes_mut(|node| {
			if !node.data.is_anchor {
				node.data.x -= mx;
				node.data.y -= my;
			}
		});
	}

	fn node_at(&self, x: f64, y: f64) -> Option<DefaultNodeIdx> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - x, node.y() as f64 - y);
			if (dx * dx + dy * dy).sqrt() <= node.data.user_data.kind.radius() {
				found = Some(node.index());
			}
		});
		found
	}

	/// Pins the node under the pointer and reheats the layout.
	pub fn grab(&mut self, sx: f64, sy: f64) -> bool {
		let (x, y) = self.to_world(sx, sy);
		let Some(idx) = self.node_at(x, y) else {
			return false;
		};
		self.alpha_target = DRAG_ALPHA_TARGET;
		self.dragging = Some(idx);
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.is_anchor = true;
			}
		});
		true
	}

	pub fn drag_to(&mut self, sx: f64, sy: f64) {
		let Some(idx) = self.dragging else {
			return;
		};
		let (x, y) = self.to_world(sx, sy);
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.x = x as f32;
				node.data.y = y as f32;
			}
		});
	}

	/// Unpins the dragged node and lets the layout cool down again.
	pub fn release(&mut self) {
		let Some(idx) = self.dragging.take() else {
			return;
		};
		self.alpha_target = 0.0;
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.is_anchor = false;
			}
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const DT: f32 = 0.016;

	fn cooled() -> RiskGraphSimulation {
		let mut sim = RiskGraphSimulation::new(600.0, 500.0);
		while sim.tick(DT) {}
		sim
	}

	#[test]
	fn builds_fixed_graph() {
		let sim = RiskGraphSimulation::new(600.0, 500.0);
		assert_eq!(sim.links.len(), 6);
		assert_eq!(sim.position("user"), Some((0.0, 0.0)));
		assert_eq!(sim.alpha(), 1.0);
	}

	#[test]
	fn cools_down_in_about_three_hundred_ticks() {
		let mut sim = RiskGraphSimulation::new(600.0, 500.0);
		let mut ticks = 0;
		while sim.tick(DT) {
			ticks += 1;
			assert!(ticks < 400);
		}
		assert!(ticks >= 299);
		assert!(!sim.tick(DT));
	}

	#[test]
	fn grab_pins_and_reheats() {
		let mut sim = cooled();
		let (x, y) = sim.position("user").unwrap();
		let (sx, sy) = sim.to_screen(x, y);
		assert!(sim.grab(sx, sy));
		assert!(sim.is_pinned("user"));
		assert!(sim.tick(DT));
		assert!(sim.alpha() > ALPHA_MIN);
	}

	#[test]
	fn drag_moves_pinned_node_exactly() {
		let mut sim = cooled();
		let (x, y) = sim.position("device").unwrap();
		let (sx, sy) = sim.to_screen(x, y);
		assert!(sim.grab(sx, sy));
		sim.drag_to(sx + 40.0, sy - 25.0);
		let (nx, ny) = sim.position("device").unwrap();
		assert!((nx - (x + 40.0)).abs() < 1e-3);
		assert!((ny - (y - 25.0)).abs() < 1e-3);
	}

	#[test]
	fn release_unpins_and_cools() {
		let mut sim = cooled();
		let (x, y) = sim.position("user").unwrap();
		let (sx, sy) = sim.to_screen(x, y);
		sim.grab(sx, sy);
		for _ in 0..10 {
			sim.tick(DT);
		}
		sim.release();
		assert!(!sim.is_pinned("user"));
		let mut guard = 0;
		while sim.tick(DT) {
			guard += 1;
			assert!(guard < 1000);
		}
	}

	#[test]
	fn grab_on_empty_space_does_nothing() {
		let mut sim = cooled();
		assert!(!sim.grab(-500.0, -500.0));
		assert!(!sim.tick(DT));
	}
}
