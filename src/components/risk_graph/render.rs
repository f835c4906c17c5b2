use std::collections::HashMap;
use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::simulation::RiskGraphSimulation;

const LINK_COLOR: &str = "#aaa";
const LINK_OPACITY: f64 = 0.6;
const LINK_WIDTH: f64 = 2.0;
const LABEL_OFFSET: f64 = 45.0;

pub fn render(sim: &RiskGraphSimulation, ctx: &CanvasRenderingContext2d) {
	ctx.clear_rect(0.0, 0.0, sim.width, sim.height);
	ctx.save();
	let _ = ctx.translate(sim.width / 2.0, sim.height / 2.0);

	let mut positions = HashMap::new();
	sim.graph.visit_nodes(|node| {
		positions.insert(node.index(), (node.x() as f64, node.y() as f64));
	});

	ctx.set_global_alpha(LINK_OPACITY);
	ctx.set_stroke_style_str(LINK_COLOR);
	ctx.set_line_width(LINK_WIDTH);
	for (source, target) in &sim.links {
		if let (Some(&(x1, y1)), Some(&(x2, y2))) = (positions.get(source), positions.get(target)) {
			ctx.begin_path();
			ctx.move_to(x1, y1);
			ctx.line_to(x2, y2);
			ctx.stroke();
		}
	}
	ctx.set_global_alpha(1.0);

	sim.graph.visit_nodes(|node| {
		let (x, y) = (node.x() as f64, node.y() as f64);
		let entity = &node.data.user_data;
		ctx.begin_path();
		let _ = ctx.arc(x, y, entity.kind.radius(), 0.0, 2.0 * PI);
		ctx.set_fill_style_str(entity.kind.color());
		ctx.fill();
		ctx.set_stroke_style_str("#fff");
		ctx.set_line_width(2.0);
		ctx.stroke();

		ctx.set_fill_style_str("#333");
		ctx.set_font("12px sans-serif");
		ctx.set_text_align("center");
		let _ = ctx.fill_text(entity.name, x, y + LABEL_OFFSET);
	});

	ctx.restore();
}
