use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{FrameGeometry, GraphLayoutState};

const BACKGROUND: &str = "#F8FAFF";
const LABEL_COLOR: &str = "#333";
const EMPHASIS_EDGE_WIDTH: f64 = 4.0;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &GraphLayoutState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	let nodes = state.geometry();
	draw_edges(state, &nodes, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
	draw_tooltip(state, &nodes, ctx);
}

fn draw_edges(state: &GraphLayoutState, nodes: &FrameGeometry, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let (dash, gap) = (8.0 / k, 4.0 / k);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);
	let t = ease_out_cubic(state.hover.highlight_t);
	let has_highlight = state.has_active_highlight();

	for (i, edge) in state.edges.iter().enumerate() {
		let Some(curve) = state.edge_curve(edge, nodes) else {
			continue;
		};

		let style = &edge.style;
		let emphasized = has_highlight
			&& state.is_highlighted(edge.source)
			&& state.is_highlighted(edge.target)
			&& (state.is_hovered(edge.source) || state.is_hovered(edge.target));
		let width = if state.hover.edge == Some(i) {
			style.width.max(EMPHASIS_EDGE_WIDTH)
		} else {
			style.width
		};
		let (alpha, width) = if !has_highlight {
			(style.opacity, width)
		} else if emphasized {
			(
				style.opacity + (1.0 - style.opacity) * t,
				width + (EMPHASIS_EDGE_WIDTH - width).max(0.0) * t,
			)
		} else {
			(style.opacity * (1.0 - 0.7 * t), width)
		};
		let ((sx, sy), (cx, cy), (ex, ey)) = (curve.start, curve.control, curve.end);

		ctx.set_global_alpha(alpha);
		ctx.set_stroke_style_str(style.color);
		ctx.set_line_width(width / k.max(0.5));
		if style.dashed {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
			ctx.set_line_dash_offset(dash_offset);
		} else {
			let _ = ctx.set_line_dash(&js_sys::Array::new());
		}
		ctx.begin_path();
		ctx.move_to(sx, sy);
		ctx.quadratic_curve_to(cx, cy, ex, ey);
		ctx.stroke();

		let _ = ctx.set_line_dash(&js_sys::Array::new());
		draw_arrow(ctx, (cx, cy), (ex, ey), state.layout.arrow_size / k.max(0.5), style.color);
		ctx.set_global_alpha(1.0);
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_arrow(
	ctx: &CanvasRenderingContext2d,
	(cx, cy): (f64, f64),
	(tip_x, tip_y): (f64, f64),
	size: f64,
	color: &str,
) {
	let (dx, dy) = (tip_x - cx, tip_y - cy);
	let len = (dx * dx + dy * dy).sqrt();
	if len < 0.001 {
		return;
	}
	let (ux, uy) = (dx / len, dy / len);
	let (back_x, back_y) = (tip_x - ux * size, tip_y - uy * size);
	let (px, py) = (-uy * size * 0.5, ux * size * 0.5);
	ctx.set_fill_style_str(color);
	ctx.begin_path();
	ctx.move_to(tip_x, tip_y);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

fn draw_nodes(state: &GraphLayoutState, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		let style = &node.data.user_data;
		let (x, y) = (node.x() as f64, node.y() as f64);
		let dimmed = has_highlight && !state.is_highlighted(idx);
		let alpha = if dimmed { 1.0 - 0.7 * t } else { 1.0 };
		let radius = if has_highlight && state.is_hovered(idx) {
			style.radius * (1.0 + 0.15 * t)
		} else {
			style.radius
		};

		ctx.set_global_alpha(alpha);
		if let Some(glow) = &style.glow {
			ctx.set_shadow_blur(glow.blur);
			ctx.set_shadow_color(glow.color);
		}
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(style.color);
		ctx.fill();
		ctx.set_shadow_blur(0.0);
		ctx.set_shadow_color("transparent");

		if has_highlight && state.is_hovered(idx) && t > 0.01 {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + 2.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&format!("rgba(22, 93, 255, {})", 0.7 * t));
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}

		ctx.set_fill_style_str(LABEL_COLOR);
		ctx.set_font(&format!("500 {}px sans-serif", 12.0 / k.max(0.5)));
		ctx.set_text_align("center");
		let _ = ctx.fill_text(&style.label, x, y + radius + 14.0 / k.max(0.5));
		ctx.set_global_alpha(1.0);
	});
	ctx.set_text_align("start");
}

fn draw_tooltip(state: &GraphLayoutState, nodes: &FrameGeometry, ctx: &CanvasRenderingContext2d) {
	let Some(tip) = state.tooltip(nodes) else {
		return;
	};
	let (gx, gy) = tip.anchor;
	let (sx, sy) = (
		gx * state.transform.k + state.transform.x,
		gy * state.transform.k + state.transform.y,
	);

	let h = 10.0 + 16.0 * (tip.lines.len() + 1) as f64;
	let (x, y, w) = (sx + 12.0, sy - h - 2.0, 210.0);
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.95)");
	ctx.set_stroke_style_str("#E8F3FF");
	ctx.set_line_width(1.0);
	ctx.fill_rect(x, y, w, h);
	ctx.stroke_rect(x, y, w, h);

	ctx.set_fill_style_str(tip.accent);
	ctx.set_font("bold 12px sans-serif");
	let _ = ctx.fill_text(&tip.title, x + 8.0, y + 17.0);
	ctx.set_fill_style_str(LABEL_COLOR);
	ctx.set_font("12px sans-serif");
	for (i, line) in tip.lines.iter().enumerate() {
		let _ = ctx.fill_text(line, x + 8.0, y + 33.0 + i as f64 * 16.0);
	}
}
