use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent};

use super::render;
use super::simulation::RiskGraphSimulation;

const FRAME_DT: f32 = 0.016;

type SharedSim = Rc<RefCell<Option<RiskGraphSimulation>>>;

/// Owns the animation loop; dropping it stops the loop.
struct FrameRuntime {
	frame_loop: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
	frame_id: Rc<Cell<Option<i32>>>,
}

impl FrameRuntime {
	fn start(sim: SharedSim, ctx: CanvasRenderingContext2d) -> Self {
		let frame_loop: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
		let frame_id = Rc::new(Cell::new(None));
		let (loop_inner, id_inner) = (frame_loop.clone(), frame_id.clone());
		*frame_loop.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *sim.borrow_mut() {
				if s.tick(FRAME_DT) {
					render::render(s, &ctx);
				}
			}
			if let (Some(cb), Some(window)) = (loop_inner.borrow().as_ref(), web_sys::window()) {
				id_inner.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
			}
		}));
		if let (Some(cb), Some(window)) = (frame_loop.borrow().as_ref(), web_sys::window()) {
			frame_id.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}
		Self {
			frame_loop,
			frame_id,
		}
	}
}

impl Drop for FrameRuntime {
	fn drop(&mut self) {
		if let (Some(id), Some(window)) = (self.frame_id.take(), web_sys::window()) {
			let _ = window.cancel_animation_frame(id);
		}
		self.frame_loop.borrow_mut().take();
		debug!("risk graph animation stopped");
	}
}

fn pointer_position(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// Draggable graph of the applicant and the evidence behind the verdict.
///
/// The layout is rebuilt from scratch every time the component mounts.
#[component]
pub fn RiskGraph() -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let sim: SharedSim = Rc::new(RefCell::new(None));
	let runtime = StoredValue::new_local(None::<FrameRuntime>);

	let sim_init = sim.clone();
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (w, h) = canvas
			.parent_element()
			.map(|p| (p.client_width() as f64, p.client_height() as f64))
			.filter(|&(w, h)| w > 0.0 && h > 0.0)
			.unwrap_or((600.0, 500.0));
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx = match canvas.get_context("2d") {
			Ok(Some(ctx)) => ctx.dyn_into::<CanvasRenderingContext2d>().ok(),
			_ => None,
		};
		let Some(ctx) = ctx else {
			warn!("risk graph canvas has no 2d context");
			return;
		};
		ctx.clear_rect(0.0, 0.0, w, h);

		*sim_init.borrow_mut() = Some(RiskGraphSimulation::new(w, h));
		runtime.set_value(Some(FrameRuntime::start(sim_init.clone(), ctx)));
	});

	on_cleanup(move || {
		runtime.try_update_value(|r| r.take());
	});

	let sim_md = sim.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = pointer_position(&canvas, &ev);
		if let Some(ref mut s) = *sim_md.borrow_mut() {
			s.grab(x, y);
		}
	};

	let sim_mm = sim.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = pointer_position(&canvas, &ev);
		if let Some(ref mut s) = *sim_mm.borrow_mut() {
			s.drag_to(x, y);
		}
	};

	let sim_mu = sim.clone();
	let on_release = move |_: MouseEvent| {
		if let Some(ref mut s) = *sim_mu.borrow_mut() {
			s.release();
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="risk-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_release.clone()
			on:mouseleave=on_release
			style="display: block; cursor: grab;"
		/>
	}
}
