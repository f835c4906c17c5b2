//! Canvas rendering engine backed by a `force_graph` layout.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::debug;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use crate::error::{StudioError, StudioResult};

use super::engine::{EngineFactory, RenderEngine, ResizeBinding, ViewAction};
use super::render;
use super::state::GraphLayoutState;
use super::style::RenderSpec;

const FRAME_DT: f32 = 0.016;
const FALLBACK_SIZE: (f64, f64) = (800.0, 600.0);

type SharedState = Rc<RefCell<Option<GraphLayoutState>>>;
type FrameLoop = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn container_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or(FALLBACK_SIZE)
}

fn fit_canvas(canvas: &HtmlCanvasElement, state: &SharedState) {
	let (w, h) = container_size(canvas);
	if canvas.width() != w as u32 || canvas.height() != h as u32 {
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
	}
	if let Some(ref mut s) = *state.borrow_mut() {
		s.resize(w, h);
	}
}

fn pointer_position(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

pub struct CanvasEngine {
	canvas: HtmlCanvasElement,
	state: SharedState,
	frame_loop: FrameLoop,
	frame_id: Rc<Cell<Option<i32>>>,
	mouse_listeners: Vec<(&'static str, Closure<dyn FnMut(MouseEvent)>)>,
	wheel_listener: Option<Closure<dyn FnMut(WheelEvent)>>,
}

impl CanvasEngine {
	fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
		let state: SharedState = Rc::new(RefCell::new(None));
		let frame_loop: FrameLoop = Rc::new(RefCell::new(None));
		let frame_id = Rc::new(Cell::new(None));

		let (state_anim, loop_inner, frame_inner) =
			(state.clone(), frame_loop.clone(), frame_id.clone());
		*frame_loop.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(FRAME_DT);
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(window)) = (loop_inner.borrow().as_ref(), web_sys::window()) {
				frame_inner.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
			}
		}));

		let mut engine = Self {
			canvas,
			state,
			frame_loop,
			frame_id,
			mouse_listeners: Vec::new(),
			wheel_listener: None,
		};
		engine.bind_pointer();
		engine.request_frame();
		engine
	}

	fn request_frame(&self) {
		if let (Some(cb), Some(window)) = (self.frame_loop.borrow().as_ref(), web_sys::window()) {
			self.frame_id
				.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}
	}

	fn bind_pointer(&mut self) {
		let mouse: [(&'static str, fn(&mut GraphLayoutState, f64, f64)); 4] = [
			("mousedown", |s, x, y| s.begin_drag(x, y)),
			("mousemove", |s, x, y| s.pointer_moved(x, y)),
			("mouseup", |s, _, _| s.end_drag()),
			("mouseleave", |s, _, _| s.pointer_left()),
		];
		for (name, handler) in mouse {
			let (state, canvas) = (self.state.clone(), self.canvas.clone());
			let cb = Closure::<dyn FnMut(MouseEvent)>::new(move |ev: MouseEvent| {
				let (x, y) = pointer_position(&canvas, &ev);
				if let Some(ref mut s) = *state.borrow_mut() {
					handler(s, x, y);
				}
			});
			let _ = self
				.canvas
				.add_event_listener_with_callback(name, cb.as_ref().unchecked_ref());
			self.mouse_listeners.push((name, cb));
		}

		let (state, canvas) = (self.state.clone(), self.canvas.clone());
		let wheel = Closure::<dyn FnMut(WheelEvent)>::new(move |ev: WheelEvent| {
			ev.prevent_default();
			let (x, y) = pointer_position(&canvas, &ev);
			if let Some(ref mut s) = *state.borrow_mut() {
				s.wheel_zoom(x, y, ev.delta_y());
			}
		});
		let _ = self
			.canvas
			.add_event_listener_with_callback("wheel", wheel.as_ref().unchecked_ref());
		self.wheel_listener = Some(wheel);
	}
}

impl RenderEngine for CanvasEngine {
	fn render(&mut self, spec: &RenderSpec) {
		let mut slot = self.state.borrow_mut();
		match slot.as_mut() {
			Some(s) => s.apply_spec(spec),
			None => {
				let (w, h) = container_size(&self.canvas);
				self.canvas.set_width(w as u32);
				self.canvas.set_height(h as u32);
				*slot = Some(GraphLayoutState::new(spec, w, h));
			}
		}
	}

	fn dispatch_action(&mut self, action: ViewAction) {
		match action {
			ViewAction::Restore => {
				if let Some(ref mut s) = *self.state.borrow_mut() {
					s.restore();
				}
			}
		}
	}

	fn resize(&mut self) {
		fit_canvas(&self.canvas, &self.state);
	}

	fn dispose(&mut self) {
		if let (Some(id), Some(window)) = (self.frame_id.take(), web_sys::window()) {
			let _ = window.cancel_animation_frame(id);
		}
		self.frame_loop.borrow_mut().take();
		for (name, cb) in self.mouse_listeners.drain(..) {
			let _ = self
				.canvas
				.remove_event_listener_with_callback(name, cb.as_ref().unchecked_ref());
		}
		if let Some(cb) = self.wheel_listener.take() {
			let _ = self
				.canvas
				.remove_event_listener_with_callback("wheel", cb.as_ref().unchecked_ref());
		}
		self.state.borrow_mut().take();
		debug!("canvas engine disposed");
	}
}

/// Creates [`CanvasEngine`]s on a `<canvas>` element.
#[derive(Clone, Copy, Debug, Default)]
pub struct CanvasEngineFactory;

impl EngineFactory for CanvasEngineFactory {
	type Container = HtmlCanvasElement;
	type Engine = CanvasEngine;

	fn init(&self, canvas: &HtmlCanvasElement) -> StudioResult<CanvasEngine> {
		let ctx = canvas
			.get_context("2d")
			.map_err(|e| StudioError::RenderBackendUnavailable(format!("{e:?}")))?
			.ok_or_else(|| StudioError::RenderBackendUnavailable("no 2d context".into()))?
			.dyn_into::<CanvasRenderingContext2d>()
			.map_err(|_| StudioError::RenderBackendUnavailable("unexpected context type".into()))?;
		Ok(CanvasEngine::new(canvas.clone(), ctx))
	}

	fn bind_resize(&self, engine: &CanvasEngine) -> ResizeBinding {
		let Some(window) = web_sys::window() else {
			return ResizeBinding::new(|| ());
		};
		let (canvas, state) = (engine.canvas.clone(), engine.state.clone());
		let cb = Closure::<dyn FnMut()>::new(move || fit_canvas(&canvas, &state));
		let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		ResizeBinding::new(move || {
			let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		})
	}
}
