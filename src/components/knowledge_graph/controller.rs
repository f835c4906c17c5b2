use log::{debug, info, warn};

use crate::error::{StudioError, StudioResult};

use super::engine::{EngineFactory, RenderEngine, ResizeBinding, ViewAction};
use super::style::{LayoutParams, RenderSpec, ViewState, project};
use super::types::GraphData;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerPhase {
	Uninitialized,
	Ready,
	Disposed,
}

enum Lifecycle<E> {
	Uninitialized,
	Ready { engine: E, resize: ResizeBinding },
	Disposed,
}

/// Owns one rendering-engine handle and the authoritative [`ViewState`].
///
/// Every mutation projects a fresh [`RenderSpec`] and hands it to the engine
/// in one call; the view state is only committed once the engine took it.
pub struct GraphViewController<F: EngineFactory> {
	factory: F,
	data: GraphData,
	layout: LayoutParams,
	view: ViewState,
	lifecycle: Lifecycle<F::Engine>,
}

impl<F: EngineFactory> GraphViewController<F> {
	pub fn new(factory: F, data: GraphData) -> StudioResult<Self> {
		data.validate()?;
		Ok(Self {
			factory,
			data,
			layout: LayoutParams::default(),
			view: ViewState::default(),
			lifecycle: Lifecycle::Uninitialized,
		})
	}

	pub fn with_layout(mut self, layout: LayoutParams) -> Self {
		self.layout = layout;
		self
	}

	pub fn phase(&self) -> ControllerPhase {
		match self.lifecycle {
			Lifecycle::Uninitialized => ControllerPhase::Uninitialized,
			Lifecycle::Ready { .. } => ControllerPhase::Ready,
			Lifecycle::Disposed => ControllerPhase::Disposed,
		}
	}

	pub fn view_state(&self) -> &ViewState {
		&self.view
	}

	pub fn data(&self) -> &GraphData {
		&self.data
	}

	pub fn render_spec(&self) -> RenderSpec {
		project(&self.data, &self.view, self.layout)
	}

	/// Acquires an engine for `container` and draws the first frame.
	///
	/// A `RenderBackendUnavailable` failure leaves the controller
	/// uninitialized so the caller can retry.
	pub fn initialize(&mut self, container: &F::Container) -> StudioResult<()> {
		match self.lifecycle {
			Lifecycle::Disposed => return Err(StudioError::ControllerDisposed),
			Lifecycle::Ready { .. } => {
				debug!("graph view already initialized");
				return Ok(());
			}
			Lifecycle::Uninitialized => {}
		}

		let mut engine = self.factory.init(container).inspect_err(|e| {
			warn!("graph view initialization failed: {e}");
		})?;
		engine.render(&self.render_spec());
		let resize = self.factory.bind_resize(&engine);
		self.lifecycle = Lifecycle::Ready { engine, resize };
		info!(
			"graph view ready ({} nodes, {} edges)",
			self.data.nodes.len(),
			self.data.edges.len()
		);
		Ok(())
	}

	fn engine_mut(&mut self) -> StudioResult<&mut F::Engine> {
		match &mut self.lifecycle {
			Lifecycle::Ready { engine, .. } => Ok(engine),
			Lifecycle::Uninitialized => Err(StudioError::RenderBackendUnavailable(
				"graph view not initialized".into(),
			)),
			Lifecycle::Disposed => Err(StudioError::ControllerDisposed),
		}
	}

	fn apply(&mut self, next: ViewState) -> StudioResult<()> {
		let spec = project(&self.data, &next, self.layout);
		self.engine_mut()?.render(&spec);
		self.view = next;
		Ok(())
	}

	pub fn reset_view(&mut self) -> StudioResult<()> {
		self.engine_mut()?.dispatch_action(ViewAction::Restore);
		let next = ViewState {
			risk_highlighted: false,
			patterns_visible: false,
			zoom_factor: 1.0,
			..self.view.clone()
		};
		self.apply(next)
	}

	pub fn toggle_risk_highlight(&mut self) -> StudioResult<()> {
		let next = ViewState {
			risk_highlighted: !self.view.risk_highlighted,
			..self.view.clone()
		};
		self.apply(next)
	}

	pub fn toggle_pattern_visibility(&mut self) -> StudioResult<()> {
		let next = ViewState {
			patterns_visible: !self.view.patterns_visible,
			..self.view.clone()
		};
		self.apply(next)
	}

	pub fn toggle_animation(&mut self) -> StudioResult<()> {
		let next = ViewState {
			animation_enabled: !self.view.animation_enabled,
			..self.view.clone()
		};
		self.apply(next)
	}

	pub fn zoom(&mut self, factor: f64) -> StudioResult<()> {
		self.engine_mut()?;
		let zoom_factor = self.view.zoom_factor * factor;
		// The product must stay a usable scale, not just the factor.
		if !factor.is_finite() || factor <= 0.0 || !zoom_factor.is_finite() || zoom_factor <= 0.0 {
			warn!("rejected zoom factor {factor}");
			return Err(StudioError::InvalidZoomFactor(factor));
		}
		let next = ViewState {
			zoom_factor,
			..self.view.clone()
		};
		self.apply(next)
	}

	pub fn resize(&mut self) -> StudioResult<()> {
		self.engine_mut()?.resize();
		Ok(())
	}

	/// Unbinds the resize listener and releases the engine.
	pub fn teardown(&mut self) -> StudioResult<()> {
		match std::mem::replace(&mut self.lifecycle, Lifecycle::Disposed) {
			Lifecycle::Ready { mut engine, resize } => {
				resize.unbind();
				engine.dispose();
				info!("graph view disposed");
				Ok(())
			}
			Lifecycle::Uninitialized => Ok(()),
			Lifecycle::Disposed => Err(StudioError::ControllerDisposed),
		}
	}
}

impl<F: EngineFactory> Drop for GraphViewController<F> {
	fn drop(&mut self) {
		if self.phase() != ControllerPhase::Disposed {
			let _ = self.teardown();
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::{Cell, RefCell};
	use std::rc::Rc;

	use proptest::prelude::*;

	use super::super::data::get_graph_data;
	use super::super::types::{EdgeCategory, NodeCategory};
	use super::*;

	#[derive(Default)]
	struct Journal {
		specs: Vec<RenderSpec>,
		actions: Vec<ViewAction>,
		resizes: usize,
		disposed: bool,
		bound: bool,
	}

	struct RecordingEngine {
		journal: Rc<RefCell<Journal>>,
	}

	impl RenderEngine for RecordingEngine {
		fn render(&mut self, spec: &RenderSpec) {
			self.journal.borrow_mut().specs.push(spec.clone());
		}

		fn dispatch_action(&mut self, action: ViewAction) {
			self.journal.borrow_mut().actions.push(action);
		}

		fn resize(&mut self) {
			self.journal.borrow_mut().resizes += 1;
		}

		fn dispose(&mut self) {
			self.journal.borrow_mut().disposed = true;
		}
	}

	#[derive(Default)]
	struct FakeFactory {
		journal: Rc<RefCell<Journal>>,
		unavailable: Cell<bool>,
	}

	impl EngineFactory for FakeFactory {
		type Container = ();
		type Engine = RecordingEngine;

		fn init(&self, _: &()) -> StudioResult<RecordingEngine> {
			if self.unavailable.get() {
				return Err(StudioError::RenderBackendUnavailable("not loaded".into()));
			}
			Ok(RecordingEngine {
				journal: self.journal.clone(),
			})
		}

		fn bind_resize(&self, _: &RecordingEngine) -> ResizeBinding {
			self.journal.borrow_mut().bound = true;
			let journal = self.journal.clone();
			ResizeBinding::new(move || journal.borrow_mut().bound = false)
		}
	}

	fn ready_controller() -> (GraphViewController<FakeFactory>, Rc<RefCell<Journal>>) {
		let factory = FakeFactory::default();
		let journal = factory.journal.clone();
		let mut controller = GraphViewController::new(factory, get_graph_data()).unwrap();
		controller.initialize(&()).unwrap();
		(controller, journal)
	}

	fn last_spec(journal: &Rc<RefCell<Journal>>) -> RenderSpec {
		journal.borrow().specs.last().cloned().unwrap()
	}

	#[test]
	fn initialize_renders_and_binds_resize() {
		let (controller, journal) = ready_controller();
		assert_eq!(controller.phase(), ControllerPhase::Ready);
		assert_eq!(journal.borrow().specs.len(), 1);
		assert!(journal.borrow().bound);
		assert_eq!(controller.view_state(), &ViewState::default());
	}

	#[test]
	fn dangling_data_is_refused_with_a_banner_message() {
		let mut data = get_graph_data();
		data.edges[0].target = "ghost".into();
		let Err(err) = GraphViewController::new(FakeFactory::default(), data) else {
			panic!("dangling edge accepted");
		};
		assert!(matches!(err, StudioError::DanglingEdge { .. }));
		assert!(!err.is_retryable());
		assert!(err.user_message().contains("ghost"));
	}

	#[test]
	fn unavailable_backend_is_retryable() {
		let factory = FakeFactory::default();
		factory.unavailable.set(true);
		let mut controller = GraphViewController::new(factory, get_graph_data()).unwrap();

		let err = controller.initialize(&()).unwrap_err();
		assert!(err.is_retryable());
		assert_eq!(controller.phase(), ControllerPhase::Uninitialized);

		controller.factory.unavailable.set(false);
		controller.initialize(&()).unwrap();
		assert_eq!(controller.phase(), ControllerPhase::Ready);
	}

	#[test]
	fn mutations_before_initialize_do_not_touch_state() {
		let mut controller = GraphViewController::new(FakeFactory::default(), get_graph_data()).unwrap();
		assert!(controller.toggle_risk_highlight().is_err());
		assert!(!controller.view_state().risk_highlighted);
	}

	#[test]
	fn reset_view_is_idempotent() {
		let (mut controller, journal) = ready_controller();
		controller.toggle_risk_highlight().unwrap();
		controller.toggle_pattern_visibility().unwrap();
		controller.zoom(1.2).unwrap();

		controller.reset_view().unwrap();
		let once = controller.view_state().clone();
		controller.reset_view().unwrap();
		assert_eq!(controller.view_state(), &once);
		assert!(!once.risk_highlighted);
		assert!(!once.patterns_visible);
		assert_eq!(once.zoom_factor, 1.0);
		assert_eq!(journal.borrow().actions, vec![ViewAction::Restore, ViewAction::Restore]);
	}

	#[test]
	fn risk_highlight_rewrites_every_node() {
		let (mut controller, journal) = ready_controller();
		controller.toggle_risk_highlight().unwrap();
		let spec = last_spec(&journal);
		assert_eq!(spec.nodes.len(), controller.data().nodes.len());
		for node in &spec.nodes {
			assert_eq!(node.glow.is_some(), node.category == NodeCategory::Fraudster);
		}

		controller.toggle_risk_highlight().unwrap();
		assert!(last_spec(&journal).nodes.iter().all(|n| n.glow.is_none()));
	}

	#[test]
	fn risk_highlight_is_an_involution() {
		let (mut controller, journal) = ready_controller();
		let before = last_spec(&journal);
		controller.toggle_risk_highlight().unwrap();
		controller.toggle_risk_highlight().unwrap();
		assert_eq!(last_spec(&journal), before);
	}

	#[test]
	fn pattern_toggle_round_trips_to_uniform_edges() {
		let (mut controller, journal) = ready_controller();
		controller.toggle_pattern_visibility().unwrap();
		let shown = last_spec(&journal);
		assert!(
			shown
				.edges
				.iter()
				.filter(|e| e.category != EdgeCategory::SuspiciousLink)
				.all(|e| e.opacity < 1.0)
		);

		controller.toggle_pattern_visibility().unwrap();
		let hidden = last_spec(&journal);
		assert!(hidden.edges.iter().all(|e| e.opacity == 1.0));
	}

	#[test]
	fn animation_toggle_reaches_layout_flag() {
		let (mut controller, journal) = ready_controller();
		controller.toggle_animation().unwrap();
		assert!(!last_spec(&journal).layout_animation);
		assert!(!controller.view_state().animation_enabled);
	}

	#[test]
	fn zoom_that_would_underflow_or_overflow_is_rejected() {
		let (mut controller, journal) = ready_controller();
		controller.zoom(1e-200).unwrap();
		let frames = journal.borrow().specs.len();
		assert_eq!(controller.zoom(1e-200), Err(StudioError::InvalidZoomFactor(1e-200)));
		assert_eq!(controller.view_state().zoom_factor, 1e-200);

		controller.reset_view().unwrap();
		controller.zoom(1e300).unwrap();
		assert_eq!(controller.zoom(1e300), Err(StudioError::InvalidZoomFactor(1e300)));
		let zoom = controller.view_state().zoom_factor;
		assert!(zoom.is_finite() && zoom > 0.0);
		assert_eq!(journal.borrow().specs.len(), frames + 2);
	}

	#[test]
	fn non_positive_zoom_is_rejected_without_rendering() {
		let (mut controller, journal) = ready_controller();
		let frames = journal.borrow().specs.len();
		for factor in [0.0, -1.5, f64::NAN] {
			assert!(matches!(
				controller.zoom(factor),
				Err(StudioError::InvalidZoomFactor(_))
			));
		}
		assert_eq!(journal.borrow().specs.len(), frames);
		assert_eq!(controller.view_state().zoom_factor, 1.0);
	}

	#[test]
	fn teardown_releases_engine_and_listener() {
		let (mut controller, journal) = ready_controller();
		controller.teardown().unwrap();
		assert!(journal.borrow().disposed);
		assert!(!journal.borrow().bound);
		assert_eq!(controller.phase(), ControllerPhase::Disposed);

		assert_eq!(controller.zoom(1.2), Err(StudioError::ControllerDisposed));
		assert_eq!(controller.reset_view(), Err(StudioError::ControllerDisposed));
		assert_eq!(controller.initialize(&()), Err(StudioError::ControllerDisposed));
		assert_eq!(controller.teardown(), Err(StudioError::ControllerDisposed));
	}

	#[test]
	fn dropping_a_ready_controller_disposes_the_engine() {
		let (controller, journal) = ready_controller();
		drop(controller);
		assert!(journal.borrow().disposed);
		assert!(!journal.borrow().bound);
	}

	#[test]
	fn resize_is_forwarded() {
		let (mut controller, journal) = ready_controller();
		controller.resize().unwrap();
		controller.resize().unwrap();
		assert_eq!(journal.borrow().resizes, 2);
	}

	proptest! {
		#[test]
		fn zoom_multiplies(factors in prop::collection::vec(0.1f64..5.0, 1..8)) {
			let (mut controller, _journal) = ready_controller();
			let mut expected = 1.0;
			for f in &factors {
				controller.zoom(*f).unwrap();
				expected *= f;
			}
			prop_assert!((controller.view_state().zoom_factor - expected).abs() < 1e-9 * expected.max(1.0));
		}
	}
}
