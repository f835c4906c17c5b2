use crate::error::StudioResult;

use super::style::RenderSpec;

/// One-shot view actions forwarded to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewAction {
	/// Drop roam state: pan offset and wheel zoom.
	Restore,
}

/// Contract implemented by a graph-drawing backend.
///
/// The engine receives a fully materialized [`RenderSpec`] on every change
/// and never hands its internal representation back to the caller.
pub trait RenderEngine {
	fn render(&mut self, spec: &RenderSpec);
	fn dispatch_action(&mut self, action: ViewAction);
	fn resize(&mut self);
	fn dispose(&mut self);
}

/// Obtains engine handles. Injected into the controller at construction.
pub trait EngineFactory {
	type Container;
	type Engine: RenderEngine;

	/// Fails with `RenderBackendUnavailable` when no engine can be created yet.
	fn init(&self, container: &Self::Container) -> StudioResult<Self::Engine>;

	/// Subscribes `engine` to window resize events.
	fn bind_resize(&self, engine: &Self::Engine) -> ResizeBinding;
}

/// Live resize subscription. Unsubscribes on `unbind` or drop.
pub struct ResizeBinding {
	unbind: Option<Box<dyn FnOnce()>>,
}

impl ResizeBinding {
	pub fn new(unbind: impl FnOnce() + 'static) -> Self {
		Self {
			unbind: Some(Box::new(unbind)),
		}
	}

	pub fn unbind(mut self) {
		if let Some(f) = self.unbind.take() {
			f();
		}
	}
}

impl Drop for ResizeBinding {
	fn drop(&mut self) {
		if let Some(f) = self.unbind.take() {
			f();
		}
	}
}

impl std::fmt::Debug for ResizeBinding {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ResizeBinding")
			.field("bound", &self.unbind.is_some())
			.finish()
	}
}
