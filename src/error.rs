use thiserror::Error;

pub type StudioResult<T> = Result<T, StudioError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StudioError {
	#[error("rendering backend unavailable: {0}")]
	RenderBackendUnavailable(String),

	#[error("graph view controller has been disposed")]
	ControllerDisposed,

	#[error("no model selected")]
	ModelNotSelected,

	#[error("invalid zoom factor: {0}")]
	InvalidZoomFactor(f64),

	#[error("invalid progress schedule: step={step}, interval_ms={interval_ms}")]
	InvalidSchedule { step: u32, interval_ms: u64 },

	#[error("progress timer could not be started")]
	TimerUnavailable,

	#[error("edge {from} -> {to} references an undeclared node")]
	DanglingEdge { from: String, to: String },
}

impl StudioError {
	/// Whether the caller may retry the failed operation later.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::RenderBackendUnavailable(_))
	}

	/// Banner text shown to the user.
	pub fn user_message(&self) -> String {
		match self {
			Self::RenderBackendUnavailable(_) => {
				"Graph renderer failed to load. Please retry.".into()
			}
			Self::ControllerDisposed => "This graph view is no longer active.".into(),
			Self::ModelNotSelected => "Select a model first.".into(),
			Self::InvalidZoomFactor(f) => format!("Cannot zoom by {f}."),
			Self::TimerUnavailable => "Could not start the progress timer. Please try again.".into(),
			other => other.to_string(),
		}
	}
}
