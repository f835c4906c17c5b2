use std::time::Duration;

use log::{debug, info, warn};

use crate::components::progress::{
	FEATURE_SCHEDULE, MODEL_SCHEDULE, PROGRESS_MAX, ProgressSchedule, StageProgressSimulator, Tick,
};
use crate::error::{StudioError, StudioResult};

use super::scoring::{DEMO_SUBJECT_ID, ResultRecord, RiskScorer, ScoreRequest};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
	FeatureEngineering = 1,
	ModelJudgment = 2,
	FraudGraphReview = 3,
}

impl Stage {
	pub const ALL: [Stage; 3] = [
		Self::FeatureEngineering,
		Self::ModelJudgment,
		Self::FraudGraphReview,
	];

	pub fn number(self) -> u8 {
		self as u8
	}

	pub fn title(self) -> &'static str {
		match self {
			Self::FeatureEngineering => "Feature engineering",
			Self::ModelJudgment => "Model judgment",
			Self::FraudGraphReview => "Fraud recognition",
		}
	}

	pub fn subtitle(self) -> &'static str {
		match self {
			Self::FeatureEngineering => "Data preprocessing",
			Self::ModelJudgment => "Algorithmic risk assessment",
			Self::FraudGraphReview => "Graph review",
		}
	}
}

pub struct SubStep {
	pub name: &'static str,
	pub title: &'static str,
	pub description: &'static str,
}

pub const SUB_STEP_COUNT: usize = 5;

pub static SUB_STEPS: [SubStep; SUB_STEP_COUNT] = [
	SubStep {
		name: "Data cleaning",
		title: "Running: data cleaning",
		description: "Handling missing values, outliers and duplicates",
	},
	SubStep {
		name: "Feature extraction",
		title: "Running: feature extraction",
		description: "Extracting profile and behavioural features from raw data",
	},
	SubStep {
		name: "Feature transformation",
		title: "Running: feature transformation",
		description: "Encoding categorical features and standardising numeric ones",
	},
	SubStep {
		name: "Feature selection",
		title: "Running: feature selection",
		description: "Selecting the most effective feature subset",
	},
	SubStep {
		name: "Feature generation",
		title: "Running: feature generation",
		description: "Generating cross and derived features",
	},
];

pub const FEATURE_ITEMS: [(&str, &str); 4] = [
	(
		"Data cleaning and preprocessing",
		"Missing values, outlier detection, normalisation",
	),
	(
		"Basic feature extraction",
		"Profile information, historical behaviour, device fingerprint",
	),
	(
		"Graph structure features",
		"Social network, node centrality, clustering coefficient",
	),
	(
		"Temporal features",
		"Behaviour patterns over time series",
	),
];

const SUB_STEP_WIDTH: u8 = PROGRESS_MAX / SUB_STEP_COUNT as u8;

/// Index of the sub-step a feature-engineering progress value falls in.
///
/// Buckets are 20 wide: 0 is -1 (nothing started), 1..=19 is 0, 20..=39 is
/// 1, and so on up to 80..=100 which is 4.
pub fn sub_step_for(progress: u8) -> i8 {
	if progress == 0 {
		return -1;
	}
	(progress.min(PROGRESS_MAX) / SUB_STEP_WIDTH).min(SUB_STEP_COUNT as u8 - 1) as i8
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubStepStatus {
	Done,
	Active,
	Pending,
}

#[derive(Clone, Debug)]
pub struct WizardConfig {
	pub feature_schedule: ProgressSchedule,
	pub model_schedule: ProgressSchedule,
	pub models: Vec<String>,
	pub subject_id: String,
}

impl Default for WizardConfig {
	fn default() -> Self {
		Self {
			feature_schedule: FEATURE_SCHEDULE,
			model_schedule: MODEL_SCHEDULE,
			models: ["GraphSAGE", "GAT2", "GSA"].map(String::from).to_vec(),
			subject_id: DEMO_SUBJECT_ID.into(),
		}
	}
}

/// Snapshot of the wizard published to the view.
#[derive(Clone, Debug, PartialEq)]
pub struct WizardState {
	pub stage: Stage,
	pub feature_progress: u8,
	pub processing_features: bool,
	pub active_sub_step: i8,
	pub selected_model: Option<String>,
	pub model_running: bool,
	pub model_progress: u8,
	pub risk_result: Option<ResultRecord>,
	pub recognition_completed: bool,
}

impl Default for WizardState {
	fn default() -> Self {
		Self {
			stage: Stage::FeatureEngineering,
			feature_progress: 0,
			processing_features: false,
			active_sub_step: -1,
			selected_model: None,
			model_running: false,
			model_progress: 0,
			risk_result: None,
			recognition_completed: false,
		}
	}
}

impl WizardState {
	pub fn features_complete(&self) -> bool {
		self.feature_progress == PROGRESS_MAX
	}

	pub fn can_advance(&self) -> bool {
		match self.stage {
			Stage::FeatureEngineering => self.features_complete(),
			Stage::ModelJudgment => self.risk_result.is_some(),
			Stage::FraudGraphReview => false,
		}
	}

	pub fn sub_step_status(&self, index: usize) -> SubStepStatus {
		let active = self.active_sub_step;
		if self.features_complete() || (index as i8) < active {
			SubStepStatus::Done
		} else if index as i8 == active {
			SubStepStatus::Active
		} else {
			SubStepStatus::Pending
		}
	}
}

/// Stage gating and per-stage results for one wizard session.
pub struct WizardStateMachine {
	config: WizardConfig,
	state: WizardState,
	feature: StageProgressSimulator,
	model: StageProgressSimulator,
	scorer: Box<dyn RiskScorer>,
	runs: u32,
}

impl WizardStateMachine {
	pub fn new(config: WizardConfig, scorer: Box<dyn RiskScorer>) -> Self {
		Self {
			feature: StageProgressSimulator::new(config.feature_schedule),
			model: StageProgressSimulator::new(config.model_schedule),
			config,
			state: WizardState::default(),
			scorer,
			runs: 0,
		}
	}

	pub fn config(&self) -> &WizardConfig {
		&self.config
	}

	pub fn state(&self) -> &WizardState {
		&self.state
	}

	pub fn stage(&self) -> Stage {
		self.state.stage
	}

	/// Starts the feature simulator unless it is running or already done.
	pub fn start_feature_engineering(&mut self) -> bool {
		if self.state.processing_features || self.state.features_complete() {
			return false;
		}
		self.feature.start();
		self.state.processing_features = true;
		self.state.feature_progress = 0;
		self.state.active_sub_step = -1;
		info!("feature engineering started");
		true
	}

	/// Records a feature-engineering progress value and derives the sub-step.
	pub fn record_feature_progress(&mut self, progress: u8) {
		self.state.feature_progress = progress.min(PROGRESS_MAX);
		self.state.active_sub_step = sub_step_for(self.state.feature_progress);
	}

	fn on_feature_tick(&mut self, tick: Tick) {
		self.record_feature_progress(tick.progress);
		if tick.completed {
			self.state.processing_features = false;
			info!("feature engineering complete");
		}
	}

	pub fn tick_features(&mut self) -> Option<Tick> {
		let tick = self.feature.tick()?;
		self.on_feature_tick(tick);
		Some(tick)
	}

	pub fn next_stage(&mut self) -> bool {
		if !self.state.can_advance() {
			debug!("advance from {:?} blocked", self.state.stage);
			return false;
		}
		self.state.stage = match self.state.stage {
			Stage::FeatureEngineering => Stage::ModelJudgment,
			Stage::ModelJudgment => Stage::FraudGraphReview,
			Stage::FraudGraphReview => return false,
		};
		info!("wizard moved to stage {}", self.state.stage.number());
		true
	}

	/// Back navigation keeps feature progress and the last risk result.
	pub fn previous_stage(&mut self) -> bool {
		self.state.stage = match self.state.stage {
			Stage::FeatureEngineering => return false,
			Stage::ModelJudgment => Stage::FeatureEngineering,
			Stage::FraudGraphReview => Stage::ModelJudgment,
		};
		info!("wizard moved back to stage {}", self.state.stage.number());
		true
	}

	/// Selection is locked while a model runs.
	pub fn select_model(&mut self, name: &str) -> bool {
		if self.state.model_running {
			return false;
		}
		if !self.config.models.iter().any(|m| m == name) {
			warn!("unknown model {name:?}");
			return false;
		}
		self.state.selected_model = Some(name.to_string());
		true
	}

	/// Starts a model run. A run already in progress makes this a no-op.
	pub fn run_model(&mut self) -> StudioResult<()> {
		let Some(model) = self.state.selected_model.as_deref() else {
			warn!("model run requested without a selected model");
			return Err(StudioError::ModelNotSelected);
		};
		if self.state.model_running {
			debug!("model {model} already running");
			return Ok(());
		}
		info!("running model {model}");
		self.model.start();
		self.state.model_running = true;
		self.state.model_progress = 0;
		self.state.risk_result = None;
		Ok(())
	}

	fn on_model_tick(&mut self, tick: Tick) {
		self.state.model_progress = tick.progress;
		if !tick.completed {
			return;
		}
		self.runs += 1;
		let model = self.state.selected_model.clone().unwrap_or_default();
		let record = self.scorer.score(&ScoreRequest {
			model: &model,
			subject_id: &self.config.subject_id,
			run: self.runs,
		});
		info!(
			"model {model} judged {}: {} ({})",
			record.subject_id, record.level, record.confidence
		);
		self.state.model_running = false;
		self.state.risk_result = Some(record);
	}

	pub fn tick_model(&mut self) -> Option<Tick> {
		let tick = self.model.tick()?;
		self.on_model_tick(tick);
		Some(tick)
	}

	/// Advances both simulators by `elapsed` of virtual time.
	pub fn advance_clock(&mut self, elapsed: Duration) {
		for tick in self.feature.advance(elapsed) {
			self.on_feature_tick(tick);
		}
		for tick in self.model.advance(elapsed) {
			self.on_model_tick(tick);
		}
	}

	/// Terminal action of the review stage.
	pub fn complete_recognition(&mut self) -> bool {
		if self.state.stage != Stage::FraudGraphReview {
			return false;
		}
		self.state.recognition_completed = true;
		info!("fraud recognition completed");
		true
	}

	/// Cancels any running simulation; used when the wizard unmounts.
	pub fn cancel(&mut self) {
		self.feature.stop();
		self.model.stop();
		self.state.processing_features = false;
		self.state.model_running = false;
	}
}
