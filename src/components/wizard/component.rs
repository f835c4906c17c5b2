use leptos::prelude::*;
use log::warn;

use crate::components::progress::IntervalTicker;
use crate::error::StudioError;
use crate::components::risk_graph::RiskGraph;

use super::scoring::SimulatedScorer;
use super::state::{
	FEATURE_ITEMS, SUB_STEPS, Stage, SubStepStatus, WizardConfig, WizardState, WizardStateMachine,
};

#[derive(Clone, Copy)]
struct WizardHandles {
	machine: StoredValue<WizardStateMachine, LocalStorage>,
	snapshot: ReadSignal<WizardState>,
	set_snapshot: WriteSignal<WizardState>,
	set_notice: WriteSignal<Option<String>>,
	feature_ticker: StoredValue<Option<IntervalTicker>, LocalStorage>,
	model_ticker: StoredValue<Option<IntervalTicker>, LocalStorage>,
}

impl WizardHandles {
	fn publish(self) {
		if let Some(state) = self.machine.try_with_value(|m| m.state().clone()) {
			self.set_snapshot.set(state);
		}
	}

	fn start_features(self) {
		let started = self
			.machine
			.try_update_value(|m| m.start_feature_engineering())
			.unwrap_or(false);
		if !started {
			return;
		}
		self.publish();
		let interval = self.machine.with_value(|m| m.config().feature_schedule.interval());
		let ticker = IntervalTicker::start(interval, move || {
			let tick = self.machine.try_update_value(|m| m.tick_features()).flatten();
			self.publish();
			if tick.is_none_or(|t| t.completed) {
				self.feature_ticker.update_value(|t| {
					if let Some(t) = t {
						t.cancel();
					}
				});
			}
		});
		if ticker.is_none() {
			self.abandon_run();
		}
		self.feature_ticker.set_value(ticker);
	}

	/// Unlocks the controls when a run's timer could not be started.
	fn abandon_run(self) {
		self.machine.update_value(|m| m.cancel());
		self.set_notice.set(Some(StudioError::TimerUnavailable.user_message()));
		self.publish();
	}

	fn run_model(self) {
		let was_running = self.machine.with_value(|m| m.state().model_running);
		match self.machine.try_update_value(|m| m.run_model()) {
			Some(Ok(())) => self.set_notice.set(None),
			Some(Err(e)) => {
				self.set_notice.set(Some(e.user_message()));
				return;
			}
			None => return,
		}
		self.publish();
		if was_running {
			return;
		}
		let interval = self.machine.with_value(|m| m.config().model_schedule.interval());
		let ticker = IntervalTicker::start(interval, move || {
			let tick = self.machine.try_update_value(|m| m.tick_model()).flatten();
			self.publish();
			if tick.is_none_or(|t| t.completed) {
				self.model_ticker.update_value(|t| {
					if let Some(t) = t {
						t.cancel();
					}
				});
			}
		});
		if ticker.is_none() {
			self.abandon_run();
		}
		self.model_ticker.set_value(ticker);
	}

	fn select_model(self, name: &str) {
		self.machine.update_value(|m| {
			m.select_model(name);
		});
		self.publish();
	}

	fn next(self) {
		self.machine.update_value(|m| {
			m.next_stage();
		});
		self.publish();
	}

	fn back(self) {
		self.machine.update_value(|m| {
			m.previous_stage();
		});
		self.set_notice.set(None);
		self.publish();
	}

	fn complete(self) {
		self.machine.update_value(|m| {
			m.complete_recognition();
		});
		self.publish();
	}
}

fn step_indicator(h: WizardHandles) -> impl IntoView {
	Stage::ALL
		.into_iter()
		.map(|step| {
			let class = move || {
				let current = h.snapshot.get().stage;
				match current.cmp(&step) {
					std::cmp::Ordering::Equal => "step-badge current",
					std::cmp::Ordering::Greater => "step-badge done",
					std::cmp::Ordering::Less => "step-badge pending",
				}
			};
			let badge = move || {
				if h.snapshot.get().stage > step {
					"✓".to_string()
				} else {
					step.number().to_string()
				}
			};
			view! {
				<div class="wizard-step">
					<div class=class>{badge}</div>
					<div>
						<div class="step-title">{step.title()}</div>
						<div class="step-subtitle">{step.subtitle()}</div>
					</div>
				</div>
			}
		})
		.collect_view()
}

fn feature_stage(h: WizardHandles) -> impl IntoView {
	let sub_steps = SUB_STEPS
		.iter()
		.enumerate()
		.map(|(i, step)| {
			let status = move || h.snapshot.get().sub_step_status(i);
			view! {
				<div class="sub-step">
					<div class=move || match status() {
						SubStepStatus::Done => "sub-step-badge done",
						SubStepStatus::Active => "sub-step-badge active",
						SubStepStatus::Pending => "sub-step-badge pending",
					}>
						{move || {
							if status() == SubStepStatus::Done {
								"✓".to_string()
							} else {
								(i + 1).to_string()
							}
						}}
					</div>
					<div class="sub-step-name">{step.name}</div>
				</div>
			}
		})
		.collect_view();

	let items = FEATURE_ITEMS
		.iter()
		.map(|(title, desc)| {
			view! {
				<li class="feature-item">
					<div class="feature-item-title">{*title}</div>
					<div class="feature-item-desc">{*desc}</div>
				</li>
			}
		})
		.collect_view();

	let current_step = move || {
		let index = h.snapshot.get().active_sub_step;
		usize::try_from(index).ok().and_then(|i| SUB_STEPS.get(i))
	};

	view! {
		<div class="stage-panel">
			<h2>"Feature engineering"</h2>
			<div class="sub-steps">{sub_steps}</div>
			<ul class="feature-items">{items}</ul>
			<div class="stage-center">
				<button
					class=move || {
						if h.snapshot.get().features_complete() { "primary done" } else { "primary" }
					}
					disabled=move || {
						let s = h.snapshot.get();
						s.processing_features || s.features_complete()
					}
					on:click=move |_| h.start_features()
				>
					{move || {
						let s = h.snapshot.get();
						if s.features_complete() {
							"Feature engineering complete"
						} else if s.processing_features {
							"Processing..."
						} else {
							"Start feature engineering"
						}
					}}
				</button>
			</div>
			<Show when=move || {
				let s = h.snapshot.get();
				s.processing_features || s.features_complete()
			}>
				<div class="sub-step-info">
					<div class="sub-step-info-title">
						{move || current_step().map(|s| s.title).unwrap_or_default()}
					</div>
					<div class="sub-step-info-desc">
						{move || current_step().map(|s| s.description).unwrap_or_default()}
					</div>
				</div>
				<div class="progress-track">
					<div
						class="progress-fill"
						style=move || format!("width: {}%", h.snapshot.get().feature_progress)
					></div>
				</div>
			</Show>
			<div class="stage-nav end">
				<button
					class="primary"
					disabled=move || !h.snapshot.get().can_advance()
					on:click=move |_| h.next()
				>
					"Next"
				</button>
			</div>
		</div>
	}
}

fn model_stage(h: WizardHandles, models: Vec<String>) -> impl IntoView {
	let cards = models
		.into_iter()
		.map(|name| {
			let (for_class, for_click) = (name.clone(), name.clone());
			view! {
				<div
					class=move || {
						let s = h.snapshot.get();
						match (s.selected_model.as_deref() == Some(for_class.as_str()), s.model_running) {
							(true, _) => "model-card selected",
							(false, true) => "model-card locked",
							(false, false) => "model-card",
						}
					}
					on:click=move |_| h.select_model(&for_click)
				>
					<div class="model-name">{name}</div>
				</div>
			}
		})
		.collect_view();

	view! {
		<div class="stage-panel">
			<h2>"Model judgment"</h2>
			<div class="model-cards">{cards}</div>
			<Show when=move || h.snapshot.get().model_running>
				<div class="model-progress">
					{move || format!("Model running {}%...", h.snapshot.get().model_progress)}
				</div>
			</Show>
			{move || {
				h.snapshot
					.get()
					.risk_result
					.map(|r| {
						view! {
							<div class="risk-result">
								<div class="risk-level">"Verdict: " {r.level}</div>
								<div>"Subject: " {r.subject_id}</div>
								<div>"Confidence: " {r.confidence}</div>
								<div>"Judged at: " {r.timestamp}</div>
								<div class="risk-desc">{r.description}</div>
							</div>
						}
					})
			}}
			<div class="stage-nav">
				<button on:click=move |_| h.back()>"Back"</button>
				<div>
					<button
						class="outline"
						disabled=move || h.snapshot.get().model_running
						on:click=move |_| h.run_model()
					>
						"Run"
					</button>
					<button
						class="primary"
						disabled=move || !h.snapshot.get().can_advance()
						on:click=move |_| h.next()
					>
						"Next"
					</button>
				</div>
			</div>
		</div>
	}
}

fn review_stage(h: WizardHandles) -> impl IntoView {
	view! {
		<div class="stage-panel">
			<h2>"Anti-fraud knowledge graph"</h2>
			<div class="risk-graph-container">
				<RiskGraph />
			</div>
			<Show when=move || h.snapshot.get().recognition_completed>
				<div class="recognition-done">"Recognition complete."</div>
			</Show>
			<div class="stage-nav">
				<button on:click=move |_| h.back()>"Back"</button>
				<button
					class="success"
					disabled=move || h.snapshot.get().recognition_completed
					on:click=move |_| h.complete()
				>
					"Complete recognition"
				</button>
			</div>
		</div>
	}
}

#[component]
pub fn RiskAnalysisWizard(#[prop(optional)] config: Option<WizardConfig>) -> impl IntoView {
	let config = config.unwrap_or_default();
	let models = config.models.clone();
	let machine = StoredValue::new_local(WizardStateMachine::new(
		config,
		Box::new(SimulatedScorer::default()),
	));
	let (snapshot, set_snapshot) = signal(WizardState::default());
	let (notice, set_notice) = signal(None::<String>);

	let h = WizardHandles {
		machine,
		snapshot,
		set_snapshot,
		set_notice,
		feature_ticker: StoredValue::new_local(None),
		model_ticker: StoredValue::new_local(None),
	};

	on_cleanup(move || {
		h.feature_ticker.try_update_value(|t| t.take());
		h.model_ticker.try_update_value(|t| t.take());
		if h.machine.try_update_value(|m| m.cancel()).is_none() {
			warn!("wizard state was released before cleanup");
		}
	});

	let stage = Memo::new(move |_| snapshot.get().stage);

	view! {
		<div class="risk-wizard">
			<div class="wizard-header">
				<h1>"Risk recognition and review"</h1>
				<p>"Graph deep learning for credit anti-fraud risk recognition"</p>
			</div>

			<div class="wizard-steps">{step_indicator(h)}</div>

			{move || notice.get().map(|msg| view! { <div class="wizard-notice">{msg}</div> })}

			<div class="wizard-content">
				{move || match stage.get() {
					Stage::FeatureEngineering => feature_stage(h).into_any(),
					Stage::ModelJudgment => model_stage(h, models.clone()).into_any(),
					Stage::FraudGraphReview => review_stage(h).into_any(),
				}}
			</div>
		</div>
	}
}
