use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use log::{error, warn};
use web_sys::HtmlCanvasElement;

use crate::error::StudioResult;

use super::canvas::CanvasEngineFactory;
use super::controller::GraphViewController;
use super::data::get_graph_data;
use super::style::{ViewState, edge_color, is_dashed, node_color};
use super::types::{EdgeCategory, NodeCategory};

type Controller = GraphViewController<CanvasEngineFactory>;

#[derive(Clone, Debug, PartialEq)]
struct Banner {
	message: String,
	retryable: bool,
}

#[component]
pub fn KnowledgeGraph(
	/// Delay before the first attempt to acquire the renderer.
	#[prop(default = 500)]
	retry_delay_ms: u32,
) -> impl IntoView {
	let controller = match GraphViewController::new(CanvasEngineFactory, get_graph_data()) {
		Ok(c) => StoredValue::new_local(c),
		Err(e) => {
			error!("knowledge graph data rejected: {e}");
			return view! { <div class="graph-error">{e.user_message()}</div> }.into_any();
		}
	};

	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let (view_state, set_view_state) = signal(ViewState::default());
	let (ready, set_ready) = signal(false);
	let (banner, set_banner) = signal(None::<Banner>);
	// Dropping the handle cancels a first attempt that has not fired yet.
	let pending_init = StoredValue::new_local(None::<Timeout>);

	let try_init = move || {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		controller.update_value(|c| match c.initialize(&canvas) {
			Ok(()) => {
				set_ready.set(true);
				set_banner.set(None);
				set_view_state.set(c.view_state().clone());
			}
			Err(e) => set_banner.set(Some(Banner {
				message: e.user_message(),
				retryable: e.is_retryable(),
			})),
		});
	};

	Effect::new(move |_| {
		if canvas_ref.get().is_none() || ready.get_untracked() {
			return;
		}
		pending_init.set_value(Some(Timeout::new(retry_delay_ms, try_init)));
	});

	on_cleanup(move || {
		pending_init.try_update_value(|t| t.take());
		controller.try_update_value(|c| {
			let _ = c.teardown();
		});
	});

	let run = move |op: fn(&mut Controller) -> StudioResult<()>| {
		controller.update_value(|c| {
			match op(c) {
				Ok(()) => set_banner.set(None),
				Err(e) => {
					warn!("graph view action failed: {e}");
					set_banner.set(Some(Banner {
						message: e.user_message(),
						retryable: e.is_retryable(),
					}));
				}
			}
			set_view_state.set(c.view_state().clone());
		});
	};

	let toggle_class = move |on: bool, active: &'static str| {
		if on {
			format!("graph-action {active}")
		} else {
			"graph-action".to_string()
		}
	};

	view! {
		<div class="knowledge-graph">
			{move || {
				banner
					.get()
					.map(|Banner { message, retryable }| {
						view! {
							<div class="graph-error">
								<span>{message}</span>
								<Show when=move || retryable>
									<button on:click=move |_| try_init()>"Retry"</button>
								</Show>
							</div>
						}
					})
			}}

			<div class="graph-legend-bar">
				<div>
					<div class="legend-title">"Node types"</div>
					{NodeCategory::ALL
						.into_iter()
						.map(|c| {
							view! {
								<span class="legend-item">
									<span
										class="legend-swatch"
										style=format!("background:{}", node_color(c))
									></span>
									{c.label()}
								</span>
							}
						})
						.collect_view()}
				</div>
				<div>
					<div class="legend-title">"Relation types"</div>
					{EdgeCategory::ALL
						.into_iter()
						.map(|c| {
							let line = if is_dashed(c) { "dashed" } else { "solid" };
							view! {
								<span class="legend-item">
									<span
										class="legend-line"
										style=format!("border-bottom:2px {line} {}", edge_color(c))
									></span>
									{c.label()}
								</span>
							}
						})
						.collect_view()}
				</div>
			</div>

			<div class="graph-area">
				<canvas node_ref=canvas_ref class="knowledge-graph-canvas" style="display: block; cursor: grab;" />

				<div class="graph-actions">
					<button
						class="graph-action"
						disabled=move || !ready.get()
						on:click=move |_| run(|c| c.reset_view())
					>
						"Reset view"
					</button>
					<button
						class=move || toggle_class(view_state.get().risk_highlighted, "risk-on")
						disabled=move || !ready.get()
						on:click=move |_| run(|c| c.toggle_risk_highlight())
					>
						{move || {
							if view_state.get().risk_highlighted {
								"Clear risk highlight"
							} else {
								"Highlight risk nodes"
							}
						}}
					</button>
					<button
						class=move || toggle_class(view_state.get().patterns_visible, "patterns-on")
						disabled=move || !ready.get()
						on:click=move |_| run(|c| c.toggle_pattern_visibility())
					>
						{move || {
							if view_state.get().patterns_visible {
								"Hide fraud patterns"
							} else {
								"Show fraud patterns"
							}
						}}
					</button>
					<button
						class=move || toggle_class(view_state.get().animation_enabled, "animation-on")
						disabled=move || !ready.get()
						on:click=move |_| run(|c| c.toggle_animation())
					>
						{move || {
							if view_state.get().animation_enabled { "Animation: on" } else { "Animation: off" }
						}}
					</button>
					<div class="zoom-buttons">
						<button disabled=move || !ready.get() on:click=move |_| run(|c| c.zoom(1.2))>
							"+"
						</button>
						<button disabled=move || !ready.get() on:click=move |_| run(|c| c.zoom(0.8))>
							"-"
						</button>
					</div>
					<div class="zoom-readout">
						{move || format!("{:.0}%", view_state.get().zoom_factor * 100.0)}
					</div>
				</div>
			</div>
		</div>
	}
	.into_any()
}
