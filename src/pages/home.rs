use leptos::prelude::*;

use crate::components::knowledge_graph::KnowledgeGraph;

/// Knowledge graph landing page. Failures surface in the graph's own banner.
#[component]
pub fn Home() -> impl IntoView {
	view! {
		<div class="page home-page">
			<KnowledgeGraph />
		</div>
	}
}
