use leptos::prelude::*;

use crate::components::wizard::RiskAnalysisWizard;

#[component]
pub fn Analysis() -> impl IntoView {
	view! {
		<div class="page analysis-page">
			<RiskAnalysisWizard />
		</div>
	}
}
