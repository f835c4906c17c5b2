//! Fraud-risk studio: an interactive knowledge graph of users, devices and
//! fraud rings, plus a three-stage risk recognition wizard.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Modules
mod components;
mod error;
mod pages;

pub use error::{StudioError, StudioResult};

// Top-Level pages
use crate::pages::analysis::Analysis;
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// Router for the knowledge graph and the risk analysis wizard.
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		<Title text="Fraud Graph Studio" />

		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<nav class="studio-nav">
				<A href="/">"Knowledge graph"</A>
				<A href="/analysis">"Risk analysis"</A>
			</nav>
			<main>
				<Routes fallback=|| view! { <NotFound /> }>
					<Route path=path!("/") view=Home />
					<Route path=path!("/analysis") view=Analysis />
				</Routes>
			</main>
		</Router>
	}
}
