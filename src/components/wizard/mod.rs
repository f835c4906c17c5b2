mod component;
mod scoring;
mod state;

pub use component::RiskAnalysisWizard;
