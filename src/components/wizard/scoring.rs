use chrono::Local;

/// Outcome of one model run.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultRecord {
	pub level: String,
	pub subject_id: String,
	/// Percentage with one decimal, e.g. `"91.3%"`.
	pub confidence: String,
	pub timestamp: String,
	pub description: String,
}

/// What a scorer is asked to judge.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreRequest<'a> {
	pub model: &'a str,
	pub subject_id: &'a str,
	/// 1-based count of completed runs in this session.
	pub run: u32,
}

/// Produces the risk verdict at the end of a model run.
pub trait RiskScorer {
	fn score(&mut self, request: &ScoreRequest<'_>) -> ResultRecord;
}

pub const DEMO_SUBJECT_ID: &str = "U20260315007";

/// Stand-in scorer: fixed verdict with a pseudo-random confidence in
/// `[85.0, 95.0)`.
#[derive(Clone, Debug)]
pub struct SimulatedScorer {
	seed: u64,
}

impl SimulatedScorer {
	pub fn new(seed: u64) -> Self {
		Self { seed }
	}

	fn next_unit(&mut self) -> f64 {
		self.seed = (self.seed.wrapping_mul(9301).wrapping_add(49297)) % 233280;
		(self.seed as f64) / 233280.0
	}
}

impl Default for SimulatedScorer {
	fn default() -> Self {
		Self::new(Local::now().timestamp_millis().unsigned_abs())
	}
}

impl RiskScorer for SimulatedScorer {
	fn score(&mut self, request: &ScoreRequest<'_>) -> ResultRecord {
		let confidence = self.next_unit() * 10.0 + 85.0;
		ResultRecord {
			level: "Medium risk".into(),
			subject_id: request.subject_id.into(),
			confidence: format!("{confidence:.1}%"),
			timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
			description: "The applicant shows some fraud risk characteristics; manual review is \
			              recommended."
				.into(),
		}
	}
}
