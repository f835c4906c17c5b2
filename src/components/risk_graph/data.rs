#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EntityKind {
	#[default]
	User,
	Feature,
	Contact,
	Device,
	Risk,
}

impl EntityKind {
	pub fn color(self) -> &'static str {
		match self {
			Self::User => "#4dabf7",
			Self::Feature => "#52c41a",
			Self::Risk => "#f5222d",
			Self::Contact | Self::Device => "#fa8c16",
		}
	}

	pub fn radius(self) -> f64 {
		match self {
			Self::User => 35.0,
			_ => 25.0,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RiskEntity {
	pub id: &'static str,
	pub name: &'static str,
	pub kind: EntityKind,
}

/// The applicant under review and what the model leaned on.
pub fn risk_entities() -> Vec<RiskEntity> {
	use EntityKind::*;
	[
		("user", "Applicant", User),
		("basic", "Basic profile", Feature),
		("behavior", "Behaviour features", Feature),
		("social", "Social features", Feature),
		("contact1", "Contact A", Contact),
		("device", "Device fingerprint", Device),
		("risk1", "Abnormal login", Risk),
	]
	.into_iter()
	.map(|(id, name, kind)| RiskEntity { id, name, kind })
	.collect()
}

pub fn risk_links() -> Vec<(&'static str, &'static str)> {
	vec![
		("user", "basic"),
		("user", "behavior"),
		("user", "social"),
		("user", "contact1"),
		("user", "device"),
		("behavior", "risk1"),
	]
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;

	#[test]
	fn links_resolve() {
		let ids: HashSet<_> = risk_entities().iter().map(|e| e.id).collect();
		assert!(risk_links().iter().all(|(a, b)| ids.contains(a) && ids.contains(b)));
	}

	#[test]
	fn exactly_one_user_and_one_risk() {
		let entities = risk_entities();
		assert_eq!(entities.iter().filter(|e| e.kind == EntityKind::User).count(), 1);
		assert_eq!(entities.iter().filter(|e| e.kind == EntityKind::Risk).count(), 1);
	}
}
