use crate::{AttributeKey, Error, Observation, Result, TreatmentType};

/// A named group of attributes sharing one non-default treatment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreatmentGroup {
	pub name: String,
	pub attributes: Vec<AttributeKey>,
}
impl TreatmentGroup {
	pub fn overlaps<'a, I>(&self, keys: I) -> bool
	where
		I: IntoIterator<Item = &'a str>,
	{
		keys.into_iter().any(|key| self.attributes.iter().any(|attribute| attribute.name == key))
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateRule {
	pub code: String,
	pub priority: i32,
	pub checked_attributes: Vec<AttributeKey>,
	pub nb_filled_attributes: usize,
	pub nb_equal_attributes: usize,
	pub nb_missing_attributes: usize,
	pub connected: bool,
	pub treatment_groups: Vec<TreatmentGroup>,
}
impl DuplicateRule {
	pub fn from_config(cfg: &dedup_config::RuleConfig) -> Result<Self> {
		dedup_config::validate_rule(cfg)
			.map_err(|err| Error::InvalidRule { code: cfg.code.clone(), message: err.to_string() })?;

		let checked_attributes = cfg
			.checked_attributes
			.iter()
			.map(attribute_key_from_config)
			.collect::<Result<Vec<_>>>()?;
		let mut treatment_groups = Vec::with_capacity(cfg.treatment_groups.len());

		for group in &cfg.treatment_groups {
			treatment_groups.push(TreatmentGroup {
				name: group.name.clone(),
				attributes: group
					.attributes
					.iter()
					.map(attribute_key_from_config)
					.collect::<Result<Vec<_>>>()?,
			});
		}

		Ok(Self {
			code: cfg.code.clone(),
			priority: cfg.priority,
			checked_attributes,
			nb_filled_attributes: cfg.nb_filled_attributes as usize,
			nb_equal_attributes: cfg.nb_equal_attributes as usize,
			nb_missing_attributes: cfg.nb_missing_attributes as usize,
			connected: cfg.connected,
			treatment_groups,
		})
	}

	/// Checked attributes supplied by the observation, in rule order.
	pub fn present_attributes<'a>(&'a self, observation: &Observation) -> Vec<&'a AttributeKey> {
		self.checked_attributes
			.iter()
			.filter(|attribute| observation.contains(&attribute.name))
			.collect()
	}

	pub fn can_apply(&self, observation: &Observation) -> bool {
		if self.checked_attributes.is_empty() {
			return false;
		}

		self.nb_filled_attributes <= self.present_attributes(observation).len()
	}
}

pub fn can_apply(rule: &DuplicateRule, observation: &Observation) -> bool {
	rule.can_apply(observation)
}

fn attribute_key_from_config(cfg: &dedup_config::RuleAttributeConfig) -> Result<AttributeKey> {
	let treatment = cfg.treatment.as_deref().map(TreatmentType::parse).transpose()?;

	Ok(AttributeKey { name: cfg.key.clone(), treatment })
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;
	use crate::StaticCatalog;

	fn rule(checked: &[&str], nb_filled: usize) -> DuplicateRule {
		DuplicateRule {
			code: "R".to_string(),
			priority: 0,
			checked_attributes: checked.iter().map(|key| AttributeKey::new(*key)).collect(),
			nb_filled_attributes: nb_filled,
			nb_equal_attributes: 0,
			nb_missing_attributes: 0,
			connected: false,
			treatment_groups: Vec::new(),
		}
	}

	fn observation(keys: &[&str]) -> Observation {
		let values: HashMap<String, String> =
			keys.iter().map(|key| (key.to_string(), "value".to_string())).collect();

		Observation::from_values(&values, &StaticCatalog::default())
	}

	#[test]
	fn applies_when_enough_checked_attributes_are_present() {
		let observation = observation(&["firstName", "familyName", "email"]);

		assert!(can_apply(&rule(&["firstName", "familyName", "birthDate"], 2), &observation));
		assert!(!can_apply(&rule(&["firstName", "birthDate"], 2), &observation));
	}

	#[test]
	fn empty_checked_set_never_applies() {
		let observation = observation(&["firstName"]);

		assert!(!can_apply(&rule(&[], 0), &observation));
	}

	#[test]
	fn from_config_rejects_invalid_counts() {
		let cfg = dedup_config::RuleConfig {
			code: "BAD".to_string(),
			priority: 1,
			nb_filled_attributes: 1,
			nb_equal_attributes: 2,
			nb_missing_attributes: 0,
			connected: false,
			checked_attributes: vec![
				dedup_config::RuleAttributeConfig { key: "a".to_string(), treatment: None },
				dedup_config::RuleAttributeConfig { key: "b".to_string(), treatment: None },
			],
			treatment_groups: Vec::new(),
		};
		let err = DuplicateRule::from_config(&cfg).expect_err("nb_equal > nb_filled must fail");

		assert!(matches!(err, Error::InvalidRule { ref code, .. } if code == "BAD"));
	}
}
