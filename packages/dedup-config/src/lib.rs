mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	AttributeConfig, Backend, Config, Matching, RuleAttributeConfig, RuleConfig, Service,
	TreatmentGroupConfig,
};

use std::{collections::HashSet, fs, path::Path};

pub const TREATMENTS: [&str; 4] = ["strict", "approximated", "different", "absent"];
pub const FIELD_KINDS: [&str; 3] = ["plain", "family_name", "first_name"];

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	validate_backend(&cfg.backend)?;
	validate_matching(&cfg.matching)?;

	let mut attribute_keys = HashSet::new();

	for attribute in &cfg.attributes {
		if attribute.key.trim().is_empty() {
			return Err(Error::Validation {
				message: "attributes.key must be non-empty.".to_string(),
			});
		}
		if !attribute_keys.insert(attribute.key.as_str()) {
			return Err(Error::DuplicateKey { section: "attributes", key: attribute.key.clone() });
		}
		if attribute.output_keys.is_empty()
			|| attribute.output_keys.iter().any(|key| key.trim().is_empty())
		{
			return Err(Error::Validation {
				message: format!(
					"attributes.{}.output_keys must list at least one non-empty field.",
					attribute.key
				),
			});
		}
		if !is_one_of(&attribute.kind, &FIELD_KINDS) {
			return Err(Error::Validation {
				message: format!(
					"attributes.{}.kind must be one of plain, family_name, or first_name.",
					attribute.key
				),
			});
		}

		validate_treatment(
			&format!("attributes.{}.default_treatment", attribute.key),
			&attribute.default_treatment,
		)?;
	}

	let mut rule_codes = HashSet::new();

	for rule in &cfg.rules {
		if rule.code.trim().is_empty() {
			return Err(Error::Validation { message: "rules.code must be non-empty.".to_string() });
		}
		if !rule_codes.insert(rule.code.as_str()) {
			return Err(Error::DuplicateKey { section: "rules", key: rule.code.clone() });
		}

		validate_rule(rule)?;
	}

	Ok(())
}

pub fn validate_rule(rule: &RuleConfig) -> Result<()> {
	let code = rule.code.as_str();
	let mut checked = HashSet::new();

	for attribute in &rule.checked_attributes {
		if !checked.insert(attribute.key.as_str()) {
			return Err(Error::Validation {
				message: format!(
					"rules.{code}.checked_attributes lists '{}' more than once.",
					attribute.key
				),
			});
		}

		validate_rule_attribute(&format!("rules.{code}.checked_attributes"), attribute)?;
	}

	if rule.nb_filled_attributes as usize > checked.len() {
		return Err(Error::Validation {
			message: format!(
				"rules.{code}.nb_filled_attributes must not exceed the number of checked attributes."
			),
		});
	}
	if rule.nb_equal_attributes > rule.nb_filled_attributes {
		return Err(Error::Validation {
			message: format!(
				"rules.{code}.nb_equal_attributes must not exceed nb_filled_attributes."
			),
		});
	}

	for group in &rule.treatment_groups {
		if group.name.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("rules.{code}.treatment_groups.name must be non-empty."),
			});
		}
		if group.attributes.is_empty() {
			return Err(Error::Validation {
				message: format!(
					"rules.{code}.treatment_groups.{}.attributes must be non-empty.",
					group.name
				),
			});
		}

		for attribute in &group.attributes {
			validate_rule_attribute(
				&format!("rules.{code}.treatment_groups.{}", group.name),
				attribute,
			)?;
		}
	}

	Ok(())
}

fn validate_backend(backend: &Backend) -> Result<()> {
	for (label, value) in [("backend.url", &backend.url), ("backend.index", &backend.index)] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if backend.connect_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "backend.connect_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if backend.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "backend.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if backend.default_headers.values().any(|value| !value.is_string()) {
		return Err(Error::Validation {
			message: "backend.default_headers values must be strings.".to_string(),
		});
	}

	Ok(())
}

fn validate_matching(matching: &Matching) -> Result<()> {
	if matching.page_size == 0 {
		return Err(Error::Validation {
			message: "matching.page_size must be greater than zero.".to_string(),
		});
	}
	if matching.max_parallel_rules == 0 {
		return Err(Error::Validation {
			message: "matching.max_parallel_rules must be greater than zero.".to_string(),
		});
	}
	if !is_one_of(&matching.failure_mode, &["strict", "lenient"]) {
		return Err(Error::Validation {
			message: "matching.failure_mode must be one of strict or lenient.".to_string(),
		});
	}

	for (label, value) in [
		("matching.identity_key_field", &matching.identity_key_field),
		("matching.connection_id_field", &matching.connection_id_field),
		("matching.login_field", &matching.login_field),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	Ok(())
}

fn validate_rule_attribute(path: &str, attribute: &RuleAttributeConfig) -> Result<()> {
	if attribute.key.trim().is_empty() {
		return Err(Error::Validation { message: format!("{path}.key must be non-empty.") });
	}
	if let Some(treatment) = attribute.treatment.as_deref() {
		validate_treatment(&format!("{path}.{}.treatment", attribute.key), treatment)?;
	}

	Ok(())
}

fn validate_treatment(path: &str, treatment: &str) -> Result<()> {
	if is_one_of(treatment, &TREATMENTS) {
		return Ok(());
	}

	Err(Error::Validation {
		message: format!("{path} must be one of strict, approximated, different, or absent."),
	})
}

/// Case-insensitive, like the domain parsers, so configs that skipped `load` still validate.
fn is_one_of(value: &str, allowed: &[&str]) -> bool {
	let value = value.trim();

	allowed.iter().any(|candidate| candidate.eq_ignore_ascii_case(value))
}

fn normalize(cfg: &mut Config) {
	if cfg.backend.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
		cfg.backend.api_key = None;
	}

	cfg.matching.failure_mode = cfg.matching.failure_mode.trim().to_ascii_lowercase();

	for attribute in &mut cfg.attributes {
		attribute.kind = attribute.kind.trim().to_ascii_lowercase();
		attribute.default_treatment = attribute.default_treatment.trim().to_ascii_lowercase();
	}
	for rule in &mut cfg.rules {
		let groups = rule.treatment_groups.iter_mut().flat_map(|group| group.attributes.iter_mut());

		for attribute in rule.checked_attributes.iter_mut().chain(groups) {
			if let Some(treatment) = attribute.treatment.as_mut() {
				*treatment = treatment.trim().to_ascii_lowercase();
			}
		}
	}
}
