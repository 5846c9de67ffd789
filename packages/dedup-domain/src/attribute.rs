use std::{
	collections::HashMap,
	fmt::{Display, Formatter},
};

use serde::{Deserialize, Serialize};

use crate::{AttributeCatalog, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TreatmentType {
	Strict,
	Approximated,
	Different,
	Absent,
}
impl TreatmentType {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Strict => "strict",
			Self::Approximated => "approximated",
			Self::Different => "different",
			Self::Absent => "absent",
		}
	}

	pub fn parse(raw: &str) -> Result<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"strict" => Ok(Self::Strict),
			"approximated" => Ok(Self::Approximated),
			"different" => Ok(Self::Different),
			"absent" => Ok(Self::Absent),
			_ => Err(Error::InvalidTreatment { value: raw.to_string() }),
		}
	}
}
impl Display for TreatmentType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Selects the dedicated clause builder for an attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FieldKind {
	#[default]
	Plain,
	FamilyName,
	FirstName,
}
impl FieldKind {
	pub fn parse(raw: &str) -> Result<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"plain" => Ok(Self::Plain),
			"family_name" => Ok(Self::FamilyName),
			"first_name" => Ok(Self::FirstName),
			_ => Err(Error::InvalidFieldKind { value: raw.to_string() }),
		}
	}

	pub fn is_name(self) -> bool {
		matches!(self, Self::FamilyName | Self::FirstName)
	}
}

/// An attribute referenced by a rule. Without an explicit treatment the observation's default
/// applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeKey {
	pub name: String,
	pub treatment: Option<TreatmentType>,
}
impl AttributeKey {
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into(), treatment: None }
	}

	pub fn with_treatment(name: impl Into<String>, treatment: TreatmentType) -> Self {
		Self { name: name.into(), treatment: Some(treatment) }
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeObservation {
	key: String,
	value: String,
	treatment: TreatmentType,
	output_keys: Vec<String>,
	kind: FieldKind,
}
impl AttributeObservation {
	pub fn resolve(
		key: impl Into<String>,
		value: impl Into<String>,
		catalog: &dyn AttributeCatalog,
	) -> Self {
		let key = key.into();
		let treatment = catalog.default_treatment(&key);
		let output_keys = catalog.resolve_output_keys(&key);
		let kind = catalog.field_kind(&key);

		Self { key, value: value.into(), treatment, output_keys, kind }
	}

	/// A valueless attribute, used when only the field's absence is asserted.
	pub fn unobserved(key: impl Into<String>, catalog: &dyn AttributeCatalog) -> Self {
		Self::resolve(key, String::new(), catalog)
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	pub fn value(&self) -> &str {
		&self.value
	}

	pub fn treatment(&self) -> TreatmentType {
		self.treatment
	}

	pub fn output_keys(&self) -> &[String] {
		&self.output_keys
	}

	pub fn kind(&self) -> FieldKind {
		self.kind
	}
}

/// The attribute values submitted for one identity, resolved against the catalog once.
#[derive(Debug, Clone, Default)]
pub struct Observation {
	attributes: Vec<AttributeObservation>,
	index: HashMap<String, usize>,
}
impl Observation {
	/// Blank values are treated as not supplied.
	pub fn from_values<'a, I>(values: I, catalog: &dyn AttributeCatalog) -> Self
	where
		I: IntoIterator<Item = (&'a String, &'a String)>,
	{
		let mut pairs: Vec<(&String, &String)> =
			values.into_iter().filter(|(_, value)| !value.trim().is_empty()).collect();

		pairs.sort_by(|left, right| left.0.cmp(right.0));

		let mut observation = Self::default();

		for (key, value) in pairs {
			observation.push(AttributeObservation::resolve(key.as_str(), value.as_str(), catalog));
		}

		observation
	}

	pub fn push(&mut self, attribute: AttributeObservation) {
		match self.index.get(attribute.key()) {
			Some(&position) => self.attributes[position] = attribute,
			None => {
				self.index.insert(attribute.key().to_string(), self.attributes.len());
				self.attributes.push(attribute);
			},
		}
	}

	pub fn get(&self, key: &str) -> Option<&AttributeObservation> {
		self.index.get(key).map(|&position| &self.attributes[position])
	}

	pub fn contains(&self, key: &str) -> bool {
		self.index.contains_key(key)
	}

	pub fn iter(&self) -> impl Iterator<Item = &AttributeObservation> {
		self.attributes.iter()
	}

	pub fn len(&self) -> usize {
		self.attributes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.attributes.is_empty()
	}
}
