use std::fmt::{Display, Formatter};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchMode {
	Exact,
	Fuzzy { fuzziness: u8 },
	Phrase,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Clause {
	ExactMatch { field: String, value: String },
	FuzzyMatch { field: String, value: String, fuzziness: u8 },
	MultiFieldMatch { fields: Vec<String>, value: String, mode: MatchMode },
	PhraseMatch { field: String, value: String },
	NegatedMatch { clause: Box<Clause> },
	/// Ordered span of per-word fuzzy terms.
	ProximityMatch { field: String, terms: Vec<String>, slop: u32, fuzziness: u8 },
	/// Satisfied when at least one inner clause matches.
	AnyOf { clauses: Vec<Clause> },
	FieldAbsent { fields: Vec<String> },
	FieldPresent { field: String },
}
impl Clause {
	pub fn negated(clause: Clause) -> Self {
		Self::NegatedMatch { clause: Box::new(clause) }
	}

	/// Single-field or fan-out match depending on how many fields the attribute maps to.
	pub fn matching(fields: &[String], value: impl Into<String>, mode: MatchMode) -> Self {
		let value = value.into();

		match fields {
			[field] => match mode {
				MatchMode::Exact => Self::ExactMatch { field: field.clone(), value },
				MatchMode::Fuzzy { fuzziness } => {
					Self::FuzzyMatch { field: field.clone(), value, fuzziness }
				},
				MatchMode::Phrase => Self::PhraseMatch { field: field.clone(), value },
			},
			_ => Self::MultiFieldMatch { fields: fields.to_vec(), value, mode },
		}
	}
}

/// Provenance of a descriptor: the rule that produced it and its position in that rule's pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Marker {
	pub rule_code: String,
	pub variant: usize,
}
impl Display for Marker {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}#{}", self.rule_code, self.variant)
	}
}

/// Conjunction of `must` clauses. `should` clauses only influence scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryDescriptor {
	pub must: Vec<Clause>,
	pub should: Vec<Clause>,
	pub marker: Option<Marker>,
	/// Stored fields to return with each hit. Empty returns the whole document.
	pub source_fields: Vec<String>,
}
impl QueryDescriptor {
	pub fn new(must: Vec<Clause>) -> Self {
		Self { must, ..Self::default() }
	}

	pub fn with_should(mut self, should: Vec<Clause>) -> Self {
		self.should = should;

		self
	}

	pub fn with_marker(mut self, rule_code: impl Into<String>, variant: usize) -> Self {
		self.marker = Some(Marker { rule_code: rule_code.into(), variant });

		self
	}

	pub fn with_source_fields(mut self, fields: &[String]) -> Self {
		self.source_fields = fields.to_vec();

		self
	}

	pub fn marker_label(&self) -> Option<String> {
		self.marker.as_ref().map(Marker::to_string)
	}

	pub fn is_empty(&self) -> bool {
		self.must.is_empty() && self.should.is_empty()
	}
}
