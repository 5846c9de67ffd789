use crate::{
	AttributeObservation, Clause, FieldKind, MatchMode, QueryDescriptor, TreatmentType, normalize,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisOptions {
	pub fuzziness: u8,
	pub identity_key_field: String,
	pub connection_id_field: String,
	pub login_field: String,
}
impl SynthesisOptions {
	pub fn from_config(matching: &dedup_config::Matching) -> Self {
		Self {
			fuzziness: matching.fuzziness,
			identity_key_field: matching.identity_key_field.clone(),
			connection_id_field: matching.connection_id_field.clone(),
			login_field: matching.login_field.clone(),
		}
	}
}
impl Default for SynthesisOptions {
	fn default() -> Self {
		Self::from_config(&dedup_config::Matching::default())
	}
}

/// An observed attribute paired with the treatment it receives in one descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingAttribute {
	pub attribute: AttributeObservation,
	pub treatment: TreatmentType,
}
impl WorkingAttribute {
	pub fn new(attribute: AttributeObservation, treatment: TreatmentType) -> Self {
		Self { attribute, treatment }
	}

	pub fn key(&self) -> &str {
		self.attribute.key()
	}
}

pub struct QuerySynthesizer<'a> {
	options: &'a SynthesisOptions,
}
impl<'a> QuerySynthesizer<'a> {
	pub fn new(options: &'a SynthesisOptions) -> Self {
		Self { options }
	}

	/// AND of one clause per working attribute, plus presence checks when `connected`.
	pub fn synthesize(&self, working: &[WorkingAttribute], connected: bool) -> QueryDescriptor {
		let mut must: Vec<Clause> = working.iter().map(|item| self.attribute_clause(item)).collect();

		if connected {
			must.extend(self.connected_clauses());
		}

		QueryDescriptor::new(must)
	}

	/// Names become required proximity or fuzzy clauses; other attributes only add score.
	pub fn synthesize_near(&self, working: &[WorkingAttribute], connected: bool) -> QueryDescriptor {
		let mut must = Vec::new();
		let mut should = Vec::new();

		for item in working {
			let attribute = &item.attribute;

			match (item.treatment, attribute.kind()) {
				(TreatmentType::Absent, _) => must.push(self.attribute_clause(item)),
				(_, FieldKind::FirstName) => must.push(self.approximate_first_name(attribute)),
				(_, FieldKind::FamilyName) => must.push(Clause::matching(
					attribute.output_keys(),
					normalize::family_name(attribute.value()),
					self.fuzzy(),
				)),
				(_, FieldKind::Plain) => should.push(Clause::matching(
					attribute.output_keys(),
					attribute.value(),
					MatchMode::Exact,
				)),
			}
		}

		if connected {
			must.extend(self.connected_clauses());
		}

		QueryDescriptor::new(must).with_should(should)
	}

	pub fn identity_key(&self, identity_key: &str) -> QueryDescriptor {
		QueryDescriptor::new(vec![Clause::ExactMatch {
			field: self.options.identity_key_field.clone(),
			value: identity_key.to_string(),
		}])
	}

	pub fn attribute_clause(&self, item: &WorkingAttribute) -> Clause {
		let attribute = &item.attribute;
		let fields = attribute.output_keys();

		if item.treatment == TreatmentType::Absent {
			return Clause::FieldAbsent { fields: fields.to_vec() };
		}

		match attribute.kind() {
			FieldKind::Plain => self.plain_clause(attribute, item.treatment),
			FieldKind::FamilyName => self.family_name_clause(attribute, item.treatment),
			FieldKind::FirstName => self.first_name_clause(attribute, item.treatment),
		}
	}

	fn plain_clause(&self, attribute: &AttributeObservation, treatment: TreatmentType) -> Clause {
		let fields = attribute.output_keys();

		match treatment {
			TreatmentType::Approximated => Clause::matching(fields, attribute.value(), self.fuzzy()),
			TreatmentType::Different => {
				Clause::negated(Clause::matching(fields, attribute.value(), MatchMode::Exact))
			},
			_ => Clause::matching(fields, attribute.value(), MatchMode::Exact),
		}
	}

	fn family_name_clause(
		&self,
		attribute: &AttributeObservation,
		treatment: TreatmentType,
	) -> Clause {
		let fields = attribute.output_keys();

		match treatment {
			TreatmentType::Approximated => {
				Clause::matching(fields, normalize::family_name(attribute.value()), self.fuzzy())
			},
			TreatmentType::Different => {
				Clause::negated(Clause::matching(fields, attribute.value(), MatchMode::Phrase))
			},
			_ => Clause::matching(fields, attribute.value(), MatchMode::Phrase),
		}
	}

	fn first_name_clause(&self, attribute: &AttributeObservation, treatment: TreatmentType) -> Clause {
		let fields = attribute.output_keys();
		let value = normalize::first_name(attribute.value());

		match treatment {
			TreatmentType::Approximated => self.approximate_first_name(attribute),
			TreatmentType::Different => {
				Clause::negated(Clause::matching(fields, value, MatchMode::Phrase))
			},
			_ => Clause::matching(fields, value, MatchMode::Phrase),
		}
	}

	/// Multi-word names keep word order through a proximity span on every output field.
	fn approximate_first_name(&self, attribute: &AttributeObservation) -> Clause {
		let value = normalize::first_name(attribute.value());
		let terms = normalize::words(&value);
		let fields = attribute.output_keys();

		if terms.len() < 2 {
			return Clause::matching(fields, value, self.fuzzy());
		}

		let slop = (terms.len() - 1) as u32;
		let mut spans: Vec<Clause> = fields
			.iter()
			.map(|field| Clause::ProximityMatch {
				field: field.clone(),
				terms: terms.clone(),
				slop,
				fuzziness: self.options.fuzziness,
			})
			.collect();

		match spans.len() {
			1 => spans.remove(0),
			_ => Clause::AnyOf { clauses: spans },
		}
	}

	fn connected_clauses(&self) -> [Clause; 2] {
		[
			Clause::FieldPresent { field: self.options.connection_id_field.clone() },
			Clause::FieldPresent { field: self.options.login_field.clone() },
		]
	}

	fn fuzzy(&self) -> MatchMode {
		MatchMode::Fuzzy { fuzziness: self.options.fuzziness }
	}
}
