use std::collections::HashSet;

use crate::{
	AttributeCatalog, AttributeKey, AttributeObservation, DuplicateRule, Observation,
	QueryDescriptor, QuerySynthesizer, Result, SynthesisOptions, TreatmentGroup, TreatmentType,
	WorkingAttribute, combinations,
};

/// Settings shared by every descriptor of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
	/// Requires a connection identifier and a login on candidates. ORed with a rule's own flag.
	pub connected: bool,
	pub source_fields: Vec<String>,
}

/// The request shapes understood by the engine.
#[derive(Debug, Clone, Copy)]
pub enum QueryRequest<'a> {
	/// Every supplied attribute with its default treatment, as a single descriptor.
	Basic { observation: &'a Observation },
	/// The rule-driven combinatorial expansion.
	Complex { rule: &'a DuplicateRule, observation: &'a Observation },
	/// Proximity search on names; other attributes only add score.
	Near { observation: &'a Observation },
	ByIdentityKey { identity_key: &'a str },
}
impl QueryRequest<'_> {
	pub fn build_query(
		&self,
		generator: &RequestGenerator<'_>,
		context: &RequestContext,
	) -> Result<Vec<QueryDescriptor>> {
		let synthesizer = QuerySynthesizer::new(generator.options);
		let descriptors = match *self {
			Self::Basic { observation } => {
				let working = default_working_set(observation);

				if working.is_empty() {
					return Ok(Vec::new());
				}

				vec![synthesizer.synthesize(&working, context.connected)]
			},
			Self::Complex { rule, observation } => {
				return generator.generate(rule, observation, context);
			},
			Self::Near { observation } => {
				let working = default_working_set(observation);

				if working.is_empty() {
					return Ok(Vec::new());
				}

				vec![synthesizer.synthesize_near(&working, context.connected)]
			},
			Self::ByIdentityKey { identity_key } => vec![synthesizer.identity_key(identity_key)],
		};

		Ok(descriptors
			.into_iter()
			.map(|descriptor| descriptor.with_source_fields(&context.source_fields))
			.collect())
	}
}

pub struct RequestGenerator<'a> {
	catalog: &'a dyn AttributeCatalog,
	options: &'a SynthesisOptions,
}
impl<'a> RequestGenerator<'a> {
	pub fn new(catalog: &'a dyn AttributeCatalog, options: &'a SynthesisOptions) -> Self {
		Self { catalog, options }
	}

	/// All descriptors for one rule applied to one observation, tagged `(rule code, variant)`.
	/// An inapplicable rule yields none.
	pub fn generate(
		&self,
		rule: &DuplicateRule,
		observation: &Observation,
		context: &RequestContext,
	) -> Result<Vec<QueryDescriptor>> {
		if !rule.can_apply(observation) {
			return Ok(Vec::new());
		}

		let synthesizer = QuerySynthesizer::new(self.options);
		let connected = rule.connected || context.connected;
		let present: Vec<WorkingAttribute> = rule
			.present_attributes(observation)
			.into_iter()
			.filter_map(|key| self.working_attribute(key, observation))
			.collect();
		let groups: Vec<(&TreatmentGroup, Vec<WorkingAttribute>)> = rule
			.treatment_groups
			.iter()
			.filter_map(|group| {
				self.resolve_group(&group.attributes, observation).map(|members| (group, members))
			})
			.collect();
		let mut descriptors = Vec::new();

		for equal in combinations(&present, rule.nb_equal_attributes)? {
			let working_sets: Vec<Vec<WorkingAttribute>> = if rule.treatment_groups.is_empty() {
				vec![equal]
			} else {
				groups
					.iter()
					.filter(|(group, _)| !group.overlaps(equal.iter().map(WorkingAttribute::key)))
					.map(|(_, members)| equal.iter().chain(members.iter()).cloned().collect())
					.collect()
			};

			for working in working_sets {
				for set in self.expand_missing(rule, &present, working)? {
					if set.is_empty() {
						continue;
					}

					let variant = descriptors.len();

					descriptors.push(
						synthesizer
							.synthesize(&set, connected)
							.with_marker(rule.code.clone(), variant)
							.with_source_fields(&context.source_fields),
					);
				}
			}
		}

		Ok(descriptors)
	}

	/// Adds every size-`nb_missing_attributes` selection of the remaining present attributes as
	/// ABSENT. Yields nothing when too few remain.
	fn expand_missing(
		&self,
		rule: &DuplicateRule,
		present: &[WorkingAttribute],
		working: Vec<WorkingAttribute>,
	) -> Result<Vec<Vec<WorkingAttribute>>> {
		if rule.nb_missing_attributes == 0 {
			return Ok(vec![working]);
		}

		let taken: HashSet<&str> = working.iter().map(WorkingAttribute::key).collect();
		let remaining: Vec<WorkingAttribute> = present
			.iter()
			.filter(|item| !taken.contains(item.key()))
			.map(|item| WorkingAttribute::new(item.attribute.clone(), TreatmentType::Absent))
			.collect();

		if remaining.len() < rule.nb_missing_attributes {
			return Ok(Vec::new());
		}

		Ok(combinations(&remaining, rule.nb_missing_attributes)?
			.into_iter()
			.map(|missing| working.iter().cloned().chain(missing).collect())
			.collect())
	}

	fn working_attribute(
		&self,
		key: &AttributeKey,
		observation: &Observation,
	) -> Option<WorkingAttribute> {
		let attribute = observation.get(&key.name)?;

		Some(WorkingAttribute::new(
			attribute.clone(),
			key.treatment.unwrap_or_else(|| attribute.treatment()),
		))
	}

	/// A group is usable when every member that compares values has one.
	fn resolve_group(
		&self,
		members: &[AttributeKey],
		observation: &Observation,
	) -> Option<Vec<WorkingAttribute>> {
		members
			.iter()
			.map(|key| match self.working_attribute(key, observation) {
				Some(item) => Some(item),
				None => {
					let attribute = AttributeObservation::unobserved(key.name.as_str(), self.catalog);
					let treatment = key.treatment.unwrap_or_else(|| attribute.treatment());

					(treatment == TreatmentType::Absent)
						.then(|| WorkingAttribute::new(attribute, treatment))
				},
			})
			.collect()
	}
}

fn default_working_set(observation: &Observation) -> Vec<WorkingAttribute> {
	observation
		.iter()
		.map(|attribute| WorkingAttribute::new(attribute.clone(), attribute.treatment()))
		.collect()
}
