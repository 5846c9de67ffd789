use std::collections::HashMap;

use dedup_domain::{
	AttributeKey, CatalogEntry, Clause, DuplicateRule, FieldKind, MatchMode, Observation,
	QueryRequest, RequestContext, RequestGenerator, StaticCatalog, SynthesisOptions,
	TreatmentGroup, TreatmentType,
};

fn catalog() -> StaticCatalog {
	StaticCatalog::default()
		.with_entry(
			"familyName",
			CatalogEntry::new(["familyName"], FieldKind::FamilyName, TreatmentType::Strict),
		)
		.with_entry(
			"firstName",
			CatalogEntry::new(["firstName"], FieldKind::FirstName, TreatmentType::Approximated),
		)
		.with_entry(
			"email",
			CatalogEntry::new(["email"], FieldKind::Plain, TreatmentType::Strict),
		)
}

fn observation(pairs: &[(&str, &str)]) -> Observation {
	let values: HashMap<String, String> =
		pairs.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect();

	Observation::from_values(&values, &catalog())
}

fn rule(code: &str, checked: &[&str], filled: usize, equal: usize, missing: usize) -> DuplicateRule {
	DuplicateRule {
		code: code.to_string(),
		priority: 1,
		checked_attributes: checked.iter().map(|key| AttributeKey::new(*key)).collect(),
		nb_filled_attributes: filled,
		nb_equal_attributes: equal,
		nb_missing_attributes: missing,
		connected: false,
		treatment_groups: Vec::new(),
	}
}

fn absent_fields(clauses: &[Clause]) -> Vec<String> {
	clauses
		.iter()
		.filter_map(|clause| match clause {
			Clause::FieldAbsent { fields } => Some(fields.join(",")),
			_ => None,
		})
		.collect()
}

#[test]
fn names_rule_yields_one_descriptor() {
	let catalog = catalog();
	let options = SynthesisOptions::default();
	let generator = RequestGenerator::new(&catalog, &options);
	let rule = rule("R1", &["firstName", "familyName"], 2, 2, 0);
	let observation = observation(&[("firstName", "John"), ("familyName", "Doe")]);
	let descriptors = generator
		.generate(&rule, &observation, &RequestContext::default())
		.expect("generation must succeed");

	assert_eq!(descriptors.len(), 1);
	assert_eq!(
		descriptors[0].must,
		vec![
			Clause::FuzzyMatch {
				field: "firstName".to_string(),
				value: "john".to_string(),
				fuzziness: 1,
			},
			Clause::PhraseMatch { field: "familyName".to_string(), value: "Doe".to_string() },
		]
	);
	assert_eq!(descriptors[0].marker_label().as_deref(), Some("R1#0"));
}

#[test]
fn missing_combinations_mark_exactly_one_attribute_absent() {
	let catalog = catalog();
	let options = SynthesisOptions::default();
	let generator = RequestGenerator::new(&catalog, &options);
	let rule = rule("R2", &["a", "b", "c"], 3, 2, 1);
	let observation = observation(&[("a", "1"), ("b", "2"), ("c", "3")]);
	let descriptors = generator
		.generate(&rule, &observation, &RequestContext::default())
		.expect("generation must succeed");

	assert_eq!(descriptors.len(), 3);

	let absent: Vec<Vec<String>> =
		descriptors.iter().map(|descriptor| absent_fields(&descriptor.must)).collect();

	assert_eq!(absent, vec![vec!["c".to_string()], vec!["b".to_string()], vec!["a".to_string()]]);

	for (variant, descriptor) in descriptors.iter().enumerate() {
		assert_eq!(descriptor.must.len(), 3);
		assert_eq!(descriptor.marker_label(), Some(format!("R2#{variant}")));
	}
}

#[test]
fn inapplicable_rule_yields_nothing() {
	let catalog = catalog();
	let options = SynthesisOptions::default();
	let generator = RequestGenerator::new(&catalog, &options);
	let rule = rule("R3", &["firstName", "familyName", "email"], 3, 2, 0);
	let observation = observation(&[("firstName", "John"), ("familyName", "Doe")]);
	let descriptors = generator
		.generate(&rule, &observation, &RequestContext::default())
		.expect("generation must succeed");

	assert!(descriptors.is_empty());
}

#[test]
fn absent_treatment_never_reads_the_value() {
	let catalog = catalog();
	let options = SynthesisOptions::default();
	let generator = RequestGenerator::new(&catalog, &options);
	let mut rule = rule("R4", &["email"], 1, 1, 0);

	rule.checked_attributes[0].treatment = Some(TreatmentType::Absent);

	let observation = observation(&[("email", "john@example.org")]);
	let descriptors = generator
		.generate(&rule, &observation, &RequestContext::default())
		.expect("generation must succeed");

	assert_eq!(descriptors.len(), 1);
	assert_eq!(descriptors[0].must, vec![Clause::FieldAbsent { fields: vec!["email".to_string()] }]);
}

#[test]
fn treatment_groups_join_only_non_overlapping_equal_groups() {
	let catalog = catalog();
	let options = SynthesisOptions::default();
	let generator = RequestGenerator::new(&catalog, &options);
	let mut rule = rule("R5", &["firstName", "familyName", "email"], 2, 1, 0);

	rule.treatment_groups = vec![TreatmentGroup {
		name: "different_email".to_string(),
		attributes: vec![AttributeKey::with_treatment("email", TreatmentType::Different)],
	}];

	let observation =
		observation(&[("firstName", "John"), ("familyName", "Doe"), ("email", "j@d.org")]);
	let descriptors = generator
		.generate(&rule, &observation, &RequestContext::default())
		.expect("generation must succeed");

	// Equal groups {firstName}, {familyName}, {email}; the last overlaps the group.
	assert_eq!(descriptors.len(), 2);

	let negated = Clause::negated(Clause::ExactMatch {
		field: "email".to_string(),
		value: "j@d.org".to_string(),
	});

	for descriptor in &descriptors {
		assert_eq!(descriptor.must.len(), 2);
		assert_eq!(descriptor.must[1], negated);
	}
}

#[test]
fn absent_group_members_need_no_observed_value() {
	let catalog = catalog();
	let options = SynthesisOptions::default();
	let generator = RequestGenerator::new(&catalog, &options);
	let mut rule = rule("R6", &["firstName", "familyName"], 2, 2, 0);

	rule.treatment_groups = vec![
		TreatmentGroup {
			name: "no_email".to_string(),
			attributes: vec![AttributeKey::with_treatment("email", TreatmentType::Absent)],
		},
		TreatmentGroup {
			name: "other_email".to_string(),
			attributes: vec![AttributeKey::with_treatment("email", TreatmentType::Different)],
		},
	];

	let observation = observation(&[("firstName", "John"), ("familyName", "Doe")]);
	let descriptors = generator
		.generate(&rule, &observation, &RequestContext::default())
		.expect("generation must succeed");

	assert_eq!(descriptors.len(), 1);
	assert_eq!(absent_fields(&descriptors[0].must), vec!["email".to_string()]);
}

#[test]
fn connected_and_projection_pass_through() {
	let catalog = catalog();
	let options = SynthesisOptions::default();
	let generator = RequestGenerator::new(&catalog, &options);
	let mut rule = rule("R7", &["firstName", "familyName"], 2, 2, 0);

	rule.connected = true;

	let observation = observation(&[("firstName", "John"), ("familyName", "Doe")]);
	let context = RequestContext {
		connected: false,
		source_fields: vec!["firstName".to_string(), "familyName".to_string()],
	};
	let descriptors =
		generator.generate(&rule, &observation, &context).expect("generation must succeed");

	assert_eq!(descriptors[0].must.len(), 4);
	assert_eq!(descriptors[0].source_fields, context.source_fields);
}

#[test]
fn request_variants_build_their_own_shapes() {
	let catalog = catalog();
	let options = SynthesisOptions::default();
	let generator = RequestGenerator::new(&catalog, &options);
	let observation = observation(&[("firstName", "Jean Paul"), ("email", "j@p.org")]);
	let context = RequestContext::default();
	let basic = QueryRequest::Basic { observation: &observation }
		.build_query(&generator, &context)
		.expect("basic must build");
	let near = QueryRequest::Near { observation: &observation }
		.build_query(&generator, &context)
		.expect("near must build");
	let by_key = QueryRequest::ByIdentityKey { identity_key: "ID-1" }
		.build_query(&generator, &context)
		.expect("by-key must build");

	assert_eq!(basic.len(), 1);
	assert_eq!(basic[0].must.len(), 2);
	assert!(basic[0].should.is_empty());
	assert!(basic[0].marker.is_none());

	assert_eq!(near[0].must.len(), 1);
	assert!(matches!(near[0].must[0], Clause::ProximityMatch { slop: 1, .. }));
	assert_eq!(near[0].should.len(), 1);

	assert_eq!(
		by_key[0].must,
		vec![Clause::ExactMatch { field: "identity_key".to_string(), value: "ID-1".to_string() }]
	);
}

#[test]
fn complex_variant_matches_the_generator() {
	let catalog = catalog();
	let options = SynthesisOptions::default();
	let generator = RequestGenerator::new(&catalog, &options);
	let rule = rule("R8", &["firstName", "familyName"], 2, 1, 1);
	let observation = observation(&[("firstName", "John"), ("familyName", "Doe")]);
	let context = RequestContext::default();
	let via_request = QueryRequest::Complex { rule: &rule, observation: &observation }
		.build_query(&generator, &context)
		.expect("complex must build");
	let direct = generator.generate(&rule, &observation, &context).expect("generation must succeed");

	assert_eq!(via_request, direct);
	assert_eq!(direct.len(), 2);
	assert!(direct.iter().all(|descriptor| descriptor.must.len() == 2));
}

#[test]
fn fan_out_attributes_use_multi_field_clauses() {
	let catalog = catalog().with_entry(
		"anyName",
		CatalogEntry::new(["familyName", "usageName"], FieldKind::Plain, TreatmentType::Strict),
	);
	let options = SynthesisOptions::default();
	let generator = RequestGenerator::new(&catalog, &options);
	let rule = rule("R9", &["anyName"], 1, 1, 0);
	let values: HashMap<String, String> =
		[("anyName".to_string(), "Doe".to_string())].into_iter().collect();
	let observation = Observation::from_values(&values, &catalog);
	let descriptors = generator
		.generate(&rule, &observation, &RequestContext::default())
		.expect("generation must succeed");

	assert_eq!(
		descriptors[0].must,
		vec![Clause::MultiFieldMatch {
			fields: vec!["familyName".to_string(), "usageName".to_string()],
			value: "Doe".to_string(),
			mode: MatchMode::Exact,
		}]
	);
}
