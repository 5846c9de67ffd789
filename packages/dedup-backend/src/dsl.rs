use serde_json::{Map, Value, json};

use dedup_domain::{Clause, MatchMode, QueryDescriptor};

/// The `bool` query for one descriptor. The marker, if any, becomes the query name.
pub fn render_query(descriptor: &QueryDescriptor) -> Value {
	let mut bool_query = Map::new();

	if !descriptor.must.is_empty() {
		bool_query.insert(
			"must".to_string(),
			Value::Array(descriptor.must.iter().map(render_clause).collect()),
		);
	}
	if !descriptor.should.is_empty() {
		bool_query.insert(
			"should".to_string(),
			Value::Array(descriptor.should.iter().map(render_clause).collect()),
		);
	}
	if let Some(label) = descriptor.marker_label() {
		bool_query.insert("_name".to_string(), Value::String(label));
	}

	json!({ "bool": bool_query })
}

/// Search body for one descriptor at a page window. A projection always keeps
/// `identity_key_field` so hits stay keyed by identity.
pub fn render_search(
	descriptor: &QueryDescriptor,
	from: u32,
	size: u32,
	identity_key_field: &str,
) -> Value {
	let source = if descriptor.source_fields.is_empty() {
		Value::Bool(true)
	} else {
		let mut fields = descriptor.source_fields.clone();

		if !fields.iter().any(|field| field == identity_key_field) {
			fields.push(identity_key_field.to_string());
		}

		json!(fields)
	};

	json!({
		"query": render_query(descriptor),
		"from": from,
		"size": size,
		"track_total_hits": true,
		"_source": source,
	})
}

/// Newline-delimited `_msearch` body: one header line and one search line per descriptor.
pub fn render_msearch(
	index: &str,
	descriptors: &[QueryDescriptor],
	from: u32,
	size: u32,
	identity_key_field: &str,
) -> serde_json::Result<String> {
	let header = serde_json::to_string(&json!({ "index": index }))?;
	let mut body = String::new();

	for descriptor in descriptors {
		let search = render_search(descriptor, from, size, identity_key_field);

		body.push_str(&header);
		body.push('\n');
		body.push_str(&serde_json::to_string(&search)?);
		body.push('\n');
	}

	Ok(body)
}

pub fn render_clause(clause: &Clause) -> Value {
	match clause {
		Clause::ExactMatch { field, value } => term(field, value),
		Clause::FuzzyMatch { field, value, fuzziness } => json!({
			"match": { field.as_str(): { "query": value, "fuzziness": fuzziness, "operator": "and" } }
		}),
		Clause::MultiFieldMatch { fields, value, mode } => match mode {
			MatchMode::Exact => json!({
				"bool": {
					"should": fields.iter().map(|field| term(field, value)).collect::<Vec<_>>(),
					"minimum_should_match": 1,
				}
			}),
			MatchMode::Fuzzy { fuzziness } => json!({
				"multi_match": {
					"query": value,
					"fields": fields,
					"type": "best_fields",
					"fuzziness": fuzziness,
					"operator": "and",
				}
			}),
			MatchMode::Phrase => json!({
				"multi_match": { "query": value, "fields": fields, "type": "phrase" }
			}),
		},
		Clause::PhraseMatch { field, value } => json!({ "match_phrase": { field.as_str(): value } }),
		Clause::NegatedMatch { clause } => json!({ "bool": { "must_not": [render_clause(clause)] } }),
		Clause::ProximityMatch { field, terms, slop, fuzziness } => {
			let clauses: Vec<Value> = terms
				.iter()
				.map(|term| {
					json!({
						"span_multi": {
							"match": {
								"fuzzy": { field.as_str(): { "value": term, "fuzziness": fuzziness } }
							}
						}
					})
				})
				.collect();

			json!({ "span_near": { "clauses": clauses, "slop": slop, "in_order": true } })
		},
		Clause::AnyOf { clauses } => json!({
			"bool": {
				"should": clauses.iter().map(render_clause).collect::<Vec<_>>(),
				"minimum_should_match": 1,
			}
		}),
		Clause::FieldAbsent { fields } => json!({
			"bool": { "must_not": fields.iter().map(|field| exists(field)).collect::<Vec<_>>() }
		}),
		Clause::FieldPresent { field } => exists(field),
	}
}

fn term(field: &str, value: &str) -> Value {
	json!({ "term": { field: { "value": value } } })
}

fn exists(field: &str) -> Value {
	json!({ "exists": { "field": field } })
}
