use serde_json::Value;

use dedup_domain::{ScoredHit, SearchResponse};

use crate::{Error, Result};

/// Splits an `_msearch` reply into one response per descriptor, in request order.
pub fn parse_msearch_response(
	json: Value,
	expected: usize,
	identity_key_field: &str,
) -> Result<Vec<SearchResponse>> {
	let responses = json.get("responses").and_then(Value::as_array).ok_or_else(|| {
		Error::InvalidResponse { message: "Search response is missing responses array.".to_string() }
	})?;

	if responses.len() != expected {
		return Err(Error::InvalidResponse {
			message: format!(
				"Search response has {} entries for {expected} queries.",
				responses.len()
			),
		});
	}

	responses
		.iter()
		.enumerate()
		.map(|(position, item)| parse_single_response(position, item, identity_key_field))
		.collect()
}

fn parse_single_response(
	position: usize,
	item: &Value,
	identity_key_field: &str,
) -> Result<SearchResponse> {
	if let Some(error) = item.get("error") {
		let reason = error
			.get("reason")
			.and_then(Value::as_str)
			.map(str::to_string)
			.unwrap_or_else(|| error.to_string());

		return Err(Error::InvalidResponse { message: format!("Query {position} failed: {reason}") });
	}

	let hits = item.get("hits").ok_or_else(|| Error::InvalidResponse {
		message: format!("Query {position} response is missing hits."),
	})?;
	let total = hits
		.get("total")
		.and_then(|total| total.get("value").and_then(Value::as_u64).or_else(|| total.as_u64()))
		.ok_or_else(|| Error::InvalidResponse {
			message: format!("Query {position} response is missing hits.total."),
		})?;
	let max_score = hits.get("max_score").and_then(Value::as_f64);
	let raw_hits = hits.get("hits").and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[]);
	let mut parsed = Vec::with_capacity(raw_hits.len());

	for raw in raw_hits {
		let document = raw.get("_source").cloned().unwrap_or(Value::Null);
		let identity_key = document
			.get(identity_key_field)
			.and_then(Value::as_str)
			.or_else(|| raw.get("_id").and_then(Value::as_str));
		let Some(identity_key) = identity_key else {
			tracing::warn!(query = position, "Search hit has no identity key.");

			continue;
		};
		let score = raw.get("_score").and_then(Value::as_f64).unwrap_or(0.0);

		parsed.push(ScoredHit::new(identity_key.to_string(), score, document));
	}

	Ok(SearchResponse { total, max_score, hits: parsed })
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_responses_in_request_order() {
		let json = serde_json::json!({
			"responses": [
				{
					"hits": {
						"total": { "value": 12, "relation": "eq" },
						"max_score": 4.5,
						"hits": [
							{ "_id": "doc-1", "_score": 4.5, "_source": { "identity_key": "ID-1" } },
							{ "_id": "ID-2", "_score": 2.0, "_source": {} }
						]
					}
				},
				{ "hits": { "total": 0, "max_score": null, "hits": [] } }
			]
		});
		let parsed = parse_msearch_response(json, 2, "identity_key").expect("parse failed");

		assert_eq!(parsed.len(), 2);
		assert_eq!(parsed[0].total, 12);
		assert_eq!(parsed[0].max_score, Some(4.5));
		assert_eq!(parsed[0].hits[0].identity_key, "ID-1");
		assert_eq!(parsed[0].hits[1].identity_key, "ID-2");
		assert_eq!(parsed[1].total, 0);
		assert_eq!(parsed[1].max_score, None);
		assert!(parsed[1].hits.is_empty());
	}

	#[test]
	fn per_query_error_fails_the_batch() {
		let json = serde_json::json!({
			"responses": [
				{ "hits": { "total": 0, "hits": [] } },
				{ "error": { "type": "query_shard_exception", "reason": "bad span" }, "status": 400 }
			]
		});
		let err = parse_msearch_response(json, 2, "identity_key").expect_err("expected failure");

		assert!(err.to_string().contains("Query 1 failed: bad span"), "{err}");
	}

	#[test]
	fn response_count_must_match_queries() {
		let json = serde_json::json!({ "responses": [] });

		assert!(parse_msearch_response(json, 1, "identity_key").is_err());
	}
}
