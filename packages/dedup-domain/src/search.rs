use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredHit {
	pub identity_key: String,
	pub score: f64,
	pub document: Value,
	#[serde(default)]
	pub matched_markers: BTreeSet<String>,
	/// Set by the post-filter to the rule the hit was found for.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub rule_code: Option<String>,
}
impl ScoredHit {
	pub fn new(identity_key: impl Into<String>, score: f64, document: Value) -> Self {
		Self {
			identity_key: identity_key.into(),
			score,
			document,
			matched_markers: BTreeSet::new(),
			rule_code: None,
		}
	}

	/// Keeps the higher score (and its document) and unions the markers.
	pub fn absorb(&mut self, other: ScoredHit) {
		if other.score > self.score {
			self.score = other.score;
			self.document = other.document;
		}

		self.matched_markers.extend(other.matched_markers);
	}
}

/// One descriptor's page as returned by the search backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
	pub total: u64,
	pub max_score: Option<f64>,
	pub hits: Vec<ScoredHit>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
	pub hits: BTreeMap<String, ScoredHit>,
	pub max_score: f64,
	pub matched_markers: BTreeSet<String>,
}
impl ResultSet {
	pub fn len(&self) -> usize {
		self.hits.len()
	}

	pub fn is_empty(&self) -> bool {
		self.hits.is_empty()
	}

	pub fn contains(&self, identity_key: &str) -> bool {
		self.hits.contains_key(identity_key)
	}

	pub fn get(&self, identity_key: &str) -> Option<&ScoredHit> {
		self.hits.get(identity_key)
	}

	pub fn insert(&mut self, hit: ScoredHit) {
		match self.hits.get_mut(&hit.identity_key) {
			Some(existing) => existing.absorb(hit),
			None => {
				self.hits.insert(hit.identity_key.clone(), hit);
			},
		}
	}

	/// Hits by descending score, ties broken by identity key.
	pub fn ranked(&self) -> Vec<&ScoredHit> {
		let mut hits: Vec<&ScoredHit> = self.hits.values().collect();

		hits.sort_by(|left, right| {
			right
				.score
				.total_cmp(&left.score)
				.then_with(|| left.identity_key.cmp(&right.identity_key))
		});

		hits
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn hit(key: &str, score: f64, marker: &str) -> ScoredHit {
		let mut hit = ScoredHit::new(key, score, serde_json::json!({ "score": score }));

		hit.matched_markers.insert(marker.to_string());

		hit
	}

	#[test]
	fn insert_keeps_max_score_and_unions_markers() {
		let mut set = ResultSet::default();

		set.insert(hit("X", 1.5, "R#0"));
		set.insert(hit("X", 3.0, "R#1"));
		set.insert(hit("X", 2.0, "R#2"));

		let merged = set.get("X").expect("X must be present");

		assert_eq!(set.len(), 1);
		assert_eq!(merged.score, 3.0);
		assert_eq!(merged.document, serde_json::json!({ "score": 3.0 }));
		assert_eq!(merged.matched_markers.len(), 3);
	}

	#[test]
	fn ranked_orders_by_score_then_key() {
		let mut set = ResultSet::default();

		set.insert(hit("B", 1.0, "R#0"));
		set.insert(hit("A", 1.0, "R#0"));
		set.insert(hit("C", 4.0, "R#0"));

		let keys: Vec<&str> = set.ranked().iter().map(|hit| hit.identity_key.as_str()).collect();

		assert_eq!(keys, vec!["C", "A", "B"]);
	}
}
