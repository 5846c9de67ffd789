use std::{
	collections::{HashMap, HashSet},
	sync::Mutex,
};

use dedup_domain::{
	AttributeKey, BackendError, BoxFuture, CatalogEntry, DuplicateRule, FieldKind, IdentityState,
	QueryDescriptor, ScoredHit, SearchBackend, SearchResponse, StateError, StaticCatalog,
	TreatmentType,
};

/// One `execute_batch` invocation as seen by [`ScriptedBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCall {
	pub markers: Vec<Option<String>>,
	pub from: u32,
	pub size: u32,
}

/// Search backend serving fixed hit lists keyed by descriptor marker, paginated by `from/size`.
#[derive(Default)]
pub struct ScriptedBackend {
	by_marker: HashMap<String, Vec<(String, f64)>>,
	unmarked: Vec<(String, f64)>,
	fail_on_call: Option<usize>,
	drop_responses: bool,
	calls: Mutex<Vec<BatchCall>>,
}
impl ScriptedBackend {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn respond(mut self, marker: &str, hits: &[(&str, f64)]) -> Self {
		self.by_marker.insert(marker.to_string(), owned_hits(hits));

		self
	}

	pub fn respond_unmarked(mut self, hits: &[(&str, f64)]) -> Self {
		self.unmarked = owned_hits(hits);

		self
	}

	/// The zero-based call that fails with an unavailable error.
	pub fn fail_on_call(mut self, call: usize) -> Self {
		self.fail_on_call = Some(call);

		self
	}

	/// Answers every batch with no responses at all.
	pub fn drop_responses(mut self) -> Self {
		self.drop_responses = true;

		self
	}

	pub fn calls(&self) -> Vec<BatchCall> {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub fn call_count(&self) -> usize {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).len()
	}

	fn page(&self, descriptor: &QueryDescriptor, from: u32, size: u32) -> SearchResponse {
		let hits = descriptor
			.marker_label()
			.and_then(|label| self.by_marker.get(&label))
			.unwrap_or(&self.unmarked);
		let page: Vec<ScoredHit> = hits
			.iter()
			.skip(from as usize)
			.take(size as usize)
			.map(|(key, score)| {
				ScoredHit::new(key.clone(), *score, serde_json::json!({ "identity_key": key }))
			})
			.collect();
		let max_score = page.iter().map(|hit| hit.score).reduce(f64::max);

		SearchResponse { total: hits.len() as u64, max_score, hits: page }
	}
}
impl SearchBackend for ScriptedBackend {
	fn execute_batch<'a>(
		&'a self,
		descriptors: &'a [QueryDescriptor],
		from: u32,
		size: u32,
	) -> BoxFuture<'a, Result<Vec<SearchResponse>, BackendError>> {
		let call = {
			let mut calls = self.calls.lock().unwrap_or_else(|err| err.into_inner());

			calls.push(BatchCall {
				markers: descriptors.iter().map(QueryDescriptor::marker_label).collect(),
				from,
				size,
			});

			calls.len() - 1
		};
		let result = if self.fail_on_call == Some(call) {
			Err(BackendError::unavailable(format!("Scripted failure on call {call}.")))
		} else if self.drop_responses {
			Ok(Vec::new())
		} else {
			Ok(descriptors.iter().map(|descriptor| self.page(descriptor, from, size)).collect())
		};

		Box::pin(async move { result })
	}
}

#[derive(Default)]
pub struct MemoryIdentityState {
	excluded: HashSet<(String, String)>,
	merged: HashSet<String>,
	failing: bool,
}
impl MemoryIdentityState {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn exclude(mut self, candidate_key: &str, base_key: &str) -> Self {
		self.excluded.insert((candidate_key.to_string(), base_key.to_string()));

		self
	}

	pub fn merged(mut self, candidate_key: &str) -> Self {
		self.merged.insert(candidate_key.to_string());

		self
	}

	pub fn failing(mut self) -> Self {
		self.failing = true;

		self
	}
}
impl IdentityState for MemoryIdentityState {
	fn is_excluded<'a>(
		&'a self,
		candidate_key: &'a str,
		base_key: &'a str,
	) -> BoxFuture<'a, Result<bool, StateError>> {
		Box::pin(async move {
			if self.failing {
				return Err(StateError::new("exclusion store offline"));
			}

			Ok(self.excluded.contains(&(candidate_key.to_string(), base_key.to_string())))
		})
	}

	fn is_merged<'a>(&'a self, candidate_key: &'a str) -> BoxFuture<'a, Result<bool, StateError>> {
		Box::pin(async move {
			if self.failing {
				return Err(StateError::new("merge store offline"));
			}

			Ok(self.merged.contains(candidate_key))
		})
	}
}

/// Catalog of person attributes used across the test suites.
pub fn person_catalog() -> StaticCatalog {
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
			"birthDate",
			CatalogEntry::new(["birthDate"], FieldKind::Plain, TreatmentType::Strict),
		)
		.with_entry("email", CatalogEntry::new(["email"], FieldKind::Plain, TreatmentType::Strict))
}

pub fn rule(
	code: &str,
	priority: i32,
	checked: &[&str],
	nb_filled: usize,
	nb_equal: usize,
	nb_missing: usize,
) -> DuplicateRule {
	DuplicateRule {
		code: code.to_string(),
		priority,
		checked_attributes: checked.iter().map(|key| AttributeKey::new(*key)).collect(),
		nb_filled_attributes: nb_filled,
		nb_equal_attributes: nb_equal,
		nb_missing_attributes: nb_missing,
		connected: false,
		treatment_groups: Vec::new(),
	}
}

pub fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
	pairs.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect()
}

fn owned_hits(hits: &[(&str, f64)]) -> Vec<(String, f64)> {
	hits.iter().map(|(key, score)| (key.to_string(), *score)).collect()
}
