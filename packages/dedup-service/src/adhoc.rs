use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use dedup_domain::{QueryRequest, RequestContext, RequestGenerator, ResultSet, ScoredHit};

use crate::{DedupService, Error, Result, filter};

/// Single-rule search outside the full sweep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSearchRequest {
	pub rule_code: String,
	pub values: HashMap<String, String>,
	#[serde(default)]
	pub base_identity_key: Option<String>,
	/// Zero falls back to `matching.max_results`.
	#[serde(default)]
	pub max_results: u32,
	/// Only candidates with a connection identifier and a login.
	#[serde(default)]
	pub connected_only: bool,
	#[serde(default)]
	pub attributes_filter: Vec<String>,
}

/// Rule-less search over every supplied attribute.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributeSearchRequest {
	pub values: HashMap<String, String>,
	#[serde(default)]
	pub base_identity_key: Option<String>,
	#[serde(default)]
	pub max_results: u32,
	#[serde(default)]
	pub connected_only: bool,
	#[serde(default)]
	pub attributes_filter: Vec<String>,
}

impl DedupService {
	pub async fn find_rule_duplicates(&self, req: &RuleSearchRequest) -> Result<ResultSet> {
		let rule = self.registry.get(req.rule_code.trim())?;
		let observation = self.observation(&req.values);
		let context = RequestContext {
			connected: req.connected_only,
			source_fields: req.attributes_filter.clone(),
		};

		self.evaluate_rule_capped(
			&rule,
			&observation,
			req.base_identity_key.as_deref(),
			&context,
			req.max_results,
		)
		.await
	}

	pub async fn search_basic(&self, req: &AttributeSearchRequest) -> Result<ResultSet> {
		let observation = self.observation(&req.values);

		self.search_attributes(req, QueryRequest::Basic { observation: &observation }).await
	}

	/// Proximity search: names must match closely, other attributes only raise the score.
	pub async fn search_near(&self, req: &AttributeSearchRequest) -> Result<ResultSet> {
		let observation = self.observation(&req.values);

		self.search_attributes(req, QueryRequest::Near { observation: &observation }).await
	}

	pub async fn get_identity(&self, identity_key: &str) -> Result<Option<ScoredHit>> {
		let identity_key = identity_key.trim();

		if identity_key.is_empty() {
			return Err(Error::InvalidRequest {
				message: "identity_key must not be empty.".to_string(),
			});
		}

		let generator = RequestGenerator::new(self.catalog.as_ref(), &self.options);
		let descriptors = QueryRequest::ByIdentityKey { identity_key }
			.build_query(&generator, &RequestContext::default())?;
		let mut results = self.executor().execute(&descriptors, 1, 1).await?;

		Ok(results.hits.remove(identity_key))
	}

	async fn search_attributes(
		&self,
		req: &AttributeSearchRequest,
		request: QueryRequest<'_>,
	) -> Result<ResultSet> {
		let context = RequestContext {
			connected: req.connected_only,
			source_fields: req.attributes_filter.clone(),
		};
		let generator = RequestGenerator::new(self.catalog.as_ref(), &self.options);
		let descriptors = request.build_query(&generator, &context)?;

		if descriptors.is_empty() {
			return Err(Error::InvalidRequest {
				message: "At least one attribute value is required.".to_string(),
			});
		}

		let results = self
			.executor()
			.execute(&descriptors, self.matching.page_size, self.max_results(req.max_results))
			.await?;

		filter::post_filter(
			results,
			req.base_identity_key.as_deref(),
			None,
			self.collaborators.identity_state.as_ref(),
		)
		.await
	}
}
