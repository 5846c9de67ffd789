use std::collections::HashMap;

use futures::{StreamExt, stream};
use serde::{Deserialize, Serialize};

use dedup_domain::{DuplicateRule, Observation, RequestContext, RequestGenerator, ResultSet};

use crate::{DedupService, FailureMode, Result, filter};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindDuplicatesRequest {
	/// Attribute values of the identity being checked, keyed by logical attribute key.
	pub values: HashMap<String, String>,
	pub base_identity_key: String,
	/// Document fields returned with each hit. Empty returns whole documents.
	#[serde(default)]
	pub attributes_filter: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RuleOutcome {
	Matches { results: ResultSet },
	Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleReport {
	pub code: String,
	pub priority: i32,
	pub outcome: RuleOutcome,
}

/// Per-rule outcomes in ascending priority order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DuplicateReport {
	pub rules: Vec<RuleReport>,
}
impl DuplicateReport {
	pub fn get(&self, code: &str) -> Option<&RuleOutcome> {
		self.rules.iter().find(|report| report.code == code).map(|report| &report.outcome)
	}

	pub fn matches(&self, code: &str) -> Option<&ResultSet> {
		match self.get(code)? {
			RuleOutcome::Matches { results } => Some(results),
			RuleOutcome::Failed { .. } => None,
		}
	}

	pub fn codes(&self) -> Vec<&str> {
		self.rules.iter().map(|report| report.code.as_str()).collect()
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}
}

impl DedupService {
	/// Evaluates every rule against the identity. Inapplicable rules report an empty result.
	pub async fn find_duplicates(
		&self,
		req: &FindDuplicatesRequest,
		rules: &[DuplicateRule],
	) -> Result<DuplicateReport> {
		let mut ordered: Vec<&DuplicateRule> = rules.iter().collect();

		ordered.sort_by_key(|rule| rule.priority);

		let observation = self.observation(&req.values);
		let context =
			RequestContext { connected: false, source_fields: req.attributes_filter.clone() };
		let observation = &observation;
		let context = &context;
		let base_identity_key = req.base_identity_key.as_str();
		let parallelism = self.matching.max_parallel_rules.max(1);
		let mut outcomes = stream::iter(ordered)
			.map(|rule| async move {
				let outcome =
					self.evaluate_rule(rule, observation, base_identity_key, context).await;

				(rule, outcome)
			})
			.buffered(parallelism);
		let mut report = DuplicateReport::default();

		while let Some((rule, outcome)) = outcomes.next().await {
			let outcome = match (outcome, self.failure_mode) {
				(Ok(results), _) => RuleOutcome::Matches { results },
				(Err(err), FailureMode::Strict) => return Err(err),
				(Err(err), FailureMode::Lenient) => {
					tracing::warn!(rule = %rule.code, error = %err, "Rule evaluation failed.");

					RuleOutcome::Failed { message: err.to_string() }
				},
			};

			report.rules.push(RuleReport {
				code: rule.code.clone(),
				priority: rule.priority,
				outcome,
			});
		}

		Ok(report)
	}

	/// Runs [`Self::find_duplicates`] over the registry snapshot current at call time.
	pub async fn find_duplicates_all(
		&self,
		req: &FindDuplicatesRequest,
	) -> Result<DuplicateReport> {
		let snapshot = self.registry.snapshot();

		self.find_duplicates(req, snapshot.rules()).await
	}

	pub(crate) async fn evaluate_rule(
		&self,
		rule: &DuplicateRule,
		observation: &Observation,
		base_identity_key: &str,
		context: &RequestContext,
	) -> Result<ResultSet> {
		self.evaluate_rule_capped(rule, observation, Some(base_identity_key), context, 0).await
	}

	pub(crate) async fn evaluate_rule_capped(
		&self,
		rule: &DuplicateRule,
		observation: &Observation,
		base_identity_key: Option<&str>,
		context: &RequestContext,
		max_results: u32,
	) -> Result<ResultSet> {
		if !rule.can_apply(observation) {
			tracing::debug!(rule = %rule.code, "Rule is not applicable to the observation.");

			return Ok(ResultSet::default());
		}

		let generator = RequestGenerator::new(self.catalog.as_ref(), &self.options);
		let descriptors = generator.generate(rule, observation, context)?;

		tracing::debug!(
			rule = %rule.code,
			descriptors = descriptors.len(),
			"Generated rule queries."
		);

		let results = self
			.executor()
			.execute(&descriptors, self.matching.page_size, self.max_results(max_results))
			.await?;

		filter::post_filter(
			results,
			base_identity_key,
			Some(rule.code.as_str()),
			self.collaborators.identity_state.as_ref(),
		)
		.await
	}
}
