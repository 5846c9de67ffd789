use dedup_domain::{QueryDescriptor, ResultSet, SearchBackend, SearchResponse};

use crate::{Error, Result};

/// Running merge of paginated batch responses. Only handed out once every round succeeded.
#[derive(Debug, Default)]
pub struct HitAccumulator {
	results: ResultSet,
}
impl HitAccumulator {
	pub fn new() -> Self {
		Self::default()
	}

	/// Merges one round and returns the largest total reported by any descriptor.
	pub fn merge(
		&mut self,
		descriptors: &[QueryDescriptor],
		responses: Vec<SearchResponse>,
	) -> Result<u64> {
		if responses.is_empty() {
			return Err(Error::Aggregation {
				message: "Search backend returned no responses for the batch.".to_string(),
			});
		}
		if responses.len() != descriptors.len() {
			return Err(Error::Aggregation {
				message: format!(
					"Search backend returned {} responses for {} descriptors.",
					responses.len(),
					descriptors.len()
				),
			});
		}

		let mut max_total = 0;

		for (descriptor, response) in descriptors.iter().zip(responses) {
			let marker = descriptor.marker_label();

			max_total = max_total.max(response.total);

			let round_max = response
				.max_score
				.into_iter()
				.chain(response.hits.iter().map(|hit| hit.score))
				.reduce(f64::max);

			if let Some(score) = round_max {
				self.results.max_score = self.results.max_score.max(score);
			}
			if response.hits.is_empty() {
				continue;
			}
			if let Some(marker) = &marker {
				self.results.matched_markers.insert(marker.clone());
			}

			for mut hit in response.hits {
				if let Some(marker) = &marker {
					hit.matched_markers.insert(marker.clone());
				}

				self.results.insert(hit);
			}
		}

		Ok(max_total)
	}

	pub fn finish(self) -> ResultSet {
		self.results
	}
}

pub struct SearchExecutor<'a> {
	backend: &'a dyn SearchBackend,
}
impl<'a> SearchExecutor<'a> {
	pub fn new(backend: &'a dyn SearchBackend) -> Self {
		Self { backend }
	}

	/// Runs the descriptors as batched rounds until the largest reported total (capped by
	/// `max_results` when non-zero) is paged through.
	pub async fn execute(
		&self,
		descriptors: &[QueryDescriptor],
		page_size: u32,
		max_results: u32,
	) -> Result<ResultSet> {
		if descriptors.is_empty() {
			return Ok(ResultSet::default());
		}
		if page_size == 0 {
			return Err(Error::InvalidRequest {
				message: "page_size must be greater than zero.".to_string(),
			});
		}

		let first_size = if max_results > 0 { page_size.min(max_results) } else { page_size };
		let mut accumulator = HitAccumulator::new();
		let responses = self.backend.execute_batch(descriptors, 0, first_size).await?;
		let max_total = accumulator.merge(descriptors, responses)?;
		let bound = if max_results > 0 { max_total.min(u64::from(max_results)) } else { max_total };
		let bound = u32::try_from(bound).unwrap_or(u32::MAX);
		let mut offset = page_size;
		let mut rounds = 1;

		while offset < bound {
			let size = page_size.min(bound - offset);
			let responses = self.backend.execute_batch(descriptors, offset, size).await?;

			accumulator.merge(descriptors, responses)?;

			offset = offset.saturating_add(page_size);
			rounds += 1;
		}

		let results = accumulator.finish();

		tracing::info!(
			descriptors = descriptors.len(),
			rounds,
			total = max_total,
			hits = results.len(),
			"Executed descriptor batch."
		);

		Ok(results)
	}
}

#[cfg(test)]
mod tests {
	use dedup_domain::{Clause, ScoredHit};

	use super::*;

	fn descriptor(variant: usize) -> QueryDescriptor {
		QueryDescriptor::new(vec![Clause::FieldPresent { field: "login".to_string() }])
			.with_marker("R", variant)
	}

	fn response(total: u64, hits: &[(&str, f64)]) -> SearchResponse {
		SearchResponse {
			total,
			max_score: hits.iter().map(|(_, score)| *score).reduce(f64::max),
			hits: hits
				.iter()
				.map(|(key, score)| ScoredHit::new(*key, *score, serde_json::Value::Null))
				.collect(),
		}
	}

	fn rounds() -> Vec<Vec<SearchResponse>> {
		vec![
			vec![response(3, &[("X", 1.0), ("Y", 2.0)]), response(1, &[("X", 4.0)])],
			vec![response(3, &[("Z", 0.5)]), response(1, &[])],
		]
	}

	#[test]
	fn merging_the_same_rounds_twice_is_identical() {
		let descriptors = vec![descriptor(0), descriptor(1)];
		let merge_all = || {
			let mut accumulator = HitAccumulator::new();

			for round in rounds() {
				accumulator.merge(&descriptors, round).expect("merge must succeed");
			}

			accumulator.finish()
		};
		let first = merge_all();

		assert_eq!(first, merge_all());
		assert_eq!(first.len(), 3);
		assert_eq!(first.max_score, 4.0);
		assert_eq!(first.get("X").map(|hit| hit.score), Some(4.0));
		assert_eq!(first.get("X").map(|hit| hit.matched_markers.len()), Some(2));
		assert_eq!(first.get("Z").map(|hit| hit.matched_markers.len()), Some(1));
	}

	#[test]
	fn descriptor_without_hits_contributes_no_marker() {
		let descriptors = vec![descriptor(0), descriptor(1)];
		let mut accumulator = HitAccumulator::new();

		accumulator
			.merge(&descriptors, vec![response(1, &[("X", 1.0)]), response(0, &[])])
			.expect("merge must succeed");

		let results = accumulator.finish();

		assert_eq!(results.matched_markers.iter().collect::<Vec<_>>(), vec!["R#0"]);
	}

	#[test]
	fn missing_responses_fail_the_aggregation() {
		let descriptors = vec![descriptor(0)];
		let mut accumulator = HitAccumulator::new();

		assert!(matches!(
			accumulator.merge(&descriptors, Vec::new()),
			Err(Error::Aggregation { .. })
		));
		assert!(matches!(
			accumulator.merge(&descriptors, vec![response(0, &[]), response(0, &[])]),
			Err(Error::Aggregation { .. })
		));
	}
}
