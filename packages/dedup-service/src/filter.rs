use dedup_domain::{IdentityState, ResultSet};

use crate::Result;

/// Drops the base identity, manual exclusions and already merged candidates, then tags the
/// survivors with `rule_code`.
pub async fn post_filter(
	results: ResultSet,
	base_identity_key: Option<&str>,
	rule_code: Option<&str>,
	state: &dyn IdentityState,
) -> Result<ResultSet> {
	let mut filtered = ResultSet::default();

	for (identity_key, mut hit) in results.hits {
		if let Some(base_identity_key) = base_identity_key {
			if identity_key == base_identity_key {
				continue;
			}
			if state.is_excluded(&identity_key, base_identity_key).await? {
				tracing::debug!(candidate = %identity_key, "Dropped manually excluded candidate.");

				continue;
			}
		}
		if state.is_merged(&identity_key).await? {
			tracing::debug!(candidate = %identity_key, "Dropped merged candidate.");

			continue;
		}

		hit.rule_code = rule_code.map(str::to_string);

		filtered.max_score = filtered.max_score.max(hit.score);
		filtered.matched_markers.extend(hit.matched_markers.iter().cloned());
		filtered.insert(hit);
	}

	Ok(filtered)
}
