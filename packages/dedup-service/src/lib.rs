pub mod adhoc;
pub mod duplicates;
pub mod executor;
pub mod filter;
pub mod rules;

mod error;

pub use adhoc::{AttributeSearchRequest, RuleSearchRequest};
pub use duplicates::{DuplicateReport, FindDuplicatesRequest, RuleOutcome, RuleReport};
pub use error::{Error, Result};
pub use executor::{HitAccumulator, SearchExecutor};
pub use rules::{ConfigRuleRepository, RuleRegistry, RuleRepository, RuleSnapshot};

use std::{collections::HashMap, sync::Arc};

use dedup_backend::SearchClient;
use dedup_config::{Config, Matching};
use dedup_domain::{
	AttributeCatalog, BoxFuture, IdentityState, Observation, SearchBackend, StateError,
	StaticCatalog, SynthesisOptions,
};

/// How a sweep reacts when one rule fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
	/// The first rule error fails the whole sweep.
	Strict,
	/// A failed rule is reported as [`RuleOutcome::Failed`] and the sweep continues.
	Lenient,
}
impl FailureMode {
	pub fn from_config(matching: &Matching) -> Self {
		if matching.failure_mode.eq_ignore_ascii_case("lenient") {
			Self::Lenient
		} else {
			Self::Strict
		}
	}
}

#[derive(Clone)]
pub struct Collaborators {
	pub backend: Arc<dyn SearchBackend>,
	pub identity_state: Arc<dyn IdentityState>,
}
impl Collaborators {
	pub fn new(backend: Arc<dyn SearchBackend>, identity_state: Arc<dyn IdentityState>) -> Self {
		Self { backend, identity_state }
	}
}

pub struct DedupService {
	pub matching: Matching,
	pub failure_mode: FailureMode,
	pub options: SynthesisOptions,
	pub catalog: Arc<dyn AttributeCatalog>,
	pub collaborators: Collaborators,
	pub registry: RuleRegistry,
}
impl DedupService {
	pub fn new(
		matching: Matching,
		catalog: Arc<dyn AttributeCatalog>,
		registry: RuleRegistry,
		collaborators: Collaborators,
	) -> Self {
		Self {
			failure_mode: FailureMode::from_config(&matching),
			options: SynthesisOptions::from_config(&matching),
			matching,
			catalog,
			collaborators,
			registry,
		}
	}

	/// Wires the HTTP search client and the configured rules. Nothing is treated as excluded
	/// or merged.
	pub async fn from_config(cfg: &Config) -> Result<Self> {
		dedup_config::validate(cfg)?;

		let backend = SearchClient::new(&cfg.backend, &cfg.matching.identity_key_field)?;
		let collaborators = Collaborators::new(Arc::new(backend), Arc::new(NoIdentityState));

		Self::with_collaborators(cfg, collaborators).await
	}

	pub async fn with_collaborators(cfg: &Config, collaborators: Collaborators) -> Result<Self> {
		dedup_config::validate(cfg)?;

		let catalog = StaticCatalog::from_config(&cfg.attributes)?;
		let repository = ConfigRuleRepository::from_config(&cfg.rules)?;
		let registry = RuleRegistry::load(Arc::new(repository)).await?;

		Ok(Self::new(cfg.matching.clone(), Arc::new(catalog), registry, collaborators))
	}

	pub(crate) fn observation(&self, values: &HashMap<String, String>) -> Observation {
		Observation::from_values(values, self.catalog.as_ref())
	}

	pub(crate) fn executor(&self) -> SearchExecutor<'_> {
		SearchExecutor::new(self.collaborators.backend.as_ref())
	}

	/// `requested` when non-zero, otherwise the configured cap.
	pub(crate) fn max_results(&self, requested: u32) -> u32 {
		if requested > 0 { requested } else { self.matching.max_results }
	}
}

/// Identity state for deployments without exclusion or merge bookkeeping.
pub struct NoIdentityState;
impl IdentityState for NoIdentityState {
	fn is_excluded<'a>(
		&'a self,
		_candidate_key: &'a str,
		_base_key: &'a str,
	) -> BoxFuture<'a, std::result::Result<bool, StateError>> {
		Box::pin(async { Ok(false) })
	}

	fn is_merged<'a>(
		&'a self,
		_candidate_key: &'a str,
	) -> BoxFuture<'a, std::result::Result<bool, StateError>> {
		Box::pin(async { Ok(false) })
	}
}
