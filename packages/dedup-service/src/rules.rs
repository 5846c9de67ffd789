use std::{
	collections::BTreeMap,
	sync::{Arc, RwLock},
};

use dedup_domain::{BoxFuture, DuplicateRule};

use crate::{Error, Result};

/// Source of rule definitions. Lookups go through [`RuleRegistry`], never straight here.
pub trait RuleRepository
where
	Self: Send + Sync,
{
	fn get<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Result<DuplicateRule>>;

	/// Codes ordered by priority, then code.
	fn list_all_codes(&self) -> BoxFuture<'_, Result<Vec<String>>>;
}

/// Rules declared in the `[[rules]]` configuration table.
pub struct ConfigRuleRepository {
	rules: BTreeMap<String, DuplicateRule>,
}
impl ConfigRuleRepository {
	pub fn from_config(rules: &[dedup_config::RuleConfig]) -> Result<Self> {
		let mut by_code = BTreeMap::new();

		for cfg in rules {
			let rule = DuplicateRule::from_config(cfg)?;

			if by_code.insert(rule.code.clone(), rule).is_some() {
				return Err(Error::InvalidRule {
					message: format!("Rule code {} is declared twice.", cfg.code),
				});
			}
		}

		Ok(Self { rules: by_code })
	}

	pub fn from_rules<I>(rules: I) -> Self
	where
		I: IntoIterator<Item = DuplicateRule>,
	{
		Self { rules: rules.into_iter().map(|rule| (rule.code.clone(), rule)).collect() }
	}
}
impl RuleRepository for ConfigRuleRepository {
	fn get<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Result<DuplicateRule>> {
		Box::pin(async move {
			self.rules
				.get(code)
				.cloned()
				.ok_or_else(|| Error::RuleNotFound { code: code.to_string() })
		})
	}

	fn list_all_codes(&self) -> BoxFuture<'_, Result<Vec<String>>> {
		Box::pin(async move {
			let snapshot = RuleSnapshot::new(self.rules.values().cloned().collect());

			Ok(snapshot.codes().into_iter().map(str::to_string).collect())
		})
	}
}

/// Immutable view of every rule, sorted by priority then code.
#[derive(Debug, Default)]
pub struct RuleSnapshot {
	rules: Vec<DuplicateRule>,
}
impl RuleSnapshot {
	pub fn new(mut rules: Vec<DuplicateRule>) -> Self {
		rules.sort_by(|left, right| {
			left.priority.cmp(&right.priority).then_with(|| left.code.cmp(&right.code))
		});

		Self { rules }
	}

	pub fn rules(&self) -> &[DuplicateRule] {
		&self.rules
	}

	pub fn get(&self, code: &str) -> Option<&DuplicateRule> {
		self.rules.iter().find(|rule| rule.code == code)
	}

	pub fn codes(&self) -> Vec<&str> {
		self.rules.iter().map(|rule| rule.code.as_str()).collect()
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}
}

/// Cached rules in front of a [`RuleRepository`]. A refresh swaps the whole snapshot, so a
/// detection pass keeps the snapshot it started with.
pub struct RuleRegistry {
	repository: Arc<dyn RuleRepository>,
	snapshot: RwLock<Arc<RuleSnapshot>>,
}
impl RuleRegistry {
	pub fn new(repository: Arc<dyn RuleRepository>) -> Self {
		Self { repository, snapshot: RwLock::new(Arc::new(RuleSnapshot::default())) }
	}

	pub async fn load(repository: Arc<dyn RuleRepository>) -> Result<Self> {
		let registry = Self::new(repository);

		registry.refresh().await?;

		Ok(registry)
	}

	/// Reloads every rule from the repository. The current snapshot stays in place on failure.
	pub async fn refresh(&self) -> Result<usize> {
		let codes = self.repository.list_all_codes().await?;
		let mut rules = Vec::with_capacity(codes.len());

		for code in &codes {
			rules.push(self.repository.get(code).await?);
		}

		let snapshot = Arc::new(RuleSnapshot::new(rules));
		let count = snapshot.len();

		*self.snapshot.write().unwrap_or_else(|err| err.into_inner()) = snapshot;

		tracing::info!(rules = count, "Refreshed rule registry.");

		Ok(count)
	}

	pub fn snapshot(&self) -> Arc<RuleSnapshot> {
		self.snapshot.read().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub fn get(&self, code: &str) -> Result<DuplicateRule> {
		self.get_safe(code).ok_or_else(|| Error::RuleNotFound { code: code.to_string() })
	}

	pub fn get_safe(&self, code: &str) -> Option<DuplicateRule> {
		self.snapshot().get(code).cloned()
	}

	pub fn rules(&self) -> Vec<DuplicateRule> {
		self.snapshot().rules().to_vec()
	}
}
