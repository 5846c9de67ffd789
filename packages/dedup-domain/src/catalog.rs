use std::collections::HashMap;

use crate::{FieldKind, Result, TreatmentType};

/// Maps a logical attribute key to its storage fields and comparison defaults.
pub trait AttributeCatalog
where
	Self: Send + Sync,
{
	/// One entry for a plain attribute, two or more for a common search key.
	fn resolve_output_keys(&self, key: &str) -> Vec<String>;

	fn field_kind(&self, key: &str) -> FieldKind;

	fn default_treatment(&self, key: &str) -> TreatmentType;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
	pub output_keys: Vec<String>,
	pub kind: FieldKind,
	pub default_treatment: TreatmentType,
}
impl CatalogEntry {
	pub fn new<I, S>(output_keys: I, kind: FieldKind, default_treatment: TreatmentType) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut keys: Vec<String> = Vec::new();

		for key in output_keys {
			let key = key.into();

			if !keys.contains(&key) {
				keys.push(key);
			}
		}

		Self { output_keys: keys, kind, default_treatment }
	}
}

/// Catalog table built once at startup from `[[attributes]]`.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
	entries: HashMap<String, CatalogEntry>,
}
impl StaticCatalog {
	pub fn from_config(attributes: &[dedup_config::AttributeConfig]) -> Result<Self> {
		let mut catalog = Self::default();

		for attribute in attributes {
			let entry = CatalogEntry::new(
				attribute.output_keys.iter().map(|key| key.trim().to_string()),
				FieldKind::parse(&attribute.kind)?,
				TreatmentType::parse(&attribute.default_treatment)?,
			);

			catalog.entries.insert(attribute.key.clone(), entry);
		}

		Ok(catalog)
	}

	pub fn with_entry(mut self, key: impl Into<String>, entry: CatalogEntry) -> Self {
		self.entries.insert(key.into(), entry);

		self
	}

	pub fn entry(&self, key: &str) -> Option<&CatalogEntry> {
		self.entries.get(key)
	}
}
impl AttributeCatalog for StaticCatalog {
	fn resolve_output_keys(&self, key: &str) -> Vec<String> {
		match self.entries.get(key) {
			Some(entry) if !entry.output_keys.is_empty() => entry.output_keys.clone(),
			_ => vec![key.to_string()],
		}
	}

	fn field_kind(&self, key: &str) -> FieldKind {
		self.entries.get(key).map(|entry| entry.kind).unwrap_or_default()
	}

	fn default_treatment(&self, key: &str) -> TreatmentType {
		self.entries.get(key).map(|entry| entry.default_treatment).unwrap_or(TreatmentType::Strict)
	}
}
