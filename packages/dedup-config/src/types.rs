use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub backend: Backend,
	#[serde(default)]
	pub matching: Matching,
	#[serde(default)]
	pub attributes: Vec<AttributeConfig>,
	#[serde(default)]
	pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Backend {
	pub url: String,
	pub index: String,
	pub api_key: Option<String>,
	#[serde(default = "default_connect_timeout_ms")]
	pub connect_timeout_ms: u64,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Matching {
	pub page_size: u32,
	/// Zero means unbounded.
	pub max_results: u32,
	pub max_parallel_rules: usize,
	pub failure_mode: String,
	pub fuzziness: u8,
	pub identity_key_field: String,
	pub connection_id_field: String,
	pub login_field: String,
}
impl Default for Matching {
	fn default() -> Self {
		Self {
			page_size: 100,
			max_results: 0,
			max_parallel_rules: 1,
			failure_mode: "strict".to_string(),
			fuzziness: 1,
			identity_key_field: "identity_key".to_string(),
			connection_id_field: "connection_id".to_string(),
			login_field: "login".to_string(),
		}
	}
}

/// One row of the attribute catalog table.
#[derive(Debug, Clone, Deserialize)]
pub struct AttributeConfig {
	pub key: String,
	pub output_keys: Vec<String>,
	#[serde(default = "default_kind")]
	pub kind: String,
	#[serde(default = "default_treatment")]
	pub default_treatment: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuleConfig {
	pub code: String,
	pub priority: i32,
	pub nb_filled_attributes: u32,
	pub nb_equal_attributes: u32,
	#[serde(default)]
	pub nb_missing_attributes: u32,
	#[serde(default)]
	pub connected: bool,
	pub checked_attributes: Vec<RuleAttributeConfig>,
	#[serde(default)]
	pub treatment_groups: Vec<TreatmentGroupConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuleAttributeConfig {
	pub key: String,
	/// Falls back to the catalog default when absent.
	pub treatment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreatmentGroupConfig {
	pub name: String,
	pub attributes: Vec<RuleAttributeConfig>,
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_connect_timeout_ms() -> u64 {
	2_000
}

fn default_timeout_ms() -> u64 {
	10_000
}

fn default_kind() -> String {
	"plain".to_string()
}

fn default_treatment() -> String {
	"strict".to_string()
}
