pub mod dsl;
pub mod msearch;

mod error;

pub use error::{Error, Result};

use std::time::Duration;

use reqwest::{
	Client,
	header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};
use serde_json::{Map, Value};

use dedup_domain::{BackendError, BoxFuture, QueryDescriptor, SearchBackend, SearchResponse};

/// `_msearch` client for an Elasticsearch-compatible identity index.
pub struct SearchClient {
	client: Client,
	url: String,
	index: String,
	identity_key_field: String,
	headers: HeaderMap,
}
impl SearchClient {
	pub fn new(cfg: &dedup_config::Backend, identity_key_field: &str) -> Result<Self> {
		let client = Client::builder()
			.connect_timeout(Duration::from_millis(cfg.connect_timeout_ms))
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.build()?;
		let url = format!("{}/_msearch", cfg.url.trim_end_matches('/'));

		Ok(Self {
			client,
			url,
			index: cfg.index.clone(),
			identity_key_field: identity_key_field.to_string(),
			headers: auth_headers(cfg.api_key.as_deref(), &cfg.default_headers)?,
		})
	}

	pub async fn msearch(
		&self,
		descriptors: &[QueryDescriptor],
		from: u32,
		size: u32,
	) -> Result<Vec<SearchResponse>> {
		if descriptors.is_empty() {
			return Ok(Vec::new());
		}

		let body = dsl::render_msearch(
			&self.index,
			descriptors,
			from,
			size,
			&self.identity_key_field,
		)?;
		let res = self
			.client
			.post(&self.url)
			.headers(self.headers.clone())
			.header(CONTENT_TYPE, "application/x-ndjson")
			.body(body)
			.send()
			.await?;
		let json: Value = res.error_for_status()?.json().await?;

		tracing::debug!(queries = descriptors.len(), from, size, "Executed search batch.");

		msearch::parse_msearch_response(json, descriptors.len(), &self.identity_key_field)
	}
}
impl SearchBackend for SearchClient {
	fn execute_batch<'a>(
		&'a self,
		descriptors: &'a [QueryDescriptor],
		from: u32,
		size: u32,
	) -> BoxFuture<'a, std::result::Result<Vec<SearchResponse>, BackendError>> {
		Box::pin(async move {
			self.msearch(descriptors, from, size).await.map_err(BackendError::from)
		})
	}
}

pub fn auth_headers(api_key: Option<&str>, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	if let Some(api_key) = api_key {
		headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("ApiKey {api_key}"))?);
	}

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, HeaderValue::from_str(raw)?);
	}

	Ok(headers)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn api_key_and_default_headers_are_applied() {
		let mut defaults = Map::new();

		defaults.insert("x-client".to_string(), Value::String("dedup".to_string()));

		let headers = auth_headers(Some("secret"), &defaults).expect("headers must build");

		assert_eq!(headers.get(AUTHORIZATION).unwrap(), "ApiKey secret");
		assert_eq!(headers.get("x-client").unwrap(), "dedup");
	}

	#[test]
	fn non_string_default_header_is_rejected() {
		let mut defaults = Map::new();

		defaults.insert("x-retries".to_string(), Value::from(3));

		assert!(matches!(auth_headers(None, &defaults), Err(Error::InvalidConfig { .. })));
	}
}
