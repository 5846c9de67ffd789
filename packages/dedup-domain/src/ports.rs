use std::{
	fmt::{Display, Formatter},
	future::Future,
	pin::Pin,
};

use crate::{QueryDescriptor, SearchResponse};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

pub trait SearchBackend
where
	Self: Send + Sync,
{
	/// Runs every descriptor at the same page window. Response `i` answers descriptor `i`.
	fn execute_batch<'a>(
		&'a self,
		descriptors: &'a [QueryDescriptor],
		from: u32,
		size: u32,
	) -> BoxFuture<'a, Result<Vec<SearchResponse>, BackendError>>;
}

/// Manual exclusions and merge history for stored identities.
pub trait IdentityState
where
	Self: Send + Sync,
{
	fn is_excluded<'a>(
		&'a self,
		candidate_key: &'a str,
		base_key: &'a str,
	) -> BoxFuture<'a, Result<bool, StateError>>;

	fn is_merged<'a>(&'a self, candidate_key: &'a str) -> BoxFuture<'a, Result<bool, StateError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
	Unavailable,
	Timeout,
	InvalidResponse,
}
impl Display for BackendErrorKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Unavailable => f.write_str("backend unavailable"),
			Self::Timeout => f.write_str("backend timeout"),
			Self::InvalidResponse => f.write_str("invalid backend response"),
		}
	}
}

#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct BackendError {
	pub kind: BackendErrorKind,
	pub message: String,
	#[source]
	pub source: Option<Cause>,
}
impl BackendError {
	pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
		Self { kind, message: message.into(), source: None }
	}

	pub fn unavailable(message: impl Into<String>) -> Self {
		Self::new(BackendErrorKind::Unavailable, message)
	}

	pub fn timeout(message: impl Into<String>) -> Self {
		Self::new(BackendErrorKind::Timeout, message)
	}

	pub fn invalid_response(message: impl Into<String>) -> Self {
		Self::new(BackendErrorKind::InvalidResponse, message)
	}

	pub fn with_source<E>(mut self, source: E) -> Self
	where
		E: std::error::Error + Send + Sync + 'static,
	{
		self.source = Some(Box::new(source));

		self
	}
}

#[derive(Debug, thiserror::Error)]
#[error("Identity state lookup failed: {message}")]
pub struct StateError {
	pub message: String,
}
impl StateError {
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: message.into() }
	}
}
