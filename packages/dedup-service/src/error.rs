use dedup_domain::{BackendError, BackendErrorKind, StateError};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Rule {code} not found.")]
	RuleNotFound { code: String },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Invalid configuration: {message}")]
	InvalidConfig { message: String },
	#[error("Invalid rule: {message}")]
	InvalidRule { message: String },
	#[error("Search backend unavailable: {message}")]
	BackendUnavailable {
		message: String,
		#[source]
		source: BackendError,
	},
	#[error("Search backend timed out: {message}")]
	BackendTimeout {
		message: String,
		#[source]
		source: BackendError,
	},
	#[error("Aggregation failed: {message}")]
	Aggregation { message: String },
	#[error("Identity state error: {message}")]
	IdentityState { message: String },
}
impl From<BackendError> for Error {
	fn from(err: BackendError) -> Self {
		let message = err.message.clone();

		match err.kind {
			BackendErrorKind::Timeout => Self::BackendTimeout { message, source: err },
			_ => Self::BackendUnavailable { message, source: err },
		}
	}
}

impl From<dedup_backend::Error> for Error {
	fn from(err: dedup_backend::Error) -> Self {
		BackendError::from(err).into()
	}
}

impl From<dedup_config::Error> for Error {
	fn from(err: dedup_config::Error) -> Self {
		Self::InvalidConfig { message: err.to_string() }
	}
}

impl From<dedup_domain::Error> for Error {
	fn from(err: dedup_domain::Error) -> Self {
		match err {
			dedup_domain::Error::InvalidRule { .. } => Self::InvalidRule { message: err.to_string() },
			_ => Self::InvalidRequest { message: err.to_string() },
		}
	}
}

impl From<StateError> for Error {
	fn from(err: StateError) -> Self {
		Self::IdentityState { message: err.message }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn backend_timeout_keeps_its_cause() {
		let err = Error::from(BackendError::timeout("no answer within 50 ms"));

		assert!(matches!(
			&err,
			Error::BackendTimeout { message, .. } if message == "no answer within 50 ms"
		));
		assert!(std::error::Error::source(&err).is_some());
	}

	#[test]
	fn invalid_response_is_reported_as_unavailable() {
		let err = Error::from(BackendError::invalid_response("Query 0 failed: boom"));

		assert!(matches!(err, Error::BackendUnavailable { .. }));
	}
}
