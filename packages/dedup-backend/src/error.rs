use dedup_domain::BackendError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("{message}")]
	InvalidResponse { message: String },
}
impl From<Error> for BackendError {
	fn from(err: Error) -> Self {
		match err {
			Error::Reqwest(inner) if inner.is_timeout() => {
				BackendError::timeout(inner.to_string()).with_source(inner)
			},
			Error::Reqwest(inner) => BackendError::unavailable(inner.to_string()).with_source(inner),
			Error::SerdeJson(inner) => {
				BackendError::invalid_response(inner.to_string()).with_source(inner)
			},
			Error::InvalidHeaderName(inner) => {
				BackendError::unavailable(inner.to_string()).with_source(inner)
			},
			Error::InvalidHeaderValue(inner) => {
				BackendError::unavailable(inner.to_string()).with_source(inner)
			},
			Error::InvalidConfig { message } => BackendError::unavailable(message),
			Error::InvalidResponse { message } => BackendError::invalid_response(message),
		}
	}
}
