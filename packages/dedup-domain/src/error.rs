pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Cannot choose {k} elements out of {n}.")]
	CombinationSize { k: usize, n: usize },
	#[error("Unknown treatment '{value}'.")]
	InvalidTreatment { value: String },
	#[error("Unknown field kind '{value}'.")]
	InvalidFieldKind { value: String },
	#[error("Rule {code} is invalid: {message}")]
	InvalidRule { code: String, message: String },
}
