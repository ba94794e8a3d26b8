pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<rapport_storage::Error> for Error {
	fn from(err: rapport_storage::Error) -> Self {
		match err {
			rapport_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			rapport_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			rapport_storage::Error::NotFound(message) => Self::NotFound { message },
		}
	}
}

impl From<rapport_providers::Error> for Error {
	fn from(err: rapport_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
