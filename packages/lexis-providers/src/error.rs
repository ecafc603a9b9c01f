pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Provider request failed: {0}")]
	Http(#[from] reqwest::Error),
	#[error("Provider payload is not valid JSON: {0}")]
	Json(#[from] serde_json::Error),
	#[error("Invalid provider header: {message}")]
	Header { message: String },
	#[error("Unexpected provider response: {message}")]
	InvalidResponse { message: String },
}
impl From<reqwest::header::InvalidHeaderName> for Error {
	fn from(err: reqwest::header::InvalidHeaderName) -> Self {
		Self::Header { message: err.to_string() }
	}
}
impl From<reqwest::header::InvalidHeaderValue> for Error {
	fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
		Self::Header { message: err.to_string() }
	}
}

pub(crate) fn invalid_response(message: impl Into<String>) -> Error {
	Error::InvalidResponse { message: message.into() }
}
