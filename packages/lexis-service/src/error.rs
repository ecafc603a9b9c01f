pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Embedding failed: {message}")]
	Embedding { message: String },
	#[error("Generation failed: {message}")]
	Generation { message: String },
	#[error("Service misconfigured: {message}")]
	Configuration { message: String },
}
