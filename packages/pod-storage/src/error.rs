#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Object not found: {0}")]
	NotFound(String),
	#[error("Invalid object key: {0}")]
	InvalidKey(String),
	#[error("I/O error on {key}: {source}")]
	Io { key: String, source: std::io::Error },
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error("{0}")]
	InvalidConfig(String),
}
