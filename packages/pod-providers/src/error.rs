pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error("Worker responded with status {status}: {body}")]
	Status { status: u16, body: String },
	#[error("Worker function error: {message}")]
	Function { message: String },
	#[error("Worker returned no payload.")]
	EmptyPayload,
	#[error("Worker payload is not a search response: {0}")]
	MalformedPayload(serde_json::Error),
}
