use pod_domain::ShardId;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to load shard manifest from {key}: {message}")]
	ManifestLoad { key: String, message: String },
	#[error("All queried shards failed: {failed:?}.")]
	AllShardsFailed { failed: Vec<ShardId> },
	#[error("Configuration error: {message}")]
	Configuration { message: String },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
}
impl From<pod_config::Error> for Error {
	fn from(err: pod_config::Error) -> Self {
		Self::Configuration { message: err.to_string() }
	}
}
