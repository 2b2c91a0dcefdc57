pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid shard id {shard_id}; shard ids start at 1.")]
	InvalidShardId { shard_id: u32 },
	#[error("Unknown storage environment {value:?}; expected local or remote.")]
	InvalidEnvironment { value: String },
	#[error("Invalid manifest: {message}")]
	InvalidManifest { message: String },
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
}
