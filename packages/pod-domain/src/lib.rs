pub mod keys;
pub mod manifest;
pub mod partition;
pub mod search;

mod error;

pub use error::{Error, Result};
pub use keys::{KeyLayout, StorageEnvironment};
pub use manifest::{MANIFEST_VERSION, ShardInfo, ShardManifest, generate_shard_manifest};
pub use partition::{
	EpisodeRange, ShardId, calculate_shard_ranges, get_shard_for_episode, group_entries_by_shard,
	log_sharding_config,
};
pub use search::{
	DEFAULT_LIMIT, DEFAULT_SEARCH_FIELD, SearchEntry, SearchHit, SearchRequest, SearchResponse,
	ShardingMetadata, SortOrder,
};
