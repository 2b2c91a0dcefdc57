pub mod inbound;
pub mod invoke;
pub mod manifest_cache;
pub mod merge;
pub mod search;

mod error;

pub use error::{Error, Result};
pub use inbound::{InboundRequest, parse_inbound};
pub use invoke::{
	FanOut, ShardInvocationError, ShardResponse, ShardResult, ShardTarget, invoke_all,
	invoke_shard,
};
pub use manifest_cache::ManifestCache;
pub use merge::{
	ScoredHit, ShardPage, calculate_proportional_offsets, calculate_total_hits,
	merge_shard_results, normalize_scores,
};
pub use search::{HEALTH_CHECK_QUERY, PREFLIGHT_QUERY, preflight_response};

use std::{sync::Arc, time::Duration};

use pod_config::Config;
use pod_domain::{KeyLayout, StorageEnvironment};
use pod_providers::{HttpShardWorker, ShardWorker};
use pod_storage::ObjectStore;

pub struct PodService {
	pub cfg: Config,
	pub layout: KeyLayout,
	pub store: Arc<dyn ObjectStore>,
	pub worker: Arc<dyn ShardWorker>,
	pub manifests: Arc<ManifestCache>,
}
impl PodService {
	pub fn new(
		cfg: Config,
		store: Arc<dyn ObjectStore>,
		manifests: Arc<ManifestCache>,
	) -> Result<Self> {
		let worker = HttpShardWorker::new()
			.map_err(|err| Error::Configuration { message: err.to_string() })?;

		Self::with_worker(cfg, store, Arc::new(worker), manifests)
	}

	pub fn with_worker(
		cfg: Config,
		store: Arc<dyn ObjectStore>,
		worker: Arc<dyn ShardWorker>,
		manifests: Arc<ManifestCache>,
	) -> Result<Self> {
		let environment = cfg
			.site
			.environment
			.parse::<StorageEnvironment>()
			.map_err(|err| Error::Configuration { message: err.to_string() })?;
		let layout = KeyLayout::new(environment, &cfg.site.id);

		Ok(Self { cfg, layout, store, worker, manifests })
	}

	pub(crate) fn query_timeout(&self) -> Duration {
		Duration::from_millis(self.cfg.shards.query_timeout_ms)
	}

	pub(crate) fn warmup_timeout(&self) -> Duration {
		Duration::from_millis(self.cfg.shards.warmup_timeout_ms)
	}
}
