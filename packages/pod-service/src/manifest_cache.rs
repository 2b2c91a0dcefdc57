use std::sync::{Arc, OnceLock};

use pod_domain::ShardManifest;
use pod_storage::ObjectStore;

use crate::{Error, Result};

/// Process-wide copy of the shard manifest.
///
/// Populated by the first successful load and never refreshed; a new index build takes effect
/// on restart. Two requests racing on an empty cache may both fetch; the first stored copy
/// wins and both are equivalent reads of the same object.
#[derive(Debug, Default)]
pub struct ManifestCache {
	manifest: OnceLock<Arc<ShardManifest>>,
}
impl ManifestCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn cached(&self) -> Option<Arc<ShardManifest>> {
		self.manifest.get().cloned()
	}

	pub async fn load(&self, store: &dyn ObjectStore, key: &str) -> Result<Arc<ShardManifest>> {
		if let Some(manifest) = self.manifest.get() {
			tracing::debug!("Using cached shard manifest.");

			return Ok(manifest.clone());
		}

		tracing::info!(key, "Loading shard manifest.");

		let bytes = store.get(key).await.map_err(|err| {
			tracing::error!(error = %err, key, "Failed to fetch shard manifest.");

			Error::ManifestLoad { key: key.to_string(), message: err.to_string() }
		})?;
		let manifest = ShardManifest::from_slice(&bytes).map_err(|err| {
			tracing::error!(error = %err, key, "Failed to parse shard manifest.");

			Error::ManifestLoad { key: key.to_string(), message: err.to_string() }
		})?;

		tracing::info!(
			shard_count = manifest.shard_count,
			total_episodes = manifest.total_episodes,
			"Loaded shard manifest."
		);

		Ok(self.manifest.get_or_init(|| Arc::new(manifest)).clone())
	}
}
