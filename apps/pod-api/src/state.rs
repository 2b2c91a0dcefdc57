use std::sync::Arc;

use pod_service::{ManifestCache, PodService};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<PodService>,
}
impl AppState {
	pub fn new(config: pod_config::Config) -> color_eyre::Result<Self> {
		let store = pod_storage::from_config(&config.storage)?;
		let service = PodService::new(config, store, Arc::new(ManifestCache::new()))?;

		Ok(Self::with_service(service))
	}

	pub fn with_service(service: PodService) -> Self {
		Self { service: Arc::new(service) }
	}
}
