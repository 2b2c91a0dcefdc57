//! In-memory doubles for storage and shard workers, plus config builders for tests.

mod error;

pub use error::{Error, Result};

use std::{
	collections::HashMap,
	path::PathBuf,
	sync::{
		Mutex,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use serde_json::Map;

use pod_config::{Config, Service, Shards, Site, Storage};
use pod_domain::{
	KeyLayout, SearchHit, SearchRequest, SearchResponse, ShardManifest, calculate_shard_ranges,
	generate_shard_manifest,
};
use pod_providers::{BoxFuture, ShardWorker};
use pod_storage::ObjectStore;

pub const TEST_SITE_ID: &str = "test-site";

/// Object store backed by a map. Counts `get` calls so tests can assert caching.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
	objects: Mutex<HashMap<String, Vec<u8>>>,
	gets: AtomicUsize,
}
impl MemoryObjectStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get_count(&self) -> usize {
		self.gets.load(Ordering::SeqCst)
	}

	pub fn contains(&self, key: &str) -> bool {
		self.objects.lock().unwrap_or_else(|err| err.into_inner()).contains_key(key)
	}
}
impl ObjectStore for MemoryObjectStore {
	fn get<'a>(
		&'a self,
		key: &'a str,
	) -> pod_storage::BoxFuture<'a, pod_storage::Result<Vec<u8>>> {
		Box::pin(async move {
			self.gets.fetch_add(1, Ordering::SeqCst);

			self.objects
				.lock()
				.unwrap_or_else(|err| err.into_inner())
				.get(key)
				.cloned()
				.ok_or_else(|| pod_storage::Error::NotFound(key.to_string()))
		})
	}

	fn put<'a>(
		&'a self,
		key: &'a str,
		bytes: Vec<u8>,
	) -> pod_storage::BoxFuture<'a, pod_storage::Result<()>> {
		Box::pin(async move {
			let mut objects = self.objects.lock().unwrap_or_else(|err| err.into_inner());

			objects.insert(key.to_string(), bytes);

			Ok(())
		})
	}
}

/// How a scripted worker answers.
#[derive(Debug, Clone)]
pub enum Behavior {
	/// Serves a ranked list of hit ids, honoring the request's offset and limit. The total is
	/// the full list length.
	Ranked(Vec<String>),
	/// Fails with a worker function error.
	Fail(String),
	/// Sleeps before answering as `then`.
	Delay(Duration, Box<Behavior>),
	/// Answers hit-count requests (limit zero) as `then` and fails every page fetch.
	CountOnly(Box<Behavior>),
}
impl Behavior {
	/// Ranked list of `count` ids named `{prefix}-{n}`.
	pub fn ranked(prefix: &str, count: usize) -> Self {
		Self::Ranked((0..count).map(|n| format!("{prefix}-{n}")).collect())
	}

	pub fn delayed(self, delay: Duration) -> Self {
		Self::Delay(delay, Box::new(self))
	}

	pub fn count_only(self) -> Self {
		Self::CountOnly(Box::new(self))
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
	pub worker: String,
	pub request: SearchRequest,
}

/// Shard worker double keyed by worker reference. Unknown workers fail.
#[derive(Debug, Default)]
pub struct ScriptedWorker {
	behaviors: HashMap<String, Behavior>,
	calls: Mutex<Vec<RecordedCall>>,
}
impl ScriptedWorker {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with(mut self, worker: &str, behavior: Behavior) -> Self {
		self.behaviors.insert(worker.to_string(), behavior);

		self
	}

	pub fn calls(&self) -> Vec<RecordedCall> {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub fn requests_to(&self, worker: &str) -> Vec<SearchRequest> {
		self.calls()
			.into_iter()
			.filter(|call| call.worker == worker)
			.map(|call| call.request)
			.collect()
	}
}
impl ShardWorker for ScriptedWorker {
	fn search<'a>(
		&'a self,
		worker: &'a str,
		request: &'a SearchRequest,
	) -> BoxFuture<'a, pod_providers::Result<SearchResponse>> {
		Box::pin(async move {
			self.calls
				.lock()
				.unwrap_or_else(|err| err.into_inner())
				.push(RecordedCall { worker: worker.to_string(), request: request.clone() });

			let mut behavior = self.behaviors.get(worker).ok_or_else(|| {
				pod_providers::Error::Function { message: format!("Unknown worker {worker}.") }
			})?;

			loop {
				match behavior {
					Behavior::Ranked(ids) => return Ok(ranked_response(ids, request)),
					Behavior::Fail(message) => {
						return Err(pod_providers::Error::Function { message: message.clone() });
					},
					Behavior::Delay(delay, then) => {
						tokio::time::sleep(*delay).await;

						behavior = then.as_ref();
					},
					Behavior::CountOnly(then) => {
						if request.limit > 0 {
							return Err(pod_providers::Error::Function {
								message: format!("Page fetch refused by {worker}."),
							});
						}

						behavior = then.as_ref();
					},
				}
			}
		})
	}
}

pub fn hit(id: &str) -> SearchHit {
	SearchHit {
		id: id.to_string(),
		sequential_episode_id_as_string: "1".to_string(),
		start_time_ms: 0,
		end_time_ms: 1_000,
		episode_published_unix_timestamp: 1_700_000_000_000,
		extra: Map::new(),
	}
}

/// Config with a local layout for [`TEST_SITE_ID`] and the given workers in shard order.
pub fn test_config(workers: &[&str]) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		site: Site { id: TEST_SITE_ID.to_string(), environment: "local".to_string() },
		storage: Storage {
			backend: "local".to_string(),
			root: Some(PathBuf::from("/tmp/pod-search-test")),
			base_url: None,
			timeout_ms: pod_config::DEFAULT_STORAGE_TIMEOUT_MS,
		},
		shards: Shards {
			workers: workers.iter().map(|worker| worker.to_string()).collect(),
			query_timeout_ms: pod_config::DEFAULT_QUERY_TIMEOUT_MS,
			warmup_timeout_ms: pod_config::DEFAULT_WARMUP_TIMEOUT_MS,
			warm_on_health_check: false,
		},
	}
}

/// Writes a manifest for `shard_count` shards over `total_episodes` where `layout` expects it.
pub async fn store_manifest(
	store: &dyn ObjectStore,
	layout: &KeyLayout,
	shard_count: u32,
	total_episodes: u64,
) -> Result<ShardManifest> {
	let ranges = calculate_shard_ranges(total_episodes, shard_count);
	let manifest = generate_shard_manifest(shard_count, &ranges, total_episodes, layout)?;

	store.put(&layout.shard_manifest_key(), manifest.to_vec()?).await?;

	Ok(manifest)
}

fn ranked_response(ids: &[String], request: &SearchRequest) -> SearchResponse {
	let hits = ids
		.iter()
		.skip(request.offset as usize)
		.take(request.limit as usize)
		.map(|id| hit(id))
		.collect();

	SearchResponse {
		hits,
		total_hits: ids.len() as u64,
		processing_time_ms: 1,
		query: request.query.clone(),
		sort_by: request.sort_by.clone(),
		sort_order: request.sort_order,
		sharding_metadata: None,
	}
}
