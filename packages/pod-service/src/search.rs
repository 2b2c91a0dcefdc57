use std::time::Instant;

use tracing::Instrument;
use uuid::Uuid;

use pod_domain::{SearchRequest, SearchResponse, ShardId, ShardingMetadata};

use crate::{
	Error, PodService, Result,
	invoke::{self, FanOut, ShardResponse, ShardTarget},
	merge,
};

pub const PREFLIGHT_QUERY: &str = "preflight-check";
pub const HEALTH_CHECK_QUERY: &str = "health-check";

/// Shards ask for this many times the requested page on the first page.
const FIRST_PAGE_OVERFETCH: u32 = 2;

/// Answer to a CORS preflight. Touches neither storage nor workers.
pub fn preflight_response() -> SearchResponse {
	SearchResponse::empty(PREFLIGHT_QUERY, 0)
}

#[derive(Debug)]
struct Gathered {
	/// Shards whose hits take part in the merge.
	succeeded: Vec<ShardResponse>,
	/// Shards that answered the count round but were allocated nothing to fetch.
	idle: Vec<ShardResponse>,
	failed: Vec<ShardId>,
}

impl PodService {
	pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
		let span = tracing::info_span!(
			"search",
			request_id = %Uuid::new_v4(),
			query = %request.query,
			limit = request.limit,
			offset = request.offset,
		);

		self.search_inner(request).instrument(span).await
	}

	async fn search_inner(&self, request: SearchRequest) -> Result<SearchResponse> {
		let started = Instant::now();
		let targets = self.resolve_targets().await?;

		if request.is_health_check_only {
			return self.health_check(&targets, started).await;
		}

		tracing::info!(shards = targets.len(), "Searching shards.");

		let gathered = if request.offset == 0 {
			self.first_page(&targets, &request).await?
		} else {
			self.subsequent_page(&targets, &request).await?
		};

		Ok(respond(request, gathered, started))
	}

	/// Pairs each manifest shard with its configured worker.
	async fn resolve_targets(&self) -> Result<Vec<ShardTarget>> {
		let workers = &self.cfg.shards.workers;

		pod_config::validate_shards(&self.cfg.shards)?;

		let manifest =
			self.manifests.load(self.store.as_ref(), &self.layout.shard_manifest_key()).await?;

		if workers.len() < manifest.shards.len() {
			return Err(Error::Configuration {
				message: format!(
					"Manifest lists {} shards but only {} workers are configured.",
					manifest.shards.len(),
					workers.len()
				),
			});
		}
		if workers.len() > manifest.shards.len() {
			tracing::warn!(
				workers = workers.len(),
				shards = manifest.shards.len(),
				"Ignoring workers beyond the manifest shard count."
			);
		}

		Ok(manifest
			.shard_ids()
			.zip(workers)
			.map(|(shard_id, worker)| ShardTarget { shard_id, worker: worker.clone() })
			.collect())
	}

	async fn health_check(
		&self,
		targets: &[ShardTarget],
		started: Instant,
	) -> Result<SearchResponse> {
		if self.cfg.shards.warm_on_health_check {
			let request = SearchRequest::health_check();
			let calls: Vec<_> =
				targets.iter().map(|target| (target.clone(), request.clone())).collect();
			let results =
				invoke::invoke_all(self.worker.as_ref(), &calls, self.warmup_timeout()).await?;
			let warmed = results.iter().filter(|result| result.is_ok()).count();

			tracing::info!(warmed, shards = targets.len(), "Warmed shard workers.");
		}

		let mut response = SearchResponse::empty(HEALTH_CHECK_QUERY, elapsed_ms(started));

		response.sharding_metadata = Some(ShardingMetadata {
			is_sharded_response: true,
			queried_shards: Vec::new(),
			failed_shards: Some(Vec::new()),
			partial: false,
		});

		Ok(response)
	}

	/// Single round. Each shard returns twice the page so the merge has headroom.
	async fn first_page(
		&self,
		targets: &[ShardTarget],
		request: &SearchRequest,
	) -> Result<Gathered> {
		let shard_request =
			request.with_page(request.limit.saturating_mul(FIRST_PAGE_OVERFETCH), 0);
		let calls: Vec<_> =
			targets.iter().map(|target| (target.clone(), shard_request.clone())).collect();
		let results = invoke::invoke_all(self.worker.as_ref(), &calls, self.query_timeout()).await?;
		let FanOut { succeeded, failed } = FanOut::from(results);

		if succeeded.is_empty() {
			return Err(Error::AllShardsFailed { failed });
		}

		Ok(Gathered { succeeded, idle: Vec::new(), failed })
	}

	/// Two rounds: a hit count per shard, then a fetch of each shard's proportional slice.
	///
	/// The merged list is read from position zero because the fetch round already skipped
	/// each shard's share of the earlier pages.
	async fn subsequent_page(
		&self,
		targets: &[ShardTarget],
		request: &SearchRequest,
	) -> Result<Gathered> {
		let count_request = request.with_page(0, 0);
		let calls: Vec<_> =
			targets.iter().map(|target| (target.clone(), count_request.clone())).collect();
		let results = invoke::invoke_all(self.worker.as_ref(), &calls, self.query_timeout()).await?;
		let counts = FanOut::from(results);

		if counts.succeeded.is_empty() {
			return Err(Error::AllShardsFailed { failed: counts.failed });
		}

		let pages = merge::calculate_proportional_offsets(
			&counts.succeeded,
			request.offset,
			request.limit,
		);

		tracing::debug!(?pages, "Allocated shard pages.");

		let mut calls = Vec::new();
		let mut idle = Vec::new();

		for counted in counts.succeeded {
			match pages.get(&counted.shard_id) {
				Some(page) if page.limit > 0 => {
					if let Some(target) =
						targets.iter().find(|target| target.shard_id == counted.shard_id)
					{
						calls.push((target.clone(), request.with_page(page.limit, page.offset)));
					}
				},
				_ => idle.push(counted),
			}
		}

		let mut failed = counts.failed;

		if calls.is_empty() {
			return Ok(Gathered { succeeded: Vec::new(), idle, failed });
		}

		let results = invoke::invoke_all(self.worker.as_ref(), &calls, self.query_timeout()).await?;
		let fetched = FanOut::from(results);

		failed.extend(fetched.failed);
		failed.sort_unstable();

		if fetched.succeeded.is_empty() {
			return Err(Error::AllShardsFailed { failed });
		}

		Ok(Gathered { succeeded: fetched.succeeded, idle, failed })
	}
}

/// Merges from position zero on every page. Deep-page fetches arrive already offset per shard,
/// so skipping `request.offset` again here would drop a whole page of hits.
fn respond(request: SearchRequest, gathered: Gathered, started: Instant) -> SearchResponse {
	let Gathered { succeeded, idle, failed } = gathered;
	let hits = merge::merge_shard_results(&succeeded, request.limit as usize, 0);
	let total_hits = merge::calculate_total_hits(&succeeded) + merge::calculate_total_hits(&idle);
	let mut queried_shards: Vec<ShardId> =
		succeeded.iter().chain(&idle).map(|shard| shard.shard_id).collect();

	queried_shards.sort_unstable();

	let partial = !failed.is_empty();

	if partial {
		tracing::warn!(?failed, "Returning partial results.");
	}

	let processing_time_ms = elapsed_ms(started);

	tracing::info!(hits = hits.len(), total_hits, processing_time_ms, "Merged shard results.");

	SearchResponse {
		hits,
		total_hits,
		processing_time_ms,
		query: request.query,
		sort_by: request.sort_by,
		sort_order: request.sort_order,
		sharding_metadata: Some(ShardingMetadata {
			is_sharded_response: true,
			queried_shards,
			failed_shards: partial.then_some(failed),
			partial,
		}),
	}
}

fn elapsed_ms(started: Instant) -> u64 {
	started.elapsed().as_millis() as u64
}
