//! Concurrent shard invocation with per-call deadlines.
//!
//! Every shard-level failure becomes data on the returned [`ShardResult`]; only an empty call
//! list is reported as an error.

use std::time::{Duration, Instant};

use futures::future;

use pod_domain::{SearchRequest, SearchResponse, ShardId};
use pod_providers::ShardWorker;

use crate::{Error, Result};

/// A shard paired with the worker reference that serves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardTarget {
	pub shard_id: ShardId,
	pub worker: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ShardInvocationError {
	#[error("Shard {shard_id} timed out after {timeout_ms} ms.")]
	Timeout { shard_id: ShardId, timeout_ms: u128 },
	#[error("Shard {shard_id} failed: {source}")]
	Worker {
		shard_id: ShardId,
		#[source]
		source: pod_providers::Error,
	},
}

#[derive(Debug)]
pub struct ShardResult {
	pub shard_id: ShardId,
	pub outcome: Result<SearchResponse, ShardInvocationError>,
}
impl ShardResult {
	pub fn is_ok(&self) -> bool {
		self.outcome.is_ok()
	}
}

/// A successful shard reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ShardResponse {
	pub shard_id: ShardId,
	pub response: SearchResponse,
}

/// Results of one round split into successes and failed shard ids, both in call order.
#[derive(Debug, Default)]
pub struct FanOut {
	pub succeeded: Vec<ShardResponse>,
	pub failed: Vec<ShardId>,
}
impl From<Vec<ShardResult>> for FanOut {
	fn from(results: Vec<ShardResult>) -> Self {
		let mut fan_out = Self::default();

		for ShardResult { shard_id, outcome } in results {
			match outcome {
				Ok(response) => fan_out.succeeded.push(ShardResponse { shard_id, response }),
				Err(_) => fan_out.failed.push(shard_id),
			}
		}

		fan_out
	}
}

pub async fn invoke_shard(
	worker: &dyn ShardWorker,
	target: &ShardTarget,
	request: &SearchRequest,
	timeout: Duration,
) -> ShardResult {
	let shard_id = target.shard_id;
	let started = Instant::now();

	tracing::debug!(shard_id, worker = %target.worker, "Invoking shard worker.");

	let outcome = match tokio::time::timeout(timeout, worker.search(&target.worker, request)).await
	{
		Ok(Ok(response)) => Ok(response),
		Ok(Err(source)) => Err(ShardInvocationError::Worker { shard_id, source }),
		Err(_) => Err(ShardInvocationError::Timeout { shard_id, timeout_ms: timeout.as_millis() }),
	};
	let elapsed_ms = started.elapsed().as_millis() as u64;

	match &outcome {
		Ok(response) => tracing::info!(
			shard_id,
			elapsed_ms,
			hits = response.hits.len(),
			total_hits = response.total_hits,
			"Shard completed."
		),
		Err(err) => tracing::warn!(shard_id, elapsed_ms, error = %err, "Shard failed."),
	}

	ShardResult { shard_id, outcome }
}

/// Runs every call concurrently and waits for all of them. A slow or failing shard never
/// cancels its siblings.
pub async fn invoke_all(
	worker: &dyn ShardWorker,
	calls: &[(ShardTarget, SearchRequest)],
	timeout: Duration,
) -> Result<Vec<ShardResult>> {
	if calls.is_empty() {
		return Err(Error::Configuration { message: "No shard workers to invoke.".to_string() });
	}

	let started = Instant::now();
	let results = future::join_all(
		calls.iter().map(|(target, request)| invoke_shard(worker, target, request, timeout)),
	)
	.await;
	let succeeded = results.iter().filter(|result| result.is_ok()).count();

	tracing::info!(
		elapsed_ms = started.elapsed().as_millis() as u64,
		succeeded,
		failed = results.len() - succeeded,
		"Shard round completed."
	);

	Ok(results)
}
