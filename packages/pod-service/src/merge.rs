//! Rank-based merging of per-shard result lists.
//!
//! Workers score independently, so raw scores are not comparable across shards. Each list is
//! re-scored by rank position instead and the merged order follows that normalized score.

use std::collections::BTreeMap;

use pod_domain::{SearchHit, ShardId};

use crate::invoke::ShardResponse;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredHit {
	pub hit: SearchHit,
	pub normalized_score: f64,
}

/// Page a shard is asked for during the fetch round of a deep-page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardPage {
	pub offset: u32,
	pub limit: u32,
}

/// Scores hits by position: the first gets 1.0, the last 0.0, the rest evenly in between.
/// A single hit scores 1.0.
pub fn normalize_scores(hits: Vec<SearchHit>) -> Vec<ScoredHit> {
	let len = hits.len();

	hits.into_iter()
		.enumerate()
		.map(|(position, hit)| {
			let normalized_score =
				if len == 1 { 1.0 } else { 1.0 - position as f64 / (len - 1) as f64 };

			ScoredHit { hit, normalized_score }
		})
		.collect()
}

/// Interleaves shard lists by normalized score and returns `limit` hits starting at `offset`.
///
/// Ties keep shard order, then in-shard order.
pub fn merge_shard_results(
	shards: &[ShardResponse],
	limit: usize,
	offset: usize,
) -> Vec<SearchHit> {
	let mut scored: Vec<ScoredHit> =
		shards.iter().flat_map(|shard| normalize_scores(shard.response.hits.clone())).collect();

	scored.sort_by(|a, b| b.normalized_score.total_cmp(&a.normalized_score));

	scored.into_iter().skip(offset).take(limit).map(|scored| scored.hit).collect()
}

pub fn calculate_total_hits(shards: &[ShardResponse]) -> u64 {
	shards.iter().map(|shard| shard.response.total_hits).sum()
}

/// Splits a global page across shards in proportion to each shard's share of the total.
///
/// A shard holding `share = total_hits / grand_total` is asked for
/// `floor(offset * share)` as its offset and `ceil(limit * 2 * share)` as its limit. Every shard
/// gets an entry, so a shard that reported nothing is paged as `{ offset: 0, limit: 0 }`. An
/// empty grand total yields an empty map.
pub fn calculate_proportional_offsets(
	shards: &[ShardResponse],
	offset: u32,
	limit: u32,
) -> BTreeMap<ShardId, ShardPage> {
	let grand_total = u128::from(calculate_total_hits(shards));

	if grand_total == 0 {
		return BTreeMap::new();
	}

	shards
		.iter()
		.map(|shard| {
			let share = u128::from(shard.response.total_hits);
			let shard_offset = u128::from(offset) * share / grand_total;
			let shard_limit = (u128::from(limit) * 2 * share).div_ceil(grand_total);
			let page = ShardPage {
				offset: u32::try_from(shard_offset).unwrap_or(u32::MAX),
				limit: u32::try_from(shard_limit).unwrap_or(u32::MAX),
			};

			(shard.shard_id, page)
		})
		.collect()
}
