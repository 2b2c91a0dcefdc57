//! Episode-range partitioning of a site's transcript corpus.
//!
//! Episodes carry a monotonic, 1-indexed sequential id. A corpus of `total_episodes` is split
//! into `shard_count` contiguous ranges; the last range is open-ended so any id past the
//! current total still lands on a shard.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::search::SearchEntry;

/// 1-indexed shard identifier.
pub type ShardId = u32;

/// Inclusive episode-id range owned by one shard. `end_id == None` marks the last shard.
///
/// Serialized as the pair `[start_id, end_id | null]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u64, Option<u64>)", into = "(u64, Option<u64>)")]
pub struct EpisodeRange {
	pub start_id: u64,
	pub end_id: Option<u64>,
}
impl EpisodeRange {
	pub fn new(start_id: u64, end_id: Option<u64>) -> Self {
		Self { start_id, end_id }
	}

	pub fn contains(&self, episode_id: u64) -> bool {
		match self.end_id {
			Some(end_id) => episode_id >= self.start_id && episode_id <= end_id,
			None => episode_id >= self.start_id,
		}
	}

	/// Number of episodes in `[1, total_episodes]` that fall inside this range.
	pub fn episode_count(&self, total_episodes: u64) -> u64 {
		let end = self.end_id.map_or(total_episodes, |end_id| end_id.min(total_episodes));

		(end + 1).saturating_sub(self.start_id)
	}
}
impl From<(u64, Option<u64>)> for EpisodeRange {
	fn from((start_id, end_id): (u64, Option<u64>)) -> Self {
		Self { start_id, end_id }
	}
}
impl From<EpisodeRange> for (u64, Option<u64>) {
	fn from(range: EpisodeRange) -> Self {
		(range.start_id, range.end_id)
	}
}

/// Splits `total_episodes` into `shard_count` contiguous ranges of `ceil(total / count)`
/// episodes each. The last range absorbs the remainder and is unbounded.
///
/// A `shard_count` of zero is treated as one.
pub fn calculate_shard_ranges(total_episodes: u64, shard_count: u32) -> Vec<EpisodeRange> {
	if shard_count <= 1 {
		return vec![EpisodeRange::new(1, None)];
	}

	let count = u64::from(shard_count);
	let per_shard = total_episodes.div_ceil(count);

	(0..count)
		.map(|i| {
			let start_id = i * per_shard + 1;
			let end_id = if i == count - 1 { None } else { Some((i + 1) * per_shard) };

			EpisodeRange::new(start_id, end_id)
		})
		.collect()
}

/// Returns the 1-indexed shard owning `episode_id`, or `None` for ids below 1.
pub fn get_shard_for_episode(episode_id: i64, ranges: &[EpisodeRange]) -> Option<ShardId> {
	let episode_id = u64::try_from(episode_id).ok().filter(|id| *id >= 1)?;

	ranges
		.iter()
		.position(|range| range.contains(episode_id))
		.and_then(|index| ShardId::try_from(index + 1).ok())
}

/// Buckets entries by owning shard. Every shard gets a slot, even when it ends up empty.
pub fn group_entries_by_shard(
	entries: Vec<SearchEntry>,
	ranges: &[EpisodeRange],
) -> BTreeMap<ShardId, Vec<SearchEntry>> {
	let mut grouped: BTreeMap<ShardId, Vec<SearchEntry>> = (1..=ranges.len())
		.filter_map(|id| ShardId::try_from(id).ok())
		.map(|id| (id, Vec::new()))
		.collect();

	for entry in entries {
		let Some(sequential_id) = entry.sequential_episode_id() else {
			tracing::warn!(
				entry_id = %entry.id,
				raw_id = %entry.sequential_episode_id_as_string,
				"Entry has an unparseable sequential episode id. Skipping."
			);

			continue;
		};
		let Some(shard_id) = get_shard_for_episode(sequential_id, ranges) else {
			tracing::warn!(
				entry_id = %entry.id,
				sequential_id,
				"Entry does not belong to any shard. Skipping."
			);

			continue;
		};

		if let Some(bucket) = grouped.get_mut(&shard_id) {
			bucket.push(entry);
		}
	}

	grouped
}

pub fn log_sharding_config(ranges: &[EpisodeRange]) {
	if ranges.len() <= 1 {
		tracing::info!("Running in single mode without sharding.");

		return;
	}

	tracing::info!(shard_count = ranges.len(), "Running in sharded mode.");

	for (index, range) in ranges.iter().enumerate() {
		let end = range.end_id.map_or_else(|| "∞".to_string(), |end_id| end_id.to_string());

		tracing::info!(shard_id = index + 1, "Shard covers episodes {}-{end}.", range.start_id);
	}
}
