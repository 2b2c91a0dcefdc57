//! Partitions a search-entries export by episode range and publishes the shard manifest.

use std::{
	collections::{BTreeMap, BTreeSet},
	path::PathBuf,
};

use clap::Parser;
use color_eyre::eyre;

use pod_domain::{
	KeyLayout, SearchEntry, ShardId, ShardManifest, StorageEnvironment, calculate_shard_ranges,
	generate_shard_manifest, group_entries_by_shard, log_sharding_config,
};
use pod_storage::ObjectStore;

#[derive(Debug, Parser)]
#[command(
	version = pod_cli::VERSION,
	rename_all = "kebab",
	styles = pod_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// JSON array of search entries.
	#[arg(long, value_name = "FILE")]
	pub entries: PathBuf,
	#[arg(long, value_name = "N")]
	pub shard_count: u32,
	/// Defaults to the highest sequential episode id found in the entries.
	#[arg(long, value_name = "N")]
	pub total_episodes: Option<u64>,
}

/// Shard assignment computed from one entries export.
#[derive(Debug)]
pub struct IndexPlan {
	pub manifest: ShardManifest,
	pub entries_by_shard: BTreeMap<ShardId, Vec<SearchEntry>>,
}
impl IndexPlan {
	/// Distinct episodes routed to each shard.
	pub fn routed_episodes(&self) -> BTreeMap<ShardId, u64> {
		self.entries_by_shard
			.iter()
			.map(|(shard_id, entries)| {
				let episodes: BTreeSet<&str> = entries
					.iter()
					.map(|entry| entry.sequential_episode_id_as_string.as_str())
					.collect();

				(*shard_id, episodes.len() as u64)
			})
			.collect()
	}

	/// Shards whose manifest episode count differs from the episodes actually routed there.
	pub fn count_mismatches(&self) -> Vec<CountMismatch> {
		let routed = self.routed_episodes();

		self.manifest
			.shards
			.iter()
			.filter_map(|shard| {
				let routed_episodes = routed.get(&shard.id).copied().unwrap_or_default();

				(routed_episodes != shard.episode_count).then_some(CountMismatch {
					shard_id: shard.id,
					manifest_count: shard.episode_count,
					routed_episodes,
				})
			})
			.collect()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountMismatch {
	pub shard_id: ShardId,
	pub manifest_count: u64,
	pub routed_episodes: u64,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = pod_config::load(&args.config)?;

	pod_cli::init_tracing(&config.service.log_level);

	if args.shard_count == 0 {
		return Err(eyre::eyre!("--shard-count must be at least 1."));
	}

	let raw = tokio::fs::read(&args.entries).await.map_err(|err| {
		eyre::eyre!("Failed to read entries file {}: {err}.", args.entries.display())
	})?;
	let entries: Vec<SearchEntry> = serde_json::from_slice(&raw)?;
	let environment = config.site.environment.parse::<StorageEnvironment>()?;
	let layout = KeyLayout::new(environment, &config.site.id);

	tracing::info!(
		entries = entries.len(),
		path = %args.entries.display(),
		"Loaded search entries."
	);

	let plan = plan(entries, args.shard_count, args.total_episodes, &layout)?;

	for (shard_id, entries) in &plan.entries_by_shard {
		tracing::info!(shard_id, entries = entries.len(), "Assigned entries to shard.");
	}
	for mismatch in plan.count_mismatches() {
		tracing::warn!(
			shard_id = mismatch.shard_id,
			manifest_count = mismatch.manifest_count,
			routed_episodes = mismatch.routed_episodes,
			"Manifest episode count differs from routed episodes."
		);
	}

	let store = pod_storage::from_config(&config.storage)?;

	publish(store.as_ref(), &layout, &plan.manifest).await?;

	Ok(())
}

/// Computes ranges, groups `entries` and builds the manifest. Pure apart from logging.
pub fn plan(
	entries: Vec<SearchEntry>,
	shard_count: u32,
	total_episodes: Option<u64>,
	layout: &KeyLayout,
) -> pod_domain::Result<IndexPlan> {
	let total_episodes = total_episodes.unwrap_or_else(|| highest_episode_id(&entries));
	let ranges = calculate_shard_ranges(total_episodes, shard_count);

	log_sharding_config(&ranges);

	let entries_by_shard = group_entries_by_shard(entries, &ranges);
	let manifest = generate_shard_manifest(ranges.len() as u32, &ranges, total_episodes, layout)?;

	Ok(IndexPlan { manifest, entries_by_shard })
}

pub fn highest_episode_id(entries: &[SearchEntry]) -> u64 {
	entries
		.iter()
		.filter_map(SearchEntry::sequential_episode_id)
		.filter_map(|id| u64::try_from(id).ok())
		.max()
		.unwrap_or_default()
}

pub async fn publish(
	store: &dyn ObjectStore,
	layout: &KeyLayout,
	manifest: &ShardManifest,
) -> color_eyre::Result<()> {
	let key = layout.shard_manifest_key();

	store.put(&key, manifest.to_vec()?).await?;

	tracing::info!(
		%key,
		shard_count = manifest.shard_count,
		total_episodes = manifest.total_episodes,
		"Published shard manifest."
	);

	Ok(())
}
