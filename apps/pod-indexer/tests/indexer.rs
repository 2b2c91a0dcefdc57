use serde_json::Map;

use pod_domain::{KeyLayout, SearchEntry, ShardManifest, StorageEnvironment};
use pod_indexer::CountMismatch;
use pod_storage::ObjectStore;
use pod_testkit::MemoryObjectStore;

fn entry(id: &str, episode: u64) -> SearchEntry {
	SearchEntry {
		id: id.to_string(),
		sequential_episode_id_as_string: episode.to_string(),
		extra: Map::new(),
	}
}

fn entries(episodes: impl IntoIterator<Item = u64>) -> Vec<SearchEntry> {
	episodes
		.into_iter()
		.flat_map(|episode| {
			[entry(&format!("{episode}-0"), episode), entry(&format!("{episode}-1"), episode)]
		})
		.collect()
}

fn layout() -> KeyLayout {
	KeyLayout::new(StorageEnvironment::Local, "hardfork")
}

#[test]
fn total_defaults_to_highest_episode_id() {
	let mut export = entries(1..=7);

	export.push(entry("stray", 0));

	assert_eq!(pod_indexer::highest_episode_id(&export), 7);

	let plan = pod_indexer::plan(export, 2, None, &layout()).expect("Failed to plan.");

	assert_eq!(plan.manifest.total_episodes, 7);
	assert_eq!(plan.manifest.shard_count, 2);
	assert_eq!(plan.entries_by_shard[&1].len(), 8);
	assert_eq!(plan.entries_by_shard[&2].len(), 6);
	assert!(plan.count_mismatches().is_empty());
}

#[test]
fn small_corpus_has_consistent_counts() {
	let plan = pod_indexer::plan(entries(1..=5), 3, Some(5), &layout()).expect("Failed to plan.");
	let counts: Vec<u64> = plan.manifest.shards.iter().map(|shard| shard.episode_count).collect();

	assert_eq!(counts, vec![2, 2, 1]);
	assert!(plan.count_mismatches().is_empty());
}

#[test]
fn missing_episodes_are_reported() {
	let plan = pod_indexer::plan(entries([1, 2, 4, 5, 6]), 2, Some(6), &layout())
		.expect("Failed to plan.");

	assert_eq!(
		plan.count_mismatches(),
		vec![CountMismatch { shard_id: 1, manifest_count: 3, routed_episodes: 2 }]
	);
}

#[test]
fn explicit_total_overrides_entries() {
	let plan =
		pod_indexer::plan(entries(1..=10), 4, Some(100), &layout()).expect("Failed to plan.");

	assert_eq!(plan.manifest.total_episodes, 100);
	assert_eq!(plan.manifest.shards[0].episode_range.end_id, Some(25));
	assert_eq!(plan.entries_by_shard[&1].len(), 20);
	assert!(plan.entries_by_shard[&4].is_empty());
}

#[tokio::test]
async fn publishes_manifest_under_the_manifest_key() {
	let store = MemoryObjectStore::new();
	let layout = layout();
	let plan = pod_indexer::plan(entries(1..=9), 3, None, &layout).expect("Failed to plan.");

	pod_indexer::publish(&store, &layout, &plan.manifest).await.expect("Failed to publish.");

	let bytes = store
		.get("sites/hardfork/search-index/shard-manifest.json")
		.await
		.expect("Manifest was not written.");
	let manifest = ShardManifest::from_slice(&bytes).expect("Failed to parse manifest.");

	assert_eq!(manifest, plan.manifest);
	assert_eq!(manifest.site_id.as_deref(), Some("hardfork"));
	assert_eq!(
		manifest.shards[2].index_path,
		"sites/hardfork/search-index/shard-3/orama_index.msp"
	);
}
