use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
	Error, Result,
	keys::KeyLayout,
	partition::{EpisodeRange, ShardId},
};

pub const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShardInfo {
	pub id: ShardId,
	pub episode_range: EpisodeRange,
	/// Object-store key of the shard's index file.
	pub index_path: String,
	#[serde(default)]
	pub episode_count: u64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub index_size_bytes: Option<u64>,
}

/// Shard topology of one site's search index. Written once per index build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShardManifest {
	pub version: u32,
	pub shard_count: u32,
	pub shards: Vec<ShardInfo>,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	pub total_episodes: u64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub site_id: Option<String>,
}
impl ShardManifest {
	pub fn from_slice(bytes: &[u8]) -> Result<Self> {
		let manifest: Self = serde_json::from_slice(bytes)?;

		manifest.validate()?;

		Ok(manifest)
	}

	pub fn to_vec(&self) -> Result<Vec<u8>> {
		Ok(serde_json::to_vec_pretty(self)?)
	}

	pub fn validate(&self) -> Result<()> {
		if self.version != MANIFEST_VERSION {
			return Err(Error::InvalidManifest {
				message: format!("unsupported version {}.", self.version),
			});
		}
		if self.shard_count == 0 {
			return Err(Error::InvalidManifest {
				message: "shardCount must be greater than zero.".to_string(),
			});
		}
		if self.shards.len() != self.shard_count as usize {
			return Err(Error::InvalidManifest {
				message: format!(
					"shardCount is {} but {} shards are listed.",
					self.shard_count,
					self.shards.len()
				),
			});
		}

		for (expected, shard) in (1..).zip(&self.shards) {
			if shard.id != expected {
				return Err(Error::InvalidManifest {
					message: format!("shard at position {expected} has id {}.", shard.id),
				});
			}
		}

		Ok(())
	}

	pub fn shard_ids(&self) -> impl Iterator<Item = ShardId> + '_ {
		self.shards.iter().map(|shard| shard.id)
	}

	pub fn ranges(&self) -> Vec<EpisodeRange> {
		self.shards.iter().map(|shard| shard.episode_range).collect()
	}
}

/// Describes `shard_count` shards over `ranges`, locating each shard's index through `layout`.
///
/// Episode counts are bounded by `total_episodes`, so a shard whose range starts past the
/// end of the corpus reports zero episodes.
pub fn generate_shard_manifest(
	shard_count: u32,
	ranges: &[EpisodeRange],
	total_episodes: u64,
	layout: &KeyLayout,
) -> Result<ShardManifest> {
	if ranges.len() != shard_count as usize {
		return Err(Error::InvalidManifest {
			message: format!("expected {shard_count} ranges, got {}.", ranges.len()),
		});
	}

	let shards = (1..)
		.zip(ranges)
		.map(|(id, range)| {
			Ok(ShardInfo {
				id,
				episode_range: *range,
				index_path: layout.shard_index_key(id)?,
				episode_count: range.episode_count(total_episodes),
				index_size_bytes: None,
			})
		})
		.collect::<Result<Vec<_>>>()?;

	Ok(ShardManifest {
		version: MANIFEST_VERSION,
		shard_count,
		shards,
		created_at: OffsetDateTime::now_utc(),
		total_episodes,
		site_id: Some(layout.site_id().to_string()),
	})
}
