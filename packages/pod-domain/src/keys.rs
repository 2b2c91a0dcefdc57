//! Storage key convention shared by the indexer and the orchestrator.
//!
//! Local development stores every site in one tree, so keys are prefixed with
//! `sites/{site_id}/`. Remote buckets are already site-scoped and use bare keys.

use std::str::FromStr;

use crate::{Error, Result, partition::ShardId};

const SEARCH_INDEX_DIR: &str = "search-index";
const SHARD_MANIFEST_FILE: &str = "shard-manifest.json";
const SHARD_INDEX_FILE: &str = "orama_index.msp";

/// Parsed from the `site.environment` config value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageEnvironment {
	Local,
	Remote,
}
impl FromStr for StorageEnvironment {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self> {
		match raw {
			"local" => Ok(Self::Local),
			"remote" => Ok(Self::Remote),
			other => Err(Error::InvalidEnvironment { value: other.to_string() }),
		}
	}
}

#[derive(Debug, Clone)]
pub struct KeyLayout {
	environment: StorageEnvironment,
	site_id: String,
}
impl KeyLayout {
	pub fn new(environment: StorageEnvironment, site_id: impl Into<String>) -> Self {
		Self { environment, site_id: site_id.into() }
	}

	pub fn site_id(&self) -> &str {
		&self.site_id
	}

	pub fn shard_manifest_key(&self) -> String {
		self.scoped(&format!("{SEARCH_INDEX_DIR}/{SHARD_MANIFEST_FILE}"))
	}

	pub fn shard_index_key(&self, shard_id: ShardId) -> Result<String> {
		if shard_id < 1 {
			return Err(Error::InvalidShardId { shard_id });
		}

		Ok(self.scoped(&format!("{SEARCH_INDEX_DIR}/shard-{shard_id}/{SHARD_INDEX_FILE}")))
	}

	fn scoped(&self, key: &str) -> String {
		match self.environment {
			StorageEnvironment::Local => format!("sites/{}/{key}", self.site_id),
			StorageEnvironment::Remote => key.to_string(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn local_keys_are_site_scoped() {
		let layout = KeyLayout::new(StorageEnvironment::Local, "hardfork");

		assert_eq!(layout.shard_manifest_key(), "sites/hardfork/search-index/shard-manifest.json");
		assert_eq!(
			layout.shard_index_key(2).expect("valid shard id"),
			"sites/hardfork/search-index/shard-2/orama_index.msp"
		);
	}

	#[test]
	fn remote_keys_are_bare() {
		let layout = KeyLayout::new(StorageEnvironment::Remote, "hardfork");

		assert_eq!(layout.shard_manifest_key(), "search-index/shard-manifest.json");
		assert_eq!(
			layout.shard_index_key(1).expect("valid shard id"),
			"search-index/shard-1/orama_index.msp"
		);
	}

	#[test]
	fn parses_environment_names() {
		assert_eq!("local".parse::<StorageEnvironment>().ok(), Some(StorageEnvironment::Local));
		assert_eq!("remote".parse::<StorageEnvironment>().ok(), Some(StorageEnvironment::Remote));
		assert!(matches!(
			"staging".parse::<StorageEnvironment>(),
			Err(Error::InvalidEnvironment { .. })
		));
	}

	#[test]
	fn rejects_shard_zero() {
		let layout = KeyLayout::new(StorageEnvironment::Remote, "hardfork");

		assert!(matches!(layout.shard_index_key(0), Err(Error::InvalidShardId { shard_id: 0 })));
	}
}
