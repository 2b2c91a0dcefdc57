//! Wire types exchanged between clients, the orchestrator and shard workers.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::partition::ShardId;

pub const DEFAULT_LIMIT: u32 = 10;
pub const DEFAULT_SEARCH_FIELD: &str = "text";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
	Asc,
	#[default]
	Desc,
}
impl SortOrder {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Asc => "ASC",
			Self::Desc => "DESC",
		}
	}
}
impl fmt::Display for SortOrder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for SortOrder {
	type Err = String;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw {
			"ASC" => Ok(Self::Asc),
			"DESC" => Ok(Self::Desc),
			other => Err(format!("sortOrder must be ASC or DESC, got {other:?}.")),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
	#[serde(default)]
	pub query: String,
	#[serde(default = "default_limit")]
	pub limit: u32,
	#[serde(default)]
	pub offset: u32,
	#[serde(default = "default_search_fields")]
	pub search_fields: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sort_by: Option<String>,
	#[serde(default)]
	pub sort_order: SortOrder,
	#[serde(default)]
	pub is_health_check_only: bool,
	/// Asks workers to re-download their index file. Passed through untouched.
	#[serde(default, rename = "forceFreshDBFileDownload")]
	pub force_fresh_db_file_download: bool,
}
impl SearchRequest {
	pub fn new(query: impl Into<String>) -> Self {
		Self { query: query.into(), ..Self::default() }
	}

	/// Lightweight request used to keep shard workers warm.
	pub fn health_check() -> Self {
		Self { is_health_check_only: true, ..Self::default() }
	}

	/// Copy of this request addressed to a different page.
	pub fn with_page(&self, limit: u32, offset: u32) -> Self {
		Self { limit, offset, ..self.clone() }
	}
}
impl Default for SearchRequest {
	fn default() -> Self {
		Self {
			query: String::new(),
			limit: DEFAULT_LIMIT,
			offset: 0,
			search_fields: default_search_fields(),
			sort_by: None,
			sort_order: SortOrder::Desc,
			is_health_check_only: false,
			force_fresh_db_file_download: false,
		}
	}
}

/// One ranked transcript segment. Fields beyond the required ones are carried through as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
	pub id: String,
	pub sequential_episode_id_as_string: String,
	pub start_time_ms: i64,
	pub end_time_ms: i64,
	pub episode_published_unix_timestamp: i64,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Indexed transcript segment as produced by the ingestion pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEntry {
	pub id: String,
	pub sequential_episode_id_as_string: String,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
impl SearchEntry {
	pub fn sequential_episode_id(&self) -> Option<i64> {
		self.sequential_episode_id_as_string.trim().parse().ok()
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
	pub hits: Vec<SearchHit>,
	pub total_hits: u64,
	#[serde(default)]
	pub processing_time_ms: u64,
	#[serde(default)]
	pub query: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sort_by: Option<String>,
	#[serde(default)]
	pub sort_order: SortOrder,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sharding_metadata: Option<ShardingMetadata>,
}
impl SearchResponse {
	pub fn empty(query: impl Into<String>, processing_time_ms: u64) -> Self {
		Self {
			hits: Vec::new(),
			total_hits: 0,
			processing_time_ms,
			query: query.into(),
			sort_by: None,
			sort_order: SortOrder::Desc,
			sharding_metadata: None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShardingMetadata {
	pub is_sharded_response: bool,
	pub queried_shards: Vec<ShardId>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub failed_shards: Option<Vec<ShardId>>,
	pub partial: bool,
}

fn default_limit() -> u32 {
	DEFAULT_LIMIT
}

fn default_search_fields() -> Vec<String> {
	vec![DEFAULT_SEARCH_FIELD.to_string()]
}
