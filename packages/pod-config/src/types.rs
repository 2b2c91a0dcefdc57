use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 25_000;
pub const DEFAULT_WARMUP_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub site: Site,
	pub storage: Storage,
	pub shards: Shards,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Site {
	pub id: String,
	/// One of "local" or "remote". Local keys are prefixed with `sites/{id}/`.
	pub environment: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	/// One of "local" or "http".
	pub backend: String,
	/// Root directory of the local backend.
	pub root: Option<PathBuf>,
	/// Base URL of the http backend. Object keys are appended as path segments.
	pub base_url: Option<String>,
	#[serde(default = "default_storage_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Shards {
	/// Worker URLs in shard order: the first entry serves shard 1.
	pub workers: Vec<String>,
	#[serde(default = "default_query_timeout_ms")]
	pub query_timeout_ms: u64,
	#[serde(default = "default_warmup_timeout_ms")]
	pub warmup_timeout_ms: u64,
	#[serde(default)]
	pub warm_on_health_check: bool,
}

fn default_storage_timeout_ms() -> u64 {
	DEFAULT_STORAGE_TIMEOUT_MS
}

fn default_query_timeout_ms() -> u64 {
	DEFAULT_QUERY_TIMEOUT_MS
}

fn default_warmup_timeout_ms() -> u64 {
	DEFAULT_WARMUP_TIMEOUT_MS
}
