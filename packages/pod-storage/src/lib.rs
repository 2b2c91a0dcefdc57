//! Blob storage holding the shard manifest and per-shard index files.

pub mod http;
pub mod local;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use crate::{http::HttpObjectStore, local::LocalObjectStore};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait ObjectStore
where
	Self: Send + Sync,
{
	fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Vec<u8>>>;

	fn put<'a>(&'a self, key: &'a str, bytes: Vec<u8>) -> BoxFuture<'a, Result<()>>;
}

pub fn from_config(cfg: &pod_config::Storage) -> Result<Arc<dyn ObjectStore>> {
	match cfg.backend.as_str() {
		"local" => {
			let root = cfg
				.root
				.clone()
				.ok_or_else(|| Error::InvalidConfig("storage.root is not set.".to_string()))?;

			Ok(Arc::new(LocalObjectStore::new(root)))
		},
		"http" => {
			let base_url = cfg
				.base_url
				.clone()
				.ok_or_else(|| Error::InvalidConfig("storage.base_url is not set.".to_string()))?;

			Ok(Arc::new(HttpObjectStore::new(base_url, Duration::from_millis(cfg.timeout_ms))?))
		},
		other => Err(Error::InvalidConfig(format!("Unknown storage backend {other:?}."))),
	}
}

/// Rejects keys that are empty, absolute, or step outside the store root.
pub(crate) fn check_key(key: &str) -> Result<()> {
	let escapes = key.split('/').any(|segment| segment.is_empty() || segment == "..");

	if key.is_empty() || escapes {
		return Err(Error::InvalidKey(key.to_string()));
	}

	Ok(())
}
