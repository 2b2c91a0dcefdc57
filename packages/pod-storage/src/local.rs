use std::{io::ErrorKind, path::PathBuf};

use crate::{BoxFuture, Error, ObjectStore, Result};

/// Object store backed by a directory tree. Keys map to relative file paths.
pub struct LocalObjectStore {
	root: PathBuf,
}
impl LocalObjectStore {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	async fn read(&self, key: &str) -> Result<Vec<u8>> {
		crate::check_key(key)?;

		let path = self.root.join(key);

		tokio::fs::read(&path).await.map_err(|err| match err.kind() {
			ErrorKind::NotFound => Error::NotFound(key.to_string()),
			_ => Error::Io { key: key.to_string(), source: err },
		})
	}

	async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
		crate::check_key(key)?;

		let path = self.root.join(key);

		if let Some(parent) = path.parent() {
			tokio::fs::create_dir_all(parent)
				.await
				.map_err(|err| Error::Io { key: key.to_string(), source: err })?;
		}

		tokio::fs::write(&path, bytes)
			.await
			.map_err(|err| Error::Io { key: key.to_string(), source: err })?;

		tracing::debug!(key, path = %path.display(), "Object written.");

		Ok(())
	}
}
impl ObjectStore for LocalObjectStore {
	fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
		Box::pin(self.read(key))
	}

	fn put<'a>(&'a self, key: &'a str, bytes: Vec<u8>) -> BoxFuture<'a, Result<()>> {
		Box::pin(self.write(key, bytes))
	}
}
