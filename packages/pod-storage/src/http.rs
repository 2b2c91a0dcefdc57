use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::{BoxFuture, Error, ObjectStore, Result};

/// Object store reached over plain HTTP `GET`/`PUT`, e.g. a bucket website endpoint or a
/// presigning proxy. Keys are appended to the base URL.
pub struct HttpObjectStore {
	client: Client,
	base_url: String,
}
impl HttpObjectStore {
	pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
		let client = Client::builder().timeout(timeout).build()?;

		Ok(Self { client, base_url: base_url.into().trim_end_matches('/').to_string() })
	}

	fn url(&self, key: &str) -> Result<String> {
		crate::check_key(key)?;

		Ok(format!("{}/{key}", self.base_url))
	}

	async fn fetch(&self, key: &str) -> Result<Vec<u8>> {
		let res = self.client.get(self.url(key)?).send().await?;

		if res.status() == StatusCode::NOT_FOUND {
			return Err(Error::NotFound(key.to_string()));
		}

		let bytes = res.error_for_status()?.bytes().await?;

		Ok(bytes.to_vec())
	}

	async fn upload(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
		self.client.put(self.url(key)?).body(bytes).send().await?.error_for_status()?;

		Ok(())
	}
}
impl ObjectStore for HttpObjectStore {
	fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
		Box::pin(self.fetch(key))
	}

	fn put<'a>(&'a self, key: &'a str, bytes: Vec<u8>) -> BoxFuture<'a, Result<()>> {
		Box::pin(self.upload(key, bytes))
	}
}
