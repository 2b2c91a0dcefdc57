pub mod worker;

mod error;

pub use error::{Error, Result};
pub use worker::HttpShardWorker;

use std::{future::Future, pin::Pin};

use pod_domain::{SearchRequest, SearchResponse};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Transport to a shard's search worker. `worker` is the opaque reference configured for the
/// shard (a URL for the HTTP transport).
pub trait ShardWorker
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		worker: &'a str,
		request: &'a SearchRequest,
	) -> BoxFuture<'a, Result<SearchResponse>>;
}
