use reqwest::Client;
use serde_json::Value;

use pod_domain::{SearchRequest, SearchResponse};

use crate::{BoxFuture, Error, Result, ShardWorker};

const MAX_ERROR_BODY_CHARS: usize = 512;

/// Posts the JSON search request to the worker URL and decodes the JSON response.
///
/// The client carries no timeout of its own; callers bound each call.
#[derive(Clone)]
pub struct HttpShardWorker {
	client: Client,
}
impl HttpShardWorker {
	pub fn new() -> Result<Self> {
		Ok(Self { client: Client::builder().build()? })
	}

	async fn post_search(&self, url: &str, request: &SearchRequest) -> Result<SearchResponse> {
		let res = self.client.post(url).json(request).send().await?;
		let status = res.status().as_u16();
		let body = res.bytes().await?;

		parse_worker_payload(status, &body)
	}
}
impl ShardWorker for HttpShardWorker {
	fn search<'a>(
		&'a self,
		worker: &'a str,
		request: &'a SearchRequest,
	) -> BoxFuture<'a, Result<SearchResponse>> {
		Box::pin(self.post_search(worker, request))
	}
}

/// Classifies a worker reply: HTTP failure, function-error envelope, empty body, or a search
/// response.
pub fn parse_worker_payload(status: u16, body: &[u8]) -> Result<SearchResponse> {
	if !(200..300).contains(&status) {
		let body = String::from_utf8_lossy(body).chars().take(MAX_ERROR_BODY_CHARS).collect();

		return Err(Error::Status { status, body });
	}
	if body.iter().all(u8::is_ascii_whitespace) {
		return Err(Error::EmptyPayload);
	}

	let value: Value = serde_json::from_slice(body).map_err(Error::MalformedPayload)?;

	if value.is_null() {
		return Err(Error::EmptyPayload);
	}
	if let Some(message) = function_error(&value) {
		return Err(Error::Function { message });
	}

	serde_json::from_value(value).map_err(Error::MalformedPayload)
}

fn function_error(value: &Value) -> Option<String> {
	let object = value.as_object()?;

	if let Some(message) = object.get("errorMessage").or_else(|| object.get("errorType")) {
		return Some(message.as_str().map_or_else(|| message.to_string(), str::to_string));
	}

	match object.get("error")? {
		Value::Null => None,
		Value::String(message) => Some(message.clone()),
		other => Some(other.to_string()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decodes_search_response() {
		let body = serde_json::json!({
			"hits": [{
				"id": "a",
				"sequentialEpisodeIdAsString": "3",
				"startTimeMs": 0,
				"endTimeMs": 500,
				"episodePublishedUnixTimestamp": 1
			}],
			"totalHits": 42,
			"processingTimeMs": 7,
			"query": "bitcoin",
			"sortOrder": "DESC"
		});
		let response =
			parse_worker_payload(200, body.to_string().as_bytes()).expect("parse failed");

		assert_eq!(response.total_hits, 42);
		assert_eq!(response.hits[0].id, "a");
	}

	#[test]
	fn reports_function_errors() {
		let body = br#"{"errorType":"Error","errorMessage":"index download failed"}"#;

		assert!(matches!(
			parse_worker_payload(200, body),
			Err(Error::Function { message }) if message == "index download failed"
		));
		assert!(matches!(
			parse_worker_payload(200, br#"{"errorType":"Runtime.ExitError"}"#),
			Err(Error::Function { message }) if message == "Runtime.ExitError"
		));
	}

	#[test]
	fn reports_empty_payloads() {
		assert!(matches!(parse_worker_payload(200, b""), Err(Error::EmptyPayload)));
		assert!(matches!(parse_worker_payload(200, b"null"), Err(Error::EmptyPayload)));
	}

	#[test]
	fn reports_malformed_payloads() {
		assert!(matches!(
			parse_worker_payload(200, b"{\"hits\":"),
			Err(Error::MalformedPayload(_))
		));
		assert!(matches!(
			parse_worker_payload(200, br#"{"hits":[]}"#),
			Err(Error::MalformedPayload(_))
		));
	}

	#[test]
	fn reports_http_failures_with_truncated_body() {
		let body = "x".repeat(2_000);
		let err = parse_worker_payload(502, body.as_bytes()).expect_err("expected status error");

		assert!(matches!(
			err,
			Error::Status { status: 502, body } if body.len() == MAX_ERROR_BODY_CHARS
		));
	}
}
