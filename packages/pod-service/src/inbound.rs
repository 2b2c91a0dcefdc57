//! Normalizes the request shapes callers send into one [`SearchRequest`].

use std::collections::HashMap;

use serde_json::{Map, Value};

use pod_domain::{DEFAULT_LIMIT, DEFAULT_SEARCH_FIELD, SearchRequest, SortOrder};

use crate::{Error, Result};

#[derive(Debug, Clone)]
pub enum InboundRequest {
	/// Query-string parameters of a GET request.
	Query(HashMap<String, String>),
	/// Raw body of a POST request. An empty body means all defaults.
	Body(String),
	/// Direct invocation with a JSON object, optionally wrapped as `{ "body": ... }`.
	Direct(Value),
}

pub fn parse_inbound(inbound: InboundRequest) -> Result<SearchRequest> {
	match inbound {
		InboundRequest::Query(params) => from_query(&params),
		InboundRequest::Body(body) if body.trim().is_empty() => Ok(SearchRequest::default()),
		InboundRequest::Body(body) => {
			let value = serde_json::from_str(&body)
				.map_err(|err| invalid(format!("Request body is not valid JSON: {err}.")))?;

			from_value(value)
		},
		InboundRequest::Direct(value) => from_value(unwrap_envelope(value)?),
	}
}

fn from_query(params: &HashMap<String, String>) -> Result<SearchRequest> {
	let search_fields: Vec<String> = params
		.get("fields")
		.map(|raw| {
			raw.split(',')
				.map(str::trim)
				.filter(|field| !field.is_empty())
				.map(str::to_string)
				.collect()
		})
		.unwrap_or_default();

	Ok(SearchRequest {
		query: params.get("query").cloned().unwrap_or_default(),
		limit: parse_count(params, "limit", DEFAULT_LIMIT)?,
		offset: parse_count(params, "offset", 0)?,
		search_fields: if search_fields.is_empty() {
			vec![DEFAULT_SEARCH_FIELD.to_string()]
		} else {
			search_fields
		},
		sort_by: params.get("sortBy").filter(|value| !value.is_empty()).cloned(),
		sort_order: match params.get("sortOrder").map(String::as_str) {
			None | Some("") => SortOrder::default(),
			Some(raw) => raw.parse::<SortOrder>().map_err(invalid)?,
		},
		is_health_check_only: flag(params, "isHealthCheckOnly"),
		force_fresh_db_file_download: flag(params, "forceFreshDBFileDownload"),
	})
}

fn parse_count(params: &HashMap<String, String>, name: &str, default: u32) -> Result<u32> {
	match params.get(name).map(|raw| raw.trim()) {
		None | Some("") => Ok(default),
		Some(raw) => raw
			.parse()
			.map_err(|_| invalid(format!("{name} must be a non-negative integer, got {raw:?}."))),
	}
}

fn flag(params: &HashMap<String, String>, name: &str) -> bool {
	params.get(name).is_some_and(|value| value == "true")
}

fn unwrap_envelope(value: Value) -> Result<Value> {
	let Value::Object(mut object) = value else {
		return Err(invalid("Direct invocation payload must be a JSON object.".to_string()));
	};

	if object.contains_key("query") {
		return Ok(Value::Object(object));
	}

	match object.remove("body") {
		Some(Value::String(body)) if body.trim().is_empty() => Ok(Value::Object(Map::new())),
		Some(Value::String(body)) => serde_json::from_str(&body)
			.map_err(|err| invalid(format!("Wrapped body is not valid JSON: {err}."))),
		Some(body) => Ok(body),
		None => Ok(Value::Object(object)),
	}
}

fn from_value(value: Value) -> Result<SearchRequest> {
	let Value::Object(mut object) = value else {
		return Err(invalid("Search request must be a JSON object.".to_string()));
	};

	// Explicit nulls behave like missing fields.
	object.retain(|_, field| !field.is_null());

	serde_json::from_value(Value::Object(object)).map_err(|err| invalid(err.to_string()))
}

fn invalid(message: String) -> Error {
	Error::InvalidRequest { message }
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn query(pairs: &[(&str, &str)]) -> InboundRequest {
		InboundRequest::Query(
			pairs.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect(),
		)
	}

	#[test]
	fn query_parameters_map_onto_request() {
		let request = parse_inbound(query(&[
			("query", "lightning"),
			("limit", "5"),
			("offset", "15"),
			("fields", "text, title,,"),
			("sortBy", "episodePublishedUnixTimestamp"),
			("sortOrder", "ASC"),
			("isHealthCheckOnly", "false"),
		]))
		.expect("parse failed");

		assert_eq!(request.query, "lightning");
		assert_eq!(request.limit, 5);
		assert_eq!(request.offset, 15);
		assert_eq!(request.search_fields, vec!["text".to_string(), "title".to_string()]);
		assert_eq!(request.sort_by.as_deref(), Some("episodePublishedUnixTimestamp"));
		assert_eq!(request.sort_order, SortOrder::Asc);
		assert!(!request.is_health_check_only);
	}

	#[test]
	fn missing_query_parameters_use_defaults() {
		let request = parse_inbound(query(&[])).expect("parse failed");

		assert_eq!(request, SearchRequest::default());
	}

	#[test]
	fn explicit_zero_limit_is_kept() {
		let request = parse_inbound(query(&[("limit", "0")])).expect("parse failed");

		assert_eq!(request.limit, 0);
	}

	#[test]
	fn bad_numbers_and_sort_orders_are_rejected() {
		assert!(matches!(
			parse_inbound(query(&[("limit", "ten")])),
			Err(Error::InvalidRequest { .. })
		));
		assert!(matches!(
			parse_inbound(query(&[("offset", "-3")])),
			Err(Error::InvalidRequest { .. })
		));
		assert!(matches!(
			parse_inbound(query(&[("sortOrder", "sideways")])),
			Err(Error::InvalidRequest { .. })
		));
	}

	#[test]
	fn post_body_and_empty_body() {
		let request = parse_inbound(InboundRequest::Body(
			r#"{"query":"nostr","limit":3,"offset":6,"sortBy":null}"#.to_string(),
		))
		.expect("parse failed");

		assert_eq!(request.query, "nostr");
		assert_eq!(request.limit, 3);
		assert_eq!(request.offset, 6);
		assert_eq!(request.sort_by, None);
		assert_eq!(
			parse_inbound(InboundRequest::Body(String::new())).expect("parse failed"),
			SearchRequest::default()
		);
		assert!(matches!(
			parse_inbound(InboundRequest::Body("{".to_string())),
			Err(Error::InvalidRequest { .. })
		));
	}

	#[test]
	fn direct_payloads_accept_bare_and_wrapped_objects() {
		let bare = parse_inbound(InboundRequest::Direct(json!({ "query": "mining" })))
			.expect("parse failed");
		let wrapped = parse_inbound(InboundRequest::Direct(json!({
			"body": { "isHealthCheckOnly": true }
		})))
		.expect("parse failed");
		let wrapped_string = parse_inbound(InboundRequest::Direct(json!({
			"body": "{\"query\":\"halving\",\"forceFreshDBFileDownload\":true}"
		})))
		.expect("parse failed");

		assert_eq!(bare.query, "mining");
		assert!(wrapped.is_health_check_only);
		assert_eq!(wrapped_string.query, "halving");
		assert!(wrapped_string.force_fresh_db_file_download);
		assert!(matches!(
			parse_inbound(InboundRequest::Direct(json!(["not", "an", "object"]))),
			Err(Error::InvalidRequest { .. })
		));
	}
}
