use std::collections::HashMap;

use axum::{
	Json, Router,
	extract::{Query, State},
	http::{
		HeaderValue, StatusCode,
		header::{
			ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
			ACCESS_CONTROL_ALLOW_ORIGIN,
		},
	},
	middleware,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;
use serde_json::Value;

use pod_domain::SearchResponse;
use pod_service::{Error as ServiceError, InboundRequest};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/search", get(search_query).post(search_body).options(preflight))
		.route("/invoke", post(invoke))
		.layer(middleware::map_response(with_cors))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search_query(
	State(state): State<AppState>,
	Query(params): Query<HashMap<String, String>>,
) -> Result<Json<SearchResponse>, ApiError> {
	search(&state, InboundRequest::Query(params)).await
}

async fn search_body(
	State(state): State<AppState>,
	body: String,
) -> Result<Json<SearchResponse>, ApiError> {
	search(&state, InboundRequest::Body(body)).await
}

async fn invoke(
	State(state): State<AppState>,
	body: String,
) -> Result<Json<SearchResponse>, ApiError> {
	let payload: Value = serde_json::from_str(&body).map_err(|err| ServiceError::InvalidRequest {
		message: format!("Invocation payload is not valid JSON: {err}."),
	})?;

	search(&state, InboundRequest::Direct(payload)).await
}

async fn preflight() -> Json<SearchResponse> {
	Json(pod_service::preflight_response())
}

async fn search(
	state: &AppState,
	inbound: InboundRequest,
) -> Result<Json<SearchResponse>, ApiError> {
	let request = pod_service::parse_inbound(inbound)?;
	let response = state.service.search(request).await?;

	Ok(Json(response))
}

async fn with_cors(mut response: Response) -> Response {
	let headers = response.headers_mut();

	headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
	headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET, POST, OPTIONS"));
	headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type"));

	response
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: &'static str,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: &'static str, message: impl Into<String>) -> Self {
		Self { status, error_code, message: message.into() }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let message = err.to_string();

		match err {
			ServiceError::InvalidRequest { .. } => {
				Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message)
			},
			ServiceError::Configuration { .. } => {
				tracing::error!(error = %message, "Search is misconfigured.");

				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR", message)
			},
			ServiceError::ManifestLoad { .. } => {
				Self::new(StatusCode::SERVICE_UNAVAILABLE, "MANIFEST_UNAVAILABLE", message)
			},
			ServiceError::AllShardsFailed { .. } => {
				Self::new(StatusCode::BAD_GATEWAY, "ALL_SHARDS_FAILED", message)
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code.to_string(), message: self.message };

		(self.status, Json(body)).into_response()
	}
}
