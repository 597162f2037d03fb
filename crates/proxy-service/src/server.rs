//! HTTP server for the relayer submission API.
//!
//! Relayers submit signed transfer requests here; the engine performs the
//! actual authorization and execution. The HTTP layer does no validation
//! of its own beyond decoding, so every engine error maps onto a status
//! code and a JSON error body.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::{IntoResponse, Json},
	routing::{get, post},
	Router,
};
use proxy_config::ApiConfig;
use proxy_core::{TransferError, TransferExecutor};
use proxy_registry::{AdminController, AdminError};
use proxy_token::TokenError;
use proxy_types::{parse_address, PermitData, TransferRequest};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Reference to the engine for processing submissions.
	pub executor: Arc<TransferExecutor>,
	/// Reference to the owner-gated registry mutators.
	pub admin: Arc<AdminController>,
}

/// Starts the HTTP server for the submission API.
pub async fn start_server(
	api_config: ApiConfig,
	executor: Arc<TransferExecutor>,
	admin: Arc<AdminController>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app_state = AppState { executor, admin };

	let app = Router::new()
		.nest(
			"/api",
			Router::new()
				.route("/transfers/direct", post(handle_direct_transfer))
				.route("/transfers/permit", post(handle_permit_transfer))
				.route("/nonce/{address}", get(handle_get_nonce))
				.route(
					"/tokens/{address}/permit-support",
					get(handle_permit_support),
				)
				.route("/admin/relayers", post(handle_set_relayer))
				.route("/admin/tokens", post(handle_set_token)),
		)
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(app_state);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Proxy API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

/// A direct-path submission: the sender has pre-approved the proxy.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DirectSubmission {
	request: TransferRequest,
	/// 65-byte transfer signature, hex encoded.
	signature: String,
	/// Address of the submitting relayer.
	relayer: String,
}

/// A permit-path submission bundling the delegated-approval signature.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PermitSubmission {
	request: TransferRequest,
	signature: String,
	permit_data: PermitData,
	relayer: String,
}

/// An admin registry mutation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdminSubmission {
	/// Must be the configured owner.
	caller: String,
	address: String,
	enabled: bool,
}

fn bad_request(message: impl Into<String>) -> (StatusCode, Json<serde_json::Value>) {
	(
		StatusCode::BAD_REQUEST,
		Json(serde_json::json!({ "error": message.into() })),
	)
}

fn decode_signature(hex_signature: &str) -> Result<Vec<u8>, (StatusCode, Json<serde_json::Value>)> {
	let stripped = hex_signature
		.strip_prefix("0x")
		.unwrap_or(hex_signature);
	hex::decode(stripped).map_err(|e| bad_request(format!("Invalid signature encoding: {}", e)))
}

/// Maps engine errors onto HTTP status codes.
fn status_for(error: &TransferError) -> StatusCode {
	match error {
		TransferError::SignatureInvalid
		| TransferError::RequestExpired { .. }
		| TransferError::AllowanceInsufficient { .. } => StatusCode::BAD_REQUEST,
		TransferError::RelayerUnauthorized(_) => StatusCode::FORBIDDEN,
		TransferError::NonceMismatch { .. } => StatusCode::CONFLICT,
		TransferError::TokenUnsupported(_) | TransferError::PermitUnsupported(_) => {
			StatusCode::UNPROCESSABLE_ENTITY
		},
		TransferError::TransferFailed(TokenError::InsufficientBalance)
		| TransferError::TransferFailed(TokenError::InsufficientAllowance) => {
			StatusCode::UNPROCESSABLE_ENTITY
		},
		TransferError::TransferFailed(_) => StatusCode::BAD_GATEWAY,
	}
}

fn engine_error(error: TransferError) -> (StatusCode, Json<serde_json::Value>) {
	(
		status_for(&error),
		Json(serde_json::json!({ "error": error.to_string() })),
	)
}

/// Handles POST /api/transfers/direct.
async fn handle_direct_transfer(
	State(state): State<AppState>,
	Json(submission): Json<DirectSubmission>,
) -> impl IntoResponse {
	let relayer = match parse_address(&submission.relayer) {
		Ok(address) => address,
		Err(e) => return bad_request(e.to_string()).into_response(),
	};
	let signature = match decode_signature(&submission.signature) {
		Ok(bytes) => bytes,
		Err(response) => return response.into_response(),
	};

	match state
		.executor
		.process_direct_gasless_transfer(&submission.request, &signature, relayer)
		.await
	{
		Ok(()) => Json(serde_json::json!({
			"status": "completed",
			"nonce": submission.request.nonce,
		}))
		.into_response(),
		Err(e) => {
			tracing::warn!(error = %e, "Direct transfer rejected");
			engine_error(e).into_response()
		},
	}
}

/// Handles POST /api/transfers/permit.
async fn handle_permit_transfer(
	State(state): State<AppState>,
	Json(submission): Json<PermitSubmission>,
) -> impl IntoResponse {
	let relayer = match parse_address(&submission.relayer) {
		Ok(address) => address,
		Err(e) => return bad_request(e.to_string()).into_response(),
	};
	let signature = match decode_signature(&submission.signature) {
		Ok(bytes) => bytes,
		Err(response) => return response.into_response(),
	};

	match state
		.executor
		.process_permit_based_gasless_transfer(
			&submission.request,
			&signature,
			&submission.permit_data,
			relayer,
		)
		.await
	{
		Ok(()) => Json(serde_json::json!({
			"status": "completed",
			"nonce": submission.request.nonce,
		}))
		.into_response(),
		Err(e) => {
			tracing::warn!(error = %e, "Permit transfer rejected");
			engine_error(e).into_response()
		},
	}
}

/// Handles GET /api/nonce/{address}: the next expected nonce, which a
/// sender embeds in its next request.
async fn handle_get_nonce(
	Path(address): Path<String>,
	State(state): State<AppState>,
) -> impl IntoResponse {
	match parse_address(&address) {
		Ok(account) => {
			let nonce = state.executor.current_nonce(account).await;
			Json(serde_json::json!({ "nonce": nonce })).into_response()
		},
		Err(e) => bad_request(e.to_string()).into_response(),
	}
}

/// Handles GET /api/tokens/{address}/permit-support.
async fn handle_permit_support(
	Path(address): Path<String>,
	State(state): State<AppState>,
) -> impl IntoResponse {
	let token = match parse_address(&address) {
		Ok(token) => token,
		Err(e) => return bad_request(e.to_string()).into_response(),
	};
	match state.executor.check_permit_support(token).await {
		Ok(supported) => Json(serde_json::json!({ "supported": supported })).into_response(),
		Err(e) => engine_error(e).into_response(),
	}
}

fn admin_error(error: AdminError) -> (StatusCode, Json<serde_json::Value>) {
	(
		StatusCode::FORBIDDEN,
		Json(serde_json::json!({ "error": error.to_string() })),
	)
}

/// Handles POST /api/admin/relayers.
async fn handle_set_relayer(
	State(state): State<AppState>,
	Json(submission): Json<AdminSubmission>,
) -> impl IntoResponse {
	let (caller, relayer) = match (
		parse_address(&submission.caller),
		parse_address(&submission.address),
	) {
		(Ok(caller), Ok(relayer)) => (caller, relayer),
		(Err(e), _) | (_, Err(e)) => return bad_request(e.to_string()).into_response(),
	};
	match state
		.admin
		.set_relayer_authorization(caller, relayer, submission.enabled)
		.await
	{
		Ok(()) => Json(serde_json::json!({ "status": "updated" })).into_response(),
		Err(e) => admin_error(e).into_response(),
	}
}

/// Handles POST /api/admin/tokens.
async fn handle_set_token(
	State(state): State<AppState>,
	Json(submission): Json<AdminSubmission>,
) -> impl IntoResponse {
	let (caller, token) = match (
		parse_address(&submission.caller),
		parse_address(&submission.address),
	) {
		(Ok(caller), Ok(token)) => (caller, token),
		(Err(e), _) | (_, Err(e)) => return bad_request(e.to_string()).into_response(),
	};
	match state
		.admin
		.set_token_support(caller, token, submission.enabled)
		.await
	{
		Ok(()) => Json(serde_json::json!({ "status": "updated" })).into_response(),
		Err(e) => admin_error(e).into_response(),
	}
}
