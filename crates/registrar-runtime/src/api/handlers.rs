//! Route handlers.
//!
//! Bodies are JSON. Failures are `{"status": false, "message": ...}`.

use super::auth::{bearer_token, is_admin};
use super::router::AppState;
use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared_types::{
    QueueIndex, QueueRecord, RegistrarError, SpamReason, SubdomainOperation, Timestamp,
};
use sr_03_admission::AdmissionRequest;
use std::net::SocketAddr;
use tracing::{debug, error, warn};

pub const REGISTER_ACCEPTED: &str =
    "Your subdomain registration was received, and will be included in the blockchain soon.";
pub const REGISTER_REJECTED: &str = "Failed to validate your registration request.";
pub const REGISTER_UNPARSEABLE: &str =
    "Failed to parse your registration request: expected JSON";
pub const STATUS_FAILED: &str = "There was an error processing your request.";

/// Header set by the fronting proxy. Only trustworthy behind a proxy the
/// registrar controls.
const REAL_IP_HEADER: &str = "x-real-ip";

fn failure(code: StatusCode, message: impl Into<String>) -> Response {
    (
        code,
        Json(json!({ "status": false, "message": message.into() })),
    )
        .into_response()
}

fn unauthorized() -> Response {
    failure(StatusCode::UNAUTHORIZED, "Unauthorized")
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub owner_address: String,
    pub zonefile: String,
}

/// Queue record as listed by `/list`.
#[derive(Debug, Serialize)]
pub struct ListEntry {
    pub name: String,
    pub owner: String,
    pub sequence_number: u64,
    pub zonefile: String,
    pub signature: Option<String>,
    pub status: String,
    pub queue_index: QueueIndex,
    pub received_at: Timestamp,
}

impl From<QueueRecord> for ListEntry {
    fn from(record: QueueRecord) -> Self {
        let status = record.status.to_string();
        let SubdomainOperation {
            subdomain_name,
            owner,
            sequence_number,
            zonefile,
            signature,
        } = record.operation;
        Self {
            name: subdomain_name,
            owner,
            sequence_number,
            zonefile,
            signature,
            status,
            queue_index: record.queue_index,
            received_at: record.received_at,
        }
    }
}

/// Message returned for a rejected registration. Proof and name-length
/// failures are shown to the user; everything else is generic.
pub fn rejection_message(err: &RegistrarError) -> String {
    let user_facing = err.is_name_length()
        || matches!(
            err,
            RegistrarError::SpamRejected(
                SpamReason::InsufficientProofs { .. } | SpamReason::ProofResolution { .. }
            )
        );
    if user_facing {
        err.to_string()
    } else {
        REGISTER_REJECTED.to_string()
    }
}

fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    headers
        .get(REAL_IP_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}

pub async fn index() -> Json<serde_json::Value> {
    Json(json!({ "status": true }))
}

pub async fn register(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(error = %rejection, "Unparseable registration request");
            return failure(StatusCode::CONFLICT, REGISTER_UNPARSEABLE);
        }
    };

    let mut request = AdmissionRequest::new(SubdomainOperation::new_registration(
        body.name,
        body.owner_address,
        body.zonefile,
    ));
    request.ip_address = client_ip(&headers, peer.map(|ConnectInfo(addr)| addr));
    request.auth_token = bearer_token(&headers).map(str::to_string);

    let name = request.operation.subdomain_name.clone();
    match state.admission.admit(request).await {
        Ok(_) => (
            StatusCode::ACCEPTED,
            Json(json!({ "status": true, "message": REGISTER_ACCEPTED })),
        )
            .into_response(),
        Err(e) => {
            error!(%name, error = %e, "Registration rejected");
            let code = if e.is_name_length() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::CONFLICT
            };
            failure(code, rejection_message(&e))
        }
    }
}

pub async fn issue_batch(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !is_admin(&headers, &state.admin_password) {
        return unauthorized();
    }
    match state.batch.submit_batch().await {
        Ok(txid) => (
            StatusCode::ACCEPTED,
            Json(json!({ "status": true, "txid": txid })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to broadcast batch.");
            failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

pub async fn check_zonefiles(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !is_admin(&headers, &state.admin_password) {
        return unauthorized();
    }
    match state.confirmation.check_zonefiles().await {
        Ok(report) => (
            StatusCode::ACCEPTED,
            Json(json!({ "status": true, "report": report })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to check our zonefiles.");
            failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

pub async fn status(State(state): State<AppState>, Path(subdomain): Path<String>) -> Response {
    match state.status.status(&subdomain).await {
        Ok(status) => {
            let code = StatusCode::from_u16(status.status_code()).unwrap_or(StatusCode::OK);
            let body = if code == StatusCode::NOT_FOUND {
                json!({ "status": status.message(), "statusCode": code.as_u16() })
            } else {
                json!({ "status": status.message() })
            };
            (code, Json(body)).into_response()
        }
        Err(e) => {
            error!(name = %subdomain, error = %e, "Status lookup failed");
            failure(StatusCode::NOT_IMPLEMENTED, STATUS_FAILED)
        }
    }
}

pub async fn list(State(state): State<AppState>, Path(iterator): Path<String>) -> Response {
    let Ok(from_index) = iterator.parse::<QueueIndex>() else {
        return failure(StatusCode::BAD_REQUEST, "Invalid iterator");
    };
    match state.status.list(from_index).await {
        Ok(records) => {
            let entries: Vec<ListEntry> = records.into_iter().map(ListEntry::from).collect();
            Json(entries).into_response()
        }
        Err(e) => {
            error!(from_index, error = %e, "Listing failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, STATUS_FAILED)
        }
    }
}

pub async fn name_info(State(state): State<AppState>, Path(fq_name): Path<String>) -> Response {
    match state.status.subdomain_info(&fq_name).await {
        Ok(Some(info)) => Json(info).into_response(),
        Ok(None) => failure(StatusCode::NOT_FOUND, "Name not found"),
        Err(RegistrarError::InvalidOperation { .. }) => {
            failure(StatusCode::BAD_REQUEST, "Invalid name")
        }
        Err(e) => {
            error!(name = %fq_name, error = %e, "Name lookup failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, STATUS_FAILED)
        }
    }
}

/// Fallback for unknown routes.
pub async fn not_found() -> Response {
    debug!("Unknown route requested");
    failure(StatusCode::NOT_FOUND, "Not found")
}
