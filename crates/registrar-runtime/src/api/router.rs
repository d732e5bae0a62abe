//! HTTP router.
//!
//! | Route | Auth | Success |
//! |-------|------|---------|
//! | `GET /index` | none | 200 |
//! | `POST /register` | optional API key | 202; 400 for a short name, 409 otherwise |
//! | `POST /issue_batch` | admin | 202 |
//! | `POST /check_zonefiles` | admin | 202 |
//! | `GET /status/:subdomain` | none | 200, 404 when unknown |
//! | `GET /list/:iterator` | none | 200 |
//! | `GET /v1/names/:fq_name` | none | 200, 404 when not submitted, 400 for an invalid or short label |

use super::handlers;
use crate::container::RegistrarContainer;
use axum::{
    routing::{get, post},
    Router,
};
use sr_03_admission::AdmissionApi;
use sr_04_batch_engine::BatchApi;
use sr_05_confirmation::ConfirmationApi;
use sr_06_status::StatusApi;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub admission: Arc<dyn AdmissionApi>,
    pub batch: Arc<dyn BatchApi>,
    pub confirmation: Arc<dyn ConfirmationApi>,
    pub status: Arc<dyn StatusApi>,
    pub admin_password: Arc<str>,
}

impl AppState {
    pub fn from_container(container: &RegistrarContainer) -> Self {
        Self {
            admission: container.admission.clone(),
            batch: container.batch.clone(),
            confirmation: container.confirmation.clone(),
            status: container.status.clone(),
            admin_password: Arc::from(container.config.http.admin_password.as_str()),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/index", get(handlers::index))
        .route("/register", post(handlers::register))
        .route("/issue_batch", post(handlers::issue_batch))
        .route("/issue_batch/", post(handlers::issue_batch))
        .route("/check_zonefiles", post(handlers::check_zonefiles))
        .route("/check_zonefiles/", post(handlers::check_zonefiles))
        .route("/status/:subdomain", get(handlers::status))
        .route("/list/:iterator", get(handlers::list))
        .route("/v1/names/:fq_name", get(handlers::name_info))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
