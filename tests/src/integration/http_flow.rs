//! The lifecycle again, driven only through the HTTP surface.

use super::harness::{base_config, Registrar, DOMAIN};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use registrar_runtime::api::{build_router, AppState};
use serde_json::{json, Value};
use shared_types::testing::TEST_ADDRESSES;
use tower::ServiceExt;

const PASSWORD: &str = "s3cret";

async fn call(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn admin(path: &str) -> Request<Body> {
    Request::post(path)
        .header(header::AUTHORIZATION, format!("bearer {}", PASSWORD))
        .body(Body::empty())
        .unwrap()
}

fn status_of(name: &str) -> Request<Body> {
    Request::get(format!("/status/{}", name))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_http_lifecycle() {
    let mut config = base_config();
    config.http.admin_password = PASSWORD.into();
    config.admission.policy.ip_limit = 1;
    let r = Registrar::with_config(config);
    let router = build_router(AppState::from_container(&r.container));

    let register = |name: &str, owner: &str, ip: &str| {
        Request::post("/register")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-real-ip", ip)
            .body(Body::from(
                json!({ "name": name, "owner_address": owner, "zonefile": "$ORIGIN bar\n" })
                    .to_string(),
            ))
            .unwrap()
    };

    let (code, _) = call(&router, register("bar", TEST_ADDRESSES[0], "192.0.2.1")).await;
    assert_eq!(code, StatusCode::ACCEPTED);

    // Second registration from the same IP hits the limit.
    let (code, body) = call(&router, register("baz", TEST_ADDRESSES[1], "192.0.2.1")).await;
    assert_eq!(code, StatusCode::CONFLICT);
    assert_eq!(body["status"], false);

    let (code, body) = call(&router, status_of("bar")).await;
    assert_eq!(code, StatusCode::OK);
    assert!(body["status"].as_str().unwrap().starts_with("Subdomain is queued"));

    let (code, body) = call(&router, admin("/issue_batch/")).await;
    assert_eq!(code, StatusCode::ACCEPTED);
    assert_eq!(body["txid"], "tx-1");

    let (_, body) = call(
        &router,
        Request::get(format!("/v1/names/bar.{}", DOMAIN))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(body["status"], "submitted_subdomain");
    assert_eq!(body["last_txid"], "tx-1");

    r.chain.include_tx("tx-1", 100);
    r.set_height(107);
    let (code, body) = call(&router, admin("/check_zonefiles/")).await;
    assert_eq!(code, StatusCode::ACCEPTED);
    assert_eq!(body["report"]["finalized"], json!(["tx-1"]));

    r.chain
        .register_subdomain(&format!("bar.{}", DOMAIN), TEST_ADDRESSES[0]);
    let (code, body) = call(&router, status_of("bar")).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body, json!({ "status": "Subdomain propagated" }));

    let (code, body) = call(&router, status_of("baz")).await;
    assert_eq!(code, StatusCode::NOT_FOUND);
    assert_eq!(body["statusCode"], 404);
}
