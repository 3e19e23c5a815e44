//! Drives the standard stack end to end through the hyper service adapter.

use std::time::Duration;

use apikit::classify::{verify_error, VerifyError};
use apikit::middleware::{Stack, X_REQUEST_ID};
use apikit::reply::{self, ErrorEnvelope};
use apikit::{Request, Response};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Method, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::service::Service;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct Transfer {
    public_key: String,
    amount: u64,
}

#[derive(Serialize)]
struct Receipt {
    amount: u64,
}

async fn app(mut req: Request) -> Response {
    if req.path() == "/panic" {
        panic!("handler bug");
    }
    if req.path() == "/slow" {
        let ctx = req.context().clone();
        ctx.done().await;
        return match ctx.err() {
            Some(err) => reply::error(StatusCode::GATEWAY_TIMEOUT, &err.to_string()),
            None => reply::error(StatusCode::OK, "unreachable"),
        };
    }

    let transfer: Transfer = match req.json().await {
        Ok(t) => t,
        Err(err) => return verify_error(req.context(), &err),
    };
    if transfer.public_key != "k1" {
        return verify_error(req.context(), &VerifyError::NotVerified);
    }
    reply::ok(StatusCode::CREATED, &Receipt { amount: transfer.amount })
}

async fn send(
    method: Method,
    path: &str,
    body: &'static str,
) -> (StatusCode, http::HeaderMap, serde_json::Value) {
    let service = apikit::into_service(
        Stack::new()
            .timeout(Duration::from_millis(20))
            .body_limit(64)
            .wrap(app),
    );
    let req = http::Request::builder()
        .method(method)
        .uri(path)
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap();

    let res = service.call(req).await.unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let body = res.into_body().collect().await.unwrap().to_bytes();
    (status, headers, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn success_envelope() {
    let (status, headers, body) =
        send(Method::POST, "/transfer", r#"{"public_key":"k1","amount":5}"#).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(headers[CONTENT_TYPE], "application/json");
    assert!(!headers[X_REQUEST_ID].is_empty());
    assert_eq!(body, serde_json::json!({ "amount": 5 }));
}

#[tokio::test]
async fn verification_failure_is_unauthorized() {
    let (status, headers, body) =
        send(Method::POST, "/transfer", r#"{"public_key":"k2","amount":5}"#).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers[CONTENT_TYPE], "application/json");
    let envelope: ErrorEnvelope = serde_json::from_value(body).unwrap();
    assert_eq!(envelope.error, "failed to verify message");
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let (status, _, body) = send(Method::POST, "/transfer", "{").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("invalid request: "));
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let big = r#"{"public_key":"k1","amount":5,"memo":"this memo pushes the body past sixty-four bytes"}"#;
    let (status, _, body) = send(Method::POST, "/transfer", big).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, serde_json::json!({ "error": "request body too large" }));
}

#[tokio::test]
async fn deadline_reaches_the_handler() {
    let (status, headers, body) = send(Method::GET, "/slow", "").await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert!(headers.contains_key(X_REQUEST_ID));
    assert_eq!(body, serde_json::json!({ "error": "deadline exceeded" }));
}

#[tokio::test]
async fn panics_become_internal_errors() {
    let (status, _, body) = send(Method::GET, "/panic", "").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, serde_json::json!({ "error": "internal error" }));
}
