//! `HttpFetcher` against a local stub of the getUpdates endpoint.

use std::sync::{Arc, Mutex};

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use pollvisor::{Fetch, FetchError, FetchRequest, HttpFetcher, PollConfig, RawPayload};

type Seen = Arc<Mutex<Vec<Value>>>;

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/getUpdates")
}

fn fetcher<P>(endpoint: &str) -> HttpFetcher<P> {
    HttpFetcher::new(&PollConfig::new(endpoint)).unwrap()
}

#[tokio::test]
async fn sends_request_and_decodes_updates() {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route(
            "/getUpdates",
            post(|State(seen): State<Seen>, Json(body): Json<Value>| async move {
                seen.lock().unwrap().push(body);
                Json(json!({
                    "ok": true,
                    "result": [
                        {"update_id": 7, "message": {"text": "hi"}},
                        {"update_id": 8, "edited_message": {"text": "hey"}}
                    ]
                }))
            }),
        )
        .with_state(Arc::clone(&seen));
    let endpoint = spawn(app).await;

    let updates = fetcher::<RawPayload>(&endpoint)
        .fetch(FetchRequest {
            offset: 7,
            limit: 100,
            timeout_secs: 0,
        })
        .await
        .unwrap();

    assert_eq!(updates.iter().map(|u| u.id).collect::<Vec<_>>(), vec![7, 8]);
    assert!(updates[0].payload.contains_key("message"));
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        &[json!({"offset": 7, "limit": 100, "timeout": 0})]
    );
}

#[derive(Debug, Deserialize, PartialEq)]
struct Text {
    message: Message,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Message {
    text: String,
}

#[tokio::test]
async fn decodes_typed_payloads() {
    let app = Router::new().route(
        "/getUpdates",
        post(|| async {
            Json(json!({"ok": true, "result": [{"update_id": 1, "message": {"text": "typed"}}]}))
        }),
    );
    let endpoint = spawn(app).await;

    let updates = fetcher::<Text>(&endpoint)
        .fetch(FetchRequest {
            offset: 0,
            limit: 1,
            timeout_secs: 0,
        })
        .await
        .unwrap();
    assert_eq!(updates[0].payload.message.text, "typed");
}

#[tokio::test]
async fn rate_limit_carries_retry_after() {
    let app = Router::new().route(
        "/getUpdates",
        post(|| async {
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({
                    "ok": false,
                    "error_code": 429,
                    "description": "Too Many Requests: retry after 3",
                    "parameters": {"retry_after": 3}
                })),
            )
        }),
    );
    let endpoint = spawn(app).await;

    let err = fetcher::<RawPayload>(&endpoint)
        .fetch(FetchRequest {
            offset: 0,
            limit: 1,
            timeout_secs: 0,
        })
        .await
        .unwrap_err();
    assert_eq!(err.retry_after(), Some(std::time::Duration::from_secs(3)));
}

#[tokio::test]
async fn server_error_is_a_status_error() {
    let app = Router::new().route(
        "/getUpdates",
        post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
    );
    let endpoint = spawn(app).await;

    let err = fetcher::<RawPayload>(&endpoint)
        .fetch(FetchRequest {
            offset: 0,
            limit: 1,
            timeout_secs: 0,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 502, .. }), "{err:?}");
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = fetcher::<RawPayload>(&format!("http://{addr}/getUpdates"))
        .fetch(FetchRequest {
            offset: 0,
            limit: 1,
            timeout_secs: 0,
        })
        .await
        .unwrap_err();
    assert_eq!(err.as_label(), "fetch_transport");
}

#[cfg(feature = "server")]
#[tokio::test]
async fn gzip_bodies_are_decoded_transparently() {
    use axum::http::HeaderMap;
    use tower_http::compression::CompressionLayer;

    let app = Router::new()
        .route(
            "/getUpdates",
            post(|headers: HeaderMap| async move {
                let accepts = headers
                    .get("accept-encoding")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .contains("gzip");
                let text = if accepts { "gzip accepted" } else { "plain" };
                Json(json!({
                    "ok": true,
                    "result": [{"update_id": 3, "message": {"text": text, "padding": "x".repeat(256)}}]
                }))
            }),
        )
        .layer(CompressionLayer::new().gzip(true));
    let endpoint = spawn(app).await;

    let updates = fetcher::<Text>(&endpoint)
        .fetch(FetchRequest {
            offset: 0,
            limit: 1,
            timeout_secs: 0,
        })
        .await
        .unwrap();
    assert_eq!(updates[0].payload.message.text, "gzip accepted");
}
