#![cfg(feature = "server")]
//! The product listing through the full layer stack.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use pollvisor::{HttpServer, ProductList, ServerConfig};

fn app() -> axum::Router {
    HttpServer::new(ServerConfig::default()).unwrap().app()
}

#[tokio::test]
async fn listing_carries_cors_headers_for_the_allowed_origin() {
    let resp = app()
        .oneshot(
            Request::get("/products?offset=2")
                .header(header::ORIGIN, "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );
    assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");

    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let list: ProductList = serde_json::from_slice(&body).unwrap();
    assert_eq!(list.paginator.offset, 2);
    assert_eq!(list.products[0].price, "100");
}

#[tokio::test]
async fn other_origins_get_no_cors_grant() {
    let resp = app()
        .oneshot(
            Request::get("/products")
                .header(header::ORIGIN, "http://evil.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(!resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn preflight_allows_delete() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/products")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "DELETE")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let methods = resp.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .unwrap()
        .to_string();
    assert!(methods.contains("DELETE"), "{methods}");
}

#[tokio::test]
async fn large_enough_bodies_are_gzipped_on_request() {
    let resp = app()
        .oneshot(
            Request::get("/products")
                .header(header::ACCEPT_ENCODING, "gzip")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.headers()[header::CONTENT_ENCODING], "gzip");
}

#[tokio::test]
async fn bad_offset_is_rejected() {
    let resp = app()
        .oneshot(Request::get("/products?offset=x").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn gzip_encoded_requests_are_accepted() {
    let resp = app()
        .oneshot(
            Request::get("/products")
                .header(header::CONTENT_ENCODING, "gzip")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_request_encoding_is_unsupported() {
    let resp = app()
        .oneshot(
            Request::get("/products")
                .header(header::CONTENT_ENCODING, "compress")
                .body(Body::from("x"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn percent_encoded_and_negative_offsets_parse() {
    for (uri, want) in [("/products?offset=%31%32", 12), ("/products?offset=-1", -1)] {
        let resp = app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let list: ProductList = serde_json::from_slice(&body).unwrap();
        assert_eq!(list.paginator.offset, want, "{uri}");
    }
}
