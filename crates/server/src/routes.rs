use axum::{
    extract::DefaultBodyLimit,
    routing::{get, put},
    Router,
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::state::AppState;

pub mod resources;

/// Build the application router: the four resource routes, with every other
/// method or path answered by a JSON 404.
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route(
            "/resource",
            get(resources::list_resources)
                .post(resources::create_resource)
                // `get` would otherwise answer HEAD too
                .head(resources::endpoint_not_found)
                .fallback(resources::endpoint_not_found),
        )
        .route(
            "/resource/:id",
            put(resources::update_resource)
                .delete(resources::delete_resource)
                .fallback(resources::endpoint_not_found),
        )
        .fallback(resources::endpoint_not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use service::resources::{ResourceStore, StoreOptions};
    use service::storage::MemoryBackend;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app_with(initial: &str, strict: bool) -> (Router, MemoryBackend) {
        let backend = MemoryBackend::with_bytes(initial.as_bytes());
        let store = ResourceStore::new(Arc::new(backend.clone()), StoreOptions { strict, op_timeout: None });
        (build_router(AppState::new(store, strict), 1024), backend)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: &str) -> (StatusCode, Value, Option<String>) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::from(body.to_string()))
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let content_type = res
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, body, content_type)
    }

    #[tokio::test]
    async fn full_crud_cycle() {
        let (app, _) = app_with("[]", true);

        let (status, body, ct) = send(&app, Method::POST, "/resource", r#"{"id":1,"name":"a","x":1}"#).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({"message": "Resource created successfully"}));
        assert_eq!(ct.as_deref(), Some("application/json"));

        let (status, body, _) = send(&app, Method::PUT, "/resource/1", r#"{"name":"b"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Resource updated successfully"}));

        let (status, body, _) = send(&app, Method::GET, "/resource", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{"id": 1, "name": "b", "x": 1}]));

        let (status, body, _) = send(&app, Method::DELETE, "/resource/1", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Resource deleted successfully"}));

        let (_, body, _) = send(&app, Method::GET, "/resource", "").await;
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn malformed_body_is_400_and_store_untouched() {
        let (app, backend) = app_with(r#"[{"id":1}]"#, true);
        for bad in ["not json", "[1,2]", "42", ""] {
            let (status, body, _) = send(&app, Method::POST, "/resource", bad).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({"error": "Invalid JSON data"}));
        }
        let (status, _, _) = send(&app, Method::PUT, "/resource/1", "{broken").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(backend.snapshot().await.unwrap(), br#"[{"id":1}]"#);
    }

    #[tokio::test]
    async fn unknown_routes_are_json_404() {
        let (app, _) = app_with("[]", true);
        let cases = [
            (Method::PATCH, "/resource"),
            (Method::GET, "/resource/1"),
            (Method::POST, "/resource/1"),
            (Method::PUT, "/resource"),
            (Method::GET, "/other"),
            (Method::DELETE, "/resource/1/extra"),
        ];
        for (method, uri) in cases {
            let (status, body, ct) = send(&app, method, uri, "").await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body, json!({"error": "Endpoint not found"}));
            assert_eq!(ct.as_deref(), Some("application/json"));
        }
    }

    #[tokio::test]
    async fn head_requests_are_404() {
        let (app, _) = app_with(r#"[{"id":1}]"#, true);
        for uri in ["/resource", "/resource?page=2", "/resource/1"] {
            let (status, body, ct) = send(&app, Method::HEAD, uri, "").await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(ct.as_deref(), Some("application/json"));
            // HEAD responses may have their body stripped
            assert!(body.is_null() || body == json!({"error": "Endpoint not found"}));
        }
    }

    #[tokio::test]
    async fn strict_mode_reports_bad_and_missing_ids() {
        let (app, backend) = app_with(r#"[{"id":1}]"#, true);

        let (status, body, _) = send(&app, Method::DELETE, "/resource/abc", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid resource id"}));

        let (status, body, _) = send(&app, Method::PUT, "/resource/999", r#"{"name":"z"}"#).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Resource not found"}));

        let (status, _, _) = send(&app, Method::DELETE, "/resource/999", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(backend.snapshot().await.unwrap(), br#"[{"id":1}]"#);
    }

    #[tokio::test]
    async fn lenient_mode_keeps_silent_noops() {
        let (app, backend) = app_with(r#"[{"id":1}]"#, false);

        let (status, _, _) = send(&app, Method::PUT, "/resource/abc", r#"{"name":"z"}"#).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _, _) = send(&app, Method::PUT, "/resource/999", r#"{"name":"z"}"#).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _, _) = send(&app, Method::DELETE, "/resource/abc", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(backend.snapshot().await.unwrap(), br#"[{"id":1}]"#);

        // leading-integer parse, like "1abc" -> 1
        let (status, _, _) = send(&app, Method::PUT, "/resource/1abc", r#"{"name":"y"}"#).await;
        assert_eq!(status, StatusCode::OK);
        let (_, body, _) = send(&app, Method::GET, "/resource", "").await;
        assert_eq!(body, json!([{"id": 1, "name": "y"}]));
    }

    #[tokio::test]
    async fn store_failures_are_opaque_500() {
        let (app, _) = app_with("{ corrupt", true);
        let (status, body, _) = send(&app, Method::GET, "/resource", "").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Internal Server Error"}));

        let (status, _, _) = send(&app, Method::POST, "/resource", r#"{"id":1}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn oversized_body_is_413() {
        let (app, _) = app_with("[]", true);
        let big = format!(r#"{{"id":1,"pad":"{}"}}"#, "x".repeat(4096));
        let (status, body, _) = send(&app, Method::POST, "/resource", &big).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body, json!({"error": "Payload too large"}));
    }
}
