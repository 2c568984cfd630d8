//! Integration tests for the HTTP API router.

mod common;

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use common::test_engine;
use termlink::server::{AppState, router};

fn test_router() -> Router {
    let state = Arc::new(AppState {
        engine: test_engine(&["Generated Title"]),
    });
    router(state)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_create_term_then_snapshot_reflects_it() {
    let app = test_router();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/terms",
            json!({"canonicalTerm": "Machine Learning", "standaloneTitle": "Machine Learning"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let term = body_json(response).await;
    assert_eq!(term["canonicalTerm"], "Machine Learning");

    let response = app.oneshot(get_request("/api/snapshot")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let snapshot = body_json(response).await;
    assert_eq!(snapshot["version"], 1);
    assert_eq!(snapshot["entryCount"], 1);
}

#[tokio::test]
async fn test_empty_canonical_term_is_bad_request() {
    let app = test_router();
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/terms",
            json!({"canonicalTerm": "  ", "standaloneTitle": "Title"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("canonical term"));
}

#[tokio::test]
async fn test_term_responses_carry_existing_aliases() {
    let app = test_router();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/terms",
            json!({"canonicalTerm": "Machine Learning", "standaloneTitle": "Machine Learning"}),
        ))
        .await
        .unwrap();
    let term = body_json(response).await;
    let id = term["id"].as_u64().unwrap();

    app.clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/terms/{id}/aliases"),
            json!({"aliases": ["ML"]}),
        ))
        .await
        .unwrap();

    // An update response reflects the aliases the term already has
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/terms/{id}"),
            json!({"standaloneTitle": "ML Basics"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["standaloneTitle"], "ML Basics");
    let aliases = updated["aliases"].as_array().unwrap();
    assert_eq!(aliases.len(), 1);
    assert_eq!(aliases[0]["aliasTerm"], "ML");

    // So does the idempotent create of the same term
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/terms",
            json!({"canonicalTerm": "machine learning", "standaloneTitle": "Other"}),
        ))
        .await
        .unwrap();
    let existing = body_json(response).await;
    assert_eq!(existing["id"].as_u64().unwrap(), id);
    assert_eq!(existing["aliases"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_null_description_clears_it() {
    let app = test_router();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/terms",
            json!({
                "canonicalTerm": "Tensor",
                "standaloneTitle": "Tensor",
                "description": "A multilinear map"
            }),
        ))
        .await
        .unwrap();
    let term = body_json(response).await;
    let id = term["id"].as_u64().unwrap();
    assert_eq!(term["description"], "A multilinear map");

    // An update without the field keeps the description
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/terms/{id}"),
            json!({"standaloneTitle": "Tensors"}),
        ))
        .await
        .unwrap();
    let updated = body_json(response).await;
    assert_eq!(updated["description"], "A multilinear map");

    // An explicit null clears it, and the field drops from the body
    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/terms/{id}"),
            json!({"description": null}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = body_json(response).await;
    assert!(cleared.get("description").is_none());
}

#[tokio::test]
async fn test_rename_collision_is_bad_request() {
    let app = test_router();

    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/terms",
            json!({"canonicalTerm": "Tensor", "standaloneTitle": "Tensor"}),
        ))
        .await
        .unwrap();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/terms",
            json!({"canonicalTerm": "Gradient", "standaloneTitle": "Gradient"}),
        ))
        .await
        .unwrap();
    let gradient = body_json(response).await;
    let id = gradient["id"].as_u64().unwrap();

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/terms/{id}"),
            json!({"canonicalTerm": "tensor"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn test_update_unknown_term_is_not_found() {
    let app = test_router();
    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/terms/42",
            json!({"standaloneTitle": "New Title"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_resolve_endpoint_returns_camel_case_links() {
    let app = test_router();

    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/terms",
            json!({"canonicalTerm": "tensor", "standaloneTitle": "Tensor"}),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/articles/a1/resolve",
            json!({"content": "A tensor appears."}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let links = body["links"].as_array().unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0]["term"], "tensor");
    assert_eq!(links[0]["startIndex"], 2);
    assert_eq!(links[0]["endIndex"], 8);
    assert_eq!(links[0]["type"], "term");
    assert_eq!(links[0]["standaloneTitle"], "Tensor");
}

#[tokio::test]
async fn test_override_roundtrip_through_api() {
    let app = test_router();

    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/terms",
            json!({"canonicalTerm": "tensor", "standaloneTitle": "Tensor"}),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/articles/a1/overrides",
            json!({"term": "tensor", "action": {"type": "disabled"}}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/articles/a1/resolve",
            json!({"content": "A tensor appears."}),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert!(body["links"].as_array().unwrap().is_empty());

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/articles/a1/overrides/tensor")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_generate_headings_caches_and_renders() {
    let app = test_router();
    let content = "## Deep Dive\n\nBody text.";

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/articles/a1/headings/generate",
            json!({"content": content, "articleTitle": "An Article"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let titles = body_json(response).await;
    assert_eq!(titles["Deep Dive"], "Generated Title");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/articles/a1/render",
            json!({"content": content}),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(
        body["content"],
        "## [Deep Dive](/standalone?title=Generated%20Title)\n\nBody text."
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/articles/a1/headings")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["deleted"], 1);
}
