//! Integration tests for [`ComfyUIApi`] against a fake ComfyUI HTTP server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use comfyrun_comfyui::api::{ComfyUIApi, ComfyUIApiError};

/// Request bodies received by `POST /prompt`.
type Received = Arc<Mutex<Vec<Value>>>;

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff];

async fn spawn_app(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn accept_prompt(State(received): State<Received>, Json(body): Json<Value>) -> Json<Value> {
    received.lock().unwrap().push(body);
    Json(json!({ "prompt_id": "abc-123", "number": 4, "node_errors": {}, "queue_note": "server-field" }))
}

async fn reject_prompt() -> impl IntoResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": { "type": "prompt_outputs_failed_validation", "message": "Prompt outputs failed validation" },
            "node_errors": {}
        })),
    )
}

async fn history(Path(prompt_id): Path<String>) -> Json<Value> {
    Json(json!({
        prompt_id: {
            "outputs": { "9": { "images": [ { "filename": "a.png", "subfolder": "", "type": "output" } ] } }
        }
    }))
}

async fn view(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    let expected = [("filename", "a.png"), ("subfolder", "sub dir"), ("type", "output")];
    let matches = expected
        .iter()
        .all(|(k, v)| params.get(*k).map(String::as_str) == Some(*v));
    if matches {
        (StatusCode::OK, PNG_BYTES.to_vec())
    } else {
        (StatusCode::NOT_FOUND, b"no such file".to_vec())
    }
}

async fn fake_server() -> (ComfyUIApi, Received) {
    let received = Received::default();
    let app = Router::new()
        .route("/prompt", post(accept_prompt))
        .route("/history/{prompt_id}", get(history))
        .route("/view", get(view))
        .with_state(Arc::clone(&received));
    (ComfyUIApi::new(spawn_app(app).await), received)
}

// ---------------------------------------------------------------------------
// Test: submission with a client ID
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_returns_prompt_id_and_sends_client_id() {
    let (api, received) = fake_server().await;
    let workflow = json!({ "3": { "inputs": { "seed": 1 } } });

    let response = api.submit_workflow(&workflow, Some("client-1")).await.unwrap();

    assert_eq!(response.prompt_id, "abc-123");
    assert_eq!(response.number, 4);
    let bodies = received.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0], json!({ "prompt": workflow, "client_id": "client-1" }));
}

// ---------------------------------------------------------------------------
// Test: fire-and-forget submission omits client_id
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_without_client_id_omits_field() {
    let (api, received) = fake_server().await;
    let workflow = json!({ "3": { "inputs": {} } });

    api.submit_workflow(&workflow, None).await.unwrap();

    let bodies = received.lock().unwrap();
    assert!(bodies[0].get("client_id").is_none());
    assert_eq!(bodies[0]["prompt"], workflow);
}

// ---------------------------------------------------------------------------
// Test: raw submission keeps every field the server sent
// ---------------------------------------------------------------------------

#[tokio::test]
async fn raw_submission_returns_body_verbatim() {
    let (api, _) = fake_server().await;

    let response = api.submit_workflow_raw(&json!({}), None).await.unwrap();

    assert_eq!(
        response,
        json!({ "prompt_id": "abc-123", "number": 4, "node_errors": {}, "queue_note": "server-field" })
    );
}

// ---------------------------------------------------------------------------
// Test: rejected submission surfaces the response body
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rejected_submission_surfaces_body() {
    let base = spawn_app(Router::new().route("/prompt", post(reject_prompt))).await;
    let api = ComfyUIApi::new(base);

    let err = api.submit_workflow(&json!({}), None).await.unwrap_err();

    assert_eq!(err.response_body().map(|b| b.contains("prompt_outputs_failed_validation")), Some(true));
    assert_matches!(err, ComfyUIApiError::ApiError { status: 400, .. });
}

// ---------------------------------------------------------------------------
// Test: unreachable server is a transport error without a body
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unreachable_server_is_request_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = ComfyUIApi::new(format!("http://{addr}"));
    let err = api.submit_workflow(&json!({}), None).await.unwrap_err();

    assert!(err.response_body().is_none());
    assert_matches!(err, ComfyUIApiError::Request(_));
}

// ---------------------------------------------------------------------------
// Test: history lookup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn history_is_keyed_by_prompt_id() {
    let (api, _) = fake_server().await;

    let history = api.get_history("abc-123").await.unwrap();

    assert_eq!(
        history["abc-123"]["outputs"]["9"]["images"][0]["filename"],
        "a.png"
    );
}

// ---------------------------------------------------------------------------
// Test: image download passes the descriptor as query parameters
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_image_returns_raw_bytes() {
    let (api, _) = fake_server().await;

    let bytes = api.get_image("a.png", "sub dir", "output").await.unwrap();

    assert_eq!(bytes, PNG_BYTES);
}

#[tokio::test]
async fn get_image_not_found_is_api_error() {
    let (api, _) = fake_server().await;

    let err = api.get_image("missing.png", "", "output").await.unwrap_err();

    assert_matches!(err, ComfyUIApiError::ApiError { status: 404, ref body } if body == "no such file");
}
