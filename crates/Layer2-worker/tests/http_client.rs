//! HttpWorkerClient against an in-process axum worker
//!
//! `cargo test -p jobpilot-worker --test http_client`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use jobpilot_worker::{
    Credentials, HttpWorkerClient, StartTaskRequest, StatusSnapshot, WorkerClient, WorkerError,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Recorded {
    bodies: Vec<Value>,
    stopped: Vec<String>,
}

type Shared = Arc<Mutex<Recorded>>;

async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn run_task(State(rec): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    rec.lock().unwrap().bodies.push(body);
    Json(json!({ "task_id": "t-42" }))
}

async fn task_status(Path(id): Path<String>) -> impl IntoResponse {
    match id.as_str() {
        "t-42" => Json(json!({
            "status": "completed",
            "result": { "output": "Application submitted." }
        }))
        .into_response(),
        "t-running" => Json(json!({ "status": "running" })).into_response(),
        "t-broken" => Json(json!({ "status": "failed", "error": "browser crashed" })).into_response(),
        _ => (StatusCode::NOT_FOUND, "unknown task").into_response(),
    }
}

async fn stop_task(State(rec): State<Shared>, Path(id): Path<String>) -> StatusCode {
    rec.lock().unwrap().stopped.push(id);
    StatusCode::OK
}

fn worker_router(rec: Shared) -> Router {
    Router::new()
        .route("/run-task", post(run_task))
        .route("/task/{id}/status", get(task_status))
        .route("/task/{id}/stop", post(stop_task))
        .with_state(rec)
}

#[tokio::test]
async fn test_start_status_stop_round() {
    let rec: Shared = Arc::default();
    let base = spawn_server(worker_router(Arc::clone(&rec))).await;
    let client = HttpWorkerClient::new(base).unwrap();

    let request = StartTaskRequest::new("Apply to Backend Engineer at Acme")
        .with_credentials(Credentials::new("sk-test-key"));
    let task_id = client.start_task(&request).await.unwrap();
    assert_eq!(task_id, "t-42");

    let body = rec.lock().unwrap().bodies[0].clone();
    assert_eq!(body["task"], "Apply to Backend Engineer at Acme");
    assert_eq!(body["api_key"], "sk-test-key");

    let snapshot = client.task_status(&task_id).await.unwrap();
    assert_eq!(
        snapshot,
        StatusSnapshot::Completed(json!({ "output": "Application submitted." }))
    );

    assert_eq!(
        client.task_status("t-running").await.unwrap(),
        StatusSnapshot::Running
    );
    assert_eq!(
        client.task_status("t-broken").await.unwrap(),
        StatusSnapshot::Error("browser crashed".to_string())
    );

    client.stop_task(&task_id).await.unwrap();
    assert_eq!(rec.lock().unwrap().stopped, vec!["t-42".to_string()]);
}

#[tokio::test]
async fn test_unknown_task_is_not_found() {
    let base = spawn_server(worker_router(Arc::default())).await;
    let client = HttpWorkerClient::new(base).unwrap();

    let err = client.task_status("nope").await.unwrap_err();
    assert_eq!(err, WorkerError::NotFound("unknown task".to_string()));
}

#[tokio::test]
async fn test_start_server_error_carries_body() {
    let router = Router::new().route(
        "/run-task",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "worker crashed") }),
    );
    let base = spawn_server(router).await;
    let client = HttpWorkerClient::new(base).unwrap();

    let err = client
        .start_task(&StartTaskRequest::new("anything"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        WorkerError::ServerError {
            status: 500,
            body: "worker crashed".to_string()
        }
    );
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_start_without_task_id() {
    let router = Router::new().route("/run-task", post(|| async { Json(json!({ "ok": true })) }));
    let base = spawn_server(router).await;
    let client = HttpWorkerClient::new(base).unwrap();

    let err = client
        .start_task(&StartTaskRequest::new("anything"))
        .await
        .unwrap_err();
    assert_eq!(err, WorkerError::MissingTaskId);
}

#[tokio::test]
async fn test_unreachable_worker_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpWorkerClient::new(format!("http://{}", addr)).unwrap();
    let err = client.task_status("t-1").await.unwrap_err();
    assert!(matches!(err, WorkerError::Network(_)));
    assert!(err.is_transient());
}
