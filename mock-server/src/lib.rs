use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};

/// Identification headers the server records from each request.
pub const RECORDED_HEADERS: [&str; 6] = [
    "device-id",
    "package-name",
    "app-type",
    "user-agent",
    "content-type",
    "accept",
];

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

pub type Log = Arc<RwLock<Vec<RecordedRequest>>>;

pub fn app() -> Router {
    let log: Log = Arc::new(RwLock::new(Vec::new()));
    Router::new()
        .route("/ping", get(ping))
        .route("/echo", post(echo))
        .route("/fail", get(fail).post(fail))
        .route("/empty-error", get(empty_error))
        .route("/requests", get(list_requests))
        .with_state(log)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn record(log: &Log, method: &Method, uri: &Uri, headers: &HeaderMap, body: String) {
    let headers = RECORDED_HEADERS
        .iter()
        .filter_map(|name| {
            headers
                .get(*name)
                .and_then(|v| v.to_str().ok())
                .map(|v| (name.to_string(), v.to_string()))
        })
        .collect();
    tracing::debug!(%method, path = uri.path(), "recorded request");
    log.write().await.push(RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body,
    });
}

async fn ping(
    State(log): State<Log>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Json<Value> {
    record(&log, &method, &uri, &headers, String::new()).await;
    Json(serde_json::json!({ "ok": true }))
}

async fn echo(
    State(log): State<Log>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Value>, StatusCode> {
    record(&log, &method, &uri, &headers, body.clone()).await;
    serde_json::from_str(&body)
        .map(Json)
        .map_err(|_| StatusCode::BAD_REQUEST)
}

async fn fail(
    State(log): State<Log>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, &'static str) {
    record(&log, &method, &uri, &headers, body).await;
    (StatusCode::INTERNAL_SERVER_ERROR, "err")
}

async fn empty_error(
    State(log): State<Log>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> StatusCode {
    record(&log, &method, &uri, &headers, String::new()).await;
    StatusCode::SERVICE_UNAVAILABLE
}

async fn list_requests(State(log): State<Log>) -> Json<Vec<RecordedRequest>> {
    Json(log.read().await.clone())
}
