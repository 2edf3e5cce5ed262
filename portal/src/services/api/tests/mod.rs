//! HTTP-level tests against an in-process axum backend.

mod bank_accounts;
mod portal;

use super::ApiClient;
use crate::app::events::{event_channel, AppEvent};
use crate::config::PortalConfig;
use crate::services::token_store::{MemoryTokenStore, TokenStore};
use async_channel::Receiver;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

/// Serve `router` on an ephemeral port and return its base URL.
pub(super) async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

pub(super) fn config(base_url: &str) -> PortalConfig {
    PortalConfig {
        api_base_url: base_url.to_string(),
        ws_url: format!("{}/api/ws/notifications", base_url.replacen("http://", "ws://", 1)),
        ..Default::default()
    }
}

pub(super) fn client(base_url: &str, tokens: Arc<MemoryTokenStore>) -> (ApiClient, Receiver<AppEvent>) {
    let (tx, rx) = event_channel();
    let tokens: Arc<dyn TokenStore> = tokens;
    let client = ApiClient::new(&config(base_url), tokens).unwrap().with_events(tx);
    (client, rx)
}

pub(super) fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

pub(super) fn user_json(id: &str) -> Value {
    json!({
        "id": id,
        "email": "jane@example.com",
        "firstName": "Jane",
        "lastName": "Doe",
        "kycStatus": "VERIFIED",
        "emailVerified": true,
        "role": "CLIENT"
    })
}

pub(super) fn ok(data: Value) -> Response {
    Json(json!({ "data": data })).into_response()
}

pub(super) fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}
