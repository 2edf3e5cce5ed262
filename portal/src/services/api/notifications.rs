//! # Notification Endpoints

use super::client::ApiClient;
use crate::core::error::Result;
use reqwest::Method;
use shared::{Notification, UnreadCount};

/// Most recent `limit` notifications, newest first.
pub async fn list_notifications(client: &ApiClient, limit: u32) -> Result<Vec<Notification>> {
    client
        .get_query("/api/notifications", &[("limit", limit)])
        .await
}

pub async fn unread_count(client: &ApiClient) -> Result<u64> {
    let count: UnreadCount = client.get("/api/notifications/unread-count").await?;
    Ok(count.count)
}

pub async fn mark_read(client: &ApiClient, id: &str) -> Result<()> {
    client
        .send_unit(Method::PUT, &format!("/api/notifications/{}/read", id), |b| b)
        .await
}

pub async fn mark_all_read(client: &ApiClient) -> Result<()> {
    client
        .send_unit(Method::PUT, "/api/notifications/read-all", |b| b)
        .await
}

pub async fn delete_notification(client: &ApiClient, id: &str) -> Result<()> {
    client
        .send_unit(Method::DELETE, &format!("/api/notifications/{}", id), |b| b)
        .await
}
