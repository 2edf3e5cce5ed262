//! # Transaction History Endpoints

use super::client::ApiClient;
use crate::core::error::Result;
use shared::{ListQuery, Page, Transaction};

pub async fn list_transactions(client: &ApiClient, query: &ListQuery) -> Result<Page<Transaction>> {
    client.get_query("/api/transactions", query).await
}

pub async fn get_transaction(client: &ApiClient, id: &str) -> Result<Transaction> {
    client.get(&format!("/api/transactions/{}", id)).await
}
