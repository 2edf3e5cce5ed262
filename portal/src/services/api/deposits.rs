//! # Deposit Endpoints (client side)

use super::client::ApiClient;
use crate::core::error::Result;
use shared::{Deposit, DepositRequest, ListQuery, Page};

pub async fn list_deposits(client: &ApiClient, query: &ListQuery) -> Result<Page<Deposit>> {
    client.get_query("/api/deposits", query).await
}

#[tracing::instrument(skip(client, request), fields(amount = %request.amount, currency = %request.currency))]
pub async fn request_deposit(client: &ApiClient, request: &DepositRequest) -> Result<Deposit> {
    client.post("/api/deposits", request).await
}

pub async fn cancel_deposit(client: &ApiClient, id: &str) -> Result<Deposit> {
    client.post_empty(&format!("/api/deposits/{}/cancel", id)).await
}
