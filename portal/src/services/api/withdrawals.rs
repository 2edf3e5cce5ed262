//! # Withdrawal Endpoints (client side)

use super::client::ApiClient;
use crate::core::error::Result;
use shared::{ListQuery, Page, Withdrawal, WithdrawalRequest};

pub async fn list_withdrawals(client: &ApiClient, query: &ListQuery) -> Result<Page<Withdrawal>> {
    client.get_query("/api/withdrawals", query).await
}

#[tracing::instrument(skip(client, request), fields(amount = %request.amount, account = %request.bank_account_id))]
pub async fn request_withdrawal(client: &ApiClient, request: &WithdrawalRequest) -> Result<Withdrawal> {
    client.post("/api/withdrawals", request).await
}

pub async fn cancel_withdrawal(client: &ApiClient, id: &str) -> Result<Withdrawal> {
    client.post_empty(&format!("/api/withdrawals/{}/cancel", id)).await
}
