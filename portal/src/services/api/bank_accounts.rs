//! # Bank Account Endpoints

use super::client::ApiClient;
use crate::core::error::Result;
use reqwest::Method;
use shared::{BankAccount, CreateBankAccountRequest, UpdateBankAccountRequest};

pub async fn list_bank_accounts(client: &ApiClient) -> Result<Vec<BankAccount>> {
    client.get("/api/bank-accounts").await
}

#[tracing::instrument(skip(client, request), fields(bank = %request.bank_name))]
pub async fn create_bank_account(
    client: &ApiClient,
    request: &CreateBankAccountRequest,
) -> Result<BankAccount> {
    client.post("/api/bank-accounts", request).await
}

pub async fn update_bank_account(
    client: &ApiClient,
    id: &str,
    request: &UpdateBankAccountRequest,
) -> Result<BankAccount> {
    client.put(&format!("/api/bank-accounts/{}", id), request).await
}

pub async fn delete_bank_account(client: &ApiClient, id: &str) -> Result<()> {
    client
        .send_unit(Method::DELETE, &format!("/api/bank-accounts/{}", id), |b| b)
        .await
}

pub async fn set_primary(client: &ApiClient, id: &str) -> Result<BankAccount> {
    client
        .post_empty(&format!("/api/bank-accounts/{}/primary", id))
        .await
}
