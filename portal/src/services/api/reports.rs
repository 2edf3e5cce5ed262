//! # Report and Statement Endpoints

use super::client::ApiClient;
use crate::core::error::Result;
use shared::{ListQuery, Page, Statement};

pub async fn list_statements(client: &ApiClient, query: &ListQuery) -> Result<Page<Statement>> {
    client.get_query("/api/reports/statements", query).await
}

/// Raw PDF of a statement.
pub async fn download_statement(client: &ApiClient, id: &str) -> Result<Vec<u8>> {
    client
        .get_bytes(&format!("/api/reports/statements/{}/download", id))
        .await
}

/// Transaction history export (CSV) for the filters in `query`.
pub async fn export_transactions(client: &ApiClient, query: &ListQuery) -> Result<Vec<u8>> {
    let response = client
        .execute(reqwest::Method::GET, "/api/reports/transactions/export", |b| b.query(query))
        .await?;
    Ok(response.bytes().await?.to_vec())
}
