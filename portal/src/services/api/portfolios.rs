//! # Portfolio Endpoints

use super::client::ApiClient;
use crate::core::error::Result;
use reqwest::Method;
use shared::{CreatePortfolioRequest, Portfolio};

pub async fn list_portfolios(client: &ApiClient) -> Result<Vec<Portfolio>> {
    client.get("/api/portfolios").await
}

pub async fn get_portfolio(client: &ApiClient, id: &str) -> Result<Portfolio> {
    client.get(&format!("/api/portfolios/{}", id)).await
}

pub async fn create_portfolio(client: &ApiClient, request: &CreatePortfolioRequest) -> Result<Portfolio> {
    client.post("/api/portfolios", request).await
}

pub async fn delete_portfolio(client: &ApiClient, id: &str) -> Result<()> {
    client
        .send_unit(Method::DELETE, &format!("/api/portfolios/{}", id), |b| b)
        .await
}
