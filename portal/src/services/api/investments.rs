//! # Investment Endpoints
//!
//! Owned investments and the preview/commit pair for buying and selling.

use super::client::ApiClient;
use crate::core::error::Result;
use shared::{BuyRequest, Investment, SellRequest, TradePreview, Transaction};

pub async fn list_investments(client: &ApiClient) -> Result<Vec<Investment>> {
    client.get("/api/investments").await
}

pub async fn get_investment(client: &ApiClient, id: &str) -> Result<Investment> {
    client.get(&format!("/api/investments/{}", id)).await
}

/// Fee and unit estimate for buying a marketplace listing.
#[tracing::instrument(skip(client, request), fields(investment_id = %request.investment_id, amount = %request.amount))]
pub async fn preview_buy(client: &ApiClient, request: &BuyRequest) -> Result<TradePreview> {
    client.post("/api/investments/buy/preview", request).await
}

/// Commit a buy.
#[tracing::instrument(skip(client, request), fields(investment_id = %request.investment_id, amount = %request.amount))]
pub async fn buy(client: &ApiClient, request: &BuyRequest) -> Result<Transaction> {
    tracing::info!("Submitting buy order");
    client.post("/api/investments/buy", request).await
}

/// Fee, proceeds and gain/loss for selling part of a holding.
#[tracing::instrument(skip(client, request), fields(investment_id = %request.investment_id, quantity = %request.quantity))]
pub async fn preview_sell(client: &ApiClient, request: &SellRequest) -> Result<TradePreview> {
    client
        .post(&format!("/api/investments/{}/sell/preview", request.investment_id), request)
        .await
}

/// Commit a sell.
#[tracing::instrument(skip(client, request), fields(investment_id = %request.investment_id, quantity = %request.quantity))]
pub async fn sell(client: &ApiClient, request: &SellRequest) -> Result<Transaction> {
    tracing::info!("Submitting sell order");
    client
        .post(&format!("/api/investments/{}/sell", request.investment_id), request)
        .await
}
