//! # Marketplace Endpoints

use super::client::ApiClient;
use crate::core::error::Result;
use shared::{ListQuery, MarketplaceItem, Page};

pub async fn list_items(client: &ApiClient, query: &ListQuery) -> Result<Page<MarketplaceItem>> {
    client.get_query("/api/marketplace", query).await
}

pub async fn get_item(client: &ApiClient, id: &str) -> Result<MarketplaceItem> {
    client.get(&format!("/api/marketplace/{}", id)).await
}
