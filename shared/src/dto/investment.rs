//! # Investment Data Transfer Objects
//!
//! Owned investments, the marketplace catalog, portfolios and the
//! preview/confirm trade bodies.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvestmentType {
    Stock,
    Bond,
    Etf,
    MutualFund,
    Crypto,
    RealEstate,
    Commodity,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// An investment held by the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub investment_type: InvestmentType,
    pub quantity: Decimal,
    pub purchase_price: Decimal,
    pub current_price: Decimal,
    pub current_value: Decimal,
    pub risk_level: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_investment: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_investment: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<DateTime<Utc>>,
}

impl Investment {
    /// Unrealised gain/loss at the current price.
    pub fn gain_loss(&self) -> Decimal {
        (self.current_price - self.purchase_price) * self.quantity
    }
}

/// A catalog listing that can be bought.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceItem {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub investment_type: InvestmentType,
    pub current_price: Decimal,
    pub risk_level: RiskLevel,
    pub minimum_investment: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_investment: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_return: Option<Decimal>,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

/// Admin create/update body for a marketplace listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvestmentRequest {
    pub name: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub investment_type: InvestmentType,
    pub current_price: Decimal,
    pub risk_level: RiskLevel,
    pub minimum_investment: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_investment: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_return: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub name: String,
    pub total_value: Decimal,
    #[serde(default)]
    pub total_gain_loss: Decimal,
    #[serde(default)]
    pub investments: Vec<Investment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreatePortfolioRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// Buy body: spend `amount` of cash on a marketplace listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuyRequest {
    pub investment_id: String,
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio_id: Option<String>,
}

/// Sell body: dispose of `quantity` units of an owned investment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SellRequest {
    pub investment_id: String,
    pub quantity: Decimal,
}

/// Fee and proceeds computed before a trade is committed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TradePreview {
    pub side: TradeSide,
    pub quantity: Decimal,
    pub price: Decimal,
    /// Amount spent (buy) or gross proceeds (sell), before fees
    pub gross_amount: Decimal,
    pub fee: Decimal,
    pub fee_percentage: Decimal,
    /// Amount invested after fee (buy) or proceeds after fee (sell)
    pub net_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gain_loss: Option<Decimal>,
    /// Set when the preview was computed locally because the server preview failed
    #[serde(default)]
    pub estimated: bool,
}
