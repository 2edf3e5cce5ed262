//! # Service Traits
//!
//! Traits for dependency injection, enabling better testability and modularity.
//!
//! Stores and controllers hold `Arc<dyn ...Service>`; [`crate::services::api::ApiClient`]
//! implements all of them, tests use small hand-written mocks.

use crate::core::error::Result;
use async_trait::async_trait;
use shared::{
    AuthResponse, BankAccount, BuyRequest, ChangePasswordRequest, CreateBankAccountRequest,
    CreateInvestmentRequest, Deposit, DepositRequest, Investment, MarketplaceItem, Notification,
    Portfolio, RegisterRequest, SellRequest, TradePreview, Transaction, UpdateBankAccountRequest,
    UpdateProfileRequest, User, Withdrawal, WithdrawalRequest,
};
use std::path::PathBuf;

/// Session-related backend calls
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Login with email and password
    async fn login(&self, email: String, password: String) -> Result<AuthResponse>;

    /// Create a client account
    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse>;

    /// Revoke the session server-side
    async fn logout(&self, refresh_token: Option<String>) -> Result<()>;

    /// Profile of the authenticated user
    async fn profile(&self) -> Result<User>;

    /// Partial update; returns the full user
    async fn update_profile(&self, update: UpdateProfileRequest) -> Result<User>;

    /// Upload a picture; returns the full user
    async fn upload_profile_picture(&self, path: PathBuf) -> Result<User>;

    async fn change_password(&self, request: ChangePasswordRequest) -> Result<()>;

    /// Send a reset link; the backend answers the same whether or not the email exists
    async fn forgot_password(&self, email: String) -> Result<()>;

    async fn reset_password(&self, token: String, new_password: String) -> Result<()>;

    async fn verify_email(&self, token: String) -> Result<()>;

    async fn resend_verification(&self) -> Result<()>;
}

/// Notification list and read-state calls
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn list_notifications(&self, limit: u32) -> Result<Vec<Notification>>;

    async fn unread_count(&self) -> Result<u64>;

    async fn mark_read(&self, id: &str) -> Result<()>;

    async fn mark_all_read(&self) -> Result<()>;

    async fn delete_notification(&self, id: &str) -> Result<()>;
}

#[async_trait]
pub trait BankAccountService: Send + Sync {
    async fn create_bank_account(&self, request: CreateBankAccountRequest) -> Result<BankAccount>;

    async fn update_bank_account(&self, id: &str, request: UpdateBankAccountRequest) -> Result<BankAccount>;
}

/// Deposit and withdrawal requests
#[async_trait]
pub trait FundsService: Send + Sync {
    async fn request_deposit(&self, request: DepositRequest) -> Result<Deposit>;

    async fn request_withdrawal(&self, request: WithdrawalRequest) -> Result<Withdrawal>;
}

/// Admin maintenance of marketplace listings
#[async_trait]
pub trait CatalogAdminService: Send + Sync {
    async fn create_marketplace_item(&self, request: CreateInvestmentRequest) -> Result<MarketplaceItem>;

    async fn update_marketplace_item(&self, id: &str, request: CreateInvestmentRequest) -> Result<MarketplaceItem>;
}

/// Holdings shown on the investments page
#[async_trait]
pub trait PortfolioService: Send + Sync {
    async fn list_investments(&self) -> Result<Vec<Investment>>;

    async fn list_portfolios(&self) -> Result<Vec<Portfolio>>;
}

/// Preview and commit of buy/sell orders
#[async_trait]
pub trait TradeService: Send + Sync {
    async fn preview_buy(&self, request: BuyRequest) -> Result<TradePreview>;

    async fn buy(&self, request: BuyRequest) -> Result<Transaction>;

    async fn preview_sell(&self, request: SellRequest) -> Result<TradePreview>;

    async fn sell(&self, request: SellRequest) -> Result<Transaction>;
}
