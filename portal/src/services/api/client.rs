//! # API Client
//!
//! Main HTTP client for backend API communication.
//!
//! Every request carries `Authorization: Bearer <access token>` when one is
//! stored. A 401 from a non-auth endpoint triggers exactly one token refresh
//! followed by exactly one retry of the original request. When the refresh
//! fails the stored tokens are cleared and [`AppEvent::SessionExpired`] is
//! published.

use crate::app::events::{publish, AppEvent, LOGIN_ROUTE};
use crate::config::PortalConfig;
use crate::core::error::{PortalError, Result};
use crate::core::service::{
    AuthService, BankAccountService, CatalogAdminService, FundsService, NotificationService,
    PortfolioService, TradeService,
};
use crate::services::token_store::TokenStore;
use async_channel::Sender;
use parking_lot::RwLock;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::{
    ApiEnvelope, AuthResponse, BankAccount, BuyRequest, ChangePasswordRequest,
    CreateBankAccountRequest, CreateInvestmentRequest, Deposit, DepositRequest, ErrorResponse,
    Investment, MarketplaceItem, Notification, Portfolio, RefreshRequest, RegisterRequest,
    SellRequest, TokenPair, TradePreview, Transaction, UpdateBankAccountRequest,
    UpdateProfileRequest, User, Withdrawal, WithdrawalRequest,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

const REFRESH_PATH: &str = "/api/auth/refresh";

/// HTTP client for communicating with the backend API server.
///
/// Cheap to share behind an `Arc`; the connection pool and token store are shared
/// by every clone of the `Arc`.
pub struct ApiClient {
    pub(crate) http: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    events: Option<Sender<AppEvent>>,
    /// Serialises refreshes so simultaneous 401s trigger a single refresh call
    refresh_lock: Mutex<()>,
    current_route: RwLock<String>,
}

impl ApiClient {
    /// Create a new API client from configuration.
    pub fn new(config: &PortalConfig, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| PortalError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            tokens,
            events: None,
            refresh_lock: Mutex::new(()),
            current_route: RwLock::new("/".to_string()),
        })
    }

    /// Publish session events (expiry) on `tx`.
    pub fn with_events(mut self, tx: Sender<AppEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Record the screen the user is on, so expiry on the login screen does not redirect.
    pub fn set_current_route(&self, route: &str) {
        *self.current_route.write() = route.to_string();
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ==================== TYPED HELPERS ====================

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.execute(Method::GET, path, |b| b).await?;
        decode(response).await
    }

    pub(crate) async fn get_query<Q, T>(&self, path: &str, query: &Q) -> Result<T>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.execute(Method::GET, path, |b| b.query(query)).await?;
        decode(response).await
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.execute(Method::POST, path, |b| b.json(body)).await?;
        decode(response).await
    }

    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.execute(Method::POST, path, |b| b).await?;
        decode(response).await
    }

    pub(crate) async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.execute(Method::PUT, path, |b| b.json(body)).await?;
        decode(response).await
    }

    pub(crate) async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.execute(Method::PATCH, path, |b| b.json(body)).await?;
        decode(response).await
    }

    /// Send a request whose response body is irrelevant (204s, acknowledgements).
    pub(crate) async fn send_unit<F>(&self, method: Method, path: &str, build: F) -> Result<()>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        self.execute(method, path, build).await.map(|_| ())
    }

    /// Authenticated GET returning the raw body (file downloads).
    pub(crate) async fn get_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let response = self.execute(Method::GET, path, |b| b).await?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }

    // ==================== REQUEST PIPELINE ====================

    /// Send a request with bearer auth and the single refresh-and-retry on 401.
    ///
    /// `build` is called once per attempt, so it must be able to rebuild the body.
    #[tracing::instrument(skip_all, fields(method = %method, path = %path))]
    pub(crate) async fn execute<F>(&self, method: Method, path: &str, build: F) -> Result<Response>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let start = Instant::now();
        let token_used = self.tokens.access_token();
        let mut response = self.send_once(&method, path, token_used.as_deref(), &build).await?;

        if response.status() == StatusCode::UNAUTHORIZED && !is_auth_path(path) {
            tracing::info!("Access token rejected, attempting refresh");
            self.refresh_tokens(token_used.as_deref()).await?;

            let fresh = self.tokens.access_token();
            response = self.send_once(&method, path, fresh.as_deref(), &build).await?;

            if response.status() == StatusCode::UNAUTHORIZED {
                let message = error_message(response).await;
                tracing::warn!(
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Request still unauthorized after refresh"
                );
                return Err(PortalError::Unauthorized(message));
            }
        }

        let status = response.status();
        tracing::debug!(
            status = status.as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "API request completed"
        );

        if status.is_success() {
            Ok(response)
        } else {
            let message = error_message(response).await;
            tracing::warn!(status = status.as_u16(), error = %message, "API request failed");
            Err(PortalError::api(status.as_u16(), message))
        }
    }

    async fn send_once<F>(
        &self,
        method: &Method,
        path: &str,
        token: Option<&str>,
        build: &F,
    ) -> Result<Response>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let mut builder = self
            .http
            .request(method.clone(), self.url(path))
            .header("X-Request-Id", uuid::Uuid::new_v4().to_string());
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        build(builder).send().await.map_err(|e| {
            tracing::error!(error = %e, "API network error");
            PortalError::Network(e.to_string())
        })
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// `stale_token` is the access token the failed request was sent with. If the
    /// stored token differs by the time the lock is acquired, another request already
    /// refreshed and this call returns immediately.
    async fn refresh_tokens(&self, stale_token: Option<&str>) -> Result<()> {
        let _guard = self.refresh_lock.lock().await;

        let current = self.tokens.access_token();
        if current.is_some() && current.as_deref() != stale_token {
            tracing::debug!("Token already refreshed by a concurrent request");
            return Ok(());
        }

        let Some(refresh_token) = self.tokens.refresh_token() else {
            tracing::warn!("No refresh token stored");
            return Err(self.expire_session());
        };

        let response = self
            .http
            .post(self.url(REFRESH_PATH))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await;

        let pair = match response {
            Ok(response) if response.status().is_success() => {
                match response.json::<ApiEnvelope<TokenPair>>().await {
                    Ok(envelope) => envelope.data,
                    Err(e) => {
                        tracing::error!(error = %e, "Refresh response parse error");
                        return Err(self.expire_session());
                    }
                }
            }
            Ok(response) => {
                tracing::warn!(status = response.status().as_u16(), "Token refresh rejected");
                return Err(self.expire_session());
            }
            Err(e) => {
                tracing::error!(error = %e, "Token refresh network error");
                return Err(self.expire_session());
            }
        };

        self.tokens
            .set_tokens(&pair.access_token, pair.refresh_token.as_deref())?;
        tracing::info!(rotated = pair.refresh_token.is_some(), "Access token refreshed");
        Ok(())
    }

    /// Clear stored tokens and tell the front end to go to the login screen.
    fn expire_session(&self) -> PortalError {
        if let Err(e) = self.tokens.clear() {
            tracing::error!(error = %e, "Failed to clear tokens after session expiry");
        }
        let redirect_to_login = self.current_route.read().as_str() != LOGIN_ROUTE;
        tracing::warn!(redirect_to_login, "Session expired");
        publish(self.events.as_ref(), AppEvent::SessionExpired { redirect_to_login });
        PortalError::SessionExpired
    }
}

/// Auth endpoints answer 401 for bad credentials; those are never refreshed.
fn is_auth_path(path: &str) -> bool {
    path.starts_with("/api/auth/")
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes().await?;
    let envelope: ApiEnvelope<T> = serde_json::from_slice(&body).map_err(|e| {
        tracing::error!(error = %e, "Response did not match envelope");
        PortalError::Decode(e.to_string())
    })?;
    Ok(envelope.data)
}

/// Backend message from an error body, or a generic status line.
async fn error_message(response: Response) -> String {
    let status = response.status();
    let fallback = || {
        format!(
            "Request failed: {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        )
    };

    match response.json::<ErrorResponse>().await {
        Ok(error) => error.best_message().map(str::to_string).unwrap_or_else(fallback),
        Err(_) => fallback(),
    }
}

// Implement the service traits for ApiClient
#[async_trait::async_trait]
impl AuthService for ApiClient {
    async fn login(&self, email: String, password: String) -> Result<AuthResponse> {
        super::auth::login(self, email, password).await
    }

    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse> {
        super::auth::register(self, &request).await
    }

    async fn logout(&self, refresh_token: Option<String>) -> Result<()> {
        super::auth::logout(self, refresh_token).await
    }

    async fn profile(&self) -> Result<User> {
        super::users::get_profile(self).await
    }

    async fn update_profile(&self, update: UpdateProfileRequest) -> Result<User> {
        super::users::update_profile(self, &update).await
    }

    async fn upload_profile_picture(&self, path: PathBuf) -> Result<User> {
        super::users::upload_profile_picture(self, &path).await
    }

    async fn change_password(&self, request: ChangePasswordRequest) -> Result<()> {
        super::users::change_password(self, &request).await
    }

    async fn forgot_password(&self, email: String) -> Result<()> {
        super::auth::forgot_password(self, email).await
    }

    async fn reset_password(&self, token: String, new_password: String) -> Result<()> {
        super::auth::reset_password(self, token, new_password).await
    }

    async fn verify_email(&self, token: String) -> Result<()> {
        super::auth::verify_email(self, token).await
    }

    async fn resend_verification(&self) -> Result<()> {
        super::auth::resend_verification(self).await
    }
}

#[async_trait::async_trait]
impl NotificationService for ApiClient {
    async fn list_notifications(&self, limit: u32) -> Result<Vec<Notification>> {
        super::notifications::list_notifications(self, limit).await
    }

    async fn unread_count(&self) -> Result<u64> {
        super::notifications::unread_count(self).await
    }

    async fn mark_read(&self, id: &str) -> Result<()> {
        super::notifications::mark_read(self, id).await
    }

    async fn mark_all_read(&self) -> Result<()> {
        super::notifications::mark_all_read(self).await
    }

    async fn delete_notification(&self, id: &str) -> Result<()> {
        super::notifications::delete_notification(self, id).await
    }
}

#[async_trait::async_trait]
impl BankAccountService for ApiClient {
    async fn create_bank_account(&self, request: CreateBankAccountRequest) -> Result<BankAccount> {
        super::bank_accounts::create_bank_account(self, &request).await
    }

    async fn update_bank_account(&self, id: &str, request: UpdateBankAccountRequest) -> Result<BankAccount> {
        super::bank_accounts::update_bank_account(self, id, &request).await
    }
}

#[async_trait::async_trait]
impl FundsService for ApiClient {
    async fn request_deposit(&self, request: DepositRequest) -> Result<Deposit> {
        super::deposits::request_deposit(self, &request).await
    }

    async fn request_withdrawal(&self, request: WithdrawalRequest) -> Result<Withdrawal> {
        super::withdrawals::request_withdrawal(self, &request).await
    }
}

#[async_trait::async_trait]
impl CatalogAdminService for ApiClient {
    async fn create_marketplace_item(&self, request: CreateInvestmentRequest) -> Result<MarketplaceItem> {
        super::admin::create_marketplace_item(self, &request).await
    }

    async fn update_marketplace_item(&self, id: &str, request: CreateInvestmentRequest) -> Result<MarketplaceItem> {
        super::admin::update_marketplace_item(self, id, &request).await
    }
}

#[async_trait::async_trait]
impl PortfolioService for ApiClient {
    async fn list_investments(&self) -> Result<Vec<Investment>> {
        super::investments::list_investments(self).await
    }

    async fn list_portfolios(&self) -> Result<Vec<Portfolio>> {
        super::portfolios::list_portfolios(self).await
    }
}

#[async_trait::async_trait]
impl TradeService for ApiClient {
    async fn preview_buy(&self, request: BuyRequest) -> Result<TradePreview> {
        super::investments::preview_buy(self, &request).await
    }

    async fn buy(&self, request: BuyRequest) -> Result<Transaction> {
        super::investments::buy(self, &request).await
    }

    async fn preview_sell(&self, request: SellRequest) -> Result<TradePreview> {
        super::investments::preview_sell(self, &request).await
    }

    async fn sell(&self, request: SellRequest) -> Result<Transaction> {
        super::investments::sell(self, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_paths_are_not_refreshed() {
        assert!(is_auth_path("/api/auth/login"));
        assert!(is_auth_path("/api/auth/refresh"));
        assert!(!is_auth_path("/api/users/profile"));
        assert!(!is_auth_path("/api/admin/auth-logs"));
    }
}
