//! # Authentication Endpoints
//!
//! Login, registration, logout and the password/email flows. These paths are
//! under `/api/auth/` and never go through the refresh-and-retry.

use super::client::ApiClient;
use crate::core::error::Result;
use reqwest::Method;
use shared::{
    AuthResponse, ForgotPasswordRequest, LoginRequest, RefreshRequest, RegisterRequest,
    ResetPasswordRequest, VerifyEmailRequest,
};

/// Login with email and password.
#[tracing::instrument(skip(client, password), fields(email = %email))]
pub async fn login(client: &ApiClient, email: String, password: String) -> Result<AuthResponse> {
    tracing::info!("Attempting login");
    let start = std::time::Instant::now();

    let request = LoginRequest { email, password };
    let result = client.post::<_, AuthResponse>("/api/auth/login", &request).await;

    match &result {
        Ok(auth) => tracing::info!(
            user_id = %auth.user.id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Login successful"
        ),
        Err(e) => tracing::warn!(
            error = %e,
            duration_ms = start.elapsed().as_millis() as u64,
            "Login failed"
        ),
    }
    result
}

/// Register a new client account.
#[tracing::instrument(skip(client, request), fields(email = %request.email))]
pub async fn register(client: &ApiClient, request: &RegisterRequest) -> Result<AuthResponse> {
    client.post("/api/auth/register", request).await
}

/// Revoke the refresh token server-side.
pub async fn logout(client: &ApiClient, refresh_token: Option<String>) -> Result<()> {
    client
        .send_unit(Method::POST, "/api/auth/logout", |b| match &refresh_token {
            Some(token) => b.json(&RefreshRequest {
                refresh_token: token.clone(),
            }),
            None => b,
        })
        .await
}

pub async fn forgot_password(client: &ApiClient, email: String) -> Result<()> {
    let body = ForgotPasswordRequest { email };
    client
        .send_unit(Method::POST, "/api/auth/forgot-password", |b| b.json(&body))
        .await
}

pub async fn reset_password(client: &ApiClient, token: String, new_password: String) -> Result<()> {
    let body = ResetPasswordRequest { token, new_password };
    client
        .send_unit(Method::POST, "/api/auth/reset-password", |b| b.json(&body))
        .await
}

pub async fn verify_email(client: &ApiClient, token: String) -> Result<()> {
    let body = VerifyEmailRequest { token };
    client
        .send_unit(Method::POST, "/api/auth/verify-email", |b| b.json(&body))
        .await
}

pub async fn resend_verification(client: &ApiClient) -> Result<()> {
    client
        .send_unit(Method::POST, "/api/auth/resend-verification", |b| b)
        .await
}
