//! # Admin Endpoints
//!
//! User/KYC management, approval queues for deposits and withdrawals,
//! document review, statement generation, mail settings and the marketplace catalog.

use super::client::ApiClient;
use crate::core::error::Result;
use reqwest::Method;
use shared::{
    CreateInvestmentRequest, DashboardStats, Deposit, Document, DocumentStatusUpdate, EmailTemplate,
    EmailTemplateUpdate, GenerateStatementRequest, KycUpdateRequest, ListQuery, MarketplaceItem,
    Page, SmtpConfig, Statement, StatusUpdateRequest, Transaction, User, Withdrawal,
};

pub async fn dashboard_stats(client: &ApiClient) -> Result<DashboardStats> {
    client.get("/api/admin/dashboard").await
}

// ==================== USERS ====================

pub async fn list_users(client: &ApiClient, query: &ListQuery) -> Result<Page<User>> {
    client.get_query("/api/admin/users", query).await
}

pub async fn get_user(client: &ApiClient, id: &str) -> Result<User> {
    client.get(&format!("/api/admin/users/{}", id)).await
}

#[tracing::instrument(skip(client, update), fields(user_id = %id, kyc_status = ?update.kyc_status))]
pub async fn update_kyc(client: &ApiClient, id: &str, update: &KycUpdateRequest) -> Result<User> {
    client.put(&format!("/api/admin/users/{}/kyc", id), update).await
}

// ==================== MONEY MOVEMENT ====================

pub async fn list_deposits(client: &ApiClient, query: &ListQuery) -> Result<Page<Deposit>> {
    client.get_query("/api/admin/deposits", query).await
}

#[tracing::instrument(skip(client, update), fields(deposit_id = %id, status = %update.status))]
pub async fn update_deposit_status(
    client: &ApiClient,
    id: &str,
    update: &StatusUpdateRequest,
) -> Result<Deposit> {
    client.put(&format!("/api/admin/deposits/{}/status", id), update).await
}

pub async fn list_withdrawals(client: &ApiClient, query: &ListQuery) -> Result<Page<Withdrawal>> {
    client.get_query("/api/admin/withdrawals", query).await
}

#[tracing::instrument(skip(client, update), fields(withdrawal_id = %id, status = %update.status))]
pub async fn update_withdrawal_status(
    client: &ApiClient,
    id: &str,
    update: &StatusUpdateRequest,
) -> Result<Withdrawal> {
    client.put(&format!("/api/admin/withdrawals/{}/status", id), update).await
}

pub async fn list_transactions(client: &ApiClient, query: &ListQuery) -> Result<Page<Transaction>> {
    client.get_query("/api/admin/transactions", query).await
}

pub async fn get_transaction(client: &ApiClient, id: &str) -> Result<Transaction> {
    client.get(&format!("/api/admin/transactions/{}", id)).await
}

pub async fn update_transaction_status(
    client: &ApiClient,
    id: &str,
    update: &StatusUpdateRequest,
) -> Result<Transaction> {
    client.put(&format!("/api/admin/transactions/{}/status", id), update).await
}

// ==================== DOCUMENTS & STATEMENTS ====================

pub async fn list_documents(client: &ApiClient, query: &ListQuery) -> Result<Page<Document>> {
    client.get_query("/api/admin/documents", query).await
}

pub async fn update_document_status(
    client: &ApiClient,
    id: &str,
    update: &DocumentStatusUpdate,
) -> Result<Document> {
    client.put(&format!("/api/admin/documents/{}/status", id), update).await
}

pub async fn generate_statement(client: &ApiClient, request: &GenerateStatementRequest) -> Result<Statement> {
    client.post("/api/admin/statements/generate", request).await
}

// ==================== MAIL ====================

pub async fn get_smtp_config(client: &ApiClient) -> Result<SmtpConfig> {
    client.get("/api/admin/smtp-config").await
}

pub async fn update_smtp_config(client: &ApiClient, config: &SmtpConfig) -> Result<SmtpConfig> {
    client.put("/api/admin/smtp-config", config).await
}

/// Ask the backend to send a test message with the stored SMTP settings.
pub async fn test_smtp_config(client: &ApiClient, recipient: &str) -> Result<()> {
    let body = serde_json::json!({ "email": recipient });
    client
        .send_unit(Method::POST, "/api/admin/smtp-config/test", |b| b.json(&body))
        .await
}

pub async fn list_email_templates(client: &ApiClient) -> Result<Vec<EmailTemplate>> {
    client.get("/api/admin/email-templates").await
}

pub async fn update_email_template(
    client: &ApiClient,
    id: &str,
    update: &EmailTemplateUpdate,
) -> Result<EmailTemplate> {
    client.put(&format!("/api/admin/email-templates/{}", id), update).await
}

// ==================== MARKETPLACE CATALOG ====================

pub async fn create_marketplace_item(
    client: &ApiClient,
    request: &CreateInvestmentRequest,
) -> Result<MarketplaceItem> {
    client.post("/api/admin/marketplace", request).await
}

pub async fn update_marketplace_item(
    client: &ApiClient,
    id: &str,
    request: &CreateInvestmentRequest,
) -> Result<MarketplaceItem> {
    client.put(&format!("/api/admin/marketplace/{}", id), request).await
}

pub async fn delete_marketplace_item(client: &ApiClient, id: &str) -> Result<()> {
    client
        .send_unit(Method::DELETE, &format!("/api/admin/marketplace/{}", id), |b| b)
        .await
}
