//! # List Controllers
//!
//! Paginated, filterable lists behind the admin and history pages.
//!
//! A [`ListController`] owns the query (page + filters) and the last loaded
//! page. Changing any filter resets to page 1 and re-fetches. Status changes
//! are applied locally first; if the mutation fails the authoritative page is
//! fetched again.

use crate::app::events::{publish, AppEvent};
use crate::core::error::{PortalError, Result};
use crate::services::api::{admin, reports, save_download, transactions, ApiClient};
use async_channel::Sender;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use shared::{
    Deposit, Document, DocumentStatus, DocumentStatusUpdate, KycStatus, KycUpdateRequest, ListQuery,
    Page, StatusUpdateRequest, Transaction, TransactionStatus, User, Withdrawal,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where a list's rows come from.
#[async_trait]
pub trait ListSource: Send + Sync + 'static {
    type Row: Clone + Send + Sync + 'static;

    /// Short name used in logs and events ("deposits", "users", ...)
    fn name(&self) -> &'static str;

    fn row_id(row: &Self::Row) -> &str;

    async fn fetch_page(&self, query: &ListQuery) -> Result<Page<Self::Row>>;

    /// Dedicated detail endpoint, when the backend has one.
    async fn fetch_one(&self, _id: &str) -> Result<Option<Self::Row>> {
        Ok(None)
    }
}

/// Lists whose rows carry an admin-editable status.
#[async_trait]
pub trait StatusSource: ListSource {
    type Status: Clone + std::fmt::Debug + Send + Sync + 'static;

    /// Local patch shown before the backend confirms.
    fn apply_status(row: &mut Self::Row, status: &Self::Status);

    async fn update_status(&self, id: &str, status: Self::Status, note: Option<String>) -> Result<Self::Row>;
}

/// Row rendering for CSV export.
pub trait CsvRow {
    fn csv_headers() -> &'static [&'static str];

    fn csv_fields(&self) -> Vec<String>;
}

pub struct ListController<S: ListSource> {
    source: Arc<S>,
    query: ListQuery,
    page: Page<S::Row>,
    loading: bool,
    error: Option<String>,
    events: Option<Sender<AppEvent>>,
}

impl<S: ListSource> ListController<S> {
    pub fn new(source: Arc<S>, limit: u32) -> Self {
        Self {
            source,
            query: ListQuery::with_limit(limit),
            page: Page::empty(limit),
            loading: false,
            error: None,
            events: None,
        }
    }

    pub fn with_events(mut self, tx: Sender<AppEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn rows(&self) -> &[S::Row] {
        &self.page.items
    }

    pub fn page(&self) -> &Page<S::Row> {
        &self.page
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fetch the page described by the current query.
    pub async fn refresh(&mut self) -> Result<()> {
        let name = self.source.name();
        self.loading = true;
        let result = self.source.fetch_page(&self.query).await;
        self.loading = false;

        match result {
            Ok(page) => {
                tracing::debug!(source = name, page = page.page, total = page.total, "List loaded");
                self.error = None;
                let total = page.total;
                self.page = page;
                publish(self.events.as_ref(), AppEvent::ListRefreshed { source: name, total });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(source = name, error = %e, "List load failed");
                self.error = Some(e.user_message(&format!("Failed to load {}", name)));
                Err(e)
            }
        }
    }

    pub async fn go_to_page(&mut self, page: u32) -> Result<()> {
        self.query.page = page.max(1);
        self.refresh().await
    }

    pub async fn next_page(&mut self) -> Result<()> {
        if !self.page.has_next() {
            return Ok(());
        }
        self.go_to_page(self.query.page + 1).await
    }

    pub async fn previous_page(&mut self) -> Result<()> {
        if self.query.page <= 1 {
            return Ok(());
        }
        self.go_to_page(self.query.page - 1).await
    }

    async fn refilter(&mut self, change: impl FnOnce(&mut ListQuery)) -> Result<()> {
        change(&mut self.query);
        self.query.page = 1;
        self.refresh().await
    }

    pub async fn set_status_filter(&mut self, status: Option<&str>) -> Result<()> {
        let status = status.filter(|s| !s.is_empty()).map(str::to_string);
        self.refilter(|q| q.status = status).await
    }

    pub async fn set_type_filter(&mut self, kind: Option<&str>) -> Result<()> {
        let kind = kind.filter(|s| !s.is_empty()).map(str::to_string);
        self.refilter(|q| q.kind = kind).await
    }

    pub async fn set_search(&mut self, search: &str) -> Result<()> {
        let search = search.trim();
        let search = (!search.is_empty()).then(|| search.to_string());
        self.refilter(|q| q.search = search).await
    }

    pub async fn set_date_range(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(PortalError::State("Start date must be before end date".to_string()));
            }
        }
        self.refilter(|q| {
            q.start_date = start;
            q.end_date = end;
        })
        .await
    }

    pub async fn clear_filters(&mut self) -> Result<()> {
        let limit = self.query.limit;
        self.refilter(|q| *q = ListQuery::with_limit(limit)).await
    }

    /// Row from the loaded page, else the detail endpoint.
    pub async fn detail(&self, id: &str) -> Result<S::Row> {
        if let Some(row) = self.page.items.iter().find(|r| S::row_id(r) == id) {
            return Ok(row.clone());
        }
        self.source
            .fetch_one(id)
            .await?
            .ok_or_else(|| PortalError::api(404, format!("No {} entry with id {}", self.source.name(), id)))
    }
}

impl<S: StatusSource> ListController<S> {
    /// Change a row's status: patch locally, call the backend, re-fetch on failure.
    pub async fn update_status(&mut self, id: &str, status: S::Status, note: Option<String>) -> Result<S::Row> {
        let name = self.source.name();
        let index = self
            .page
            .items
            .iter()
            .position(|r| S::row_id(r) == id)
            .ok_or_else(|| PortalError::State(format!("No {} entry with id {} on this page", name, id)))?;

        let snapshot = self.page.items[index].clone();
        S::apply_status(&mut self.page.items[index], &status);

        match self.source.update_status(id, status.clone(), note).await {
            Ok(updated) => {
                tracing::info!(source = name, id = %id, status = ?status, "Status updated");
                if let Some(slot) = self.page.items.iter_mut().find(|r| S::row_id(r) == id) {
                    *slot = updated.clone();
                }
                Ok(updated)
            }
            Err(e) => {
                tracing::warn!(source = name, id = %id, error = %e, "Status update failed, reloading");
                if self.refresh().await.is_err() {
                    if let Some(slot) = self.page.items.get_mut(index) {
                        *slot = snapshot;
                    }
                }
                self.error = Some(e.user_message("Failed to update status"));
                Err(e)
            }
        }
    }
}

impl<S: ListSource> ListController<S>
where
    S::Row: CsvRow,
{
    /// Current page as CSV (header line first).
    pub fn export_csv(&self) -> String {
        let mut out = csv_line(S::Row::csv_headers().iter().map(|h| h.to_string()));
        for row in &self.page.items {
            out.push_str(&csv_line(row.csv_fields()));
        }
        out
    }

    pub async fn export_csv_to(&self, dir: &Path) -> Result<PathBuf> {
        let file_name = format!("{}-page-{}.csv", self.source.name(), self.page.page);
        save_download(dir, &file_name, self.export_csv().as_bytes()).await
    }
}

fn csv_line(fields: impl IntoIterator<Item = String>) -> String {
    let mut line = fields
        .into_iter()
        .map(|field| {
            if field.contains([',', '"', '\n', '\r']) {
                format!("\"{}\"", field.replace('"', "\"\""))
            } else {
                field
            }
        })
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

/// SCREAMING_SNAKE wire name of an enum value.
fn wire_name<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

impl CsvRow for Transaction {
    fn csv_headers() -> &'static [&'static str] {
        &["id", "type", "amount", "currency", "status", "description", "createdAt"]
    }

    fn csv_fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            wire_name(&self.transaction_type),
            self.amount.to_string(),
            self.currency.clone(),
            self.status.as_str().to_string(),
            opt(&self.description),
            self.created_at.to_rfc3339(),
        ]
    }
}

impl CsvRow for Deposit {
    fn csv_headers() -> &'static [&'static str] {
        &["id", "amount", "currency", "method", "status", "reference", "createdAt"]
    }

    fn csv_fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.amount.to_string(),
            self.currency.clone(),
            self.method.clone(),
            self.status.as_str().to_string(),
            opt(&self.reference),
            self.created_at.to_rfc3339(),
        ]
    }
}

impl CsvRow for Withdrawal {
    fn csv_headers() -> &'static [&'static str] {
        &["id", "amount", "currency", "bankAccountId", "status", "reference", "createdAt"]
    }

    fn csv_fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.amount.to_string(),
            self.currency.clone(),
            self.bank_account_id.clone(),
            self.status.as_str().to_string(),
            opt(&self.reference),
            self.created_at.to_rfc3339(),
        ]
    }
}

impl CsvRow for User {
    fn csv_headers() -> &'static [&'static str] {
        &["id", "email", "firstName", "lastName", "role", "kycStatus", "emailVerified"]
    }

    fn csv_fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.email.clone(),
            self.first_name.clone(),
            self.last_name.clone(),
            wire_name(&self.role),
            wire_name(&self.kyc_status),
            self.email_verified.to_string(),
        ]
    }
}

impl CsvRow for Document {
    fn csv_headers() -> &'static [&'static str] {
        &["id", "fileName", "documentType", "mimeType", "fileSize", "status", "userId", "createdAt"]
    }

    fn csv_fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.file_name.clone(),
            opt(&self.document_type),
            self.mime_type.clone(),
            self.file_size.to_string(),
            wire_name(&self.status),
            self.user_id.clone(),
            self.created_at.to_rfc3339(),
        ]
    }
}

// ==================== SOURCES ====================

/// Admin: all users, KYC decisions
pub struct AdminUsers(pub Arc<ApiClient>);

#[async_trait]
impl ListSource for AdminUsers {
    type Row = User;

    fn name(&self) -> &'static str {
        "users"
    }

    fn row_id(row: &User) -> &str {
        &row.id
    }

    async fn fetch_page(&self, query: &ListQuery) -> Result<Page<User>> {
        admin::list_users(&self.0, query).await
    }

    async fn fetch_one(&self, id: &str) -> Result<Option<User>> {
        admin::get_user(&self.0, id).await.map(Some)
    }
}

#[async_trait]
impl StatusSource for AdminUsers {
    type Status = KycStatus;

    fn apply_status(row: &mut User, status: &KycStatus) {
        row.kyc_status = *status;
    }

    async fn update_status(&self, id: &str, status: KycStatus, note: Option<String>) -> Result<User> {
        let update = KycUpdateRequest { kyc_status: status, note };
        admin::update_kyc(&self.0, id, &update).await
    }
}

/// Admin: deposit requests
pub struct AdminDeposits(pub Arc<ApiClient>);

#[async_trait]
impl ListSource for AdminDeposits {
    type Row = Deposit;

    fn name(&self) -> &'static str {
        "deposits"
    }

    fn row_id(row: &Deposit) -> &str {
        &row.id
    }

    async fn fetch_page(&self, query: &ListQuery) -> Result<Page<Deposit>> {
        admin::list_deposits(&self.0, query).await
    }
}

#[async_trait]
impl StatusSource for AdminDeposits {
    type Status = TransactionStatus;

    fn apply_status(row: &mut Deposit, status: &TransactionStatus) {
        row.status = *status;
    }

    async fn update_status(&self, id: &str, status: TransactionStatus, note: Option<String>) -> Result<Deposit> {
        let update = StatusUpdateRequest { status, admin_note: note };
        admin::update_deposit_status(&self.0, id, &update).await
    }
}

/// Admin: withdrawal requests
pub struct AdminWithdrawals(pub Arc<ApiClient>);

#[async_trait]
impl ListSource for AdminWithdrawals {
    type Row = Withdrawal;

    fn name(&self) -> &'static str {
        "withdrawals"
    }

    fn row_id(row: &Withdrawal) -> &str {
        &row.id
    }

    async fn fetch_page(&self, query: &ListQuery) -> Result<Page<Withdrawal>> {
        admin::list_withdrawals(&self.0, query).await
    }
}

#[async_trait]
impl StatusSource for AdminWithdrawals {
    type Status = TransactionStatus;

    fn apply_status(row: &mut Withdrawal, status: &TransactionStatus) {
        row.status = *status;
    }

    async fn update_status(&self, id: &str, status: TransactionStatus, note: Option<String>) -> Result<Withdrawal> {
        let update = StatusUpdateRequest { status, admin_note: note };
        admin::update_withdrawal_status(&self.0, id, &update).await
    }
}

/// Admin: every user's transactions
pub struct AdminTransactions(pub Arc<ApiClient>);

#[async_trait]
impl ListSource for AdminTransactions {
    type Row = Transaction;

    fn name(&self) -> &'static str {
        "transactions"
    }

    fn row_id(row: &Transaction) -> &str {
        &row.id
    }

    async fn fetch_page(&self, query: &ListQuery) -> Result<Page<Transaction>> {
        admin::list_transactions(&self.0, query).await
    }

    async fn fetch_one(&self, id: &str) -> Result<Option<Transaction>> {
        admin::get_transaction(&self.0, id).await.map(Some)
    }
}

#[async_trait]
impl StatusSource for AdminTransactions {
    type Status = TransactionStatus;

    fn apply_status(row: &mut Transaction, status: &TransactionStatus) {
        row.status = *status;
    }

    async fn update_status(&self, id: &str, status: TransactionStatus, note: Option<String>) -> Result<Transaction> {
        let update = StatusUpdateRequest { status, admin_note: note };
        admin::update_transaction_status(&self.0, id, &update).await
    }
}

/// Admin: uploaded documents awaiting review
pub struct AdminDocuments(pub Arc<ApiClient>);

#[async_trait]
impl ListSource for AdminDocuments {
    type Row = Document;

    fn name(&self) -> &'static str {
        "documents"
    }

    fn row_id(row: &Document) -> &str {
        &row.id
    }

    async fn fetch_page(&self, query: &ListQuery) -> Result<Page<Document>> {
        admin::list_documents(&self.0, query).await
    }
}

#[async_trait]
impl StatusSource for AdminDocuments {
    type Status = DocumentStatus;

    fn apply_status(row: &mut Document, status: &DocumentStatus) {
        row.status = *status;
    }

    async fn update_status(&self, id: &str, status: DocumentStatus, note: Option<String>) -> Result<Document> {
        let update = DocumentStatusUpdate { status, note };
        admin::update_document_status(&self.0, id, &update).await
    }
}

/// Client: own transaction history
pub struct MyTransactions(pub Arc<ApiClient>);

#[async_trait]
impl ListSource for MyTransactions {
    type Row = Transaction;

    fn name(&self) -> &'static str {
        "transactions"
    }

    fn row_id(row: &Transaction) -> &str {
        &row.id
    }

    async fn fetch_page(&self, query: &ListQuery) -> Result<Page<Transaction>> {
        transactions::list_transactions(&self.0, query).await
    }

    async fn fetch_one(&self, id: &str) -> Result<Option<Transaction>> {
        transactions::get_transaction(&self.0, id).await.map(Some)
    }
}

impl MyTransactions {
    /// Server-side CSV export of the filtered history (all pages).
    pub async fn export_all(&self, query: &ListQuery, dir: &Path) -> Result<PathBuf> {
        let bytes = reports::export_transactions(&self.0, query).await?;
        save_download(dir, "transactions.csv", &bytes).await
    }
}
