//! # Backend API Client Module
//!
//! HTTP client for communicating with the portal backend.
//!
//! ## Module Structure
//!
//! ```text
//! api/
//! ├── mod.rs           - Module exports and documentation
//! ├── client.rs        - ApiClient: bearer auth, refresh-and-retry, envelope decoding
//! ├── auth.rs          - Login, register, logout, password and email flows
//! ├── users.rs         - Profile, profile picture, password change
//! ├── portfolios.rs    - Portfolios
//! ├── investments.rs   - Owned investments, buy/sell preview and commit
//! ├── marketplace.rs   - Catalog listings
//! ├── transactions.rs  - Transaction history
//! ├── bank_accounts.rs - Bank account CRUD
//! ├── deposits.rs      - Deposit requests
//! ├── withdrawals.rs   - Withdrawal requests
//! ├── documents.rs     - Document upload/download
//! ├── reports.rs       - Statements and exports
//! ├── notifications.rs - Notification list and read state
//! ├── admin.rs         - Admin operations
//! └── downloads.rs     - Saving downloaded files
//! ```
//!
//! Endpoint functions take `&ApiClient` and return the unwrapped `data` of the
//! response envelope. [`ApiClient`] also implements the service traits in
//! [`crate::core::service`], which is what the stores and controllers depend on.

pub mod admin;
pub mod auth;
pub mod bank_accounts;
pub mod client;
pub mod deposits;
pub mod documents;
pub mod downloads;
pub mod investments;
pub mod marketplace;
pub mod notifications;
pub mod portfolios;
pub mod reports;
pub mod transactions;
pub mod users;
pub mod withdrawals;

pub use client::ApiClient;
pub use downloads::save_download;

#[cfg(test)]
mod tests;
