//! # Shared Data Transfer Objects Library
//!
//! This library defines the contract between the portal client and the backend API.
//! All DTOs use JSON serialization via `serde` for API communication.
//!
//! ## Structure
//!
//! - **[`dto`]**: Data Transfer Objects for API communication
//!   - **[`dto::auth`]**: Authentication, users and profile DTOs
//!   - **[`dto::banking`]**: Bank accounts
//!   - **[`dto::investment`]**: Portfolios, owned investments, marketplace catalog, trade previews
//!   - **[`dto::transaction`]**: Transactions, deposits and withdrawals
//!   - **[`dto::notification`]**: Notifications and push channel events
//!   - **[`dto::document`]**: Documents and statements
//!   - **[`dto::admin`]**: Admin-only settings (SMTP, email templates, dashboard stats)
//!   - **[`dto::envelope`]**: Response envelope, pagination and list queries
//! - **[`utils`]**: Display helpers (account masking, money formatting)
//!
//! ## Wire Format
//!
//! - Field names are **camelCase** in JSON (`#[serde(rename_all = "camelCase")]`)
//! - Enums are **SCREAMING_SNAKE_CASE** strings (`"PENDING"`, `"CHECKING"`)
//! - Optional fields are omitted from JSON when `None`
//! - Money is [`rust_decimal::Decimal`], written as a JSON number
//!
//! ## Usage
//!
//! ```rust
//! use shared::dto::envelope::ApiEnvelope;
//! use shared::dto::auth::User;
//!
//! let body = r#"{"data":{"id":"u1","email":"jane@example.com","firstName":"Jane","lastName":"Doe",
//!     "kycStatus":"VERIFIED","emailVerified":true,"role":"CLIENT"}}"#;
//! let envelope: ApiEnvelope<User> = serde_json::from_str(body).unwrap();
//! assert_eq!(envelope.data.first_name, "Jane");
//! ```

pub mod dto;
pub mod utils;

// Re-export commonly used types for convenience
pub use dto::*;
pub use utils::*;
