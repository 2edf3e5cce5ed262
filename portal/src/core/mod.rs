//! # Core Abstractions
//!
//! Error type and service traits shared by every store and controller.
//!
//! ## Modules
//!
//! - **[`error`]**: [`PortalError`] and the `Result<T>` alias
//! - **[`service`]**: service traits for dependency injection
//!
//! ## Dependency Injection
//!
//! Stores depend on the narrow traits in [`service`], never on the concrete
//! client, so tests can hand them an in-memory mock:
//!
//! ```rust,ignore
//! use portal::core::service::AuthService;
//!
//! // In production: the HTTP client implements every service trait
//! let auth: Arc<dyn AuthService> = Arc::new(ApiClient::new(&config, tokens.clone())?);
//!
//! // In tests: a mock implementation
//! let auth: Arc<dyn AuthService> = Arc::new(MockAuth::new());
//! ```

pub mod error;
pub mod service;

pub use error::{PortalError, Result};
pub use service::{
    AuthService, BankAccountService, CatalogAdminService, FundsService, NotificationService, PortfolioService,
    TradeService,
};
