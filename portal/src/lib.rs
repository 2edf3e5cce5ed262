//! # Investment Portal Client - Library Root
//!
//! Client SDK for the investment and banking portal backend. Everything a
//! front end needs lives here: the authenticated REST client, session and
//! notification stores, forms with field validation, the buy/sell wizard and
//! the paginated admin lists. The `portal` binary is a thin command-line
//! front end over this crate.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │              portal (this crate)                       │
//! ├────────────────────────────────────────────────────────┤
//! │  Tokio              - Async runtime                    │
//! │  Reqwest            - HTTP client                      │
//! │  tokio-tungstenite  - Notification push channel        │
//! │  rust_decimal       - Exact money arithmetic           │
//! │  tracing            - Structured logging               │
//! └────────────────────────────────────────────────────────┘
//!          │ HTTP (JSON envelopes)        │ WebSocket
//!          ▼                              ▼
//! ┌────────────────────────────────────────────────────────┐
//! │                   Portal backend                       │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - **app**: stores, forms, wizards and list controllers ([`app::Portal`] ties them together)
//! - **config**: [`config::PortalConfig`] from environment variables
//! - **core**: [`core::error::PortalError`] and the service traits
//! - **services**: REST client, push channel, token storage
//! - **telemetry**: file logging setup
//! - **utils**: field validators
//!
//! ```text
//! main.rs
//!   │
//!   └── app::Portal
//!         ├── app::session ─────────┐
//!         ├── app::notifications ───┼── core::service (traits)
//!         ├── app::holdings ────────┘          ▲
//!         ├── app::forms / trade / listing     │ implemented by
//!         └── services::push             services::api::ApiClient
//! ```
//!
//! ## Core Concepts
//!
//! ### The backend is the source of truth
//!
//! Every entity is a transient copy of a backend record. Local changes are
//! applied optimistically and rolled back (or re-fetched) when the backend
//! disagrees.
//!
//! ### Session lifecycle
//!
//! Requests carry the stored access token. A 401 triggers one refresh (shared
//! by every request that failed at the same time) and a single retry; a failed
//! refresh clears the tokens and publishes [`app::AppEvent::SessionExpired`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use portal::app::Portal;
//! use portal::config::PortalConfig;
//! use portal::services::token_store::FileTokenStore;
//! use std::sync::Arc;
//!
//! # async fn run() -> portal::core::Result<()> {
//! let config = PortalConfig::from_env()?;
//! let tokens = Arc::new(FileTokenStore::open(&config.token_file)?);
//! let portal = Portal::new(config, tokens)?;
//!
//! if portal.start().await?.is_none() {
//!     portal.login("jane@example.com", "secret").await?;
//! }
//! println!("{} unread", portal.notifications.unread_count());
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test -p portal
//! ```
//!
//! HTTP behaviour is tested against an in-process axum backend
//! (`services::api::tests`); stores and forms against mock service traits.

pub mod app;
pub mod config;
pub mod core;
pub mod services;
pub mod telemetry;
pub mod utils;

pub use app::{AppEvent, Portal};
pub use core::{PortalError, Result};
