//! # Services Module
//!
//! Transport-level integrations with the portal backend.
//!
//! ```text
//! services/
//! ├── api/            - REST client, one module per resource
//! ├── push.rs         - Notification push channel (WebSocket)
//! └── token_store.rs  - Access/refresh token persistence
//! ```
//!
//! ## Service Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                     Portal (app)                     │
//! │  ┌──────────────────┐        ┌──────────────────┐    │
//! │  │  ApiClient       │        │  PushChannel     │    │
//! │  │  (api/client.rs) │        │  (push.rs)       │    │
//! │  └────────┬─────────┘        └────────┬─────────┘    │
//! │           └────── TokenStore ─────────┘              │
//! └───────────┼───────────────────────────┼──────────────┘
//!             │ HTTP/JSON                 │ WebSocket
//!             ▼                           ▼
//!   /api/auth/*  /api/users/*    /api/ws/notifications
//!   /api/investments/* ...
//! ```
//!
//! ## Error Handling
//!
//! Everything returns [`crate::core::error::PortalError`]:
//! - no response: `Network`
//! - error envelope: `Api { status, message }`, message shown verbatim
//! - rejected refresh token: `SessionExpired` (tokens already cleared)
//!
//! ## Thread Safety
//!
//! - **ApiClient**: wraps `reqwest::Client`; share it through `Arc`
//! - **TokenStore**: internally locked, shared by the client and push channel
//! - **PushChannel**: owned by a spawned task, stopped by aborting it

pub mod api;
pub mod push;
pub mod token_store;
