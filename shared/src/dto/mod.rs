//! # Data Transfer Objects (DTOs)
//!
//! This module contains all data structures used for communication between
//! the portal client and the backend via the REST API.
//!
//! The portal holds no authoritative state: every type here is a transient
//! view copy of a backend record.
//!
//! ## Example JSON Communication
//!
//! ```text
//! POST /api/auth/login
//! Content-Type: application/json
//!
//! {
//!   "email": "jane@example.com",
//!   "password": "MyPassword123!"
//! }
//! ```
//!
//! ```text
//! HTTP/1.1 200 OK
//! Content-Type: application/json
//!
//! {
//!   "data": {
//!     "user": { "id": "u1", "email": "jane@example.com", ... },
//!     "accessToken": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...",
//!     "refreshToken": "d2c1..."
//!   },
//!   "message": "Login successful"
//! }
//! ```

pub mod admin;
pub mod auth;
pub mod banking;
pub mod document;
pub mod envelope;
pub mod investment;
pub mod notification;
pub mod transaction;

pub use admin::*;
pub use auth::*;
pub use banking::*;
pub use document::*;
pub use envelope::*;
pub use investment::*;
pub use notification::*;
pub use transaction::*;
