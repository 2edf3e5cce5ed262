//! # Utility Functions
//!
//! ## Modules
//!
//! - **[`validation`]**: field validators and [`validation::FieldErrors`]
//!
//! ## Related Modules
//!
//! - [`shared::utils`]: display helpers (money formatting, account masking)
//! - [`crate::core`]: error types

pub mod validation;
