//! # Response Envelope
//!
//! Every successful response body is `{ "data": ..., "message": ... }`.
//! Error bodies carry a human-readable `message` that is shown to the user verbatim.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outer JSON wrapper around every successful API payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiEnvelope<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self { data, message: None }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: Some(message.into()),
        }
    }
}

/// Error response
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Server-side field errors, keyed by field name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// The text to show the user: `message`, else `error`.
    pub fn best_message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .filter(|m| !m.trim().is_empty())
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn empty(limit: u32) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            limit,
            total_pages: 0,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Filter and pagination parameters shared by every list endpoint.
///
/// Serialized as query string parameters; unset filters are omitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            status: None,
            kind: None,
            search: None,
            start_date: None,
            end_date: None,
        }
    }
}

impl ListQuery {
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_prefers_message() {
        let err: ErrorResponse =
            serde_json::from_str(r#"{"message":"Insufficient funds","error":"Bad Request"}"#).unwrap();
        assert_eq!(err.best_message(), Some("Insufficient funds"));

        let err: ErrorResponse = serde_json::from_str(r#"{"error":"Forbidden"}"#).unwrap();
        assert_eq!(err.best_message(), Some("Forbidden"));

        let err: ErrorResponse = serde_json::from_str(r#"{"message":"  "}"#).unwrap();
        assert_eq!(err.best_message(), None);
    }

    #[test]
    fn test_list_query_skips_unset_filters() {
        let query = ListQuery {
            status: Some("PENDING".to_string()),
            ..ListQuery::with_limit(25)
        };
        let json = serde_json::to_value(&query).unwrap();

        assert_eq!(json, serde_json::json!({ "page": 1, "limit": 25, "status": "PENDING" }));
    }

    #[test]
    fn test_page_navigation_flags() {
        let page: Page<u32> = Page {
            items: vec![1, 2],
            total: 12,
            page: 1,
            limit: 10,
            total_pages: 2,
        };
        assert!(page.has_next());
        assert!(!page.has_previous());
    }
}
