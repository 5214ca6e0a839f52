//! Error payload returned by every failing endpoint.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of all non-2xx responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Stable machine-readable error code
    #[schema(example = "NOT_FOUND")]
    pub code: String,

    /// Human-readable description
    #[schema(example = "user with id '42' not found")]
    pub message: String,

    /// Optional structured detail, e.g. per-field validation messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// Correlation id echoed from the `x-request-id` header
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            request_id: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}
