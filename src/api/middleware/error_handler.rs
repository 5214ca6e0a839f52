//! Error handler for converting AppError to HTTP responses.
//!
//! Implements IntoResponse for AppError with consistent status code
//! mapping and message sanitization, plus a middleware that normalizes
//! every error body and stamps it with the request id.

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, error};

use crate::api::dto::ErrorResponse;
use crate::api::middleware::request_id::RequestId;
use crate::error::AppError;

impl IntoResponse for AppError {
    /// Converts an AppError into an HTTP response.
    ///
    /// # Status Code Mapping
    /// - NotFound → 404 NOT_FOUND
    /// - Duplicate → 409 CONFLICT
    /// - Validation / ValidationErrors / PasswordMismatch / BadRequest → 400 BAD_REQUEST
    /// - Unauthorized → 401 UNAUTHORIZED
    /// - Forbidden → 403 FORBIDDEN
    /// - Io / Database / Configuration / Internal → 500 INTERNAL_SERVER_ERROR
    /// - ConnectionPool → 503 SERVICE_UNAVAILABLE
    ///
    /// Messages for 5xx responses carry the operation context only; the
    /// underlying source error stays in the logs.
    fn into_response(self) -> Response {
        let status = error_to_status_code(&self);

        if status.is_server_error() {
            error!(status = status.as_u16(), error = ?self, "Request failed");
        } else {
            debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let error_response = match &self {
            AppError::NotFound { .. }
            | AppError::Duplicate { .. }
            | AppError::PasswordMismatch
            | AppError::Io { .. } => ErrorResponse::new(error_to_code(&self), self.to_string()),
            AppError::Validation { field, reason } => {
                ErrorResponse::new(error_to_code(&self), self.to_string()).with_details(json!([
                    {
                        "field": field,
                        "message": reason,
                    }
                ]))
            }
            AppError::ValidationErrors { errors } => {
                ErrorResponse::new(error_to_code(&self), "Validation failed").with_details(
                    serde_json::to_value(errors).unwrap_or_else(|_| json!([])),
                )
            }
            AppError::BadRequest { message }
            | AppError::Unauthorized { message }
            | AppError::Forbidden { message } => {
                ErrorResponse::new(error_to_code(&self), message)
            }
            AppError::Database { operation, .. } => {
                ErrorResponse::new(error_to_code(&self), self.to_string())
                    .with_details(json!({ "operation": operation }))
            }
            AppError::Configuration { key, .. } => {
                ErrorResponse::new(error_to_code(&self), self.to_string())
                    .with_details(json!({ "key": key }))
            }
            AppError::ConnectionPool { .. } => {
                ErrorResponse::new(error_to_code(&self), "Database connection unavailable")
            }
            AppError::Internal { .. } => {
                ErrorResponse::new(error_to_code(&self), "An internal error occurred")
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Maps an AppError variant to its corresponding HTTP status code.
pub fn error_to_status_code(error: &AppError) -> StatusCode {
    match error {
        AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::Duplicate { .. } => StatusCode::CONFLICT,
        AppError::Validation { .. }
        | AppError::ValidationErrors { .. }
        | AppError::PasswordMismatch
        | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
        AppError::Io { .. }
        | AppError::Database { .. }
        | AppError::Configuration { .. }
        | AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        AppError::ConnectionPool { .. } => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Maps an AppError variant to its stable error code string.
pub fn error_to_code(error: &AppError) -> &'static str {
    match error {
        AppError::NotFound { .. } => "NOT_FOUND",
        AppError::Duplicate { .. } => "DUPLICATE_ENTRY",
        AppError::Validation { .. } | AppError::ValidationErrors { .. } => "VALIDATION_ERROR",
        AppError::PasswordMismatch => "PASSWORD_MISMATCH",
        AppError::BadRequest { .. } => "BAD_REQUEST",
        AppError::Unauthorized { .. } => "UNAUTHORIZED",
        AppError::Forbidden { .. } => "FORBIDDEN",
        AppError::Io { .. } => "IO_ERROR",
        AppError::Database { .. } => "DATABASE_ERROR",
        AppError::Configuration { .. } => "CONFIGURATION_ERROR",
        AppError::ConnectionPool { .. } => "SERVICE_UNAVAILABLE",
        AppError::Internal { .. } => "INTERNAL_ERROR",
    }
}

/// Normalizes error responses and stamps them with the request id.
///
/// Runs inside the request id middleware: JSON error bodies produced by
/// `AppError::into_response` get a `request_id` field when they lack one,
/// and plain-text errors emitted by the framework (unknown routes, method
/// mismatches, extractor rejections) are wrapped into [`ErrorResponse`].
pub async fn error_response_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone());

    let response = next.run(request).await;
    rewrite_error_response(response, request_id).await
}

async fn rewrite_error_response(response: Response, request_id: Option<String>) -> Response {
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => axum::body::Bytes::new(),
    };

    if is_json {
        match serde_json::from_slice::<serde_json::Value>(&body_bytes) {
            Ok(mut value) => {
                if let (Some(object), Some(id)) = (value.as_object_mut(), &request_id) {
                    object
                        .entry("request_id".to_string())
                        .or_insert_with(|| json!(id));
                }
                return (status, Json(value)).into_response();
            }
            // Unparseable JSON body, pass it through untouched.
            Err(_) => return Response::from_parts(parts, axum::body::Body::from(body_bytes)),
        }
    }

    let (code, default_message) = status_defaults(status);
    let original_message = String::from_utf8_lossy(&body_bytes).trim().to_string();
    let message = if original_message.is_empty() {
        default_message.to_string()
    } else {
        original_message
    };

    let mut error_response = ErrorResponse::new(code, message);
    if let Some(id) = request_id {
        error_response = error_response.with_request_id(id);
    }

    (status, Json(error_response)).into_response()
}

fn status_defaults(status: StatusCode) -> (&'static str, &'static str) {
    match status {
        StatusCode::BAD_REQUEST => ("BAD_REQUEST", "Bad request"),
        StatusCode::UNAUTHORIZED => ("UNAUTHORIZED", "Authentication required"),
        StatusCode::FORBIDDEN => ("FORBIDDEN", "Access denied"),
        StatusCode::NOT_FOUND => ("NOT_FOUND", "The requested resource was not found"),
        StatusCode::METHOD_NOT_ALLOWED => {
            ("METHOD_NOT_ALLOWED", "HTTP method not allowed for this endpoint")
        }
        StatusCode::REQUEST_TIMEOUT => ("REQUEST_TIMEOUT", "Request timeout"),
        StatusCode::PAYLOAD_TOO_LARGE => ("PAYLOAD_TOO_LARGE", "Request payload too large"),
        StatusCode::UNSUPPORTED_MEDIA_TYPE => ("UNSUPPORTED_MEDIA_TYPE", "Unsupported media type"),
        StatusCode::UNPROCESSABLE_ENTITY => ("UNPROCESSABLE_ENTITY", "Unprocessable request"),
        StatusCode::SERVICE_UNAVAILABLE => {
            ("SERVICE_UNAVAILABLE", "Service temporarily unavailable")
        }
        s if s.is_server_error() => ("INTERNAL_ERROR", "An internal server error occurred"),
        _ => ("REQUEST_ERROR", "Request failed"),
    }
}
