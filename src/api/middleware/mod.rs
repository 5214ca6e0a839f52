//! Middleware components for request processing.
//!
//! This module contains middleware for logging, request ID tracking,
//! error response shaping, authentication and role-based authorization.

mod auth;
mod error_handler;
mod logging;
mod request_id;
mod role_guard;

pub use auth::{AuthUser, auth_middleware};
pub use error_handler::error_response_middleware;
pub use logging::logging_middleware;
pub use request_id::{RequestId, request_id_middleware};
pub use role_guard::{RoleGuard, require_roles};
