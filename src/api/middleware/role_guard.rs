//! Role-based authorization middleware.
//!
//! A [`RoleGuard`] is attached to a route group as an `Extension` layer and
//! enforced by [`require_roles`], which runs after the authentication
//! middleware has stored the caller in the request extensions.

use axum::{extract::Request, middleware::Next, response::Response, Extension};

use crate::api::middleware::auth::AuthUser;
use crate::error::AppError;
use crate::models::Role;

/// Set of roles allowed through a route group.
#[derive(Debug, Clone)]
pub struct RoleGuard {
    roles: Vec<Role>,
}

impl RoleGuard {
    pub fn new(roles: &[Role]) -> Self {
        Self {
            roles: roles.to_vec(),
        }
    }

    pub fn admin() -> Self {
        Self::new(&[Role::Admin])
    }

    /// True when the caller holds at least one of the guarded roles.
    pub fn allows(&self, user: &AuthUser) -> bool {
        user.roles.iter().any(|role| self.roles.contains(role))
    }
}

/// Rejects the request with 403 unless the authenticated caller holds one
/// of the roles in the group's [`RoleGuard`] extension.
///
/// Layer ordering matters: the `Extension(RoleGuard)` layer must sit outside
/// this middleware so the guard is present when it runs.
pub async fn require_roles(
    Extension(guard): Extension<RoleGuard>,
    Extension(auth_user): Extension<AuthUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !guard.allows(&auth_user) {
        return Err(AppError::Forbidden {
            message: "Insufficient permissions".to_string(),
        });
    }

    Ok(next.run(request).await)
}
