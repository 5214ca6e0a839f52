//! JWT authentication middleware.
//!
//! Validates bearer tokens and loads the current account state so that
//! deleted or disabled users are rejected even while their token is valid.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::models::{Role, User};
use crate::state::AppState;
use crate::utils::jwt::validate_access_token;

/// Authenticated caller, added to request extensions after token validation.
///
/// Handlers extract it with `Extension<AuthUser>`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i32,
    pub email: String,
    pub roles: Vec<Role>,
}

impl AuthUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            roles: user.roles,
        }
    }
}

/// Validates the `Authorization: Bearer <token>` header, re-reads the
/// account from the database and stores an [`AuthUser`] in the request
/// extensions.
///
/// # Errors
/// Returns 401 if the header is missing or malformed, the token fails
/// validation, or the account behind it no longer exists. Returns 403
/// when the account exists but is disabled.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized {
            message: "Missing authorization header".to_string(),
        })?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized {
            message: "Invalid authorization header format. Expected: Bearer <token>".to_string(),
        })?;

    let claims = validate_access_token(token, &state.jwt_config.secret)?;
    let user_id = claims.user_id()?;

    // Tokens outlive account changes, so always check the live record.
    let user = match state.services.users.get_user(user_id).await {
        Ok(user) => user,
        Err(AppError::NotFound { .. }) => {
            return Err(AppError::Unauthorized {
                message: "Account no longer exists".to_string(),
            });
        }
        Err(e) => return Err(e),
    };

    if !user.enabled {
        return Err(AppError::Forbidden {
            message: "User account is disabled".to_string(),
        });
    }

    request.extensions_mut().insert(AuthUser::from(user));

    Ok(next.run(request).await)
}
