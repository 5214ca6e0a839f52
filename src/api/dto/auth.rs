//! Authentication request and response payloads.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{NewUser, Role, User};

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "john.doe@example.com")]
    pub email: String,

    #[validate(length(min = 6, max = 30, message = "Password must be 6-30 characters"))]
    #[schema(example = "secret123")]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "john.doe@example.com")]
    pub email: String,

    #[validate(length(min = 6, max = 30, message = "Password must be 6-30 characters"))]
    #[schema(example = "secret123")]
    pub password: String,

    #[validate(length(min = 1, max = 50, message = "First name must be 1-50 characters"))]
    #[schema(example = "John")]
    pub first_name: String,

    #[validate(length(min = 1, max = 50, message = "Last name must be 1-50 characters"))]
    #[schema(example = "Doe")]
    pub last_name: String,

    #[validate(length(max = 20, message = "Gender must be at most 20 characters"))]
    #[schema(example = "male")]
    pub gender: Option<String>,
}

impl RegisterRequest {
    /// Self-registered accounts start enabled with the plain user role.
    pub fn into_new_user(self) -> NewUser {
        NewUser {
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            gender: self.gender,
            password: self.password,
            enabled: true,
            roles: vec![Role::User],
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token cannot be blank"))]
    pub refresh_token: String,
}

// ============================================================================
// Responses
// ============================================================================

/// Slim user projection embedded in authentication responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserInfo {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "john.doe@example.com")]
    pub email: String,
    #[schema(example = "John")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub user: UserInfo,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub user: UserInfo,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}
