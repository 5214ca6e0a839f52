//! Request and response payloads for the user endpoints.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{Role, UpdateUser, User};

static ACTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ud]$").unwrap_or_else(|e| panic!("invalid action pattern: {e}"))
});

// ============================================================================
// Requests
// ============================================================================

/// Partial update of a user profile. Absent fields are left untouched.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 50, message = "First name must be 1-50 characters"))]
    #[schema(example = "John")]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Last name must be 1-50 characters"))]
    #[schema(example = "Doe")]
    pub last_name: Option<String>,

    #[validate(length(max = 20, message = "Gender must be at most 20 characters"))]
    #[schema(example = "male")]
    pub gender: Option<String>,

    #[schema(example = true)]
    pub enabled: Option<bool>,

    #[validate(length(min = 1, max = 255, message = "Avatar must be 1-255 characters"))]
    pub avatar: Option<String>,
}

impl UpdateUserRequest {
    /// Converts into the persistence changeset. A present `avatar` sets the
    /// column; clearing it is only done through the picture endpoint.
    pub fn into_update_user(self) -> UpdateUser {
        UpdateUser {
            first_name: self.first_name,
            last_name: self.last_name,
            gender: self.gender,
            enabled: self.enabled,
            avatar: self.avatar.map(Some),
        }
    }
}

/// Password change guarded by the current password.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 1, message = "Current password cannot be blank"))]
    pub current_password: String,

    #[validate(length(min = 6, max = 30, message = "Password must be 6-30 characters"))]
    pub new_password: String,
}

/// Multipart form for the profile picture endpoint, assembled by the handler
/// from the raw multipart stream.
#[derive(Debug, Validate, ToSchema)]
pub struct PictureForm {
    /// `u` uploads the attached file, `d` deletes the current picture.
    #[validate(
        length(min = 1, max = 1, message = "Action must be a single character"),
        regex(path = *ACTION_PATTERN, message = "Action must be 'u' or 'd'")
    )]
    #[schema(example = "u")]
    pub action: String,

    /// Image payload, required when the action is `u`.
    #[schema(value_type = Option<String>, format = Binary)]
    pub file: Option<PictureFile>,
}

impl PictureForm {
    /// Runs the field rules, then converts the action into its closed form.
    ///
    /// The regex rule on `action` admits exactly `u` and `d`, so a form that
    /// validates always parses; the fallback error only fires if the two ever
    /// drift apart.
    pub fn validated_action(&self) -> AppResult<AvatarAction> {
        self.validate()?;
        AvatarAction::parse(&self.action).ok_or_else(|| AppError::Validation {
            field: "action".to_string(),
            reason: format!("Unknown action '{}'", self.action),
        })
    }
}

/// A file part lifted out of the multipart stream.
#[derive(Debug, Clone)]
pub struct PictureFile {
    pub filename: String,
    pub bytes: axum::body::Bytes,
}

/// Validated picture action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarAction {
    Upload,
    Delete,
}

impl AvatarAction {
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "u" => Some(Self::Upload),
            "d" => Some(Self::Delete),
            _ => None,
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Full user representation returned by the user endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "john.doe@example.com")]
    pub email: String,
    #[schema(example = "John")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "male")]
    pub gender: Option<String>,
    #[schema(example = true)]
    pub enabled: bool,
    pub avatar: Option<String>,
    pub roles: Vec<Role>,
    #[schema(example = "2024-01-15T10:30:00.000Z")]
    pub created_at: String,
    #[schema(example = "2024-01-15T10:30:00.000Z")]
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            gender: user.gender,
            enabled: user.enabled,
            avatar: user.avatar,
            roles: user.roles,
            created_at: format_timestamp(&user.created_at),
            updated_at: format_timestamp(&user.updated_at),
        }
    }
}

fn format_timestamp(timestamp: &jiff_diesel::DateTime) -> String {
    timestamp
        .to_jiff()
        .strftime("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}
