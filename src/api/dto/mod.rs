//! Data transfer objects for the HTTP API.

mod auth;
mod error;
mod health;
mod response;
mod user;

pub use auth::{
    LoginRequest, LoginResponse, RefreshTokenRequest, RefreshTokenResponse, RegisterRequest,
    RegisterResponse, UserInfo,
};
pub use error::ErrorResponse;
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use response::ApiResponse;
pub use user::{
    AvatarAction, PictureFile, PictureForm, UpdatePasswordRequest, UpdateUserRequest, UserResponse,
};
