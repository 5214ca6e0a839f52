use jiff::Timestamp;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Token type enumeration
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Access token for API authentication (short-lived)
    Access,
    /// Refresh token for obtaining new access tokens (long-lived)
    Refresh,
}

/// JWT Claims structure containing user information and token metadata
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// User email
    pub email: String,
    /// Token type (access or refresh)
    pub token_type: TokenType,
    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,
    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user
    ///
    /// # Arguments
    /// * `user_id` - The user's ID
    /// * `email` - The user's email
    /// * `token_type` - The type of token (Access or Refresh)
    /// * `expiration_hours` - Token validity duration in hours
    pub fn new(user_id: i32, email: String, token_type: TokenType, expiration_hours: i64) -> Self {
        let iat = Timestamp::now().as_second();
        let exp = iat + expiration_hours * 3600;

        Self {
            sub: user_id.to_string(),
            email,
            token_type,
            iat,
            exp,
        }
    }

    /// Parse the subject claim back into a user id
    pub fn user_id(&self) -> AppResult<i32> {
        self.sub.parse::<i32>().map_err(|_| AppError::Unauthorized {
            message: format!("Invalid subject claim: {}", self.sub),
        })
    }
}

/// Generates a JWT token for a user
///
/// # Arguments
/// * `user_id` - The user's ID
/// * `email` - The user's email
/// * `token_type` - The type of token (Access or Refresh)
/// * `secret` - The secret key for signing the token
/// * `expiration_hours` - Token validity duration in hours
///
/// # Returns
/// The encoded JWT token string
pub fn generate_token(
    user_id: i32,
    email: String,
    token_type: TokenType,
    secret: &str,
    expiration_hours: i64,
) -> AppResult<String> {
    let claims = Claims::new(user_id, email, token_type, expiration_hours);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal {
        source: anyhow::anyhow!("Failed to generate JWT token: {}", e),
    })
}

/// Generates an access token (short-lived)
pub fn generate_access_token(
    user_id: i32,
    email: String,
    secret: &str,
    expiration_hours: i64,
) -> AppResult<String> {
    generate_token(user_id, email, TokenType::Access, secret, expiration_hours)
}

/// Generates a refresh token (long-lived)
pub fn generate_refresh_token(
    user_id: i32,
    email: String,
    secret: &str,
    expiration_hours: i64,
) -> AppResult<String> {
    generate_token(user_id, email, TokenType::Refresh, secret, expiration_hours)
}

/// Generates both access and refresh tokens
///
/// # Arguments
/// * `user_id` - The user's ID
/// * `email` - The user's email
/// * `secret` - The secret key for signing the tokens
/// * `access_expiration_hours` - Access token validity duration in hours
/// * `refresh_expiration_hours` - Refresh token validity duration in hours
///
/// # Returns
/// A tuple of (access_token, refresh_token)
pub fn generate_token_pair(
    user_id: i32,
    email: String,
    secret: &str,
    access_expiration_hours: i64,
    refresh_expiration_hours: i64,
) -> AppResult<(String, String)> {
    let access_token =
        generate_access_token(user_id, email.clone(), secret, access_expiration_hours)?;

    let refresh_token = generate_refresh_token(user_id, email, secret, refresh_expiration_hours)?;

    Ok((access_token, refresh_token))
}

/// Validates and decodes a JWT token
///
/// # Arguments
/// * `token` - The JWT token string to validate
/// * `secret` - The secret key for verifying the token
/// * `expected_type` - Optional expected token type to validate against
///
/// # Returns
/// The decoded claims if the token is valid
pub fn validate_token(
    token: &str,
    secret: &str,
    expected_type: Option<TokenType>,
) -> AppResult<Claims> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::Unauthorized {
            message: "Token has expired".to_string(),
        },
        jsonwebtoken::errors::ErrorKind::InvalidToken => AppError::Unauthorized {
            message: "Invalid token".to_string(),
        },
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AppError::Unauthorized {
            message: "Invalid token signature".to_string(),
        },
        _ => AppError::Unauthorized {
            message: format!("Token validation failed: {}", e),
        },
    })?;

    // Validate token type if specified
    if let Some(expected) = expected_type {
        if claims.token_type != expected {
            return Err(AppError::Unauthorized {
                message: format!(
                    "Invalid token type: expected {:?}, got {:?}",
                    expected, claims.token_type
                ),
            });
        }
    }

    Ok(claims)
}

/// Validates an access token
pub fn validate_access_token(token: &str, secret: &str) -> AppResult<Claims> {
    validate_token(token, secret, Some(TokenType::Access))
}

/// Validates a refresh token
pub fn validate_refresh_token(token: &str, secret: &str) -> AppResult<Claims> {
    validate_token(token, secret, Some(TokenType::Refresh))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test_secret_key_for_jwt_testing";

    #[test]
    fn test_generate_token() {
        let token = generate_token(
            1,
            "test@example.com".to_string(),
            TokenType::Access,
            TEST_SECRET,
            24,
        );

        assert!(token.is_ok());
        let token_str = token.unwrap();
        assert!(!token_str.is_empty());
        assert!(token_str.contains('.'));
    }

    #[test]
    fn test_generate_token_pair() {
        let result = generate_token_pair(1, "test@example.com".to_string(), TEST_SECRET, 1, 168);

        assert!(result.is_ok());
        let (access_token, refresh_token) = result.unwrap();
        assert!(!access_token.is_empty());
        assert!(!refresh_token.is_empty());
        assert_ne!(access_token, refresh_token);
    }

    #[test]
    fn test_validate_token_success() {
        let token = generate_token(
            1,
            "test@example.com".to_string(),
            TokenType::Access,
            TEST_SECRET,
            24,
        )
        .unwrap();

        let claims = validate_token(&token, TEST_SECRET, None);
        assert!(claims.is_ok());

        let claims = claims.unwrap();
        assert_eq!(claims.sub, "1");
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn test_validate_access_token() {
        let token =
            generate_access_token(1, "test@example.com".to_string(), TEST_SECRET, 1).unwrap();

        let claims = validate_access_token(&token, TEST_SECRET);
        assert!(claims.is_ok());
        assert_eq!(claims.unwrap().token_type, TokenType::Access);
    }

    #[test]
    fn test_validate_refresh_token() {
        let token =
            generate_refresh_token(1, "test@example.com".to_string(), TEST_SECRET, 168).unwrap();

        let claims = validate_refresh_token(&token, TEST_SECRET);
        assert!(claims.is_ok());
        assert_eq!(claims.unwrap().token_type, TokenType::Refresh);
    }

    #[test]
    fn test_validate_wrong_token_type() {
        let access_token =
            generate_access_token(1, "test@example.com".to_string(), TEST_SECRET, 1).unwrap();

        // Try to validate access token as refresh token
        let result = validate_refresh_token(&access_token, TEST_SECRET);
        assert!(result.is_err());

        if let Err(AppError::Unauthorized { message }) = result {
            assert!(message.contains("Invalid token type"));
        } else {
            panic!("Expected Unauthorized error for wrong token type");
        }
    }

    #[test]
    fn test_validate_token_invalid_secret() {
        let token = generate_token(
            1,
            "test@example.com".to_string(),
            TokenType::Access,
            TEST_SECRET,
            24,
        )
        .unwrap();

        let result = validate_token(&token, "wrong_secret", None);
        assert!(result.is_err());

        if let Err(AppError::Unauthorized { message }) = result {
            assert!(message.contains("signature"));
        } else {
            panic!("Expected Unauthorized error");
        }
    }

    #[test]
    fn test_validate_token_invalid_format() {
        let result = validate_token("invalid.token.format", TEST_SECRET, None);
        assert!(result.is_err());

        if let Err(AppError::Unauthorized { message }) = result {
            assert!(message.contains("Invalid token") || message.contains("validation"));
        } else {
            panic!("Expected Unauthorized error");
        }
    }

    #[test]
    fn test_expired_token() {
        // Negative hours create an already expired token
        let token = generate_token(
            1,
            "test@example.com".to_string(),
            TokenType::Access,
            TEST_SECRET,
            -1,
        )
        .unwrap();

        let result = validate_token(&token, TEST_SECRET, None);
        assert!(result.is_err());

        if let Err(AppError::Unauthorized { message }) = result {
            assert!(message.contains("expired"));
        } else {
            panic!("Expected Unauthorized error for expired token");
        }
    }

    #[test]
    fn test_claims_structure() {
        let claims = Claims::new(42, "user@example.com".to_string(), TokenType::Refresh, 24);

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email, "user@example.com");
        assert_eq!(claims.token_type, TokenType::Refresh);
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert_eq!(claims.user_id().unwrap(), 42);
    }

    #[test]
    fn test_claims_invalid_subject() {
        let mut claims = Claims::new(1, "user@example.com".to_string(), TokenType::Access, 1);
        claims.sub = "not-a-number".to_string();

        assert!(claims.user_id().is_err());
    }

    #[test]
    fn test_token_type_serialization() {
        let access_claims = Claims::new(1, "test@example.com".to_string(), TokenType::Access, 1);

        let json = serde_json::to_string(&access_claims).unwrap();
        assert!(json.contains("\"token_type\":\"access\""));

        let refresh_claims = Claims::new(1, "test@example.com".to_string(), TokenType::Refresh, 168);

        let json = serde_json::to_string(&refresh_claims).unwrap();
        assert!(json.contains("\"token_type\":\"refresh\""));
    }
}
