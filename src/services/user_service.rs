use crate::error::{AppError, AppResult};
use crate::models::{NewUser, UpdateUser, User};
use crate::repositories::UserRepository;
use crate::utils::password;

/// Service layer for user account operations.
///
/// Owns every business rule around accounts (password hashing and rotation,
/// the empty-changeset shortcut, avatar reference updates) and shapes
/// repository `Option`s into [`AppError::NotFound`] for the API layer.
#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
}

impl UserService {
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    /// Creates an account, hashing the plain-text password before it is
    /// stored. A duplicate email surfaces as [`AppError::Duplicate`] through
    /// the database error converter.
    pub async fn create_user(&self, mut new_user: NewUser) -> AppResult<User> {
        new_user.password = password::hash_password(&new_user.password)?;
        self.repo.create(new_user).await
    }

    pub async fn get_user(&self, id: i32) -> AppResult<User> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("user", id))
    }

    pub async fn get_user_by_email(&self, email: &str) -> AppResult<User> {
        self.repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound {
                entity: "user".to_string(),
                field: "email".to_string(),
                value: email.to_string(),
            })
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.repo.list_all().await
    }

    /// Applies a partial update. Fields left `None` keep their stored
    /// values. An all-`None` changeset skips the UPDATE entirely and returns
    /// the current row, since diesel rejects a SET clause with no columns.
    pub async fn update_user(&self, id: i32, update_data: UpdateUser) -> AppResult<User> {
        if update_data.is_empty() {
            return self.get_user(id).await;
        }
        self.get_user(id).await?;
        self.repo.update(id, update_data).await
    }

    /// Replaces the stored avatar reference; `None` clears the column.
    pub async fn update_avatar(&self, id: i32, avatar: Option<String>) -> AppResult<User> {
        self.get_user(id).await?;
        let update = UpdateUser {
            avatar: Some(avatar),
            ..UpdateUser::default()
        };
        self.repo.update(id, update).await
    }

    /// Rotates the password after checking the current one.
    ///
    /// A wrong current password yields [`AppError::PasswordMismatch`] and
    /// leaves the stored hash untouched.
    pub async fn update_password(
        &self,
        id: i32,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<User> {
        let user = self.get_user(id).await?;
        if !password::verify_password(current_password, &user.password)? {
            return Err(AppError::PasswordMismatch);
        }
        let new_hash = password::hash_password(new_password)?;
        self.repo.update_password(id, &new_hash).await
    }

    pub async fn delete_user(&self, id: i32) -> AppResult<()> {
        let affected = self.repo.delete(id).await?;
        if affected == 0 {
            return Err(AppError::not_found("user", id));
        }
        Ok(())
    }

    /// Checks login credentials. Unknown email and wrong password produce
    /// the same message so the response does not reveal which half failed;
    /// disabled accounts are rejected after the password check.
    pub async fn authenticate(&self, email: &str, plain_password: &str) -> AppResult<User> {
        let user = self
            .repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::Unauthorized {
                message: "Invalid email or password".to_string(),
            })?;

        if !password::verify_password(plain_password, &user.password)? {
            return Err(AppError::Unauthorized {
                message: "Invalid email or password".to_string(),
            });
        }

        if !user.enabled {
            return Err(AppError::Forbidden {
                message: "User account is disabled".to_string(),
            });
        }

        Ok(user)
    }
}
