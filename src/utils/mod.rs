//! Shared utilities: password hashing, JWT handling and payload validation.

pub mod jwt;
pub mod password;
pub mod validate;
