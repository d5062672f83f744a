//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] brewpoints_core::EmailError),

    /// Invalid phone format.
    #[error("invalid phone: {0}")]
    InvalidPhone(#[from] brewpoints_core::PhoneError),

    /// Neither phone nor email was supplied.
    #[error("phone or email is required")]
    MissingIdentity,

    /// Shop name empty or too long.
    #[error("invalid shop name: {0}")]
    InvalidShopName(String),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Wrong email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No guest with this phone or email at the shop.
    #[error("user not found")]
    GuestNotFound,

    /// Guest sign-up for a shop that does not exist.
    #[error("shop not found")]
    ShopNotFound,

    /// Admin email already used by another shop.
    #[error("shop with this admin_email already exists")]
    ShopAlreadyExists,

    /// Phone or email already registered.
    #[error("user already exists")]
    GuestAlreadyExists,

    /// Token malformed or signed with another key.
    #[error("invalid token")]
    InvalidToken,

    /// Token past its expiry.
    #[error("token expired")]
    TokenExpired,

    /// Token could not be produced.
    #[error("token signing error")]
    TokenSigning,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
