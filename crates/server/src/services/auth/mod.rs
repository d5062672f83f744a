//! Authentication service.
//!
//! Shop admins sign in with email and password; guests sign in with the phone
//! or email they enrolled with at a given shop. Both receive a signed bearer
//! token from [`TokenSigner`].

mod error;
pub mod token;

pub use error::AuthError;
pub use token::{Claims, IssuedToken, TokenSigner};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use tracing::instrument;

use brewpoints_core::{Email, Phone, ShopId};

use crate::db::{self, RepositoryError};
use crate::models::{Guest, GuestIdentity, NewGuest, NewShop, Shop};

/// Minimum admin password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum shop name length in characters.
pub const MAX_SHOP_NAME_LENGTH: usize = 120;

/// Authentication service.
pub struct AuthService<'a> {
    pool: &'a PgPool,
    tokens: &'a TokenSigner,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenSigner) -> Self {
        Self { pool, tokens }
    }

    // =========================================================================
    // Shop admins
    // =========================================================================

    /// Create a shop and sign its administrator in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidShopName`, `AuthError::InvalidEmail`, or
    /// `AuthError::WeakPassword` for bad input.
    /// Returns `AuthError::ShopAlreadyExists` if the admin email is taken.
    #[instrument(skip(self, password))]
    pub async fn register_shop(
        &self,
        name: &str,
        admin_email: &str,
        password: &str,
    ) -> Result<(Shop, IssuedToken), AuthError> {
        let shop = create_shop(self.pool, name, admin_email, password).await?;
        let token = self
            .tokens
            .issue(Claims::admin(shop.id, shop.admin_email.to_string()))?;

        tracing::info!(shop_id = %shop.id, "Shop registered");
        Ok((shop, token))
    }

    /// Sign a shop administrator in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip(self, password))]
    pub async fn login_shop(
        &self,
        admin_email: &str,
        password: &str,
    ) -> Result<(Shop, IssuedToken), AuthError> {
        let email = Email::parse(admin_email).map_err(|_| AuthError::InvalidCredentials)?;

        let (shop, password_hash) = db::shops::find_credentials(self.pool, &email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let token = self
            .tokens
            .issue(Claims::admin(shop.id, shop.admin_email.to_string()))?;
        Ok((shop, token))
    }

    // =========================================================================
    // Guests
    // =========================================================================

    /// Enroll a guest at `shop_id` with a zero balance and sign them in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingIdentity` if neither phone nor email is given.
    /// Returns `AuthError::ShopNotFound` if the shop does not exist.
    /// Returns `AuthError::GuestAlreadyExists` if the phone or email is taken.
    #[instrument(skip_all, fields(shop_id = %shop_id))]
    pub async fn register_guest(
        &self,
        shop_id: ShopId,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<(Guest, IssuedToken), AuthError> {
        let (phone, email) = parse_identity(phone, email)?;
        if phone.is_none() && email.is_none() {
            return Err(AuthError::MissingIdentity);
        }

        if db::shops::find_by_id(self.pool, shop_id).await?.is_none() {
            return Err(AuthError::ShopNotFound);
        }

        let guest = db::guests::create(
            self.pool,
            &NewGuest {
                shop_id,
                phone,
                email,
            },
        )
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::GuestAlreadyExists,
            other => AuthError::Repository(other),
        })?;

        let token = self.issue_guest_token(&guest)?;
        tracing::info!(guest_id = %guest.id, "Guest registered");
        Ok((guest, token))
    }

    /// Sign a guest in by phone or email. Phone wins when both are given.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingIdentity` if neither phone nor email is given.
    /// Returns `AuthError::GuestNotFound` if no guest of the shop matches.
    #[instrument(skip_all, fields(shop_id = %shop_id))]
    pub async fn login_guest(
        &self,
        shop_id: ShopId,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<(Guest, IssuedToken), AuthError> {
        let (phone, email) = parse_identity(phone, email)?;
        let identity =
            GuestIdentity::from_parts(phone, email).ok_or(AuthError::MissingIdentity)?;

        let guest = db::guests::find_by_identity(self.pool, shop_id, &identity)
            .await?
            .ok_or(AuthError::GuestNotFound)?;

        let token = self.issue_guest_token(&guest)?;
        Ok((guest, token))
    }

    fn issue_guest_token(&self, guest: &Guest) -> Result<IssuedToken, AuthError> {
        self.tokens.issue(Claims::guest(
            guest.id,
            guest.shop_id,
            guest.email.as_ref().map(ToString::to_string),
            guest.phone.as_ref().map(ToString::to_string),
        ))
    }
}

/// Validate input, hash the password, and insert a shop.
///
/// Shared by the HTTP registration flow and the CLI.
///
/// # Errors
///
/// Returns `AuthError::InvalidShopName`, `AuthError::InvalidEmail`, or
/// `AuthError::WeakPassword` for bad input.
/// Returns `AuthError::ShopAlreadyExists` if the admin email is taken.
pub async fn create_shop(
    pool: &PgPool,
    name: &str,
    admin_email: &str,
    password: &str,
) -> Result<Shop, AuthError> {
    let name = validate_shop_name(name)?;
    let admin_email = Email::parse(admin_email)?;
    validate_password(password)?;

    if db::shops::find_credentials(pool, &admin_email)
        .await?
        .is_some()
    {
        return Err(AuthError::ShopAlreadyExists);
    }

    let admin_password_hash = hash_password(password)?;

    db::shops::create(
        pool,
        &NewShop {
            name,
            admin_email,
            admin_password_hash,
        },
    )
    .await
    .map_err(|e| match e {
        RepositoryError::Conflict(_) => AuthError::ShopAlreadyExists,
        other => AuthError::Repository(other),
    })
}

/// Parse whichever of phone and email were supplied. Blank strings count as absent.
fn parse_identity(
    phone: Option<&str>,
    email: Option<&str>,
) -> Result<(Option<Phone>, Option<Email>), AuthError> {
    let phone = phone
        .filter(|p| !p.trim().is_empty())
        .map(Phone::parse)
        .transpose()?;
    let email = email
        .filter(|e| !e.trim().is_empty())
        .map(Email::parse)
        .transpose()?;
    Ok((phone, email))
}

fn validate_shop_name(name: &str) -> Result<String, AuthError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AuthError::InvalidShopName("name is required".to_owned()));
    }
    if name.chars().count() > MAX_SHOP_NAME_LENGTH {
        return Err(AuthError::InvalidShopName(format!(
            "name must be at most {MAX_SHOP_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_owned())
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("espresso").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("espresso", &hash).is_ok());
        assert!(matches!(
            verify_password("americano", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("espresso", "not-a-hash"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("123456").is_ok());
        assert!(matches!(
            validate_password("12345"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_validate_shop_name() {
        assert_eq!(validate_shop_name("  Bean There  ").unwrap(), "Bean There");
        assert!(validate_shop_name("   ").is_err());
        assert!(validate_shop_name(&"x".repeat(MAX_SHOP_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_parse_identity() {
        let (phone, email) = parse_identity(Some("+1 555 123 4567"), Some("")).unwrap();
        assert_eq!(phone.unwrap().as_str(), "+15551234567");
        assert!(email.is_none());

        assert!(matches!(
            parse_identity(None, Some("nope")),
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(matches!(
            parse_identity(Some("abc"), None),
            Err(AuthError::InvalidPhone(_))
        ));
    }
}
