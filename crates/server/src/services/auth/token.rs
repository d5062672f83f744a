//! Signed bearer tokens.
//!
//! A token is `base64url(claims JSON) "." base64url(HMAC-SHA256(claims))`,
//! both parts unpadded. Tokens are stateless: the server keeps no session
//! table, so revocation means rotating `LOYALTY_TOKEN_SECRET`.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use brewpoints_core::{GuestId, Role, ShopId};

use super::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Claims carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Guest ID for guests, shop ID for admins.
    pub sub: Uuid,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Tenant the bearer belongs to.
    pub shop_id: ShopId,
    pub role: Role,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

impl Claims {
    /// Claims for a guest of `shop_id`.
    #[must_use]
    pub fn guest(
        guest_id: GuestId,
        shop_id: ShopId,
        email: Option<String>,
        phone: Option<String>,
    ) -> Self {
        Self {
            sub: guest_id.as_uuid(),
            email,
            phone,
            shop_id,
            role: Role::Guest,
            iat: 0,
            exp: 0,
        }
    }

    /// Claims for the administrator of `shop_id`.
    #[must_use]
    pub fn admin(shop_id: ShopId, email: String) -> Self {
        Self {
            sub: shop_id.as_uuid(),
            email: Some(email),
            phone: None,
            shop_id,
            role: Role::Admin,
            iat: 0,
            exp: 0,
        }
    }
}

/// A freshly signed token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies tokens with a shared HMAC key.
pub struct TokenSigner {
    secret: SecretString,
    ttl: Duration,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenSigner {
    /// Create a signer. Tokens expire `ttl` after issue.
    #[must_use]
    pub const fn new(secret: SecretString, ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    fn mac(&self) -> Result<HmacSha256, AuthError> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| AuthError::TokenSigning)
    }

    /// Stamp `claims` with issue and expiry times and sign them.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` if the claims cannot be encoded or
    /// the expiry is out of range.
    pub fn issue(&self, claims: Claims) -> Result<IssuedToken, AuthError> {
        self.issue_at(claims, Utc::now())
    }

    fn issue_at(&self, mut claims: Claims, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or(AuthError::TokenSigning)?;
        claims.iat = now.timestamp();
        claims.exp = expires_at.timestamp();

        let payload = serde_json::to_vec(&claims).map_err(|_| AuthError::TokenSigning)?;
        let payload = URL_SAFE_NO_PAD.encode(payload);

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(IssuedToken {
            token: format!("{payload}.{signature}"),
            expires_at,
        })
    }

    /// Check the signature and expiry of `token` and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is malformed or the
    /// signature does not match, `AuthError::TokenExpired` if it is past `exp`.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let (payload, signature) = token.split_once('.').ok_or(AuthError::InvalidToken)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::InvalidToken)?;

        // Constant-time comparison
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::InvalidToken)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AuthError::InvalidToken)?;
        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| AuthError::InvalidToken)?;

        if claims.exp <= now.timestamp() {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }
}
