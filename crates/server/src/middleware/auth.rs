//! Bearer token extractors.
//!
//! Handlers declare the role they need by taking [`RequireGuest`] or
//! [`RequireAdmin`]. The shop and guest a request acts on always come from the
//! verified token, never from the request body or path.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::Span;

use brewpoints_core::{GuestId, Role, ShopId};

use crate::error::{AppError, set_sentry_user};
use crate::services::auth::Claims;
use crate::state::AppState;

/// A signed-in guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentGuest {
    pub guest_id: GuestId,
    pub shop_id: ShopId,
}

/// A signed-in shop administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentAdmin {
    pub shop_id: ShopId,
}

/// Extractor that requires a guest token.
///
/// # Example
///
/// ```rust,ignore
/// async fn profile(RequireGuest(guest): RequireGuest) -> impl IntoResponse {
///     format!("guest {} of shop {}", guest.guest_id, guest.shop_id)
/// }
/// ```
pub struct RequireGuest(pub CurrentGuest);

/// Extractor that requires a shop admin token.
pub struct RequireAdmin(pub CurrentAdmin);

impl FromRequestParts<AppState> for RequireGuest {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = authenticate(parts, state, Role::Guest)?;
        Ok(Self(CurrentGuest {
            guest_id: GuestId::new(claims.sub),
            shop_id: claims.shop_id,
        }))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = authenticate(parts, state, Role::Admin)?;
        Ok(Self(CurrentAdmin {
            shop_id: claims.shop_id,
        }))
    }
}

/// Verify the bearer token and check it carries `role`.
fn authenticate(parts: &Parts, state: &AppState, role: Role) -> Result<Claims, AppError> {
    let token = bearer_token(parts)
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_owned()))?;

    let claims = state.tokens().verify(token)?;

    if claims.role != role {
        return Err(AppError::Forbidden(format!("{role} role required")));
    }

    let span = Span::current();
    span.record("shop_id", tracing::field::display(claims.shop_id));
    span.record("role", claims.role.as_str());
    set_sentry_user(&claims.sub, claims.email.as_deref());

    Ok(claims)
}

/// The token from `Authorization: Bearer <token>`, if present.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/loyalty/profile");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&parts_with(Some("Bearer abc.def"))), Some("abc.def"));
        assert_eq!(bearer_token(&parts_with(Some("bearer abc.def"))), Some("abc.def"));
        assert_eq!(bearer_token(&parts_with(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&parts_with(Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts_with(Some("Bearer"))), None);
        assert_eq!(bearer_token(&parts_with(None)), None);
    }
}
