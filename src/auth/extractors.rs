use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;
use tracing::warn;

use crate::auth::claims::{Claims, Role};
use crate::auth::jwt::TokenKeys;
use crate::error::ApiError;

/// Name of the session cookie set at login and read on every gated route.
pub const SESSION_COOKIE: &str = "token";

/// The one authorization gate. Reads the session cookie, verifies the
/// token, and optionally enforces a role. A missing or bad token is 401;
/// a valid identity without the required role is 403.
fn authorize<S>(parts: &Parts, state: &S, required: Option<Role>) -> Result<Claims, ApiError>
where
    TokenKeys: FromRef<S>,
{
    let jar = CookieJar::from_headers(&parts.headers);
    let cookie = jar.get(SESSION_COOKIE).ok_or(ApiError::Unauthorized)?;

    let keys = TokenKeys::from_ref(state);
    let claims = keys.verify(cookie.value()).map_err(|_| {
        warn!("invalid or expired session token");
        ApiError::Unauthorized
    })?;

    if let Some(role) = required {
        if claims.role != role {
            return Err(ApiError::Forbidden);
        }
    }
    Ok(claims)
}

/// Verified claims of any logged-in account.
pub struct AuthClaims(pub Claims);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
    TokenKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authorize(parts, state, None).map(AuthClaims)
    }
}

/// Verified claims of an admin account.
pub struct AdminClaims(pub Claims);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminClaims
where
    S: Send + Sync,
    TokenKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authorize(parts, state, Some(Role::Admin)).map(AdminClaims)
    }
}
