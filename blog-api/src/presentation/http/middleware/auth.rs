use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::presentation::AppState;
use crate::presentation::http::app_error::AppError;

#[derive(Debug, Clone)]
pub(crate) struct AuthenticatedUser {
    pub(crate) user_id: i64,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Identity on routes that serve anonymous requests too; carries the
/// requester id when the optional auth middleware verified a token.
#[derive(Debug, Clone)]
pub(crate) struct MaybeAuthenticatedUser(pub(crate) Option<i64>);

impl<S> FromRequestParts<S> for MaybeAuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<AuthenticatedUser>()
                .map(|auth| auth.user_id),
        ))
    }
}

pub(crate) async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let user = verify_bearer(&state, auth_header)?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Listing and fetch endpoints are public, but a present token still
/// has to be valid: a malformed token is rejected instead of silently
/// downgrading the request to anonymous.
pub(crate) async fn jwt_optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .map(|value| value.to_str().map(str::to_string))
        .transpose()
        .map_err(|_| AppError::Unauthorized)?;

    if let Some(auth_header) = auth_header {
        let user = verify_bearer(&state, &auth_header)?;
        request.extensions_mut().insert(user);
    }

    Ok(next.run(request).await)
}

fn verify_bearer(state: &AppState, auth_header: &str) -> Result<AuthenticatedUser, AppError> {
    let mut parts = auth_header.split_whitespace();
    let scheme = parts.next().ok_or(AppError::Unauthorized)?;
    let token = parts.next().ok_or(AppError::Unauthorized)?;
    if parts.next().is_some() {
        return Err(AppError::Unauthorized);
    }
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::Unauthorized);
    }
    if token.trim().is_empty() {
        return Err(AppError::Unauthorized);
    }

    let claims = state
        .jwt
        .verify_token(token.trim())
        .map_err(|_| AppError::Unauthorized)?;

    Ok(AuthenticatedUser {
        user_id: claims.user_id,
    })
}
