use anyhow::anyhow;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use passgate_core::AppError;
use uuid::Uuid;

use crate::state::AppState;

/// The caller identified by a verified access token.
///
/// Inserted into the request extensions by [`require_auth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized(anyhow!("Missing authorization header")))?;

    auth_header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized(anyhow!("Invalid authorization header format")))
}

fn authenticate(headers: &HeaderMap, state: &AppState) -> Result<AuthenticatedUser, AppError> {
    let token = bearer_token(headers)?;
    let claims = state.auth.validate_token(token)?;
    let user_id = claims
        .user_id()
        .map_err(|_| AppError::unauthorized(anyhow!("Invalid user ID in token")))?;

    Ok(AuthenticatedUser { user_id })
}

/// Rejects requests without a valid bearer access token and attaches the
/// [`AuthenticatedUser`] to the rest.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(req.headers(), &state)?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Extractor for the authenticated caller.
///
/// Reads the value left by [`require_auth`]; on routes without that layer it
/// validates the `Authorization` header itself.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub AuthenticatedUser);

impl AuthUser {
    pub fn user_id(&self) -> Uuid {
        self.0.user_id
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(AuthUser(*user));
        }

        authenticate(&parts.headers, state).map(AuthUser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extracted() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_header_rejected() {
        let err = bearer_token(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
        assert_eq!(err.public_message(), "Missing authorization header");
    }

    #[test]
    fn test_wrong_scheme_rejected() {
        for value in ["Basic dXNlcjpwYXNz", "bearer abc", "Bearer "] {
            let err = bearer_token(&headers_with(value)).unwrap_err();
            assert_eq!(err.status.as_u16(), 401);
            assert_eq!(err.public_message(), "Invalid authorization header format");
        }
    }
}
