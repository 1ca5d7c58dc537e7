//! Authentication middleware for JWT token validation

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use tracing::warn;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Authenticated user information, injected into request extensions
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
}

/// Extract a bearer-scheme credential from request headers
///
/// Used both for access tokens (by the middleware) and for refresh tokens
/// (by the refresh/revoke handlers); the transport is the same.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized)?;

    if token.is_empty() {
        return Err(ApiError::Unauthorized);
    }

    Ok(token)
}

/// Authentication middleware
///
/// Verifies the bearer access token and makes the authenticated user id
/// available to handlers. No side effects beyond the request extension.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = {
        let token = bearer_token(req.headers())?;
        state.jwt_service.validate_token(token).map_err(|e| {
            warn!("Rejected bearer token: {}", e);
            ApiError::Unauthorized
        })?
    };

    req.extensions_mut().insert(AuthUser { id: claims.sub });

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = value {
            headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    #[test]
    fn test_bearer_token_extracted() {
        let headers = headers_with(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_header_rejected() {
        let headers = headers_with(None);
        assert!(matches!(
            bearer_token(&headers),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn test_non_bearer_scheme_rejected() {
        let headers = headers_with(Some("Basic dXNlcjpwYXNz"));
        assert!(matches!(
            bearer_token(&headers),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn test_empty_bearer_rejected() {
        let headers = headers_with(Some("Bearer "));
        assert!(matches!(
            bearer_token(&headers),
            Err(ApiError::Unauthorized)
        ));
    }
}
