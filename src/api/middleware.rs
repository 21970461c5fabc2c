//! Request middleware and caller extractors
//!
//! `principal_middleware` resolves an `Authorization: Bearer` token once per
//! request and stores the `Principal` in the request extensions. Handlers
//! pick it up with `Caller` (required) or `MaybeCaller` (optional).

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::{Principal, PrincipalResolver};
use crate::error::LedgerError;

/// Token of an `Authorization: Bearer <token>` value. The scheme is
/// case-insensitive; any other scheme yields no token.
fn parse_bearer(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_bearer)
        .map(str::to_string)
}

/// Resolve the bearer token, if any. An unknown token is rejected outright;
/// a missing one leaves the request anonymous.
pub async fn principal_middleware(
    State(resolver): State<Arc<dyn PrincipalResolver>>,
    mut request: Request,
    next: Next,
) -> Result<Response, LedgerError> {
    if let Some(token) = bearer_token(&request) {
        match resolver.resolve(&token).await {
            Ok(principal) => {
                debug!(
                    login = %principal.login,
                    path = %request.uri().path(),
                    "Caller authenticated"
                );
                request.extensions_mut().insert(principal);
            }
            Err(e) => {
                warn!(path = %request.uri().path(), "Rejected bearer token");
                return Err(e);
            }
        }
    }

    Ok(next.run(request).await)
}

/// Security headers for JSON API responses
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "Cache-Control",
        HeaderValue::from_static("no-store, no-cache, must-revalidate"),
    );

    response
}

/// Authenticated caller; rejects anonymous requests
#[derive(Debug, Clone)]
pub struct Caller(pub Principal);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = LedgerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(Caller)
            .ok_or_else(|| {
                LedgerError::AuthenticationRequired("authentication required".to_string())
            })
    }
}

/// Caller that may be anonymous
#[derive(Debug, Clone)]
pub struct MaybeCaller(pub Option<Principal>);

impl<S: Send + Sync> FromRequestParts<S> for MaybeCaller {
    type Rejection = LedgerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeCaller(parts.extensions.get::<Principal>().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_scheme_is_case_insensitive() {
        assert_eq!(parse_bearer("Bearer abc123"), Some("abc123"));
        assert_eq!(parse_bearer("bearer abc123"), Some("abc123"));
        assert_eq!(parse_bearer("BEARER  abc123 "), Some("abc123"));
    }

    #[test]
    fn test_non_bearer_values_yield_no_token() {
        assert_eq!(parse_bearer("Basic dXNlcjpwYXNz"), None);
        assert_eq!(parse_bearer("abc123"), None);
        assert_eq!(parse_bearer("Bearer "), None);
    }
}
