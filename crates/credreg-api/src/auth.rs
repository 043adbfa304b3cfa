//! # Caller Authentication
//!
//! Bearer tokens configured in [`AppConfig::tokens`](crate::state::AppConfig)
//! map to registry identities. The [`Caller`] extractor resolves the token on
//! each request:
//!
//! ```text
//! no Authorization header     → anonymous (read endpoints only)
//! Bearer <known token>        → that token's identity
//! Bearer <unknown token>      → 401
//! ```
//!
//! Authentication only establishes *who* is calling. Whether the caller may
//! perform an operation is decided by the registry's own role checks, so a
//! valid token for a non-administrator still gets a 403 on issuer
//! management.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use subtle::ConstantTimeEq;

use credreg_core::Identity;

use crate::error::AppError;
use crate::state::{AppState, TokenBinding};

/// The identity behind a request, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(Option<Identity>);

impl Caller {
    /// An unauthenticated caller.
    pub const ANONYMOUS: Self = Self(None);

    /// An authenticated caller.
    pub fn authenticated(identity: Identity) -> Self {
        Self(Some(identity))
    }

    /// The authenticated identity, if any.
    pub fn identity(&self) -> Option<Identity> {
        self.0
    }

    /// The authenticated identity, or 401 for anonymous callers.
    pub fn require_identity(&self) -> Result<Identity, AppError> {
        self.0.ok_or_else(|| {
            AppError::Unauthorized("mutating endpoints require a bearer token".into())
        })
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await {
            Ok(TypedHeader(Authorization(bearer))) => resolve_token(&state.config.tokens, bearer.token())
                .map(Caller::authenticated)
                .ok_or_else(|| AppError::Unauthorized("invalid bearer token".into())),
            Err(rejection) if rejection.is_missing() => Ok(Caller::ANONYMOUS),
            Err(rejection) => Err(AppError::Unauthorized(rejection.to_string())),
        }
    }
}

/// Constant-time comparison of bearer tokens.
///
/// When lengths differ, performs a dummy comparison to avoid leaking length
/// information through timing variance.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Find the identity for `provided`. Every binding is compared so the time
/// taken does not reveal which entry matched.
pub fn resolve_token(bindings: &[TokenBinding], provided: &str) -> Option<Identity> {
    let mut found = None;
    for binding in bindings {
        if constant_time_token_eq(provided, &binding.token) && found.is_none() {
            found = Some(binding.identity);
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings() -> Vec<TokenBinding> {
        vec![
            TokenBinding {
                token: "admin-token".into(),
                identity: Identity::from_bytes([1; 20]),
            },
            TokenBinding {
                token: "acme-token".into(),
                identity: Identity::from_bytes([2; 20]),
            },
        ]
    }

    #[test]
    fn known_tokens_resolve() {
        assert_eq!(
            resolve_token(&bindings(), "acme-token"),
            Some(Identity::from_bytes([2; 20]))
        );
    }

    #[test]
    fn unknown_or_prefix_tokens_do_not_resolve() {
        assert_eq!(resolve_token(&bindings(), "acme"), None);
        assert_eq!(resolve_token(&bindings(), "acme-token-x"), None);
        assert_eq!(resolve_token(&bindings(), ""), None);
    }

    #[test]
    fn anonymous_caller_cannot_mutate() {
        assert!(Caller::ANONYMOUS.require_identity().is_err());
        let caller = Caller::authenticated(Identity::from_bytes([3; 20]));
        assert_eq!(caller.require_identity().unwrap(), Identity::from_bytes([3; 20]));
    }
}
