//! The ordered interception pipeline applied to every inbound call
//!
//! 1. rate limiting, for operations that declare it, keyed by the call's rate key
//! 2. bearer authentication, for operations that require it
//!
//! The resolved identity is handed back to the transport, which passes it
//! to handlers explicitly.

mod operation;

use std::sync::Arc;

pub use operation::Operation;

use crate::auth::{AuthError, Identity, TokenAuthenticator};
use crate::error::GateError;
use crate::rate_limit::RateLimiter;
use crate::store::CollectionStore;

/// Metadata header carrying the bearer credential
pub const AUTHORIZATION: &str = "authorization";
const BEARER_PREFIX: &str = "Bearer ";

/// The parts of an inbound call the gate looks at
#[derive(Debug, Clone, Copy, Default)]
pub struct CallMetadata<'a> {
    /// Raw `authorization` metadata value, if present
    pub authorization: Option<&'a str>,
    /// Rate limiting key, for operations that are rate limited
    pub rate_key: Option<&'a str>,
}

/// Extract the token from an `authorization` value of the exact form `Bearer <token>`
pub fn parse_bearer(authorization: Option<&str>) -> Result<&str, AuthError> {
    let value = authorization.ok_or(AuthError::MissingCredentials)?;
    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::InvalidScheme)?;

    if token.is_empty() || token.chars().any(char::is_whitespace) {
        return Err(AuthError::MalformedToken);
    }
    Ok(token)
}

#[derive(Clone)]
pub struct RequestGate<S> {
    limiter: Arc<dyn RateLimiter>,
    authenticator: TokenAuthenticator<S>,
}

impl<S> std::fmt::Debug for RequestGate<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestGate")
            .field("authenticator", &self.authenticator)
            .finish_non_exhaustive()
    }
}

impl<S: CollectionStore> RequestGate<S> {
    pub fn new(limiter: Arc<dyn RateLimiter>, authenticator: TokenAuthenticator<S>) -> Self {
        Self {
            limiter,
            authenticator,
        }
    }

    pub fn authenticator(&self) -> &TokenAuthenticator<S> {
        &self.authenticator
    }

    /// Run the pipeline for one call.
    ///
    /// Returns the caller's identity for authenticated operations and
    ///  `None` for public ones.
    pub fn admit(
        &self,
        op: Operation,
        call: &CallMetadata<'_>,
    ) -> Result<Option<Identity>, GateError> {
        if op.rate_limited() {
            let key = call
                .rate_key
                .filter(|key| !key.is_empty())
                .ok_or_else(|| GateError::InvalidInput("token is required".into()))?;

            if !self.limiter.allow(key) {
                tracing::warn!(operation = %op, "rate limit exceeded");
                return Err(GateError::ResourceExhausted);
            }
        }

        if !op.requires_auth() {
            return Ok(None);
        }

        let identity = parse_bearer(call.authorization)
            .and_then(|token| self.authenticator.validate_token(token))
            .map_err(|e| {
                tracing::warn!(operation = %op, reason = %e, "rejected credentials");
                GateError::Unauthenticated(e)
            })?;

        tracing::debug!(operation = %op, user_id = identity.user_id, "caller authenticated");
        Ok(Some(identity))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::rate_limit::SlidingWindowLimiter;
    use crate::store::MemoryStore;

    async fn gate(limit: usize) -> RequestGate<MemoryStore> {
        let store = MemoryStore::new();
        store.create_user("a@x.com").await.unwrap();
        let limiter = SlidingWindowLimiter::new(limit, Duration::from_secs(60)).unwrap();
        RequestGate::new(
            Arc::new(limiter),
            TokenAuthenticator::new(store, "test-secret"),
        )
    }

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer(Some("Bearer abc.def")), Ok("abc.def"));
        assert_eq!(parse_bearer(None), Err(AuthError::MissingCredentials));
        assert_eq!(
            parse_bearer(Some("Basic dXNlcjpwYXNz")),
            Err(AuthError::InvalidScheme)
        );
        assert_eq!(
            parse_bearer(Some("bearer abc")),
            Err(AuthError::InvalidScheme)
        );
        assert_eq!(parse_bearer(Some("Bearer ")), Err(AuthError::MalformedToken));
        assert_eq!(
            parse_bearer(Some("Bearer a b")),
            Err(AuthError::MalformedToken)
        );
    }

    #[tokio::test]
    async fn test_public_operations_skip_auth() {
        let gate = gate(10).await;
        for op in Operation::ALL.iter().filter(|op| !op.requires_auth()) {
            let call = CallMetadata {
                authorization: None,
                rate_key: Some("token"),
            };
            assert_eq!(gate.admit(*op, &call).unwrap(), None, "{}", op);
        }
    }

    #[tokio::test]
    async fn test_protected_operations_need_credentials() {
        let gate = gate(10).await;
        for op in Operation::ALL.iter().filter(|op| op.requires_auth()) {
            let result = gate.admit(*op, &CallMetadata::default());
            assert!(
                matches!(
                    result,
                    Err(GateError::Unauthenticated(AuthError::MissingCredentials))
                ),
                "{}",
                op
            );
        }
    }

    #[tokio::test]
    async fn test_valid_token_yields_identity() {
        let gate = gate(10).await;
        let token = gate.authenticator().login("a@x.com").await.unwrap();
        let header = format!("Bearer {}", token);

        let identity = gate
            .admit(
                Operation::GetCollection,
                &CallMetadata {
                    authorization: Some(&header),
                    rate_key: None,
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(identity.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_invalid_token_is_unauthenticated() {
        let gate = gate(10).await;
        let result = gate.admit(
            Operation::DeleteCollection,
            &CallMetadata {
                authorization: Some("Bearer garbage"),
                rate_key: None,
            },
        );
        assert!(matches!(
            result,
            Err(GateError::Unauthenticated(AuthError::Invalid(_)))
        ));
    }

    #[tokio::test]
    async fn test_share_fetch_is_rate_limited_per_token() {
        let gate = gate(2).await;
        let call = |key| CallMetadata {
            authorization: None,
            rate_key: Some(key),
        };

        assert!(gate.admit(Operation::GetSharedCollection, &call("a")).is_ok());
        assert!(gate.admit(Operation::GetSharedCollection, &call("a")).is_ok());
        assert!(matches!(
            gate.admit(Operation::GetSharedCollection, &call("a")),
            Err(GateError::ResourceExhausted)
        ));
        assert!(gate.admit(Operation::GetSharedCollection, &call("b")).is_ok());

        // other operations never touch the limiter
        for _ in 0..5 {
            assert!(gate.admit(Operation::Login, &call("a")).is_ok());
        }
    }

    #[tokio::test]
    async fn test_share_fetch_requires_key() {
        let gate = gate(2).await;
        assert!(matches!(
            gate.admit(Operation::GetSharedCollection, &CallMetadata::default()),
            Err(GateError::InvalidInput(_))
        ));
    }
}
