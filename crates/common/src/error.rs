use crate::auth::AuthError;

/// Every way an inbound call can be refused by the gating layer.
///
/// Each variant maps onto one caller-visible signal; none of them are
///  retried internally.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// A required field is missing or malformed
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A referenced user, organization, collection or share link does not exist
    #[error("{0} not found")]
    NotFound(String),
    /// Missing, malformed, invalid or expired credential
    #[error("unauthenticated: {0}")]
    Unauthenticated(AuthError),
    /// Authenticated, but the access decision went against the caller
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// Rate limit exceeded for the gated operation
    #[error("rate limit exceeded")]
    ResourceExhausted,
    /// A collaborator failed unexpectedly (storage, encoding, randomness)
    #[error("internal error: {0}")]
    Internal(String),
}

impl GateError {
    pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        GateError::Internal(format!("{}: {}", context, err))
    }
}

impl From<AuthError> for GateError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmptyEmail => GateError::InvalidInput("email is required".into()),
            AuthError::UserNotFound(email) => GateError::NotFound(format!("user {}", email)),
            AuthError::Signing(msg) => GateError::Internal(format!("failed to sign token: {}", msg)),
            AuthError::Lookup(msg) => GateError::Internal(format!("user lookup failed: {}", msg)),
            other => GateError::Unauthenticated(other),
        }
    }
}
