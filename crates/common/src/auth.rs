//! Bearer token issuance and validation
//!
//! Tokens are HS256 JWTs signed with a symmetric secret configured at
//! process start. They carry the caller's user id and email and expire
//! 24 hours after issuance; there is no refresh and no revocation.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::model::UserId;
use crate::store::CollectionStore;

/// Lifetime of an issued token
pub const TOKEN_TTL: time::Duration = time::Duration::hours(24);

/// The only algorithm used for issuance, and the only one accepted on validation
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Who is calling, as proven by a bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
    pub issued_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

/// Wire claims of a bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Claims {
    pub(crate) user_id: UserId,
    pub(crate) email: String,
    pub(crate) sub: String,
    pub(crate) iat: i64,
    pub(crate) exp: i64,
}

impl TryFrom<Claims> for Identity {
    type Error = AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        if claims.sub != claims.user_id.to_string() {
            return Err(AuthError::Invalid("subject does not match user id".into()));
        }
        let issued_at = OffsetDateTime::from_unix_timestamp(claims.iat)
            .map_err(|e| AuthError::Invalid(format!("iat: {}", e)))?;
        let expires_at = OffsetDateTime::from_unix_timestamp(claims.exp)
            .map_err(|e| AuthError::Invalid(format!("exp: {}", e)))?;

        Ok(Identity {
            user_id: claims.user_id,
            email: claims.email,
            issued_at,
            expires_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("email is required")]
    EmptyEmail,
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("user lookup failed: {0}")]
    Lookup(String),
    #[error("failed to sign token: {0}")]
    Signing(String),
    #[error("missing authorization header")]
    MissingCredentials,
    #[error("invalid authorization format")]
    InvalidScheme,
    #[error("malformed bearer token")]
    MalformedToken,
    #[error("token expired")]
    Expired,
    #[error("unexpected signing algorithm")]
    AlgorithmMismatch,
    #[error("token signature does not verify")]
    InvalidSignature,
    #[error("invalid token: {0}")]
    Invalid(String),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                AuthError::AlgorithmMismatch
            }
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            _ => AuthError::Invalid(err.to_string()),
        }
    }
}

/// Issues and validates bearer tokens
#[derive(Clone)]
pub struct TokenAuthenticator<S> {
    store: S,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl<S> std::fmt::Debug for TokenAuthenticator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthenticator")
            .field("algorithm", &TOKEN_ALGORITHM)
            .finish_non_exhaustive()
    }
}

impl<S: CollectionStore> TokenAuthenticator<S> {
    pub fn new(store: S, secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();

        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            store,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Resolve a user by email and issue a token for them
    pub async fn login(&self, email: &str) -> Result<String, AuthError> {
        if email.is_empty() {
            return Err(AuthError::EmptyEmail);
        }

        let user = self
            .store
            .find_user_by_email(email)
            .await
            .map_err(|e| AuthError::Lookup(e.to_string()))?
            .ok_or_else(|| AuthError::UserNotFound(email.to_string()))?;

        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            user_id: user.id,
            email: user.email,
            sub: user.id.to_string(),
            iat: now.unix_timestamp(),
            exp: (now + TOKEN_TTL).unix_timestamp(),
        };

        let token = jsonwebtoken::encode(
            &Header::new(TOKEN_ALGORITHM),
            &claims,
            &self.encoding_key,
        )
        .map_err(|e| AuthError::Signing(e.to_string()))?;

        tracing::debug!(user_id = user.id, "issued bearer token");
        Ok(token)
    }

    /// Verify signature, algorithm and expiry, returning the embedded identity
    pub fn validate_token(&self, token: &str) -> Result<Identity, AuthError> {
        let data =
            jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Identity::try_from(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const SECRET: &str = "test-secret";

    async fn setup() -> (TokenAuthenticator<MemoryStore>, MemoryStore) {
        let store = MemoryStore::new();
        store.create_user("a@x.com").await.unwrap();
        (TokenAuthenticator::new(store.clone(), SECRET), store)
    }

    fn sign(claims: &Claims, algorithm: Algorithm, secret: &str) -> String {
        jsonwebtoken::encode(
            &Header::new(algorithm),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims_for(user_id: UserId, exp_offset: time::Duration) -> Claims {
        let now = OffsetDateTime::now_utc();
        Claims {
            user_id,
            email: "a@x.com".to_string(),
            sub: user_id.to_string(),
            iat: now.unix_timestamp(),
            exp: (now + exp_offset).unix_timestamp(),
        }
    }

    #[tokio::test]
    async fn test_login_then_validate() {
        let (auth, store) = setup().await;
        let user = store.find_user_by_email("a@x.com").await.unwrap().unwrap();

        let token = auth.login("a@x.com").await.unwrap();
        let identity = auth.validate_token(&token).unwrap();

        assert_eq!(identity.user_id, user.id);
        assert_eq!(identity.email, "a@x.com");
        assert_eq!(identity.expires_at - identity.issued_at, TOKEN_TTL);
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let (auth, _) = setup().await;
        let result = auth.login("nobody@x.com").await;
        assert_eq!(result, Err(AuthError::UserNotFound("nobody@x.com".into())));
    }

    #[tokio::test]
    async fn test_login_empty_email() {
        let (auth, _) = setup().await;
        assert_eq!(auth.login("").await, Err(AuthError::EmptyEmail));
    }

    #[tokio::test]
    async fn test_rejects_garbage() {
        let (auth, _) = setup().await;
        assert!(matches!(
            auth.validate_token("garbage"),
            Err(AuthError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_other_secret() {
        let (auth, _) = setup().await;
        let token = sign(
            &claims_for(1, time::Duration::hours(1)),
            Algorithm::HS256,
            "some-other-secret",
        );
        assert_eq!(
            auth.validate_token(&token),
            Err(AuthError::InvalidSignature)
        );
    }

    #[tokio::test]
    async fn test_rejects_expired() {
        let (auth, _) = setup().await;
        let token = sign(
            &claims_for(1, time::Duration::seconds(-10)),
            Algorithm::HS256,
            SECRET,
        );
        assert_eq!(auth.validate_token(&token), Err(AuthError::Expired));
    }

    #[tokio::test]
    async fn test_rejects_other_algorithm() {
        let (auth, _) = setup().await;
        // same secret, same HMAC family, different algorithm
        let token = sign(
            &claims_for(1, time::Duration::hours(1)),
            Algorithm::HS512,
            SECRET,
        );
        assert_eq!(
            auth.validate_token(&token),
            Err(AuthError::AlgorithmMismatch)
        );
    }

    #[tokio::test]
    async fn test_rejects_subject_mismatch() {
        let (auth, _) = setup().await;
        let mut claims = claims_for(1, time::Duration::hours(1));
        claims.sub = "2".to_string();
        let token = sign(&claims, Algorithm::HS256, SECRET);
        assert!(matches!(
            auth.validate_token(&token),
            Err(AuthError::Invalid(_))
        ));
    }
}
