/**
 * Collection access decisions: ownership,
 *  organization membership, and share tokens.
 */
pub mod access;
/**
 * Bearer token issuance and validation.
 */
pub mod auth;
pub mod error;
/**
 * The interception pipeline every inbound call
 *  goes through, and the catalog of operations
 *  it is configured by.
 */
pub mod gate;
pub mod model;
/**
 * Per-key sliding-window rate limiting.
 */
pub mod rate_limit;
/**
 * Persistence seam for users, organizations,
 *  collections and share links, plus an
 *  in-memory implementation.
 */
pub mod store;

pub mod prelude {
    pub use crate::access::{generate_share_token, AccessController};
    pub use crate::auth::{AuthError, Identity, TokenAuthenticator};
    pub use crate::error::GateError;
    pub use crate::gate::{CallMetadata, Operation, RequestGate};
    pub use crate::model::{
        AccessLevel, Collection, NewCollection, Organization, ShareLink, SharedCollection, User,
    };
    pub use crate::rate_limit::{RateLimiter, SlidingWindowLimiter};
    pub use crate::store::{CollectionStore, MemoryStore};
}
