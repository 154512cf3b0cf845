//! Wires the request gate into axum.
//!
//! Every route is registered together with its [`Operation`], and
//! [`intercept`] runs the gate for that operation before the handler.
//! Handlers of authenticated operations receive the caller through the
//! [`Caller`] extractor.

use axum::async_trait;
use axum::extract::{FromRequestParts, RawPathParams, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::MethodRouter;
use http::header::AUTHORIZATION;
use http::request::Parts;

use common::prelude::{AuthError, CallMetadata, GateError, Identity, Operation};

use super::api::ApiError;
use crate::ServiceState;

/// Path parameter holding the rate key of rate-limited operations
pub const RATE_KEY_PARAM: &str = "token";

/// Middleware state: the service plus the operation a route serves
#[derive(Clone)]
pub struct GateContext {
    state: ServiceState,
    operation: Operation,
}

/// Put `route` behind the gate for `operation`.
///
/// Only the registered method handlers are wrapped; a request with an
///  unsupported method gets its 405 without touching the limiter or
///  the authenticator.
pub fn gated(
    state: &ServiceState,
    operation: Operation,
    route: MethodRouter<ServiceState>,
) -> MethodRouter<ServiceState> {
    let context = GateContext {
        state: state.clone(),
        operation,
    };
    route.route_layer(middleware::from_fn_with_state(context, intercept))
}

pub async fn intercept(
    State(context): State<GateContext>,
    params: Option<RawPathParams>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let operation = context.operation;

    let rate_key = match (&params, operation.rate_limited()) {
        (Some(params), true) => params
            .iter()
            .find(|(name, _)| *name == RATE_KEY_PARAM)
            .map(|(_, value)| value),
        _ => None,
    };

    // only looked at when the operation needs it
    let authorization = match request.headers().get(AUTHORIZATION) {
        Some(value) if operation.requires_auth() => Some(
            value
                .to_str()
                .map_err(|_| GateError::Unauthenticated(AuthError::MalformedToken))?,
        ),
        _ => None,
    };

    let identity = context.state.gate().admit(
        operation,
        &CallMetadata {
            authorization,
            rate_key,
        },
    )?;

    if let Some(identity) = identity {
        request.extensions_mut().insert(identity);
    }
    Ok(next.run(request).await)
}

/// The authenticated caller of the current request
#[derive(Debug, Clone)]
pub struct Caller(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(Caller)
            .ok_or_else(|| GateError::Unauthenticated(AuthError::MissingCredentials).into())
    }
}
