use axum::routing::{delete, get, patch, post, MethodRouter};
use axum::Router;
use uuid::Uuid;

use common::prelude::{GateError, Operation};

pub mod admin;
pub mod auth;
pub mod collections;
pub mod shared;

use crate::http_server::gate::gated;
use crate::ServiceState;

/// Every operation is served from exactly one route, behind the gate
pub fn router(state: ServiceState) -> Router<ServiceState> {
    Operation::ALL
        .into_iter()
        .fold(Router::new(), |router, operation| {
            let (path, route) = route(operation);
            router.route(path, gated(&state, operation, route))
        })
        .with_state(state)
}

fn route(operation: Operation) -> (&'static str, MethodRouter<ServiceState>) {
    match operation {
        Operation::Login => ("/auth/login", post(auth::login::handler)),
        Operation::GetSharedCollection => ("/shared/:token", get(shared::fetch::handler)),
        Operation::CreateUser => ("/admin/users", post(admin::create_user::handler)),
        Operation::CreateOrganization => (
            "/admin/organizations",
            post(admin::create_organization::handler),
        ),
        Operation::AddOrganizationMember => (
            "/admin/organizations/members",
            post(admin::add_member::handler),
        ),
        Operation::CreateCollection => ("/collections", post(collections::create::handler)),
        Operation::GetCollection => ("/collections/:uid", get(collections::get::handler)),
        Operation::UpdateCollection => ("/collections/:uid", patch(collections::update::handler)),
        Operation::DeleteCollection => ("/collections/:uid", delete(collections::delete::handler)),
        Operation::CreateShareToken => (
            "/collections/:uid/share",
            post(collections::share::handler),
        ),
    }
}

/// Parse a uid supplied by the caller, naming the field on failure
pub(crate) fn parse_uid(value: &str, field: &str) -> Result<Uuid, GateError> {
    if value.is_empty() {
        return Err(GateError::InvalidInput(format!("{} is required", field)));
    }
    Uuid::parse_str(value).map_err(|e| GateError::InvalidInput(format!("invalid {}: {}", field, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uid() {
        let uid = Uuid::new_v4();
        assert_eq!(parse_uid(&uid.to_string(), "uid").unwrap(), uid);
        assert!(matches!(
            parse_uid("", "uid"),
            Err(GateError::InvalidInput(msg)) if msg == "uid is required"
        ));
        assert!(matches!(
            parse_uid("not-a-uuid", "user_uid"),
            Err(GateError::InvalidInput(msg)) if msg.starts_with("invalid user_uid")
        ));
    }
}
