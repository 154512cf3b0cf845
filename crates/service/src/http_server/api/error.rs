use axum::response::{IntoResponse, Response};
use axum::Json;
use http::header::WWW_AUTHENTICATE;
use http::StatusCode;

use common::prelude::GateError;

/// A [`GateError`] on its way out as an HTTP response.
///
/// Bodies are always `{"msg": "..."}`. Internal failures are logged here
///  and reported to the caller without detail.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] GateError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            GateError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            GateError::NotFound(_) => StatusCode::NOT_FOUND,
            GateError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            GateError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            GateError::ResourceExhausted => StatusCode::TOO_MANY_REQUESTS,
            GateError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_inner(self) -> GateError {
        self.0
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let msg = match &self.0 {
            GateError::InvalidInput(msg) | GateError::PermissionDenied(msg) => msg.clone(),
            GateError::Internal(detail) => {
                tracing::error!(error = %detail, "internal error while handling request");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        let body = Json(serde_json::json!({ "msg": msg }));

        match self.0 {
            GateError::Unauthenticated(_) => {
                (status, [(WWW_AUTHENTICATE, "Bearer")], body).into_response()
            }
            _ => (status, body).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use common::prelude::AuthError;
    use http_body_util::BodyExt;

    use super::*;

    async fn body_msg(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        value["msg"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let cases = [
            (GateError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (GateError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                GateError::Unauthenticated(AuthError::Expired),
                StatusCode::UNAUTHORIZED,
            ),
            (
                GateError::PermissionDenied("x".into()),
                StatusCode::FORBIDDEN,
            ),
            (GateError::ResourceExhausted, StatusCode::TOO_MANY_REQUESTS),
            (
                GateError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_unauthenticated_carries_challenge() {
        let response =
            ApiError::from(GateError::Unauthenticated(AuthError::MissingCredentials))
                .into_response();
        assert_eq!(response.headers()[WWW_AUTHENTICATE], "Bearer");
        assert_eq!(
            body_msg(response).await,
            "unauthenticated: missing authorization header"
        );
    }

    #[tokio::test]
    async fn test_internal_detail_is_hidden() {
        let response =
            ApiError::from(GateError::Internal("disk on fire".into())).into_response();
        assert_eq!(body_msg(response).await, "internal server error");
    }
}
