use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use courier_core::Error;
use courier_types::api::ErrorResponse;

/// Transport-facing error. Wraps the core taxonomy plus the one failure
/// the core deliberately does not model as an error: bad credentials at
/// login, which must stay a single opaque 401.
#[derive(Debug)]
pub enum ApiError {
    Core(Error),
    BadCredentials,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self::Core(err)
    }
}

impl From<courier_core::AuthError> for ApiError {
    fn from(err: courier_core::AuthError) -> Self {
        Self::Core(Error::Auth(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadCredentials => {
                // Never reveal whether the username or the password failed.
                (StatusCode::UNAUTHORIZED, "invalid username/password".to_string())
            }
            Self::Core(err) => match err {
                Error::Conflict(_) => (StatusCode::CONFLICT, err.to_string()),
                Error::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
                Error::Auth(_) => (StatusCode::UNAUTHORIZED, err.to_string()),
                Error::Forbidden => (StatusCode::FORBIDDEN, err.to_string()),
                Error::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                Error::Store(e) => {
                    error!("store failure: {e:#}");
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
                }
            },
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
