use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use courier_core::AuthError;

use crate::auth::AppState;
use crate::error::ApiError;

/// The authenticated username, as asserted by a verified token. This is
/// the only identity handlers ever see.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

/// Extract and verify the bearer token from the Authorization header.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::Invalid)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::Invalid)?;

    let username = state.tokens.verify(token)?;

    req.extensions_mut().insert(CurrentUser(username));
    Ok(next.run(req).await)
}
