use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use courier_core::{CredentialStore, MessageLedger, TokenIssuer, UserDirectory};
use courier_types::api::{LoginRequest, RegisterRequest, TokenResponse};

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub credentials: CredentialStore,
    pub tokens: TokenIssuer,
    pub directory: UserDirectory,
    pub ledger: MessageLedger,
}

/// POST /auth/register — register, log in, return a token.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.credentials.register(&req)?;
    let token = state.tokens.issue(&user.username)?;
    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

/// POST /auth/login — verify credentials, stamp last_login, mint a token.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.credentials.verify(&req.username, &req.password)? {
        return Err(ApiError::BadCredentials);
    }

    state.credentials.record_login(&req.username)?;
    let token = state.tokens.issue(&req.username)?;
    Ok(Json(TokenResponse { token }))
}
