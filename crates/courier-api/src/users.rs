use axum::{
    Extension, Json,
    extract::{Path, State},
};

use courier_core::access;
use courier_types::models::{ReceivedMessage, SentMessage, UserProfile, UserSummary};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;

/// GET /users — coarse listing, open to any authenticated requester.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    Ok(Json(state.directory.list_all()?))
}

/// GET /users/{username} — full profile, self-only.
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<UserProfile>, ApiError> {
    access::ensure_self(&user.0, &username)?;
    Ok(Json(state.directory.get_by_username(&username)?))
}

/// GET /users/{username}/to — messages received by this user, self-only.
pub async fn messages_to(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<ReceivedMessage>>, ApiError> {
    access::ensure_self(&user.0, &username)?;
    Ok(Json(state.directory.messages_received_by(&username)?))
}

/// GET /users/{username}/from — messages sent by this user, self-only.
pub async fn messages_from(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<SentMessage>>, ApiError> {
    access::ensure_self(&user.0, &username)?;
    Ok(Json(state.directory.messages_sent_by(&username)?))
}
