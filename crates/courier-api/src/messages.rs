use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use courier_types::api::SendMessageRequest;
use courier_types::models::MessageDetail;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;

/// POST /messages — send a message; the sender is always the
/// authenticated identity, never a request field.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state.ledger.create(&user.0, &req.to_username, &req.body)?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /messages/{id} — message detail, sender or recipient only.
pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<MessageDetail>, ApiError> {
    Ok(Json(state.ledger.view(&user.0, id)?))
}

/// POST /messages/{id}/read — recipient-only read acknowledgement.
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<MessageDetail>, ApiError> {
    Ok(Json(state.ledger.mark_read(&user.0, id)?))
}
