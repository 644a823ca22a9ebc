//! HTTP dispatcher over courier-core: axum handlers, bearer-token
//! middleware and the error-kind to status-code mapping.

pub mod auth;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod users;

pub use auth::{AppState, AppStateInner};
pub use error::ApiError;
