use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use courier_api::auth::{self, AppState, AppStateInner};
use courier_api::messages;
use courier_api::middleware::require_auth;
use courier_api::users;
use courier_core::store::Store;
use courier_core::tokens::DEFAULT_TTL_SECS;
use courier_core::{CredentialStore, MessageLedger, TokenIssuer, UserDirectory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "courier=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let secret =
        std::env::var("COURIER_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("COURIER_DB_PATH").unwrap_or_else(|_| "courier.db".into());
    let host = std::env::var("COURIER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("COURIER_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let ttl_secs: i64 = std::env::var("COURIER_TOKEN_TTL_SECS")
        .unwrap_or_else(|_| DEFAULT_TTL_SECS.to_string())
        .parse()?;

    // Init database
    let store: Arc<dyn Store> = Arc::new(courier_db::Database::open(&PathBuf::from(&db_path))?);

    // Shared state: one store behind the four core components, signing
    // secret injected once here and nowhere else.
    let state: AppState = Arc::new(AppStateInner {
        credentials: CredentialStore::new(store.clone()),
        tokens: TokenIssuer::new(&secret, chrono::Duration::seconds(ttl_secs)),
        directory: UserDirectory::new(store.clone()),
        ledger: MessageLedger::new(store),
    });

    // Routes
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/{username}", get(users::get_user))
        .route("/users/{username}/to", get(users::messages_to))
        .route("/users/{username}/from", get(users::messages_from))
        .route("/messages", post(messages::send_message))
        .route("/messages/{id}", get(messages::get_message))
        .route("/messages/{id}/read", post(messages::mark_read))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Courier server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
