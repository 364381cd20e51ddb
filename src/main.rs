use std::sync::Arc;

use axum::extract::FromRef;
use axum::routing::{get, post};
use axum::Router;
use axum_extra::extract::cookie::Key;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

mod config;
mod db;
mod error;
mod flash;
mod handlers;
mod models;
mod views;

use crate::config::Config;
use crate::db::ItemStore;

/// Shared application state — cheap to clone (the SDK client is
/// reference-counted internally).
#[derive(Clone)]
pub struct AppState {
    pub store: ItemStore,
    pub config: Arc<Config>,
    key: Key,
}

/// Lets SignedCookieJar pull its signing key straight from state.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.key.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    let config = Config::from_env()?;

    // Structured logging; development gets debug-level service logs
    let default_filter = if config.is_development() {
        "info,item_service=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.parse().unwrap()),
        )
        .with_target(false)
        .compact()
        .init();

    info!(
        table = %config.table_name,
        region = %config.aws_region,
        environment = %config.environment,
        "Starting item service"
    );
    if let Some(endpoint) = &config.dynamodb_endpoint {
        info!(endpoint = %endpoint, "Using DynamoDB endpoint override");
    }

    let store = ItemStore::connect(&config).await;

    let state = AppState {
        store,
        key: config.signing_key(),
        config: Arc::new(config),
    };

    let addr = format!("{}:{}", state.config.host, state.config.port);
    let app = build_router(state);

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        // ── Web (HTML) ──────────────────────────────────────────────────────
        .route("/", get(handlers::web::index))
        .route(
            "/create",
            get(handlers::web::create_form).post(handlers::web::create_submit),
        )
        .route(
            "/edit/:id",
            get(handlers::web::edit_form).post(handlers::web::edit_submit),
        )
        .route("/delete/:id", post(handlers::web::delete_submit))
        .route("/info", get(handlers::web::info))

        // ── Health ──────────────────────────────────────────────────────────
        .route("/health", get(handlers::health))

        // ── Items API ───────────────────────────────────────────────────────
        .route(
            "/api/items",
            get(handlers::api::list_items).post(handlers::api::create_item),
        )
        .route(
            "/api/items/:id",
            get(handlers::api::get_item)
                .put(handlers::api::update_item)
                .delete(handlers::api::delete_item),
        )

        // ── Middleware ──────────────────────────────────────────────────────
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
