//! Release Notes Backend
//!
//! Publishes per-project release notes from SQLite: public read pages plus an admin REST API.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod slug;

use std::sync::Arc;

use axum::{
    middleware,
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Release Notes Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!(
        "Default site {}, default language {}, slug policy {:?}",
        config.default_site_id,
        config.default_language,
        config.slug_policy
    );

    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (RN_API_PSK). Admin authentication is disabled!");
    }

    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool, config.slug_policy));

    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
///
/// Admin routes are registered with their full `/api` path so that the public
/// `/{project}/{release}` pattern never captures them.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let psk = state.config.api_psk.clone();

    let admin_routes = Router::new()
        // Projects
        .route("/api/projects", get(api::list_projects).post(api::create_project))
        .route(
            "/api/projects/{id}",
            get(api::get_project)
                .put(api::update_project)
                .delete(api::delete_project),
        )
        // Releases
        .route("/api/releases", get(api::list_releases).post(api::create_release))
        .route(
            "/api/releases/{id}",
            get(api::get_release)
                .put(api::update_release)
                .delete(api::delete_release),
        )
        // Audiences
        .route("/api/audiences", get(api::list_audiences).post(api::create_audience))
        .route(
            "/api/audiences/{id}",
            get(api::get_audience).put(api::update_audience),
        )
        // Notes
        .route("/api/notes", get(api::list_notes).post(api::create_note))
        .route(
            "/api/notes/{id}",
            get(api::get_note)
                .put(api::update_note)
                .delete(api::delete_note),
        )
        // Translations
        .route(
            "/api/translations",
            get(api::list_translations).post(api::create_translation),
        )
        .route(
            "/api/translations/{id}",
            get(api::get_translation)
                .put(api::update_translation)
                .delete(api::delete_translation),
        )
        .route_layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Public pages (no auth required)
    let public_routes = Router::new()
        .route("/", get(api::index))
        .route("/health", get(health_check))
        .route("/{project_slug}", get(api::project_detail))
        .route("/{project_slug}/", get(api::project_detail))
        .route("/{project_slug}/{release_slug}", get(api::release_detail))
        .route("/{project_slug}/{release_slug}/", get(api::release_detail));

    Router::new()
        .merge(admin_routes)
        .merge(public_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
