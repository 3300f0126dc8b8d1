use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use sea_orm_migration::MigratorTrait;
use serde::Serialize;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::{ServerConfig, StartupError};
use error::BookingError;
use gigboard_db::AppState;

mod api;
mod config;
mod error;
mod forms;
mod records;
mod schedule;
#[cfg(test)]
mod test_support;

/// Home page: where each section lives.
#[derive(Serialize)]
struct HomePage {
    venues: &'static str,
    artists: &'static str,
    shows: &'static str,
}

#[derive(Serialize)]
struct ApiStatus {
    status: &'static str,
    version: &'static str,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        tracing::error!("startup failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = ServerConfig::from_env()?;

    // Database connection
    let db_config = gigboard_db::DatabaseConfig::from_env();
    tracing::info!("connecting to database...");
    let db = gigboard_db::connect(&db_config).await?;

    // Run migrations
    tracing::info!("running database migrations...");
    gigboard_migration::Migrator::up(&db, None).await?;
    tracing::info!("migrations complete");

    let state = Arc::new(AppState { db });

    let app = router(state).layer(cors_layer(&config.cors_origins));

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(addr = %config.bind, "server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Every route, with tracing and response headers but without CORS.
fn router(state: Arc<AppState>) -> Router {
    let venues = Router::new()
        .route("/", get(api::venues::list_venues))
        .route("/search", post(api::venues::search_venues))
        .route(
            "/create",
            get(api::venues::create_venue_form).post(api::venues::create_venue),
        )
        .route(
            "/{id}",
            get(api::venues::get_venue)
                .post(api::venues::delete_venue)
                .delete(api::venues::delete_venue),
        )
        .route(
            "/{id}/edit",
            get(api::venues::edit_venue_form).post(api::venues::edit_venue),
        );

    let artists = Router::new()
        .route("/", get(api::artists::list_artists))
        .route("/search", post(api::artists::search_artists))
        .route(
            "/create",
            get(api::artists::create_artist_form).post(api::artists::create_artist),
        )
        .route("/{id}", get(api::artists::get_artist))
        .route(
            "/{id}/edit",
            get(api::artists::edit_artist_form).post(api::artists::edit_artist),
        );

    let shows = Router::new()
        .route("/", get(api::shows::list_shows))
        .route(
            "/create",
            get(api::shows::create_show_form).post(api::shows::create_show),
        );

    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .nest("/venues", venues)
        .nest("/artists", artists)
        .nest("/shows", shows)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .with_state(state)
}

fn cors_layer(origins: &[HeaderValue]) -> CorsLayer {
    if origins.is_empty() {
        tracing::warn!("CORS_ORIGINS not set, cross-origin requests will be refused");
    } else {
        tracing::info!("CORS allowed origins: {:?}", origins);
    }
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins.iter().cloned()))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

async fn index() -> Json<HomePage> {
    Json(HomePage {
        venues: "/venues",
        artists: "/artists",
        shows: "/shows",
    })
}

async fn healthz() -> Json<ApiStatus> {
    Json(ApiStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn not_found() -> BookingError {
    BookingError::NotFound(error::NOT_FOUND_NOTICE.to_string())
}
