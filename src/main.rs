mod api;
mod auth;
mod config;
mod database;
mod models;
mod repositories;
mod services;

use anyhow::Result;
use api::AppState;
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use config::AppConfig;
use database::Database;
use services::{FileStorage, GoogleAuthService};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "apuntes_rs=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::new()?;
    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    info!("Starting apuntes-rs server on {}", bind_address);

    // Initialize database
    let database = match Database::new(&config.database.url, config.database.max_connections).await
    {
        Ok(db) => {
            info!("Database connected successfully");
            db
        }
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e);
        }
    };

    // Initialize upload storage
    let storage = match FileStorage::new(&config.storage.upload_dir).await {
        Ok(storage) => {
            info!("Upload storage ready at {}", storage.base_path().display());
            storage
        }
        Err(e) => {
            error!("Failed to initialize upload storage: {}", e);
            return Err(e.into());
        }
    };

    // Initialize Google token verifier
    let google = GoogleAuthService::new(
        config.google.client_id.clone(),
        config.google.tokeninfo_url.clone(),
    );
    if config.google.client_id.is_empty() {
        warn!("GOOGLE_CLIENT_ID is empty; google-login will reject every token");
    }

    // Create application state
    let app_state = AppState {
        database,
        storage,
        google,
        config,
    };

    // Build application router
    let app = create_app(app_state).await?;

    // Create TCP listener
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!("Server listening on http://{}", bind_address);

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}

async fn create_app(app_state: AppState) -> Result<Router> {
    let max_upload_size = app_state.config.storage.max_upload_size;

    let app = Router::new()
        .route("/", get(root_handler))
        .route(
            "/health",
            get({
                let db = app_state.database.clone();
                move || health_handler(db)
            }),
        )
        .merge(api::create_router().await?)
        .layer(DefaultBodyLimit::max(max_upload_size))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    Ok(app)
}

async fn root_handler() -> &'static str {
    "Apuntes-RS: course file sharing backend"
}

async fn health_handler(database: Database) -> &'static str {
    match database.health_check().await {
        Ok(_) => "OK",
        Err(_) => "Database connection failed",
    }
}
