// =============================================================================
// Larder Backend - Web Server Entry Point
// =============================================================================
// Table of Contents:
// 1. Imports
// 2. Main Entry Point
// =============================================================================

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use larder_backend::config::Config;
use larder_backend::inventory::Inventory;
use larder_backend::recipes::RecipeClient;
use larder_backend::store::Store;
use larder_backend::{create_router, store, AppState};

// -----------------------------------------------------------------------------
// 2. Main Entry Point
// -----------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Current directory first, then the crate directory
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_filename("crates/backend/.env");
    }

    let config = Config::from_env()?;
    let bind_addr = config.bind_address.clone();

    // Ensure database directory exists for SQLite
    if let Some(db_path) = config.database_url.strip_prefix("sqlite:") {
        let db_path = db_path.trim_start_matches("//").split('?').next().unwrap_or_default();
        if let Some(parent) = std::path::Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    let store = store::connect(&config.database_url, config.max_connections).await?;
    store.migrate().await?;
    tracing::info!(backend = store.name(), "Storage ready");

    if config.recipes.api_key.is_none() {
        tracing::warn!("SPOONACULAR_API_KEY is not set, recipe suggestions are disabled");
    }

    let state = AppState {
        inventory: Inventory::new(store, config.purchase_policy, config.shelf_days),
        recipes: RecipeClient::new(&config.recipes)?,
        config: Arc::new(config),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Larder running on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
