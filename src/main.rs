/// Flight search front-end service entry point
mod clients;
mod config;
mod domain;
mod errors;
mod handlers;
mod routes;
mod services;
mod store;
mod utils;
mod views;

#[cfg(test)]
mod test_support;

use crate::clients::{AirportClient, FlightClient, HttpClient};
use crate::config::AppConfig;
use crate::handlers::AppState;
use crate::routes::build_router;
use crate::services::SearchController;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    // Load configuration
    let config = AppConfig::from_env()?;
    info!(
        "Configuration loaded (upstream {}, default date {})",
        config.upstream.base_url, config.default_date
    );

    // Initialize clients
    let http_client = HttpClient::new(&config.upstream)?;
    let airport_client = AirportClient::new(http_client.clone());
    let flight_client = FlightClient::new(http_client, config.market.clone());

    // Initialize controller and application state
    let today = Utc::now().date_naive();
    let controller = SearchController::new(airport_client, flight_client, config.default_date, today);
    let state = AppState {
        controller: Arc::new(controller),
    };

    // Build router
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("flight_search listening on {}", config.bind_addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
