use std::net::SocketAddr;
use std::sync::Arc;

use fleet_api::{
    app,
    state::{AppState, AuthConfig},
    worker,
};
use fleet_core::notify::LogNotifier;
use fleet_geo::resolver::DistanceResolver;
use fleet_geo::routing::RoutingClient;
use fleet_store::{
    DbClient, DriverRepository, OrderRepository, PricingRepository, RelocationRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fleet_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = fleet_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Fleet API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let orders = Arc::new(OrderRepository::new(db.pool.clone()));
    let relocations = Arc::new(RelocationRepository::new(db.pool.clone()));
    let drivers = Arc::new(DriverRepository::new(db.pool.clone()));
    let pricing = Arc::new(PricingRepository::new(db.pool.clone()));

    pricing
        .ensure_default()
        .await
        .expect("Failed to seed pricing config");

    let resolver = match &config.routing.api_key {
        Some(key) if !key.is_empty() => {
            let client = RoutingClient::new(&config.routing.base_url, key.clone())
                .expect("Invalid routing base URL");
            Arc::new(DistanceResolver::new(Some(client)))
        }
        _ => {
            tracing::warn!("No routing API key configured, using fallback distances");
            Arc::new(DistanceResolver::disabled())
        }
    };

    let (notice_tx, notice_rx) = tokio::sync::mpsc::channel(100);
    worker::spawn_notifier(notice_rx, Arc::new(LogNotifier));

    let app_state = AppState {
        orders,
        relocations,
        drivers,
        pricing,
        resolver,
        fallback_distance_km: config.routing.fallback_distance_km,
        notices: notice_tx,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}
