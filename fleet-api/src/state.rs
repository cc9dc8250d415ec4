use std::sync::Arc;

use fleet_core::notify::DeliveryNotice;
use fleet_geo::DistanceResolver;
use fleet_store::{DriverRepository, OrderRepository, PricingRepository, RelocationRepository};
use tokio::sync::mpsc;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<OrderRepository>,
    pub relocations: Arc<RelocationRepository>,
    pub drivers: Arc<DriverRepository>,
    pub pricing: Arc<PricingRepository>,
    pub resolver: Arc<DistanceResolver>,
    pub fallback_distance_km: f64,
    pub notices: mpsc::Sender<DeliveryNotice>,
    pub auth: AuthConfig,
}
