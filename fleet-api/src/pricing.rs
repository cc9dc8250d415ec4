use axum::{extract::State, Extension, Json};
use fleet_core::identity::{Principal, Role};
use fleet_pricing::{PricingConfig, ServiceLevel, VehicleClass, WeightBand};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::middleware::auth::require_role;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PublicPricingResponse {
    pub base_cost_per_km: f64,
    pub weight_bands: Vec<WeightBand>,
    pub vehicle_classes: Vec<&'static str>,
    pub service_levels: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePricingRequest {
    pub base_cost_per_km: Option<f64>,
    /// Loose JSON: band fields are coerced, malformed numbers default to 0,
    /// missing labels are synthesized.
    pub weight_bands: Option<Vec<Value>>,
}

/// GET /v1/pricing
/// Pricing info consumed by the client app before estimating.
pub async fn public_pricing(
    State(state): State<AppState>,
) -> Result<Json<PublicPricingResponse>, AppError> {
    let config = crate::orders::pricing_snapshot(&state).await;
    Ok(Json(PublicPricingResponse {
        base_cost_per_km: config.base_cost_per_km,
        weight_bands: config.weight_bands,
        vehicle_classes: VehicleClass::ALL.iter().map(|v| v.as_str()).collect(),
        service_levels: ServiceLevel::ALL.iter().map(|s| s.as_str()).collect(),
    }))
}

/// GET /v1/admin/pricing
pub async fn get_pricing(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<PricingConfig>, AppError> {
    require_role(&principal, Role::Admin)?;
    let config = state.pricing.get_or_create().await?;
    Ok(Json(config))
}

/// PUT /v1/admin/pricing
/// Overwrites provided fields only. Band ordering and overlap are left to
/// the operator; the calculator takes the first match in list order.
pub async fn update_pricing(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<UpdatePricingRequest>,
) -> Result<Json<PricingConfig>, AppError> {
    require_role(&principal, Role::Admin)?;

    let mut config = state.pricing.get_or_create().await?;
    config.apply_update(req.base_cost_per_km, req.weight_bands.as_deref());
    state.pricing.update(&config).await?;

    Ok(Json(config))
}
