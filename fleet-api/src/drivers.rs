use axum::{
    extract::{Query, State},
    Extension, Json,
};
use fleet_core::identity::{Principal, Role};
use fleet_dispatch::candidates::{rank_candidates, Candidate};
use fleet_dispatch::models::{Driver, Order, RelocationRequest};
use fleet_geo::GeoPoint;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::middleware::auth::require_role;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct OnlineStatusRequest {
    pub is_online: bool,
}

#[derive(Debug, Deserialize)]
pub struct LocationRequest {
    /// `[longitude, latitude]`, GeoJSON order.
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    #[serde(default = "default_max_distance_km")]
    pub max_distance_km: f64,
}

fn default_max_distance_km() -> f64 {
    10.0
}

#[derive(Debug, Serialize)]
pub struct NearbyOrdersResponse {
    pub orders: Vec<Candidate<Order>>,
    pub driver_location: GeoPoint,
}

#[derive(Debug, Serialize)]
pub struct NearbyRelocationsResponse {
    pub requests: Vec<Candidate<RelocationRequest>>,
    pub driver_location: GeoPoint,
}

// ============================================================================
// Helpers
// ============================================================================

async fn driver_profile(state: &AppState, principal: &Principal) -> Result<Driver, AppError> {
    state
        .drivers
        .get_by_user(&principal.id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Driver profile not found".into()))
}

/// Self-service discovery requires an online driver with a known location.
fn presence_location(driver: &Driver) -> Result<GeoPoint, AppError> {
    if !driver.is_online {
        return Err(AppError::ValidationError(
            "Driver must be online to view nearby work".into(),
        ));
    }
    driver.location.ok_or_else(|| {
        AppError::ValidationError("Driver location not set. Please update your location.".into())
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// PATCH /v1/drivers/status
pub async fn update_online_status(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<OnlineStatusRequest>,
) -> Result<Json<Driver>, AppError> {
    require_role(&principal, Role::Driver)?;
    let driver = state
        .drivers
        .set_online(&principal.id, req.is_online)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Driver profile not found".into()))?;
    Ok(Json(driver))
}

/// PATCH /v1/drivers/location
pub async fn update_location(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<LocationRequest>,
) -> Result<Json<Driver>, AppError> {
    require_role(&principal, Role::Driver)?;

    if req.coordinates.len() != 2 {
        return Err(AppError::ValidationError(
            "coordinates must be [longitude, latitude]".into(),
        ));
    }
    let (lon, lat) = (req.coordinates[0], req.coordinates[1]);
    if !lon.is_finite() || !lat.is_finite() {
        return Err(AppError::ValidationError(
            "longitude and latitude must be finite numbers".into(),
        ));
    }

    let driver = state
        .drivers
        .set_location(&principal.id, GeoPoint::new(lon, lat))
        .await?
        .ok_or_else(|| AppError::NotFoundError("Driver profile not found".into()))?;
    Ok(Json(driver))
}

/// GET /v1/drivers/nearby-orders
/// Unassigned pending orders annotated with the driver's real distance to
/// each pickup, sorted ascending.
pub async fn nearby_orders(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<NearbyOrdersResponse>, AppError> {
    require_role(&principal, Role::Driver)?;
    let driver = driver_profile(&state, &principal).await?;
    let location = presence_location(&driver)?;

    let items = state.orders.list_pending_unassigned().await?;
    let orders = rank_candidates(items, location, query.max_distance_km, |o| o.pickup_point);

    Ok(Json(NearbyOrdersResponse {
        orders,
        driver_location: location,
    }))
}

/// GET /v1/drivers/nearby-relocations
pub async fn nearby_relocations(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<NearbyRelocationsResponse>, AppError> {
    require_role(&principal, Role::Driver)?;
    let driver = driver_profile(&state, &principal).await?;
    let location = presence_location(&driver)?;

    let items = state.relocations.list_pending_unassigned().await?;
    let requests = rank_candidates(items, location, query.max_distance_km, |r| r.pickup_point);

    Ok(Json(NearbyRelocationsResponse {
        requests,
        driver_location: location,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fleet_pricing::VehicleClass;

    fn driver(is_online: bool, location: Option<GeoPoint>) -> Driver {
        Driver {
            id: uuid::Uuid::new_v4(),
            user_id: "driver-1".into(),
            vehicle_class: VehicleClass::Bike,
            is_online,
            location,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn offline_driver_cannot_browse() {
        let err = presence_location(&driver(false, Some(GeoPoint::new(36.8, -1.3)))).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn driver_without_location_cannot_browse() {
        let err = presence_location(&driver(true, None)).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn online_located_driver_passes_presence_check() {
        let location = presence_location(&driver(true, Some(GeoPoint::new(36.8, -1.3)))).unwrap();
        assert_eq!(location.lon, 36.8);
    }
}
