use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use fleet_core::identity::{Principal, Role};
use fleet_core::notify::{DeliveryNotice, NoticeKind};
use fleet_dispatch::lifecycle::advance_order;
use fleet_dispatch::models::{Order, OrderStatus};
use fleet_geo::{GeoPoint, ResolvedRoute};
use fleet_pricing::{quote, PricingConfig, ServiceLevel, VehicleClass};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::{require_role, require_role_or_admin};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub pickup_address: String,
    pub dropoff_address: String,
    pub recipient_name: Option<String>,
    pub recipient_phone: Option<String>,
    pub package_weight_kg: f64,
    pub vehicle_class: VehicleClass,
    pub service_level: Option<ServiceLevel>,
}

#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    pub pickup_address: String,
    pub dropoff_address: String,
    pub package_weight_kg: f64,
    pub vehicle_class: VehicleClass,
    pub service_level: Option<ServiceLevel>,
}

#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    pub distance_km: f64,
    pub price_kes: i64,
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub driver_id: Uuid,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

// ============================================================================
// Helpers
// ============================================================================

fn validate_addresses(pickup: &str, dropoff: &str) -> Result<(), AppError> {
    if pickup.trim().is_empty() {
        return Err(AppError::ValidationError("pickup_address is required".into()));
    }
    if dropoff.trim().is_empty() {
        return Err(AppError::ValidationError("dropoff_address is required".into()));
    }
    Ok(())
}

fn validate_weight(weight_kg: f64) -> Result<(), AppError> {
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(AppError::ValidationError(
            "package_weight_kg must be a positive number".into(),
        ));
    }
    Ok(())
}

/// Caller-side policy for an absent route: substitute the configured
/// fallback distance and carry no coordinates.
pub(crate) fn route_or_fallback(
    resolved: Option<ResolvedRoute>,
    fallback_distance_km: f64,
) -> (f64, Option<GeoPoint>, Option<GeoPoint>) {
    match resolved {
        Some(route) => (
            route.distance_km,
            Some(route.origin),
            Some(route.destination),
        ),
        None => (fallback_distance_km, None, None),
    }
}

/// Pricing snapshot for a quote. An unreadable configuration degrades to the
/// hardcoded base rate instead of failing the request.
pub(crate) async fn pricing_snapshot(state: &AppState) -> PricingConfig {
    match state.pricing.get_or_create().await {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "pricing config lookup failed, using fallback rate");
            PricingConfig::fallback()
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/orders
/// Create a delivery order. Price and distance are computed exactly once
/// here and frozen on the record.
pub async fn create_order(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    require_role(&principal, Role::Client)?;
    validate_addresses(&req.pickup_address, &req.dropoff_address)?;
    validate_weight(req.package_weight_kg)?;

    let resolved = state
        .resolver
        .resolve(&req.pickup_address, &req.dropoff_address)
        .await;
    let (distance_km, pickup_point, dropoff_point) =
        route_or_fallback(resolved, state.fallback_distance_km);

    let service_level = req.service_level.unwrap_or(ServiceLevel::Standard);
    let config = pricing_snapshot(&state).await;
    let price_kes = quote(
        distance_km,
        Some(req.package_weight_kg),
        req.vehicle_class,
        service_level,
        &config,
    );

    let now = Utc::now();
    let order = Order {
        id: Uuid::new_v4(),
        client_id: principal.id,
        driver_id: None,
        pickup_address: req.pickup_address,
        dropoff_address: req.dropoff_address,
        pickup_point,
        dropoff_point,
        recipient_name: req.recipient_name,
        recipient_phone: req.recipient_phone,
        distance_km,
        package_weight_kg: req.package_weight_kg,
        vehicle_class: req.vehicle_class,
        service_level,
        price_kes,
        status: OrderStatus::Pending,
        delivered_at: None,
        created_at: now,
        updated_at: now,
    };
    state.orders.create(&order).await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// POST /v1/orders/estimate
/// Price an order without persisting anything.
pub async fn estimate_order(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<EstimateRequest>,
) -> Result<Json<EstimateResponse>, AppError> {
    require_role(&principal, Role::Client)?;
    validate_addresses(&req.pickup_address, &req.dropoff_address)?;
    validate_weight(req.package_weight_kg)?;

    let resolved = state
        .resolver
        .resolve(&req.pickup_address, &req.dropoff_address)
        .await;
    let (distance_km, _, _) = route_or_fallback(resolved, state.fallback_distance_km);

    let config = pricing_snapshot(&state).await;
    let price_kes = quote(
        distance_km,
        Some(req.package_weight_kg),
        req.vehicle_class,
        req.service_level.unwrap_or(ServiceLevel::Standard),
        &config,
    );

    Ok(Json(EstimateResponse {
        distance_km,
        price_kes,
    }))
}

/// GET /v1/orders/my
/// The caller's own orders, newest first.
pub async fn my_orders(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<Order>>, AppError> {
    require_role(&principal, Role::Client)?;
    let orders = state.orders.list_for_client(&principal.id, 20).await?;
    Ok(Json(orders))
}

/// GET /v1/orders/{id}
/// Tracking fetch: the owner, the bound driver, or an admin.
pub async fn get_order(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .orders
        .get(order_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Order not found".into()))?;

    if !principal.is_admin() && !principal.owns(&order.client_id) {
        let is_bound_driver = match principal.role {
            Role::Driver => {
                let driver = state.drivers.get_by_user(&principal.id).await?;
                driver.map(|d| order.driver_id == Some(d.id)).unwrap_or(false)
            }
            _ => false,
        };
        if !is_bound_driver {
            return Err(AppError::AuthorizationError(
                "Not authorized to view this order".into(),
            ));
        }
    }

    Ok(Json(order))
}

/// PATCH /v1/orders/{id}/assign
/// Privileged assignment. The claim is a conditional update: the order must
/// still be pending and unassigned at write time, so a lost race surfaces as
/// a conflict rather than a silent overwrite.
pub async fn assign_order(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<AssignRequest>,
) -> Result<Json<Order>, AppError> {
    require_role(&principal, Role::Admin)?;

    let target = match req.status {
        None => OrderStatus::Assigned,
        Some(status @ (OrderStatus::Assigned | OrderStatus::InTransit)) => status,
        Some(other) => {
            return Err(AppError::ValidationError(format!(
                "status must be an in-progress status, got {}",
                other.as_str()
            )))
        }
    };

    state
        .orders
        .get(order_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Order not found".into()))?;
    state
        .drivers
        .get(req.driver_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Driver not found".into()))?;

    let order = state
        .orders
        .claim(order_id, req.driver_id, target)
        .await?
        .ok_or_else(|| {
            AppError::ConflictError("Order is no longer pending and unassigned".into())
        })?;

    Ok(Json(order))
}

/// PATCH /v1/orders/{id}/status
/// Driver-issued (must be the bound driver) or admin-issued status advance.
/// The transition into `delivered` stamps the timestamp once and enqueues a
/// best-effort notification to the requester.
pub async fn update_order_status(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, AppError> {
    require_role_or_admin(&principal, Role::Driver)?;

    let order = state
        .orders
        .get(order_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Order not found".into()))?;

    if principal.role == Role::Driver {
        let driver = state
            .drivers
            .get_by_user(&principal.id)
            .await?
            .ok_or_else(|| AppError::NotFoundError("Driver profile not found".into()))?;
        if order.driver_id != Some(driver.id) {
            return Err(AppError::AuthorizationError(
                "Not authorized to update this order".into(),
            ));
        }
    }

    advance_order(order.status, req.status, order.driver_id.is_some())
        .map_err(AppError::from_transition)?;

    let updated = state
        .orders
        .update_status(order_id, req.status)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Order not found".into()))?;

    if updated.status.is_terminal() {
        let notice = DeliveryNotice {
            work_item_id: updated.id,
            recipient: Some(updated.client_id.clone()),
            pickup_address: updated.pickup_address.clone(),
            dropoff_address: updated.dropoff_address.clone(),
            price_kes: updated.price_kes,
            kind: NoticeKind::OrderDelivered,
        };
        // Best-effort: a full or closed queue is logged, never surfaced.
        if let Err(err) = state.notices.try_send(notice) {
            tracing::error!(order_id = %updated.id, error = %err, "failed to enqueue delivery notice");
        }
    }

    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_route_substitutes_the_configured_fallback() {
        let (distance_km, pickup, dropoff) = route_or_fallback(None, 10.0);
        assert_eq!(distance_km, 10.0);
        assert!(pickup.is_none());
        assert!(dropoff.is_none());
    }

    #[test]
    fn resolved_route_carries_distance_and_endpoints() {
        let route = ResolvedRoute {
            distance_km: 4.2,
            origin: GeoPoint::new(36.8219, -1.2921),
            destination: GeoPoint::new(36.8090, -1.2635),
        };
        let (distance_km, pickup, dropoff) = route_or_fallback(Some(route), 10.0);
        assert_eq!(distance_km, 4.2);
        assert_eq!(pickup, Some(GeoPoint::new(36.8219, -1.2921)));
        assert_eq!(dropoff, Some(GeoPoint::new(36.8090, -1.2635)));
    }
}
