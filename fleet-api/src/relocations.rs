use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use fleet_core::identity::{Principal, Role};
use fleet_core::notify::{DeliveryNotice, NoticeKind};
use fleet_dispatch::lifecycle::{advance_relocation, cancel_relocation};
use fleet_dispatch::models::{RelocationRequest, RelocationStatus};
use fleet_pricing::{quote, ServiceLevel, VehicleClass};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::{require_role, require_role_or_admin};
use crate::orders::{pricing_snapshot, route_or_fallback};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateRelocationRequest {
    pub pickup_address: String,
    pub destination_address: String,
    pub scheduled_date: DateTime<Utc>,
    pub items_description: String,
    pub estimated_volume: String,
    pub vehicle_class: VehicleClass,
    pub service_level: Option<ServiceLevel>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RelocationEstimateRequest {
    pub pickup_address: String,
    pub destination_address: String,
    pub vehicle_class: Option<VehicleClass>,
    pub service_level: Option<ServiceLevel>,
}

#[derive(Debug, Serialize)]
pub struct RelocationEstimateResponse {
    pub distance_km: f64,
    pub price_kes: i64,
}

#[derive(Debug, Deserialize)]
pub struct AssignRelocationRequest {
    pub driver_id: Uuid,
    pub status: Option<RelocationStatus>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRelocationStatusRequest {
    pub status: RelocationStatus,
}

fn validate_addresses(pickup: &str, destination: &str) -> Result<(), AppError> {
    if pickup.trim().is_empty() {
        return Err(AppError::ValidationError("pickup_address is required".into()));
    }
    if destination.trim().is_empty() {
        return Err(AppError::ValidationError(
            "destination_address is required".into(),
        ));
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/relocations
/// Create a relocation request. Relocations are priced on distance and the
/// base/vehicle/service rates; the load is described as volume text, not a
/// weight, so no band lookup applies.
pub async fn create_relocation(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateRelocationRequest>,
) -> Result<(StatusCode, Json<RelocationRequest>), AppError> {
    require_role(&principal, Role::Client)?;
    validate_addresses(&req.pickup_address, &req.destination_address)?;
    if req.items_description.trim().is_empty() {
        return Err(AppError::ValidationError(
            "items_description is required".into(),
        ));
    }
    if req.estimated_volume.trim().is_empty() {
        return Err(AppError::ValidationError(
            "estimated_volume is required".into(),
        ));
    }

    let resolved = state
        .resolver
        .resolve(&req.pickup_address, &req.destination_address)
        .await;
    let (distance_km, pickup_point, destination_point) =
        route_or_fallback(resolved, state.fallback_distance_km);

    let service_level = req.service_level.unwrap_or(ServiceLevel::Standard);
    let config = pricing_snapshot(&state).await;
    let price_kes = quote(distance_km, None, req.vehicle_class, service_level, &config);

    let now = Utc::now();
    let request = RelocationRequest {
        id: Uuid::new_v4(),
        client_id: principal.id,
        driver_id: None,
        pickup_address: req.pickup_address,
        destination_address: req.destination_address,
        pickup_point,
        destination_point,
        scheduled_date: req.scheduled_date,
        items_description: req.items_description,
        estimated_volume: req.estimated_volume,
        vehicle_class: req.vehicle_class,
        service_level,
        price_kes,
        distance_km,
        notes: req.notes,
        status: RelocationStatus::Pending,
        completed_at: None,
        created_at: now,
        updated_at: now,
    };
    state.relocations.create(&request).await?;

    Ok((StatusCode::CREATED, Json(request)))
}

/// POST /v1/relocations/estimate
pub async fn estimate_relocation(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<RelocationEstimateRequest>,
) -> Result<Json<RelocationEstimateResponse>, AppError> {
    require_role(&principal, Role::Client)?;
    validate_addresses(&req.pickup_address, &req.destination_address)?;

    let resolved = state
        .resolver
        .resolve(&req.pickup_address, &req.destination_address)
        .await;
    let (distance_km, _, _) = route_or_fallback(resolved, state.fallback_distance_km);

    let config = pricing_snapshot(&state).await;
    let price_kes = quote(
        distance_km,
        None,
        req.vehicle_class.unwrap_or(VehicleClass::Van),
        req.service_level.unwrap_or(ServiceLevel::Standard),
        &config,
    );

    Ok(Json(RelocationEstimateResponse {
        distance_km,
        price_kes,
    }))
}

/// GET /v1/relocations/my
pub async fn my_relocations(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<RelocationRequest>>, AppError> {
    require_role(&principal, Role::Client)?;
    let requests = state.relocations.list_for_client(&principal.id).await?;
    Ok(Json(requests))
}

/// GET /v1/relocations/{id}
pub async fn get_relocation(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<RelocationRequest>, AppError> {
    let request = state
        .relocations
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Relocation request not found".into()))?;

    if !principal.is_admin() && !principal.owns(&request.client_id) {
        let is_bound_driver = match principal.role {
            Role::Driver => {
                let driver = state.drivers.get_by_user(&principal.id).await?;
                driver
                    .map(|d| request.driver_id == Some(d.id))
                    .unwrap_or(false)
            }
            _ => false,
        };
        if !is_bound_driver {
            return Err(AppError::AuthorizationError(
                "Not authorized to view this request".into(),
            ));
        }
    }

    Ok(Json(request))
}

/// PATCH /v1/relocations/{id}/assign
/// Same conditional-claim semantics as order assignment.
pub async fn assign_relocation(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignRelocationRequest>,
) -> Result<Json<RelocationRequest>, AppError> {
    require_role(&principal, Role::Admin)?;

    let target = match req.status {
        None => RelocationStatus::Assigned,
        Some(status @ (RelocationStatus::Assigned | RelocationStatus::InTransit)) => status,
        Some(other) => {
            return Err(AppError::ValidationError(format!(
                "status must be an in-progress status, got {}",
                other.as_str()
            )))
        }
    };

    state
        .relocations
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Relocation request not found".into()))?;
    state
        .drivers
        .get(req.driver_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Driver not found".into()))?;

    let request = state
        .relocations
        .claim(id, req.driver_id, target)
        .await?
        .ok_or_else(|| {
            AppError::ConflictError("Relocation request is no longer pending and unassigned".into())
        })?;

    Ok(Json(request))
}

/// PATCH /v1/relocations/{id}/status
pub async fn update_relocation_status(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRelocationStatusRequest>,
) -> Result<Json<RelocationRequest>, AppError> {
    require_role_or_admin(&principal, Role::Driver)?;

    let request = state
        .relocations
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Relocation request not found".into()))?;

    if principal.role == Role::Driver {
        let driver = state
            .drivers
            .get_by_user(&principal.id)
            .await?
            .ok_or_else(|| AppError::NotFoundError("Driver profile not found".into()))?;
        if request.driver_id != Some(driver.id) {
            return Err(AppError::AuthorizationError(
                "Not authorized to update this request".into(),
            ));
        }
    }

    advance_relocation(request.status, req.status, request.driver_id.is_some())
        .map_err(AppError::from_transition)?;

    let updated = state
        .relocations
        .update_status(id, req.status)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Relocation request not found".into()))?;

    if updated.status == RelocationStatus::Completed {
        let notice = DeliveryNotice {
            work_item_id: updated.id,
            recipient: Some(updated.client_id.clone()),
            pickup_address: updated.pickup_address.clone(),
            dropoff_address: updated.destination_address.clone(),
            price_kes: updated.price_kes,
            kind: NoticeKind::RelocationCompleted,
        };
        if let Err(err) = state.notices.try_send(notice) {
            tracing::error!(relocation_id = %updated.id, error = %err, "failed to enqueue completion notice");
        }
    }

    Ok(Json(updated))
}

/// DELETE /v1/relocations/{id}
/// Cancellation is a terminal status, not a removal. Only the requester or
/// an admin, and only before the move is in transit.
pub async fn cancel_relocation_request(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_role_or_admin(&principal, Role::Client)?;

    let request = state
        .relocations
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Relocation request not found".into()))?;

    if !principal.is_admin() && !principal.owns(&request.client_id) {
        return Err(AppError::AuthorizationError(
            "Not authorized to cancel this request".into(),
        ));
    }

    cancel_relocation(request.status).map_err(AppError::from_transition)?;

    state
        .relocations
        .update_status(id, RelocationStatus::Cancelled)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Relocation request not found".into()))?;

    Ok(Json(json!({
        "message": "Relocation request cancelled successfully"
    })))
}
