use fleet_dispatch::models::{RelocationRequest, RelocationStatus};
use fleet_geo::GeoPoint;
use sqlx::PgPool;
use uuid::Uuid;

use crate::StoreError;

pub struct RelocationRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct RelocationRow {
    id: Uuid,
    client_id: String,
    driver_id: Option<Uuid>,
    pickup_address: String,
    destination_address: String,
    pickup_lon: Option<f64>,
    pickup_lat: Option<f64>,
    destination_lon: Option<f64>,
    destination_lat: Option<f64>,
    scheduled_date: chrono::DateTime<chrono::Utc>,
    items_description: String,
    estimated_volume: String,
    vehicle_class: String,
    service_level: String,
    price_kes: i64,
    distance_km: f64,
    notes: Option<String>,
    status: String,
    completed_at: Option<chrono::DateTime<chrono::Utc>>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

fn point(lon: Option<f64>, lat: Option<f64>) -> Option<GeoPoint> {
    match (lon, lat) {
        (Some(lon), Some(lat)) => Some(GeoPoint::new(lon, lat)),
        _ => None,
    }
}

impl TryFrom<RelocationRow> for RelocationRequest {
    type Error = StoreError;

    fn try_from(row: RelocationRow) -> Result<Self, Self::Error> {
        Ok(RelocationRequest {
            id: row.id,
            client_id: row.client_id,
            driver_id: row.driver_id,
            pickup_address: row.pickup_address,
            destination_address: row.destination_address,
            pickup_point: point(row.pickup_lon, row.pickup_lat),
            destination_point: point(row.destination_lon, row.destination_lat),
            scheduled_date: row.scheduled_date,
            items_description: row.items_description,
            estimated_volume: row.estimated_volume,
            vehicle_class: row.vehicle_class.parse().map_err(StoreError::Corrupt)?,
            service_level: row.service_level.parse().map_err(StoreError::Corrupt)?,
            price_kes: row.price_kes,
            distance_km: row.distance_km,
            notes: row.notes,
            status: row.status.parse().map_err(StoreError::Corrupt)?,
            completed_at: row.completed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const RELOCATION_COLUMNS: &str = "id, client_id, driver_id, pickup_address, destination_address, \
     pickup_lon, pickup_lat, destination_lon, destination_lat, scheduled_date, \
     items_description, estimated_volume, vehicle_class, service_level, price_kes, \
     distance_km, notes, status, completed_at, created_at, updated_at";

impl RelocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: &RelocationRequest) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO relocation_requests (id, client_id, driver_id, pickup_address,
                destination_address, pickup_lon, pickup_lat, destination_lon, destination_lat,
                scheduled_date, items_description, estimated_volume, vehicle_class,
                service_level, price_kes, distance_km, notes, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(request.id)
        .bind(&request.client_id)
        .bind(request.driver_id)
        .bind(&request.pickup_address)
        .bind(&request.destination_address)
        .bind(request.pickup_point.map(|p| p.lon))
        .bind(request.pickup_point.map(|p| p.lat))
        .bind(request.destination_point.map(|p| p.lon))
        .bind(request.destination_point.map(|p| p.lat))
        .bind(request.scheduled_date)
        .bind(&request.items_description)
        .bind(&request.estimated_volume)
        .bind(request.vehicle_class.as_str())
        .bind(request.service_level.as_str())
        .bind(request.price_kes)
        .bind(request.distance_km)
        .bind(&request.notes)
        .bind(request.status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<RelocationRequest>, StoreError> {
        let row: Option<RelocationRow> = sqlx::query_as(&format!(
            "SELECT {RELOCATION_COLUMNS} FROM relocation_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(RelocationRequest::try_from).transpose()
    }

    pub async fn list_for_client(&self, client_id: &str) -> Result<Vec<RelocationRequest>, StoreError> {
        let rows: Vec<RelocationRow> = sqlx::query_as(&format!(
            "SELECT {RELOCATION_COLUMNS} FROM relocation_requests WHERE client_id = $1 ORDER BY created_at DESC"
        ))
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(RelocationRequest::try_from).collect()
    }

    pub async fn list_pending_unassigned(&self) -> Result<Vec<RelocationRequest>, StoreError> {
        let rows: Vec<RelocationRow> = sqlx::query_as(&format!(
            "SELECT {RELOCATION_COLUMNS} FROM relocation_requests WHERE status = 'pending' AND driver_id IS NULL ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(RelocationRequest::try_from).collect()
    }

    /// Conditional driver binding; `None` means the claim was lost to a
    /// concurrent assignment or the request is no longer pending.
    pub async fn claim(
        &self,
        id: Uuid,
        driver_id: Uuid,
        status: RelocationStatus,
    ) -> Result<Option<RelocationRequest>, StoreError> {
        let row: Option<RelocationRow> = sqlx::query_as(&format!(
            r#"
            UPDATE relocation_requests SET driver_id = $2, status = $3, updated_at = NOW()
            WHERE id = $1 AND status = 'pending' AND driver_id IS NULL
            RETURNING {RELOCATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(driver_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(RelocationRequest::try_from).transpose()
    }

    /// Writes an already-validated status transition. Only the transition
    /// into `completed` stamps the completion timestamp; cancellation leaves
    /// it unset.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: RelocationStatus,
    ) -> Result<Option<RelocationRequest>, StoreError> {
        let row: Option<RelocationRow> = sqlx::query_as(&format!(
            r#"
            UPDATE relocation_requests
            SET status = $2,
                completed_at = CASE WHEN $3 THEN COALESCE(completed_at, NOW()) ELSE completed_at END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {RELOCATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(status == RelocationStatus::Completed)
        .fetch_optional(&self.pool)
        .await?;
        row.map(RelocationRequest::try_from).transpose()
    }
}
