use fleet_dispatch::models::Driver;
use fleet_geo::GeoPoint;
use sqlx::PgPool;
use uuid::Uuid;

use crate::StoreError;

pub struct DriverRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct DriverRow {
    id: Uuid,
    user_id: String,
    vehicle_class: String,
    is_online: bool,
    location_lon: Option<f64>,
    location_lat: Option<f64>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<DriverRow> for Driver {
    type Error = StoreError;

    fn try_from(row: DriverRow) -> Result<Self, Self::Error> {
        let location = match (row.location_lon, row.location_lat) {
            (Some(lon), Some(lat)) => Some(GeoPoint::new(lon, lat)),
            _ => None,
        };
        Ok(Driver {
            id: row.id,
            user_id: row.user_id,
            vehicle_class: row.vehicle_class.parse().map_err(StoreError::Corrupt)?,
            is_online: row.is_online,
            location,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const DRIVER_COLUMNS: &str =
    "id, user_id, vehicle_class, is_online, location_lon, location_lat, created_at, updated_at";

impl DriverRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Driver>, StoreError> {
        let row: Option<DriverRow> =
            sqlx::query_as(&format!("SELECT {DRIVER_COLUMNS} FROM drivers WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Driver::try_from).transpose()
    }

    /// Driver profile for the authenticated user behind it. Profiles are
    /// provisioned by the identity collaborator, outside this engine.
    pub async fn get_by_user(&self, user_id: &str) -> Result<Option<Driver>, StoreError> {
        let row: Option<DriverRow> = sqlx::query_as(&format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Driver::try_from).transpose()
    }

    pub async fn set_online(&self, user_id: &str, is_online: bool) -> Result<Option<Driver>, StoreError> {
        let row: Option<DriverRow> = sqlx::query_as(&format!(
            "UPDATE drivers SET is_online = $2, updated_at = NOW() WHERE user_id = $1 RETURNING {DRIVER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(is_online)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Driver::try_from).transpose()
    }

    pub async fn set_location(
        &self,
        user_id: &str,
        location: GeoPoint,
    ) -> Result<Option<Driver>, StoreError> {
        let row: Option<DriverRow> = sqlx::query_as(&format!(
            r#"
            UPDATE drivers SET location_lon = $2, location_lat = $3, updated_at = NOW()
            WHERE user_id = $1
            RETURNING {DRIVER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(location.lon)
        .bind(location.lat)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Driver::try_from).transpose()
    }
}
