use fleet_dispatch::models::{Order, OrderStatus};
use fleet_geo::GeoPoint;
use sqlx::PgPool;
use uuid::Uuid;

use crate::StoreError;

pub struct OrderRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    client_id: String,
    driver_id: Option<Uuid>,
    pickup_address: String,
    dropoff_address: String,
    pickup_lon: Option<f64>,
    pickup_lat: Option<f64>,
    dropoff_lon: Option<f64>,
    dropoff_lat: Option<f64>,
    recipient_name: Option<String>,
    recipient_phone: Option<String>,
    distance_km: f64,
    package_weight_kg: f64,
    vehicle_class: String,
    service_level: String,
    price_kes: i64,
    status: String,
    delivered_at: Option<chrono::DateTime<chrono::Utc>>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

fn point(lon: Option<f64>, lat: Option<f64>) -> Option<GeoPoint> {
    match (lon, lat) {
        (Some(lon), Some(lat)) => Some(GeoPoint::new(lon, lat)),
        _ => None,
    }
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: row.id,
            client_id: row.client_id,
            driver_id: row.driver_id,
            pickup_address: row.pickup_address,
            dropoff_address: row.dropoff_address,
            pickup_point: point(row.pickup_lon, row.pickup_lat),
            dropoff_point: point(row.dropoff_lon, row.dropoff_lat),
            recipient_name: row.recipient_name,
            recipient_phone: row.recipient_phone,
            distance_km: row.distance_km,
            package_weight_kg: row.package_weight_kg,
            vehicle_class: row.vehicle_class.parse().map_err(StoreError::Corrupt)?,
            service_level: row.service_level.parse().map_err(StoreError::Corrupt)?,
            price_kes: row.price_kes,
            status: row.status.parse().map_err(StoreError::Corrupt)?,
            delivered_at: row.delivered_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const ORDER_COLUMNS: &str = "id, client_id, driver_id, pickup_address, dropoff_address, \
     pickup_lon, pickup_lat, dropoff_lon, dropoff_lat, recipient_name, recipient_phone, \
     distance_km, package_weight_kg, vehicle_class, service_level, price_kes, status, \
     delivered_at, created_at, updated_at";

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, order: &Order) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, client_id, driver_id, pickup_address, dropoff_address,
                pickup_lon, pickup_lat, dropoff_lon, dropoff_lat, recipient_name,
                recipient_phone, distance_km, package_weight_kg, vehicle_class,
                service_level, price_kes, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(order.id)
        .bind(&order.client_id)
        .bind(order.driver_id)
        .bind(&order.pickup_address)
        .bind(&order.dropoff_address)
        .bind(order.pickup_point.map(|p| p.lon))
        .bind(order.pickup_point.map(|p| p.lat))
        .bind(order.dropoff_point.map(|p| p.lon))
        .bind(order.dropoff_point.map(|p| p.lat))
        .bind(&order.recipient_name)
        .bind(&order.recipient_phone)
        .bind(order.distance_km)
        .bind(order.package_weight_kg)
        .bind(order.vehicle_class.as_str())
        .bind(order.service_level.as_str())
        .bind(order.price_kes)
        .bind(order.status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Order::try_from).transpose()
    }

    pub async fn list_for_client(&self, client_id: &str, limit: i64) -> Result<Vec<Order>, StoreError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE client_id = $1 ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(client_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Order::try_from).collect()
    }

    pub async fn list_pending_unassigned(&self) -> Result<Vec<Order>, StoreError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE status = 'pending' AND driver_id IS NULL ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Order::try_from).collect()
    }

    /// Binds a driver with a conditional update: the order must still be
    /// pending and unassigned at write time, so at most one concurrent
    /// assignment can succeed. Returns `None` when the claim is lost.
    pub async fn claim(
        &self,
        id: Uuid,
        driver_id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            r#"
            UPDATE orders SET driver_id = $2, status = $3, updated_at = NOW()
            WHERE id = $1 AND status = 'pending' AND driver_id IS NULL
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(driver_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Order::try_from).transpose()
    }

    /// Writes an already-validated status transition. The terminal timestamp
    /// is stamped at the transition into `delivered` and never after.
    pub async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Option<Order>, StoreError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            r#"
            UPDATE orders
            SET status = $2,
                delivered_at = CASE WHEN $3 THEN COALESCE(delivered_at, NOW()) ELSE delivered_at END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(status.is_terminal())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Order::try_from).transpose()
    }
}
