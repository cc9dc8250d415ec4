use chrono::{DateTime, Utc};
use fleet_geo::GeoPoint;
use fleet_pricing::{ServiceLevel, VehicleClass};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status lifecycle of a delivery order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Assigned,
    InTransit,
    Delivered,
}

impl OrderStatus {
    /// Position in the defined order; transitions only move forward.
    pub fn rank(&self) -> u8 {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::Assigned => 1,
            OrderStatus::InTransit => 2,
            OrderStatus::Delivered => 3,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Assigned => "assigned",
            OrderStatus::InTransit => "in-transit",
            OrderStatus::Delivered => "delivered",
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "assigned" => Ok(OrderStatus::Assigned),
            "in-transit" => Ok(OrderStatus::InTransit),
            "delivered" => Ok(OrderStatus::Delivered),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// Status lifecycle of a relocation request. Cancellation is a terminal
/// status of its own, reachable only before the move is in transit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RelocationStatus {
    Pending,
    Assigned,
    InTransit,
    Completed,
    Cancelled,
}

impl RelocationStatus {
    pub fn rank(&self) -> u8 {
        match self {
            RelocationStatus::Pending => 0,
            RelocationStatus::Assigned => 1,
            RelocationStatus::InTransit => 2,
            RelocationStatus::Completed => 3,
            // Terminal but outside the forward order; only `cancel` reaches it.
            RelocationStatus::Cancelled => 4,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RelocationStatus::Completed | RelocationStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelocationStatus::Pending => "pending",
            RelocationStatus::Assigned => "assigned",
            RelocationStatus::InTransit => "in-transit",
            RelocationStatus::Completed => "completed",
            RelocationStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for RelocationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RelocationStatus::Pending),
            "assigned" => Ok(RelocationStatus::Assigned),
            "in-transit" => Ok(RelocationStatus::InTransit),
            "completed" => Ok(RelocationStatus::Completed),
            "cancelled" => Ok(RelocationStatus::Cancelled),
            other => Err(format!("unknown relocation status: {other}")),
        }
    }
}

/// A priced, trackable delivery work item. Price and distance are frozen at
/// creation and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub client_id: String,
    pub driver_id: Option<Uuid>,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub pickup_point: Option<GeoPoint>,
    pub dropoff_point: Option<GeoPoint>,
    pub recipient_name: Option<String>,
    pub recipient_phone: Option<String>,
    pub distance_km: f64,
    pub package_weight_kg: f64,
    pub vehicle_class: VehicleClass,
    pub service_level: ServiceLevel,
    pub price_kes: i64,
    pub status: OrderStatus,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A priced, trackable relocation work item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelocationRequest {
    pub id: Uuid,
    pub client_id: String,
    pub driver_id: Option<Uuid>,
    pub pickup_address: String,
    pub destination_address: String,
    pub pickup_point: Option<GeoPoint>,
    pub destination_point: Option<GeoPoint>,
    pub scheduled_date: DateTime<Utc>,
    pub items_description: String,
    pub estimated_volume: String,
    pub vehicle_class: VehicleClass,
    pub service_level: ServiceLevel,
    pub price_kes: i64,
    pub distance_km: f64,
    pub notes: Option<String>,
    pub status: RelocationStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A driver eligible to be bound to a work item. Presence (online flag and
/// last-known location) gates self-service candidate discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub user_id: String,
    pub vehicle_class: VehicleClass,
    pub is_online: bool,
    pub location: Option<GeoPoint>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_serde_uses_kebab_case() {
        let json = serde_json::to_string(&OrderStatus::InTransit).unwrap();
        assert_eq!(json, "\"in-transit\"");
        let back: OrderStatus = serde_json::from_str("\"delivered\"").unwrap();
        assert_eq!(back, OrderStatus::Delivered);
    }

    #[test]
    fn status_text_round_trips() {
        for status in [
            RelocationStatus::Pending,
            RelocationStatus::Assigned,
            RelocationStatus::InTransit,
            RelocationStatus::Completed,
            RelocationStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<RelocationStatus>().unwrap(), status);
        }
    }

    #[test]
    fn terminal_statuses() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(!OrderStatus::InTransit.is_terminal());
        assert!(RelocationStatus::Cancelled.is_terminal());
        assert!(RelocationStatus::Completed.is_terminal());
        assert!(!RelocationStatus::Assigned.is_terminal());
    }
}
