use serde::{Deserialize, Serialize};

use crate::config::PricingConfig;

/// Per-km rate used when the stored configuration cannot be read.
pub const FALLBACK_BASE_RATE: f64 = 50.0;

/// Vehicle class requested for a work item. Each class carries a
/// multiplicative adjustment to the per-km rate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VehicleClass {
    Bicycle,
    Bike,
    Car,
    Van,
    Lorry,
}

impl VehicleClass {
    pub fn factor(&self) -> f64 {
        match self {
            VehicleClass::Bicycle => 0.6,
            VehicleClass::Bike => 0.8,
            VehicleClass::Car => 1.0,
            VehicleClass::Van => 1.5,
            VehicleClass::Lorry => 2.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleClass::Bicycle => "bicycle",
            VehicleClass::Bike => "bike",
            VehicleClass::Car => "car",
            VehicleClass::Van => "van",
            VehicleClass::Lorry => "lorry",
        }
    }

    pub const ALL: [VehicleClass; 5] = [
        VehicleClass::Bicycle,
        VehicleClass::Bike,
        VehicleClass::Car,
        VehicleClass::Van,
        VehicleClass::Lorry,
    ];
}

impl std::str::FromStr for VehicleClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bicycle" => Ok(VehicleClass::Bicycle),
            "bike" => Ok(VehicleClass::Bike),
            "car" => Ok(VehicleClass::Car),
            "van" => Ok(VehicleClass::Van),
            "lorry" => Ok(VehicleClass::Lorry),
            other => Err(format!("unknown vehicle class: {other}")),
        }
    }
}

/// Delivery speed tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ServiceLevel {
    Standard,
    #[serde(rename = "Same Day")]
    SameDay,
    Express,
}

impl ServiceLevel {
    pub fn factor(&self) -> f64 {
        match self {
            ServiceLevel::Standard => 1.0,
            ServiceLevel::SameDay => 1.3,
            ServiceLevel::Express => 1.5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceLevel::Standard => "Standard",
            ServiceLevel::SameDay => "Same Day",
            ServiceLevel::Express => "Express",
        }
    }

    pub const ALL: [ServiceLevel; 3] = [
        ServiceLevel::Standard,
        ServiceLevel::SameDay,
        ServiceLevel::Express,
    ];
}

impl std::str::FromStr for ServiceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Standard" => Ok(ServiceLevel::Standard),
            "Same Day" => Ok(ServiceLevel::SameDay),
            "Express" => Ok(ServiceLevel::Express),
            other => Err(format!("unknown service level: {other}")),
        }
    }
}

/// Computes the price for a work item, in whole KES.
///
/// Rate lookup takes the first configured band containing the weight; no
/// match, no bands, or no weight (relocations are priced on volume text)
/// falls back to the configured base rate. Pure and deterministic for a
/// given configuration snapshot.
pub fn quote(
    distance_km: f64,
    weight_kg: Option<f64>,
    vehicle: VehicleClass,
    service: ServiceLevel,
    config: &PricingConfig,
) -> i64 {
    let per_km = config.rate_for(weight_kg);
    (distance_km * per_km * vehicle.factor() * service.factor()).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeightBand;

    fn single_band(min: f64, max: f64, rate: f64) -> PricingConfig {
        PricingConfig {
            base_cost_per_km: 50.0,
            weight_bands: vec![WeightBand::new(min, max, rate)],
        }
    }

    #[test]
    fn standard_bike_delivery() {
        // round(10 * 50 * 0.8 * 1.0) = 400
        let config = single_band(0.0, 5.0, 50.0);
        let price = quote(
            10.0,
            Some(3.0),
            VehicleClass::Bike,
            ServiceLevel::Standard,
            &config,
        );
        assert_eq!(price, 400);
    }

    #[test]
    fn express_van_delivery() {
        // round(20 * 80 * 1.5 * 1.5) = 3600
        let config = single_band(20.0, 50.0, 80.0);
        let price = quote(
            20.0,
            Some(30.0),
            VehicleClass::Van,
            ServiceLevel::Express,
            &config,
        );
        assert_eq!(price, 3600);
    }

    #[test]
    fn unmatched_weight_uses_base_rate() {
        let config = single_band(0.0, 5.0, 120.0);
        let price = quote(
            10.0,
            Some(50.0),
            VehicleClass::Car,
            ServiceLevel::Standard,
            &config,
        );
        assert_eq!(price, 500);
    }

    #[test]
    fn fallback_config_quotes_at_hardcoded_base() {
        let config = PricingConfig::fallback();
        let price = quote(
            10.0,
            Some(3.0),
            VehicleClass::Car,
            ServiceLevel::Standard,
            &config,
        );
        assert_eq!(price, 500);
    }

    #[test]
    fn price_rounds_to_nearest_unit() {
        let config = single_band(0.0, 5.0, 50.0);
        // 10.01 * 50 * 0.6 * 1.3 = 390.39 -> 390
        let price = quote(
            10.01,
            Some(3.0),
            VehicleClass::Bicycle,
            ServiceLevel::SameDay,
            &config,
        );
        assert_eq!(price, 390);
    }

    #[test]
    fn service_level_serde_uses_display_names() {
        let json = serde_json::to_string(&ServiceLevel::SameDay).unwrap();
        assert_eq!(json, "\"Same Day\"");
        let back: ServiceLevel = serde_json::from_str("\"Express\"").unwrap();
        assert_eq!(back, ServiceLevel::Express);
    }
}
