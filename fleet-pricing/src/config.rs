use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A `[min, max]` kilogram range mapping to a per-kilometer rate. Bands are
/// evaluated in list order and are deliberately not validated for overlap;
/// the first match wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightBand {
    pub label: String,
    pub min_kg: f64,
    pub max_kg: f64,
    pub price_per_km: f64,
}

impl WeightBand {
    pub fn new(min_kg: f64, max_kg: f64, price_per_km: f64) -> Self {
        Self {
            label: format!("{} - {} kg", min_kg, max_kg),
            min_kg,
            max_kg,
            price_per_km,
        }
    }

    /// Builds a band from an untrusted admin payload. Numeric fields are
    /// coerced with malformed or negative values defaulting to 0; a missing
    /// label is synthesized from the range.
    pub fn from_loose(raw: &Value) -> Self {
        let min_kg = raw["min_kg"].as_f64().unwrap_or(0.0).max(0.0);
        let max_kg = raw["max_kg"].as_f64().unwrap_or(0.0).max(0.0);
        let price_per_km = raw["price_per_km"].as_f64().unwrap_or(0.0).max(0.0);
        let label = raw["label"]
            .as_str()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} - {} kg", min_kg, max_kg));
        Self {
            label,
            min_kg,
            max_kg,
            price_per_km,
        }
    }

    pub fn contains(&self, weight_kg: f64) -> bool {
        weight_kg >= self.min_kg && weight_kg <= self.max_kg
    }
}

/// One logical pricing configuration per deployment: a base per-km rate plus
/// an ordered list of weight-band rates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricingConfig {
    pub base_cost_per_km: f64,
    pub weight_bands: Vec<WeightBand>,
}

impl PricingConfig {
    /// Canonical seed written at startup if no configuration exists yet.
    pub fn default_seed() -> Self {
        Self {
            base_cost_per_km: 50.0,
            weight_bands: vec![
                WeightBand::new(0.0, 5.0, 50.0),
                WeightBand::new(5.0, 20.0, 60.0),
                WeightBand::new(20.0, 50.0, 80.0),
                WeightBand::new(50.0, 100.0, 100.0),
            ],
        }
    }

    /// Used when the stored configuration cannot be read at all. Quoting
    /// degrades to the hardcoded base rate rather than failing the request.
    pub fn fallback() -> Self {
        Self {
            base_cost_per_km: crate::quote::FALLBACK_BASE_RATE,
            weight_bands: Vec::new(),
        }
    }

    /// First configured band containing the weight, in list order.
    pub fn band_for(&self, weight_kg: f64) -> Option<&WeightBand> {
        self.weight_bands.iter().find(|b| b.contains(weight_kg))
    }

    /// Per-km rate for a weight, falling back to the base rate when no band
    /// matches or no weight applies.
    pub fn rate_for(&self, weight_kg: Option<f64>) -> f64 {
        weight_kg
            .and_then(|w| self.band_for(w))
            .map(|b| b.price_per_km)
            .unwrap_or(self.base_cost_per_km)
    }

    /// Applies an admin update, overwriting only the provided fields. Rates
    /// are never negative; a negative base is clamped to 0 like any other
    /// malformed numeric input.
    pub fn apply_update(&mut self, base_cost_per_km: Option<f64>, weight_bands: Option<&[Value]>) {
        if let Some(base) = base_cost_per_km {
            if base.is_finite() {
                self.base_cost_per_km = base.max(0.0);
            }
        }
        if let Some(bands) = weight_bands {
            self.weight_bands = bands
                .iter()
                .filter(|b| !b.is_null())
                .map(WeightBand::from_loose)
                .collect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_seed_has_four_bands_and_base_fifty() {
        let config = PricingConfig::default_seed();
        assert_eq!(config.base_cost_per_km, 50.0);
        assert_eq!(config.weight_bands.len(), 4);
        assert_eq!(config.weight_bands[0].label, "0 - 5 kg");
        assert_eq!(config.weight_bands[3].price_per_km, 100.0);
    }

    #[test]
    fn first_matching_band_wins_on_overlap() {
        let config = PricingConfig {
            base_cost_per_km: 50.0,
            weight_bands: vec![
                WeightBand::new(0.0, 10.0, 40.0),
                WeightBand::new(5.0, 20.0, 70.0),
            ],
        };
        // 7 kg sits in both bands; list order breaks the tie.
        assert_eq!(config.rate_for(Some(7.0)), 40.0);
    }

    #[test]
    fn band_bounds_are_inclusive() {
        let config = PricingConfig {
            base_cost_per_km: 50.0,
            weight_bands: vec![WeightBand::new(5.0, 20.0, 60.0)],
        };
        assert_eq!(config.rate_for(Some(5.0)), 60.0);
        assert_eq!(config.rate_for(Some(20.0)), 60.0);
        assert_eq!(config.rate_for(Some(20.1)), 50.0);
    }

    #[test]
    fn missing_weight_uses_base_rate() {
        let config = PricingConfig::default_seed();
        assert_eq!(config.rate_for(None), 50.0);
    }

    #[test]
    fn loose_band_coerces_malformed_numbers_to_zero() {
        let band = WeightBand::from_loose(&json!({
            "label": "",
            "min_kg": "not a number",
            "max_kg": 20,
            "price_per_km": 60
        }));
        assert_eq!(band.min_kg, 0.0);
        assert_eq!(band.max_kg, 20.0);
        assert_eq!(band.price_per_km, 60.0);
        assert_eq!(band.label, "0 - 20 kg");
    }

    #[test]
    fn negative_rates_are_clamped_to_zero() {
        let mut config = PricingConfig::default_seed();
        let bands = vec![json!({"min_kg": -5, "max_kg": 10, "price_per_km": -80})];
        config.apply_update(Some(-25.0), Some(&bands));

        assert_eq!(config.base_cost_per_km, 0.0);
        assert_eq!(config.weight_bands[0].min_kg, 0.0);
        assert_eq!(config.weight_bands[0].price_per_km, 0.0);

        // A quote against the sanitized configuration can never go negative.
        let price = crate::quote::quote(
            10.0,
            Some(3.0),
            crate::quote::VehicleClass::Car,
            crate::quote::ServiceLevel::Standard,
            &config,
        );
        assert_eq!(price, 0);
    }

    #[test]
    fn update_overwrites_only_provided_fields() {
        let mut config = PricingConfig::default_seed();
        config.apply_update(Some(75.0), None);
        assert_eq!(config.base_cost_per_km, 75.0);
        assert_eq!(config.weight_bands.len(), 4);

        let bands = vec![json!({"min_kg": 0, "max_kg": 100, "price_per_km": 90})];
        config.apply_update(None, Some(&bands));
        assert_eq!(config.base_cost_per_km, 75.0);
        assert_eq!(config.weight_bands.len(), 1);
        assert_eq!(config.weight_bands[0].label, "0 - 100 kg");
    }
}
