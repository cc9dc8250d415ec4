pub mod config;
pub mod quote;

pub use config::{PricingConfig, WeightBand};
pub use quote::{quote, ServiceLevel, VehicleClass, FALLBACK_BASE_RATE};
