use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub routing: RoutingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

/// Geocode+route collaborator settings. A missing API key disables the
/// resolver entirely; every resolution then degrades to the fallback
/// distance without a network call.
#[derive(Debug, Deserialize, Clone)]
pub struct RoutingConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    #[serde(default = "default_fallback_distance_km")]
    pub fallback_distance_km: f64,
}

fn default_fallback_distance_km() -> f64 {
    10.0
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("FLEET").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_fallback_distance_defaults_to_ten_km() {
        let routing: RoutingConfig = serde_json::from_value(serde_json::json!({
            "base_url": "https://api.openrouteservice.org/"
        }))
        .unwrap();
        assert_eq!(routing.fallback_distance_km, 10.0);
        assert!(routing.api_key.is_none());
    }
}
