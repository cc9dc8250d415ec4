//! Thin asynchronous client for an OpenRouteService-compatible API.
//!
//! Two endpoints are consumed: forward geocoding (`geocode/search`) and
//! driving directions (`v2/directions/driving-car`). Both return GeoJSON
//! feature collections; the fields the engine needs are pulled out by the
//! parse helpers below so they stay testable without a network.

use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;

use crate::point::GeoPoint;

const USER_AGENT: &str = "fleet-engine/0.1.0";

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub features: Vec<GeocodeFeature>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeFeature {
    pub geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeGeometry {
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    #[serde(default)]
    pub features: Vec<DirectionsFeature>,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsFeature {
    pub properties: DirectionsProperties,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsProperties {
    pub summary: Option<DirectionsSummary>,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsSummary {
    pub distance: Option<f64>,
}

/// First geocode hit's coordinate pair, if the response carries one.
pub fn first_coordinates(response: &GeocodeResponse) -> Option<GeoPoint> {
    let coords = &response.features.first()?.geometry.coordinates;
    if coords.len() < 2 {
        return None;
    }
    Some(GeoPoint::new(coords[0], coords[1]))
}

/// Distance in kilometers from the first route feature's summary.
pub fn first_route_distance_km(response: &DirectionsResponse) -> Option<f64> {
    let meters = response
        .features
        .first()?
        .properties
        .summary
        .as_ref()?
        .distance?;
    Some(meters / 1000.0)
}

#[derive(Clone)]
pub struct RoutingClient {
    http: Client,
    base_url: Url,
    api_key: String,
}

impl RoutingClient {
    pub fn new(base_url: &str, api_key: String) -> Result<Self, RoutingError> {
        let base_url = Url::parse(base_url)?;
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    /// Forward-geocodes a free-text address to its best-match coordinates.
    pub async fn geocode(&self, address: &str) -> Result<Option<GeoPoint>, RoutingError> {
        let url = self.base_url.join("geocode/search")?;
        let response: GeocodeResponse = self
            .http
            .get(url)
            .header("Authorization", &self.api_key)
            .query(&[("text", address), ("size", "1")])
            .send()
            .await?
            .json()
            .await?;
        Ok(first_coordinates(&response))
    }

    /// Driving distance between two coordinate pairs, in kilometers.
    pub async fn route(&self, start: GeoPoint, end: GeoPoint) -> Result<Option<f64>, RoutingError> {
        let url = self.base_url.join("v2/directions/driving-car")?;
        let response: DirectionsResponse = self
            .http
            .get(url)
            .header("Authorization", &self.api_key)
            .query(&[
                ("start", format!("{},{}", start.lon, start.lat)),
                ("end", format!("{},{}", end.lon, end.lat)),
            ])
            .send()
            .await?
            .json()
            .await?;
        Ok(first_route_distance_km(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_coordinates_from_geocode_payload() {
        let raw = r#"{"features":[{"geometry":{"coordinates":[36.8219,-1.2921]}}]}"#;
        let response: GeocodeResponse = serde_json::from_str(raw).unwrap();
        let point = first_coordinates(&response).unwrap();
        assert_eq!(point.lon, 36.8219);
        assert_eq!(point.lat, -1.2921);
    }

    #[test]
    fn empty_feature_list_yields_no_coordinates() {
        let response: GeocodeResponse = serde_json::from_str(r#"{"features":[]}"#).unwrap();
        assert!(first_coordinates(&response).is_none());
    }

    #[test]
    fn truncated_coordinate_pair_yields_none() {
        let raw = r#"{"features":[{"geometry":{"coordinates":[36.8219]}}]}"#;
        let response: GeocodeResponse = serde_json::from_str(raw).unwrap();
        assert!(first_coordinates(&response).is_none());
    }

    #[test]
    fn converts_route_distance_to_kilometers() {
        let raw = r#"{"features":[{"properties":{"summary":{"distance":12500.0}}}]}"#;
        let response: DirectionsResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(first_route_distance_km(&response), Some(12.5));
    }

    #[test]
    fn missing_summary_distance_yields_none() {
        let raw = r#"{"features":[{"properties":{"summary":null}}]}"#;
        let response: DirectionsResponse = serde_json::from_str(raw).unwrap();
        assert!(first_route_distance_km(&response).is_none());
    }
}
