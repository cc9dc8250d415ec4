use crate::point::GeoPoint;
use crate::routing::RoutingClient;

/// Outcome of a successful resolution: the travel distance plus the geocoded
/// endpoints, captured so callers can persist them on the work item.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedRoute {
    pub distance_km: f64,
    pub origin: GeoPoint,
    pub destination: GeoPoint,
}

/// Resolves two free-text addresses into a travel distance through the
/// geocode+route collaborator.
///
/// The resolver never raises to its caller: every transport or parse failure
/// is logged and collapses to `None`, and the calling operation substitutes
/// the configured fallback distance. Availability over pricing accuracy.
pub struct DistanceResolver {
    client: Option<RoutingClient>,
}

impl DistanceResolver {
    pub fn new(client: Option<RoutingClient>) -> Self {
        Self { client }
    }

    /// No credentials at all: every resolution short-circuits to `None`.
    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub async fn resolve(&self, origin: &str, destination: &str) -> Option<ResolvedRoute> {
        // Missing credentials or missing addresses: no network calls at all.
        let client = self.client.as_ref()?;
        if origin.trim().is_empty() || destination.trim().is_empty() {
            return None;
        }

        let origin_point = match client.geocode(origin).await {
            Ok(Some(point)) => point,
            Ok(None) => {
                tracing::warn!(address = origin, "geocoding returned no coordinates");
                return None;
            }
            Err(err) => {
                tracing::warn!(address = origin, error = %err, "geocoding failed");
                return None;
            }
        };

        let destination_point = match client.geocode(destination).await {
            Ok(Some(point)) => point,
            Ok(None) => {
                tracing::warn!(address = destination, "geocoding returned no coordinates");
                return None;
            }
            Err(err) => {
                tracing::warn!(address = destination, error = %err, "geocoding failed");
                return None;
            }
        };

        match client.route(origin_point, destination_point).await {
            Ok(Some(distance_km)) => Some(ResolvedRoute {
                distance_km,
                origin: origin_point,
                destination: destination_point,
            }),
            Ok(None) => {
                tracing::warn!("directions response missing distance");
                None
            }
            Err(err) => {
                tracing::warn!(error = %err, "directions request failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_resolver_short_circuits() {
        let resolver = DistanceResolver::disabled();
        assert!(resolver.resolve("Westlands", "Kilimani").await.is_none());
    }

    #[tokio::test]
    async fn blank_addresses_make_no_calls() {
        // An unroutable base URL proves no request is issued before the
        // address check.
        let client = RoutingClient::new("http://127.0.0.1:1/", "key".into()).unwrap();
        let resolver = DistanceResolver::new(Some(client));
        assert!(resolver.resolve("", "Kilimani").await.is_none());
        assert!(resolver.resolve("Westlands", "   ").await.is_none());
    }
}
