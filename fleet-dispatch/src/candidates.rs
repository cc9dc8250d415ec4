use fleet_geo::{haversine_km, GeoPoint};
use serde::Serialize;

/// A pending, unassigned work item annotated with the driver's real distance
/// to its pickup point. Items whose pickup was never geocoded carry no
/// distance; they are kept in the listing but sort after every measured item.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate<T> {
    #[serde(flatten)]
    pub item: T,
    pub pickup_distance_km: Option<f64>,
}

/// Annotates, filters, and sorts candidate work items for a self-service
/// driver at `driver_location`. Measured items beyond `max_distance_km` are
/// dropped; the rest are sorted ascending by distance.
pub fn rank_candidates<T>(
    items: Vec<T>,
    driver_location: GeoPoint,
    max_distance_km: f64,
    pickup_point: impl Fn(&T) -> Option<GeoPoint>,
) -> Vec<Candidate<T>> {
    let mut candidates: Vec<Candidate<T>> = items
        .into_iter()
        .filter_map(|item| {
            let distance = pickup_point(&item).map(|p| haversine_km(driver_location, p));
            match distance {
                Some(d) if d > max_distance_km => None,
                other => Some(Candidate {
                    item,
                    pickup_distance_km: other,
                }),
            }
        })
        .collect();

    candidates.sort_by(|a, b| match (a.pickup_distance_km, b.pickup_distance_km) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Serialize)]
    struct Stub {
        name: &'static str,
        pickup: Option<GeoPoint>,
    }

    fn driver() -> GeoPoint {
        GeoPoint::new(36.8219, -1.2921)
    }

    #[test]
    fn sorts_ascending_by_pickup_distance() {
        let items = vec![
            Stub {
                name: "far",
                pickup: Some(GeoPoint::new(36.95, -1.35)),
            },
            Stub {
                name: "near",
                pickup: Some(GeoPoint::new(36.825, -1.293)),
            },
        ];
        let ranked = rank_candidates(items, driver(), 50.0, |s| s.pickup);
        assert_eq!(ranked[0].item.name, "near");
        assert_eq!(ranked[1].item.name, "far");
        assert!(ranked[0].pickup_distance_km.unwrap() < ranked[1].pickup_distance_km.unwrap());
    }

    #[test]
    fn drops_items_beyond_max_distance() {
        let items = vec![
            Stub {
                name: "mombasa",
                pickup: Some(GeoPoint::new(39.6682, -4.0435)),
            },
            Stub {
                name: "near",
                pickup: Some(GeoPoint::new(36.825, -1.293)),
            },
        ];
        let ranked = rank_candidates(items, driver(), 10.0, |s| s.pickup);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].item.name, "near");
    }

    #[test]
    fn ungeocoded_items_are_kept_and_sort_last() {
        let items = vec![
            Stub {
                name: "unknown",
                pickup: None,
            },
            Stub {
                name: "near",
                pickup: Some(GeoPoint::new(36.825, -1.293)),
            },
        ];
        let ranked = rank_candidates(items, driver(), 10.0, |s| s.pickup);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].item.name, "near");
        assert_eq!(ranked[1].item.name, "unknown");
        assert!(ranked[1].pickup_distance_km.is_none());
    }
}
