pub mod point;
pub mod resolver;
pub mod routing;

pub use point::{haversine_km, GeoPoint};
pub use resolver::{DistanceResolver, ResolvedRoute};
pub use routing::{RoutingClient, RoutingError};
