use axum::{
    http::Method,
    routing::{get, patch, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod drivers;
pub mod error;
pub mod middleware;
pub mod orders;
pub mod pricing;
pub mod relocations;
pub mod state;
pub mod worker;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    let protected = Router::new()
        .route("/v1/orders", post(orders::create_order))
        .route("/v1/orders/estimate", post(orders::estimate_order))
        .route("/v1/orders/my", get(orders::my_orders))
        .route("/v1/orders/{id}", get(orders::get_order))
        .route("/v1/orders/{id}/assign", patch(orders::assign_order))
        .route("/v1/orders/{id}/status", patch(orders::update_order_status))
        .route("/v1/relocations", post(relocations::create_relocation))
        .route(
            "/v1/relocations/estimate",
            post(relocations::estimate_relocation),
        )
        .route("/v1/relocations/my", get(relocations::my_relocations))
        .route(
            "/v1/relocations/{id}",
            get(relocations::get_relocation).delete(relocations::cancel_relocation_request),
        )
        .route(
            "/v1/relocations/{id}/assign",
            patch(relocations::assign_relocation),
        )
        .route(
            "/v1/relocations/{id}/status",
            patch(relocations::update_relocation_status),
        )
        .route("/v1/drivers/status", patch(drivers::update_online_status))
        .route("/v1/drivers/location", patch(drivers::update_location))
        .route("/v1/drivers/nearby-orders", get(drivers::nearby_orders))
        .route(
            "/v1/drivers/nearby-relocations",
            get(drivers::nearby_relocations),
        )
        .route("/v1/admin/pricing", get(pricing::get_pricing))
        .route("/v1/admin/pricing", put(pricing::update_pricing))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/v1/pricing", get(pricing::public_pricing))
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
