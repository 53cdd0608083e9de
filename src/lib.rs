pub mod config;
pub mod currency;
pub mod domain {
    pub mod api;
    pub mod cart;
}
pub mod engine;
pub mod http {
    pub mod handlers {
        pub mod carts;
        pub mod ops;
        pub mod payment_sessions;
        pub mod providers;
        pub mod webhooks;
    }
    pub mod middleware {
        pub mod store_auth;
    }
}
pub mod pricing;
pub mod provider;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;

#[derive(Clone)]
pub struct AppState {
    pub providers: provider::ProviderRegistry,
    pub engine: engine::EngineClient,
    pub pricing: pricing::PricingClient,
}

pub fn app(state: AppState, store_publishable_key: String) -> Router {
    let store_routes = Router::new()
        .route(
            "/store/carts/:cart_id/line-items-calculated-price",
            post(http::handlers::carts::add_line_items_with_calculated_price),
        )
        .layer(from_fn_with_state(
            store_publishable_key,
            http::middleware::store_auth::require_publishable_key,
        ));

    Router::new()
        .route(
            "/sessions",
            post(http::handlers::payment_sessions::initiate_session)
                .delete(http::handlers::payment_sessions::delete_session),
        )
        .route(
            "/sessions/retrieve",
            post(http::handlers::payment_sessions::retrieve_session),
        )
        .route(
            "/sessions/authorize",
            post(http::handlers::payment_sessions::authorize_session),
        )
        .route(
            "/sessions/update",
            post(http::handlers::payment_sessions::update_session),
        )
        .route(
            "/sessions/capture",
            post(http::handlers::payment_sessions::capture_session),
        )
        .route(
            "/sessions/refund",
            post(http::handlers::payment_sessions::refund_session),
        )
        .route(
            "/sessions/cancel",
            post(http::handlers::payment_sessions::cancel_session),
        )
        .route(
            "/hooks/payment/:provider_id",
            post(http::handlers::webhooks::receive),
        )
        .route("/providers", get(http::handlers::providers::list_providers))
        .route("/ops/liveness", get(http::handlers::ops::liveness))
        .route("/ops/readiness", get(http::handlers::ops::readiness))
        .merge(store_routes)
        .with_state(state)
}
