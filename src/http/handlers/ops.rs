use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let providers_ok = !state.providers.is_empty();
    let engine_ok = !state.engine.base_url.is_empty();
    let pricing_ok = !state.pricing.base_url.is_empty();

    let ok = providers_ok && engine_ok && pricing_ok;
    let status = if ok {
        axum::http::StatusCode::OK
    } else {
        axum::http::StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "ready": ok,
            "providers": providers_ok,
            "engine": engine_ok,
            "pricing": pricing_ok
        })),
    )
        .into_response()
}

pub async fn liveness() -> impl IntoResponse {
    (axum::http::StatusCode::OK, Json(serde_json::json!({"alive": true}))).into_response()
}
