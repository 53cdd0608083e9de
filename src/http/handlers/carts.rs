use crate::domain::api::ErrorEnvelope;
use crate::domain::cart::AddItemsRequest;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub async fn add_line_items_with_calculated_price(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
    Json(req): Json<AddItemsRequest>,
) -> impl IntoResponse {
    if req.items.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorEnvelope::new(
                "EMPTY_ITEMS",
                "at least one item is required",
            )),
        )
            .into_response();
    }

    let priced = match state.pricing.quote(&req.items).await {
        Ok(priced) => priced,
        Err(e) => return upstream_failure("PRICING_UNAVAILABLE", e),
    };

    if let Err(e) = state.engine.add_line_items(&cart_id, &priced).await {
        return upstream_failure("ENGINE_UNAVAILABLE", e);
    }

    match state.engine.fetch_cart(&cart_id).await {
        Ok(cart) => (StatusCode::OK, Json(serde_json::json!({ "cart": cart }))).into_response(),
        Err(e) => upstream_failure("ENGINE_UNAVAILABLE", e),
    }
}

fn upstream_failure(code: &str, e: anyhow::Error) -> Response {
    tracing::warn!(code, "cart pricing call failed: {:#}", e);
    (
        StatusCode::BAD_GATEWAY,
        Json(ErrorEnvelope::new(code, &e.to_string())),
    )
        .into_response()
}
