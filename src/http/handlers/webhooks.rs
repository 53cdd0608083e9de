use crate::domain::api::ErrorEnvelope;
use crate::AppState;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub async fn receive(
    State(state): State<AppState>,
    Path(provider_id): Path<String>,
    body: Bytes,
) -> impl IntoResponse {
    let Some(provider) = state.providers.get(&provider_id) else {
        return unknown_provider(&provider_id);
    };
    let result = provider.webhook_action(&body).await;
    tracing::info!(
        provider = %provider_id,
        action = ?result.action,
        "classified payment webhook"
    );
    (StatusCode::OK, Json(result)).into_response()
}

fn unknown_provider(provider_id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorEnvelope::new(
            "UNKNOWN_PROVIDER",
            &format!("no payment provider registered as '{}'", provider_id),
        )),
    )
        .into_response()
}
