use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

pub async fn list_providers(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({ "providers": state.providers.ids() }))
}
