use crate::domain::api::{
    AuthorizeSessionRequest, ErrorEnvelope, InitiateSessionRequest, RefundSessionRequest,
    SessionDataRequest,
};
use crate::provider::{InitiatePaymentInput, ProviderError, SessionResponse};
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub async fn initiate_session(
    State(state): State<AppState>,
    Json(req): Json<InitiateSessionRequest>,
) -> impl IntoResponse {
    let Some(provider) = state.providers.get(&req.provider_id) else {
        return unknown_provider(&req.provider_id);
    };
    let input = InitiatePaymentInput {
        amount: req.amount,
        currency_code: req.currency_code,
        context: req.context,
    };
    match provider.initiate(&input).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(e) => provider_failure("initiate", &req.provider_id, e),
    }
}

pub async fn retrieve_session(
    State(state): State<AppState>,
    Json(req): Json<SessionDataRequest>,
) -> impl IntoResponse {
    let Some(provider) = state.providers.get(&req.provider_id) else {
        return unknown_provider(&req.provider_id);
    };
    match provider.retrieve(&req.data).await {
        Ok(data) => (StatusCode::OK, Json(SessionResponse { data })).into_response(),
        Err(e) => provider_failure("retrieve", &req.provider_id, e),
    }
}

pub async fn authorize_session(
    State(state): State<AppState>,
    Json(req): Json<AuthorizeSessionRequest>,
) -> impl IntoResponse {
    let Some(provider) = state.providers.get(&req.provider_id) else {
        return unknown_provider(&req.provider_id);
    };
    match provider.authorize(&req.data, &req.context).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => provider_failure("authorize", &req.provider_id, e),
    }
}

pub async fn update_session(
    State(state): State<AppState>,
    Json(req): Json<SessionDataRequest>,
) -> impl IntoResponse {
    let Some(provider) = state.providers.get(&req.provider_id) else {
        return unknown_provider(&req.provider_id);
    };
    match provider.update(&req.data).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => provider_failure("update", &req.provider_id, e),
    }
}

pub async fn capture_session(
    State(state): State<AppState>,
    Json(req): Json<SessionDataRequest>,
) -> impl IntoResponse {
    let Some(provider) = state.providers.get(&req.provider_id) else {
        return unknown_provider(&req.provider_id);
    };
    match provider.capture(&req.data).await {
        Ok(data) => (StatusCode::OK, Json(SessionResponse { data })).into_response(),
        Err(e) => provider_failure("capture", &req.provider_id, e),
    }
}

pub async fn refund_session(
    State(state): State<AppState>,
    Json(req): Json<RefundSessionRequest>,
) -> impl IntoResponse {
    let Some(provider) = state.providers.get(&req.provider_id) else {
        return unknown_provider(&req.provider_id);
    };
    match provider.refund(&req.data, req.amount).await {
        Ok(data) => (StatusCode::OK, Json(SessionResponse { data })).into_response(),
        Err(e) => provider_failure("refund", &req.provider_id, e),
    }
}

pub async fn cancel_session(
    State(state): State<AppState>,
    Json(req): Json<SessionDataRequest>,
) -> impl IntoResponse {
    let Some(provider) = state.providers.get(&req.provider_id) else {
        return unknown_provider(&req.provider_id);
    };
    match provider.cancel(&req.data).await {
        Ok(data) => (StatusCode::OK, Json(SessionResponse { data })).into_response(),
        Err(e) => provider_failure("cancel", &req.provider_id, e),
    }
}

pub async fn delete_session(
    State(state): State<AppState>,
    Json(req): Json<SessionDataRequest>,
) -> impl IntoResponse {
    let Some(provider) = state.providers.get(&req.provider_id) else {
        return unknown_provider(&req.provider_id);
    };
    match provider.delete(&req.data).await {
        Ok(data) => (StatusCode::OK, Json(SessionResponse { data })).into_response(),
        Err(e) => provider_failure("delete", &req.provider_id, e),
    }
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

fn provider_failure(op: &str, provider_id: &str, e: ProviderError) -> Response {
    tracing::warn!(
        provider = provider_id,
        op,
        code = %e.code,
        "payment operation failed: {}",
        e.detail
    );
    (StatusCode::UNPROCESSABLE_ENTITY, Json(e)).into_response()
}
