use crate::provider::{PaymentContext, SessionData};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct InitiateSessionRequest {
    pub provider_id: String,
    pub amount: Decimal,
    pub currency_code: String,
    pub context: PaymentContext,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionDataRequest {
    pub provider_id: String,
    pub data: SessionData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizeSessionRequest {
    pub provider_id: String,
    pub data: SessionData,
    #[serde(default)]
    pub context: PaymentContext,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefundSessionRequest {
    pub provider_id: String,
    pub data: SessionData,
    pub amount: i64,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            error: ErrorPayload {
                code: code.to_string(),
                message: message.to_string(),
                details: None,
            },
        }
    }
}
