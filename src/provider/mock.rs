use crate::currency;
use crate::provider::{
    AuthorizeResult, InitiatePaymentInput, PaymentContext, PaymentProvider, PaymentSessionStatus,
    ProviderError, ProviderResult, SessionData, SessionResponse, WebhookAction,
    WebhookActionResult, WebhookEventData,
};
use serde::Deserialize;
use serde_json::json;

pub struct MockProvider {
    pub behavior: String,
}

impl MockProvider {
    pub fn new(behavior: impl Into<String>) -> Self {
        Self {
            behavior: behavior.into(),
        }
    }

    fn refuses_modifications(&self, summary: &str) -> Option<ProviderError> {
        if self.behavior == "REFUSE_MODIFICATIONS" {
            Some(ProviderError::new(
                summary,
                "MOCK_REFUSED",
                "mock gateway is refusing modifications",
            ))
        } else {
            None
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("APPROVE")
    }
}

#[derive(Deserialize)]
struct MockWebhookEvent {
    event: String,
    session_id: Option<String>,
    amount: Option<i64>,
}

#[async_trait::async_trait]
impl PaymentProvider for MockProvider {
    fn id(&self) -> &'static str {
        "mock"
    }

    async fn initiate(&self, input: &InitiatePaymentInput) -> ProviderResult<SessionResponse> {
        let value = currency::to_minor_units(input.amount, &input.currency_code).map_err(|e| {
            ProviderError::without_code("failed to initiate mock session", e.to_string())
        })?;
        let data = json!({
            "id": format!("mock_sess_{}", uuid::Uuid::new_v4()),
            "pspReference": format!("mock_psp_{}", uuid::Uuid::new_v4()),
            "reference": input.context.session_id,
            "amount": {"currency": input.currency_code.to_uppercase(), "value": value},
            "status": "paymentPending",
            "created_at": chrono::Utc::now().to_rfc3339(),
        });
        Ok(SessionResponse { data })
    }

    async fn retrieve(&self, data: &SessionData) -> ProviderResult<SessionData> {
        Ok(data.clone())
    }

    async fn authorize(
        &self,
        data: &SessionData,
        _context: &PaymentContext,
    ) -> ProviderResult<AuthorizeResult> {
        let (status, raw) = if self.behavior == "DECLINE" {
            (PaymentSessionStatus::Error, "refused")
        } else {
            (PaymentSessionStatus::Authorized, "completed")
        };
        Ok(AuthorizeResult {
            status,
            data: merged(data, &[("status", json!(raw))]),
        })
    }

    async fn update(&self, data: &SessionData) -> ProviderResult<AuthorizeResult> {
        let status = if self.behavior == "DECLINE" {
            PaymentSessionStatus::Error
        } else {
            PaymentSessionStatus::Pending
        };
        Ok(AuthorizeResult {
            status,
            data: data.clone(),
        })
    }

    async fn capture(&self, data: &SessionData) -> ProviderResult<SessionData> {
        if let Some(err) = self.refuses_modifications("failed to capture mock payment") {
            return Err(err);
        }
        Ok(merged(
            data,
            &[
                ("status", json!("captured")),
                ("captured_at", json!(chrono::Utc::now().to_rfc3339())),
            ],
        ))
    }

    async fn refund(&self, data: &SessionData, refund_minor: i64) -> ProviderResult<SessionData> {
        if let Some(err) = self.refuses_modifications("failed to refund mock payment") {
            return Err(err);
        }
        Ok(merged(
            data,
            &[
                ("status", json!("refunded")),
                ("refunded_minor", json!(refund_minor)),
            ],
        ))
    }

    async fn cancel(&self, data: &SessionData) -> ProviderResult<SessionData> {
        if let Some(err) = self.refuses_modifications("failed to cancel mock payment") {
            return Err(err);
        }
        Ok(merged(data, &[("status", json!("canceled"))]))
    }

    async fn webhook_action(&self, payload: &[u8]) -> WebhookActionResult {
        let Ok(event) = serde_json::from_slice::<MockWebhookEvent>(payload) else {
            return WebhookActionResult::not_supported();
        };
        let action = match event.event.as_str() {
            "payment.authorized" => WebhookAction::Authorized,
            "payment.captured" => WebhookAction::Captured,
            "payment.refunded" => WebhookAction::Refunded,
            "payment.failed" => WebhookAction::Failed,
            _ => return WebhookActionResult::not_supported(),
        };
        WebhookActionResult {
            action,
            data: event.session_id.map(|session_id| WebhookEventData {
                session_id,
                amount: event.amount.unwrap_or(0),
            }),
        }
    }
}

fn merged(data: &SessionData, fields: &[(&str, serde_json::Value)]) -> SessionData {
    let mut out = data.clone();
    if let Some(map) = out.as_object_mut() {
        for (key, value) in fields {
            map.insert((*key).to_string(), value.clone());
        }
    }
    out
}
