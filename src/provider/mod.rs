use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

pub mod adyen;
pub mod mock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentSessionStatus {
    Pending,
    Authorized,
    Captured,
    Canceled,
    RequiresMore,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub currency: String,
    pub value: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    pub country_code: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartContext {
    pub id: Option<String>,
    pub email: Option<String>,
    pub shipping_address: Option<Address>,
    pub billing_address: Option<Address>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentContext {
    pub session_id: String,
    #[serde(default)]
    pub cart: CartContext,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiatePaymentInput {
    pub amount: Decimal,
    pub currency_code: String,
    pub context: PaymentContext,
}

pub type SessionData = serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub data: SessionData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizeResult {
    pub status: PaymentSessionStatus,
    pub data: SessionData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderError {
    pub error: String,
    pub code: String,
    pub detail: String,
}

impl ProviderError {
    pub fn new(
        error: impl Into<String>,
        code: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            detail: detail.into(),
        }
    }

    pub fn without_code(error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(error, "", detail)
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.code.is_empty() {
            write!(f, "{}: {}", self.error, self.detail)
        } else {
            write!(f, "{} [{}]: {}", self.error, self.code, self.detail)
        }
    }
}

impl std::error::Error for ProviderError {}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WebhookAction {
    NotSupported,
    Authorized,
    Captured,
    Refunded,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEventData {
    pub session_id: String,
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookActionResult {
    pub action: WebhookAction,
    pub data: Option<WebhookEventData>,
}

impl WebhookActionResult {
    pub fn not_supported() -> Self {
        Self {
            action: WebhookAction::NotSupported,
            data: None,
        }
    }
}

#[async_trait::async_trait]
pub trait PaymentProvider: Send + Sync {
    fn id(&self) -> &'static str;

    async fn initiate(&self, input: &InitiatePaymentInput) -> ProviderResult<SessionResponse>;

    async fn retrieve(&self, data: &SessionData) -> ProviderResult<SessionData>;

    async fn authorize(
        &self,
        data: &SessionData,
        context: &PaymentContext,
    ) -> ProviderResult<AuthorizeResult>;

    async fn update(&self, data: &SessionData) -> ProviderResult<AuthorizeResult>;

    async fn capture(&self, data: &SessionData) -> ProviderResult<SessionData>;

    async fn refund(&self, data: &SessionData, refund_minor: i64) -> ProviderResult<SessionData>;

    async fn cancel(&self, data: &SessionData) -> ProviderResult<SessionData>;

    async fn delete(&self, data: &SessionData) -> ProviderResult<SessionData> {
        self.cancel(data).await
    }

    async fn webhook_action(&self, payload: &[u8]) -> WebhookActionResult;
}

#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn PaymentProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Arc<dyn PaymentProvider>) {
        self.providers.insert(provider.id().to_string(), provider);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn PaymentProvider>> {
        self.providers.get(id).cloned()
    }

    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.providers.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
