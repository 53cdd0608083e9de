use crate::currency;
use crate::provider::{
    Amount, AuthorizeResult, InitiatePaymentInput, PaymentContext, PaymentProvider,
    PaymentSessionStatus, ProviderError, ProviderResult, SessionData, SessionResponse,
    WebhookActionResult,
};
use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const TEST_CHECKOUT_URL: &str = "https://checkout-test.adyen.com/v71";

pub const SESSION_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdyenEnvironment {
    Test,
    Live,
}

impl AdyenEnvironment {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "test" => Ok(Self::Test),
            "live" => Ok(Self::Live),
            other => bail!("unknown Adyen environment '{}', expected test or live", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdyenOptions {
    pub api_key: String,
    pub merchant_account: String,
    pub return_url: String,
    pub environment: AdyenEnvironment,
    pub live_endpoint_prefix: Option<String>,
    pub endpoint_override: Option<String>,
    pub timeout_ms: u64,
}

impl AdyenOptions {
    pub fn from_env(timeout_ms: u64) -> Result<Self> {
        let environment = AdyenEnvironment::parse(
            &std::env::var("ADYEN_ENVIRONMENT").unwrap_or_else(|_| "test".to_string()),
        )?;
        Ok(Self {
            api_key: std::env::var("ADYEN_API_KEY").unwrap_or_default(),
            merchant_account: std::env::var("ADYEN_MERCHANT_ACCOUNT").unwrap_or_default(),
            return_url: std::env::var("ADYEN_RETURN_URL").unwrap_or_default(),
            environment,
            live_endpoint_prefix: std::env::var("ADYEN_LIVE_ENDPOINT_PREFIX").ok(),
            endpoint_override: std::env::var("ADYEN_ENDPOINT_OVERRIDE").ok(),
            timeout_ms,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            bail!("Adyen API key is missing; set ADYEN_API_KEY");
        }
        if self.merchant_account.trim().is_empty() {
            bail!("Adyen merchant account is missing; set ADYEN_MERCHANT_ACCOUNT");
        }
        if self.return_url.trim().is_empty() {
            bail!("Adyen return URL is missing; set ADYEN_RETURN_URL");
        }
        Ok(())
    }

    fn base_url(&self) -> Result<String> {
        if let Some(url) = &self.endpoint_override {
            return Ok(url.trim_end_matches('/').to_string());
        }
        match self.environment {
            AdyenEnvironment::Test => Ok(TEST_CHECKOUT_URL.to_string()),
            AdyenEnvironment::Live => {
                let prefix = self
                    .live_endpoint_prefix
                    .as_deref()
                    .filter(|p| !p.trim().is_empty())
                    .ok_or_else(|| {
                        anyhow!("Adyen live environment needs ADYEN_LIVE_ENDPOINT_PREFIX")
                    })?;
                Ok(format!(
                    "https://{}-checkout-live.adyenpayments.com/checkout/v71",
                    prefix
                ))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdyenSessionData {
    #[serde(default = "default_schema")]
    pub schema: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psp_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_schema() -> u32 {
    SESSION_SCHEMA_VERSION
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionRequest {
    reference: String,
    amount: Amount,
    merchant_account: String,
    country_code: String,
    return_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ModificationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<Amount>,
    merchant_account: String,
}

#[derive(Deserialize)]
struct AdyenApiError {
    #[serde(rename = "errorCode")]
    error_code: String,
    message: String,
}

#[derive(Debug)]
pub struct AdyenProvider {
    options: AdyenOptions,
    base_url: String,
    client: reqwest::Client,
}

impl AdyenProvider {
    pub fn new(options: AdyenOptions) -> Result<Self> {
        options.validate()?;
        let base_url = options.base_url()?;
        Ok(Self {
            options,
            base_url,
            client: reqwest::Client::new(),
        })
    }

    async fn post_json<T: Serialize>(
        &self,
        path: &str,
        body: &T,
        summary: &str,
    ) -> ProviderResult<serde_json::Value> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header("x-api-key", &self.options.api_key)
            .json(body)
            .timeout(Duration::from_millis(self.options.timeout_ms))
            .send()
            .await;
        unpack(response, summary).await
    }

    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, &str)],
        summary: &str,
    ) -> ProviderResult<serde_json::Value> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header("x-api-key", &self.options.api_key)
            .query(query)
            .timeout(Duration::from_millis(self.options.timeout_ms))
            .send()
            .await;
        unpack(response, summary).await
    }

    async fn fetch_session(
        &self,
        data: &SessionData,
        summary: &str,
    ) -> ProviderResult<SessionData> {
        let record = decode_session(data, summary)?;
        let id = record
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ProviderError::without_code(summary, "session id missing from session data"))?;
        let session_result = record.session_result.as_deref().unwrap_or_default();
        self.get_json(
            &format!("/sessions/{}", id),
            &[("sessionResult", session_result)],
            summary,
        )
        .await
    }
}

#[async_trait::async_trait]
impl PaymentProvider for AdyenProvider {
    fn id(&self) -> &'static str {
        "adyen"
    }

    async fn initiate(&self, input: &InitiatePaymentInput) -> ProviderResult<SessionResponse> {
        let country_code = input
            .context
            .cart
            .shipping_address
            .as_ref()
            .and_then(|address| address.country_code.as_deref())
            .filter(|code| !code.is_empty());
        let Some(country_code) = country_code else {
            return Err(ProviderError::new(
                "No shipping address found on cart",
                "NoShippingAddress",
                "a shipping country is required to create an Adyen checkout session",
            ));
        };

        let summary = "failed to initiate Adyen session";
        let value = currency::to_minor_units(input.amount, &input.currency_code)
            .map_err(|e| ProviderError::without_code(summary, e.to_string()))?;
        let request = CreateSessionRequest {
            reference: input.context.session_id.clone(),
            amount: Amount {
                currency: input.currency_code.to_uppercase(),
                value,
            },
            merchant_account: self.options.merchant_account.clone(),
            country_code: country_code.to_uppercase(),
            return_url: self.options.return_url.clone(),
        };

        let response = self.post_json("/sessions", &request, summary).await?;
        let mut record = decode_value(response, summary)?;
        record.schema = SESSION_SCHEMA_VERSION;
        Ok(SessionResponse {
            data: encode_session(&record, summary)?,
        })
    }

    async fn retrieve(&self, data: &SessionData) -> ProviderResult<SessionData> {
        self.fetch_session(data, "failed to retrieve Adyen session").await
    }

    async fn authorize(
        &self,
        data: &SessionData,
        _context: &PaymentContext,
    ) -> ProviderResult<AuthorizeResult> {
        let fetched = self
            .fetch_session(data, "failed to authorize Adyen payment")
            .await?;
        Ok(AuthorizeResult {
            status: derive_status(&fetched),
            data: data.clone(),
        })
    }

    async fn update(&self, data: &SessionData) -> ProviderResult<AuthorizeResult> {
        let fetched = self
            .fetch_session(data, "failed to update Adyen payment")
            .await?;
        Ok(AuthorizeResult {
            status: derive_status(&fetched),
            data: data.clone(),
        })
    }

    async fn capture(&self, data: &SessionData) -> ProviderResult<SessionData> {
        let summary = "failed to capture Adyen payment";
        let record = decode_session(data, summary)?;
        let psp_reference = require_psp_reference(&record, summary)?;
        let amount = record
            .amount
            .clone()
            .ok_or_else(|| ProviderError::without_code(summary, "amount missing from session data"))?;
        let request = ModificationRequest {
            amount: Some(amount),
            merchant_account: self.options.merchant_account.clone(),
        };
        let response = self
            .post_json(
                &format!("/payments/{}/captures", psp_reference),
                &request,
                summary,
            )
            .await?;
        merge_modification(response, &psp_reference, summary)
    }

    async fn refund(&self, data: &SessionData, refund_minor: i64) -> ProviderResult<SessionData> {
        let summary = "failed to refund Adyen payment";
        let record = decode_session(data, summary)?;
        let psp_reference = require_psp_reference(&record, summary)?;
        let currency = record
            .amount
            .as_ref()
            .map(|amount| amount.currency.clone())
            .ok_or_else(|| ProviderError::without_code(summary, "amount missing from session data"))?;
        let request = ModificationRequest {
            amount: Some(Amount {
                currency,
                value: refund_minor,
            }),
            merchant_account: self.options.merchant_account.clone(),
        };
        let response = self
            .post_json(
                &format!("/payments/{}/refunds", psp_reference),
                &request,
                summary,
            )
            .await?;
        merge_modification(response, &psp_reference, summary)
    }

    async fn cancel(&self, data: &SessionData) -> ProviderResult<SessionData> {
        let summary = "failed to cancel Adyen payment";
        let record = decode_session(data, summary)?;
        let psp_reference = match record.psp_reference.as_deref().filter(|p| !p.is_empty()) {
            Some(p) => p.to_string(),
            None => return Ok(serde_json::json!({})),
        };
        let request = ModificationRequest {
            amount: None,
            merchant_account: self.options.merchant_account.clone(),
        };
        let response = self
            .post_json(
                &format!("/payments/{}/reversals", psp_reference),
                &request,
                summary,
            )
            .await?;
        merge_modification(response, &psp_reference, summary)
    }

    async fn webhook_action(&self, _payload: &[u8]) -> WebhookActionResult {
        WebhookActionResult::not_supported()
    }
}

async fn unpack(
    response: reqwest::Result<reqwest::Response>,
    summary: &str,
) -> ProviderResult<serde_json::Value> {
    match response {
        Ok(r) if r.status().is_success() => r
            .json()
            .await
            .map_err(|e| ProviderError::without_code(summary, format!("unreadable gateway response: {}", e))),
        Ok(r) => {
            let status = r.status();
            let body = r.text().await.unwrap_or_default();
            match serde_json::from_str::<AdyenApiError>(&body) {
                Ok(api) => Err(ProviderError::new(summary, api.error_code, api.message)),
                Err(_) => Err(ProviderError::new(
                    summary,
                    format!("HTTP_{}", status.as_u16()),
                    body.chars().take(200).collect::<String>(),
                )),
            }
        }
        Err(e) if e.is_timeout() => Err(ProviderError::without_code(summary, "gateway timeout")),
        Err(e) => Err(ProviderError::without_code(summary, e.to_string())),
    }
}

fn session_status(raw: &str) -> PaymentSessionStatus {
    match raw {
        "paymentPending" => PaymentSessionStatus::Pending,
        "canceled" => PaymentSessionStatus::Canceled,
        "completed" => PaymentSessionStatus::Authorized,
        "refused" => PaymentSessionStatus::Error,
        _ => PaymentSessionStatus::Pending,
    }
}

fn derive_status(fetched: &SessionData) -> PaymentSessionStatus {
    fetched
        .get("status")
        .and_then(|s| s.as_str())
        .map(session_status)
        .unwrap_or(PaymentSessionStatus::Pending)
}

fn decode_session(data: &SessionData, summary: &str) -> ProviderResult<AdyenSessionData> {
    decode_value(data.clone(), summary)
}

fn decode_value(value: serde_json::Value, summary: &str) -> ProviderResult<AdyenSessionData> {
    serde_json::from_value(value)
        .map_err(|e| ProviderError::without_code(summary, format!("malformed session payload: {}", e)))
}

fn encode_session(record: &AdyenSessionData, summary: &str) -> ProviderResult<SessionData> {
    serde_json::to_value(record).map_err(|e| ProviderError::without_code(summary, e.to_string()))
}

fn require_psp_reference(record: &AdyenSessionData, summary: &str) -> ProviderResult<String> {
    record
        .psp_reference
        .clone()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ProviderError::without_code(summary, "pspReference missing from session data"))
}

fn merge_modification(
    response: serde_json::Value,
    psp_reference: &str,
    summary: &str,
) -> ProviderResult<SessionData> {
    let mut record = decode_value(response, summary)?;
    record.psp_reference = Some(psp_reference.to_string());
    record.schema = SESSION_SCHEMA_VERSION;
    encode_session(&record, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Address, CartContext};
    use rust_decimal::Decimal;

    fn options_with_override(url: &str) -> AdyenOptions {
        AdyenOptions {
            api_key: "adyen-test-key".to_string(),
            merchant_account: "StorefrontECOM".to_string(),
            return_url: "https://shop.example.com/return".to_string(),
            environment: AdyenEnvironment::Test,
            live_endpoint_prefix: None,
            endpoint_override: Some(url.to_string()),
            timeout_ms: 500,
        }
    }

    fn initiate_input(shipping: Option<Address>) -> InitiatePaymentInput {
        InitiatePaymentInput {
            amount: Decimal::new(1000, 2),
            currency_code: "eur".to_string(),
            context: PaymentContext {
                session_id: "ps_123".to_string(),
                cart: CartContext {
                    id: Some("cart_123".to_string()),
                    email: Some("buyer@example.com".to_string()),
                    shipping_address: shipping,
                    billing_address: None,
                },
            },
        }
    }

    #[test]
    fn construction_rejects_missing_credentials() {
        let mut options = options_with_override("http://127.0.0.1:9");
        options.api_key = String::new();
        let err = AdyenProvider::new(options).unwrap_err();
        assert!(err.to_string().contains("ADYEN_API_KEY"));

        let mut options = options_with_override("http://127.0.0.1:9");
        options.merchant_account = "  ".to_string();
        let err = AdyenProvider::new(options).unwrap_err();
        assert!(err.to_string().contains("ADYEN_MERCHANT_ACCOUNT"));

        let mut options = options_with_override("http://127.0.0.1:9");
        options.return_url = String::new();
        let err = AdyenProvider::new(options).unwrap_err();
        assert!(err.to_string().contains("ADYEN_RETURN_URL"));
    }

    #[test]
    fn live_environment_needs_prefix_unless_overridden() {
        let mut options = options_with_override("ignored");
        options.environment = AdyenEnvironment::Live;
        options.endpoint_override = None;
        assert!(AdyenProvider::new(options).is_err());

        let mut options = options_with_override("ignored");
        options.environment = AdyenEnvironment::Live;
        options.endpoint_override = None;
        options.live_endpoint_prefix = Some("abc123-MyCompany".to_string());
        let provider = AdyenProvider::new(options).unwrap();
        assert_eq!(
            provider.base_url,
            "https://abc123-MyCompany-checkout-live.adyenpayments.com/checkout/v71"
        );
    }

    #[test]
    fn endpoint_override_wins_and_drops_trailing_slash() {
        let provider = AdyenProvider::new(options_with_override("http://127.0.0.1:4100/")).unwrap();
        assert_eq!(provider.base_url, "http://127.0.0.1:4100");
    }

    #[test]
    fn environment_parse_is_case_insensitive() {
        assert_eq!(AdyenEnvironment::parse("TEST").unwrap(), AdyenEnvironment::Test);
        assert_eq!(AdyenEnvironment::parse("Live").unwrap(), AdyenEnvironment::Live);
        assert!(AdyenEnvironment::parse("sandbox").is_err());
    }

    #[test]
    fn maps_gateway_session_statuses() {
        assert_eq!(session_status("paymentPending"), PaymentSessionStatus::Pending);
        assert_eq!(session_status("canceled"), PaymentSessionStatus::Canceled);
        assert_eq!(session_status("completed"), PaymentSessionStatus::Authorized);
        assert_eq!(session_status("refused"), PaymentSessionStatus::Error);
        assert_eq!(session_status("expired"), PaymentSessionStatus::Pending);
        assert_eq!(session_status(""), PaymentSessionStatus::Pending);
    }

    #[tokio::test]
    async fn initiate_without_shipping_country_never_reaches_gateway() {
        let provider = AdyenProvider::new(options_with_override("http://127.0.0.1:9")).unwrap();
        let err = provider.initiate(&initiate_input(None)).await.unwrap_err();
        assert_eq!(err.code, "NoShippingAddress");
        assert_eq!(err.error, "No shipping address found on cart");

        let empty_country = Address {
            country_code: Some(String::new()),
            ..Address::default()
        };
        let err = provider
            .initiate(&initiate_input(Some(empty_country)))
            .await
            .unwrap_err();
        assert_eq!(err.code, "NoShippingAddress");
    }

    #[tokio::test]
    async fn cancel_without_psp_reference_is_empty_success() {
        let provider = AdyenProvider::new(options_with_override("http://127.0.0.1:9")).unwrap();
        let data = serde_json::json!({"id": "CS_1", "sessionData": "blob"});
        let out = provider.cancel(&data).await.unwrap();
        assert_eq!(out, serde_json::json!({}));
    }

    #[tokio::test]
    async fn webhooks_are_not_supported() {
        use crate::provider::WebhookAction;

        let provider = AdyenProvider::new(options_with_override("http://127.0.0.1:9")).unwrap();
        let result = provider
            .webhook_action(br#"{"eventCode": "AUTHORISATION"}"#)
            .await;
        assert_eq!(result.action, WebhookAction::NotSupported);
        assert!(result.data.is_none());
    }

    #[test]
    fn session_record_preserves_unknown_fields() {
        let blob = serde_json::json!({
            "id": "CS_1",
            "pspReference": "PSP-1",
            "amount": {"currency": "EUR", "value": 1000},
            "checkoutSessionUrl": "https://checkout.example/CS_1",
            "mode": "embedded"
        });
        let record = decode_session(&blob, "test").unwrap();
        assert_eq!(record.psp_reference.as_deref(), Some("PSP-1"));
        assert_eq!(record.schema, SESSION_SCHEMA_VERSION);

        let out = encode_session(&record, "test").unwrap();
        assert_eq!(out["checkoutSessionUrl"], "https://checkout.example/CS_1");
        assert_eq!(out["mode"], "embedded");
        assert_eq!(out["schema"], SESSION_SCHEMA_VERSION);
        assert_eq!(out["amount"]["value"], 1000);
    }

    #[test]
    fn modification_merge_carries_payment_psp_reference() {
        let response = serde_json::json!({
            "status": "received",
            "pspReference": "MOD-99",
            "amount": {"currency": "EUR", "value": 1000}
        });
        let merged = merge_modification(response, "PSP-1", "test").unwrap();
        assert_eq!(merged["pspReference"], "PSP-1");
        assert_eq!(merged["status"], "received");
    }
}
