use serde_json::{json, Value};
use std::sync::Arc;
use storefront_payments::engine::EngineClient;
use storefront_payments::pricing::PricingClient;
use storefront_payments::provider::mock::MockProvider;
use storefront_payments::provider::{PaymentProvider, ProviderRegistry};
use storefront_payments::AppState;

const STORE_KEY: &str = "pk_test_123";

#[tokio::test]
async fn session_lifecycle_over_http_with_mock_provider() {
    let base = spawn_app(MockProvider::default()).await;
    let client = reqwest::Client::new();

    let session: Value = client
        .post(format!("{}/sessions", base))
        .json(&json!({
            "provider_id": "mock",
            "amount": "25.99",
            "currency_code": "usd",
            "context": {
                "session_id": "ps_http_1",
                "cart": {
                    "id": "cart_http_1",
                    "shipping_address": {"country_code": "US"}
                }
            }
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let data = session["data"].clone();
    assert_eq!(data["amount"]["value"], 2599);
    assert_eq!(data["reference"], "ps_http_1");

    let authorized: Value = client
        .post(format!("{}/sessions/authorize", base))
        .json(&json!({
            "provider_id": "mock",
            "data": data,
            "context": {"session_id": "ps_http_1"}
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(authorized["status"], "AUTHORIZED");

    let updated: Value = post_data(&client, &base, "/sessions/update", &authorized["data"]).await;
    assert_eq!(updated["status"], "PENDING");
    assert_eq!(updated["data"], authorized["data"]);

    let retrieved: Value = post_data(&client, &base, "/sessions/retrieve", &authorized["data"]).await;
    assert_eq!(retrieved["data"], authorized["data"]);

    let captured: Value = post_data(&client, &base, "/sessions/capture", &authorized["data"]).await;
    assert_eq!(captured["data"]["status"], "captured");

    let refunded: Value = client
        .post(format!("{}/sessions/refund", base))
        .json(&json!({"provider_id": "mock", "data": captured["data"], "amount": 1000}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(refunded["data"]["refunded_minor"], 1000);

    let deleted: Value = client
        .delete(format!("{}/sessions", base))
        .json(&json!({"provider_id": "mock", "data": refunded["data"]}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(deleted["data"]["status"], "canceled");
}

#[tokio::test]
async fn declined_authorization_is_a_status_not_an_error() {
    let base = spawn_app(MockProvider::new("DECLINE")).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/sessions/authorize", base))
        .json(&json!({"provider_id": "mock", "data": {"id": "s1"}}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ERROR");
}

#[tokio::test]
async fn provider_error_maps_to_422_with_normalized_body() {
    let base = spawn_app(MockProvider::new("REFUSE_MODIFICATIONS")).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/sessions/capture", base))
        .json(&json!({"provider_id": "mock", "data": {"id": "s1"}}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "failed to capture mock payment");
    assert_eq!(body["code"], "MOCK_REFUSED");
    assert!(body["detail"].as_str().is_some());
}

#[tokio::test]
async fn unknown_provider_maps_to_404_envelope() {
    let base = spawn_app(MockProvider::default()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/sessions/capture", base))
        .json(&json!({"provider_id": "stripe", "data": {}}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "UNKNOWN_PROVIDER");
}

#[tokio::test]
async fn webhook_route_classifies_events() {
    let base = spawn_app(MockProvider::default()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/hooks/payment/mock", base))
        .body(r#"{"event": "payment.refunded", "session_id": "ps_7", "amount": 250}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["action"], "REFUNDED");
    assert_eq!(body["data"]["session_id"], "ps_7");
    assert_eq!(body["data"]["amount"], 250);

    let response = client
        .post(format!("{}/hooks/payment/unknown", base))
        .body("{}")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn providers_and_ops_endpoints_respond() {
    let base = spawn_app(MockProvider::default()).await;
    let client = reqwest::Client::new();

    let body: Value = client
        .get(format!("{}/providers", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["providers"], json!(["mock"]));

    let live: Value = client
        .get(format!("{}/ops/liveness", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(live["alive"], true);

    let ready = client
        .get(format!("{}/ops/readiness", base))
        .send()
        .await
        .unwrap();
    assert_eq!(ready.status(), 200);
    let ready: Value = ready.json().await.unwrap();
    assert_eq!(ready["ready"], true);
}

async fn post_data(client: &reqwest::Client, base: &str, path: &str, data: &Value) -> Value {
    client
        .post(format!("{}{}", base, path))
        .json(&json!({"provider_id": "mock", "data": data}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn spawn_app(provider: MockProvider) -> String {
    let mut providers = ProviderRegistry::new();
    providers.register(Arc::new(provider) as Arc<dyn PaymentProvider>);

    let client = reqwest::Client::new();
    let state = AppState {
        providers,
        engine: EngineClient {
            base_url: "http://localhost:9000".to_string(),
            publishable_key: STORE_KEY.to_string(),
            timeout_ms: 500,
            client: client.clone(),
        },
        pricing: PricingClient {
            base_url: "http://localhost:4700".to_string(),
            timeout_ms: 500,
            client,
        },
    };

    let app = storefront_payments::app(state, STORE_KEY.to_string());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}
