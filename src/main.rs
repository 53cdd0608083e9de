use std::sync::Arc;
use storefront_payments::config::AppConfig;
use storefront_payments::engine::EngineClient;
use storefront_payments::pricing::PricingClient;
use storefront_payments::provider::adyen::{AdyenOptions, AdyenProvider};
use storefront_payments::provider::mock::MockProvider;
use storefront_payments::provider::ProviderRegistry;
use storefront_payments::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let mut providers = ProviderRegistry::new();
    for id in cfg
        .payment_providers
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
    {
        match id {
            "mock" => providers.register(Arc::new(MockProvider::new(cfg.mock_behavior.clone()))),
            "adyen" => {
                let options = AdyenOptions::from_env(cfg.gateway_timeout_ms)?;
                providers.register(Arc::new(AdyenProvider::new(options)?));
            }
            other => anyhow::bail!("unknown payment provider '{}' in PAYMENT_PROVIDERS", other),
        }
    }
    tracing::info!(providers = ?providers.ids(), "payment providers registered");

    let client = reqwest::Client::new();
    let engine = EngineClient {
        base_url: cfg.engine_base_url.clone(),
        publishable_key: cfg.store_publishable_key.clone(),
        timeout_ms: cfg.gateway_timeout_ms,
        client: client.clone(),
    };
    let pricing = PricingClient {
        base_url: cfg.pricing_base_url.clone(),
        timeout_ms: cfg.gateway_timeout_ms,
        client,
    };

    let state = AppState {
        providers,
        engine,
        pricing,
    };
    let app = storefront_payments::app(state, cfg.store_publishable_key.clone());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
