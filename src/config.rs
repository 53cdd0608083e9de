#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub engine_base_url: String,
    pub pricing_base_url: String,
    pub store_publishable_key: String,
    pub payment_providers: String,
    pub mock_behavior: String,
    pub gateway_timeout_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:4100".to_string()),
            engine_base_url: std::env::var("ENGINE_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:9000".to_string()),
            pricing_base_url: std::env::var("PRICING_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:4700".to_string()),
            store_publishable_key: std::env::var("STORE_PUBLISHABLE_KEY")
                .unwrap_or_else(|_| "dev-publishable-key".to_string()),
            payment_providers: std::env::var("PAYMENT_PROVIDERS")
                .unwrap_or_else(|_| "mock".to_string()),
            mock_behavior: std::env::var("MOCK_BEHAVIOR").unwrap_or_else(|_| "APPROVE".to_string()),
            gateway_timeout_ms: std::env::var("GATEWAY_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(2500),
        }
    }
}
