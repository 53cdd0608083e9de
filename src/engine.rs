use crate::domain::cart::PricedLineItem;
use anyhow::{bail, Context, Result};
use std::time::Duration;

#[derive(Clone)]
pub struct EngineClient {
    pub base_url: String,
    pub publishable_key: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

impl EngineClient {
    pub async fn add_line_items(&self, cart_id: &str, items: &[PricedLineItem]) -> Result<()> {
        let response = self
            .client
            .post(format!(
                "{}/store/carts/{}/line-items/batch",
                self.base_url, cart_id
            ))
            .header("x-publishable-api-key", &self.publishable_key)
            .json(&serde_json::json!({ "items": items }))
            .timeout(Duration::from_millis(self.timeout_ms))
            .send()
            .await
            .context("commerce engine unreachable")?;
        if !response.status().is_success() {
            bail!(
                "commerce engine returned {} adding line items",
                response.status()
            );
        }
        Ok(())
    }

    pub async fn fetch_cart(&self, cart_id: &str) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(format!("{}/store/carts/{}", self.base_url, cart_id))
            .header("x-publishable-api-key", &self.publishable_key)
            .timeout(Duration::from_millis(self.timeout_ms))
            .send()
            .await
            .context("commerce engine unreachable")?;
        if !response.status().is_success() {
            bail!(
                "commerce engine returned {} fetching cart",
                response.status()
            );
        }
        let body: serde_json::Value = response.json().await.context("unreadable engine response")?;
        Ok(body.get("cart").cloned().unwrap_or(body))
    }
}
