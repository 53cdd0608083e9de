use crate::domain::cart::{CartItemInput, PricedLineItem};
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone)]
pub struct PricingClient {
    pub base_url: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

#[derive(Serialize)]
struct QuoteRequest<'a> {
    items: &'a [CartItemInput],
}

#[derive(Deserialize)]
struct QuoteResponse {
    prices: Vec<QuotedPrice>,
}

#[derive(Deserialize)]
struct QuotedPrice {
    variant_id: String,
    unit_price: i64,
}

impl PricingClient {
    pub async fn quote(&self, items: &[CartItemInput]) -> Result<Vec<PricedLineItem>> {
        let response = self
            .client
            .post(format!("{}/quotes", self.base_url))
            .json(&QuoteRequest { items })
            .timeout(Duration::from_millis(self.timeout_ms))
            .send()
            .await
            .context("pricing service unreachable")?;
        if !response.status().is_success() {
            bail!("pricing service returned {}", response.status());
        }
        let quoted: QuoteResponse = response
            .json()
            .await
            .context("unreadable pricing response")?;

        let mut priced = Vec::with_capacity(items.len());
        for item in items {
            let unit_price = quoted
                .prices
                .iter()
                .find(|price| price.variant_id == item.variant_id)
                .map(|price| price.unit_price)
                .ok_or_else(|| anyhow!("no price quoted for variant {}", item.variant_id))?;
            priced.push(PricedLineItem {
                variant_id: item.variant_id.clone(),
                quantity: item.quantity,
                unit_price,
            });
        }
        Ok(priced)
    }
}
