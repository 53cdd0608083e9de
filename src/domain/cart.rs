use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct AddItemsRequest {
    pub items: Vec<CartItemInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemInput {
    pub variant_id: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricedLineItem {
    pub variant_id: String,
    pub quantity: i64,
    pub unit_price: i64,
}
