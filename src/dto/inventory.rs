use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::InventoryRecord;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertInventoryRequest {
    pub product_id: Uuid,
    pub store_location: String,
    pub quantity: i32,
    pub reserved_quantity: Option<i32>,
    pub reorder_point: Option<i32>,
    pub max_stock: Option<i32>,
    pub batch_number: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustInventoryRequest {
    pub delta: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryList {
    pub records: Vec<InventoryRecord>,
}
