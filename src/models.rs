use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Staff,
    Supplier,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Supplier => "supplier",
            Role::Customer => "customer",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            "supplier" => Ok(Role::Supplier),
            "customer" => Ok(Role::Customer),
            other => Err(AppError::BadRequest(format!("Invalid role: {other}"))),
        }
    }
}

pub const TRACKING_STATUSES: [&str; 6] = [
    "created",
    "in_transit",
    "in_warehouse",
    "in_store",
    "delivered",
    "returned",
];

pub const TX_STATUSES: [&str; 3] = ["pending", "confirmed", "failed"];

pub const TX_ACTIONS: [&str; 4] = ["create", "transfer", "update", "verify"];

pub const PRODUCT_CATEGORIES: [&str; 5] = ["Electronics", "Food", "Clothing", "Home", "Health"];

pub const CERTIFICATION_LEVELS: [&str; 4] = ["Bronze", "Silver", "Gold", "Platinum"];

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub supplier_id: Option<Uuid>,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub blockchain_address: Option<String>,
    pub sustainability_score: f64,
    pub performance_rating: f64,
    pub on_time_delivery: f64,
    pub quality_score: f64,
    pub cost_efficiency: f64,
    pub verified: bool,
    pub certification_level: String,
    #[schema(value_type = Vec<String>)]
    pub specialties: Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub supplier_id: Uuid,
    pub sku: String,
    pub description: Option<String>,
    pub price: f64,
    pub weight: Option<f64>,
    #[schema(value_type = Option<Object>)]
    pub dimensions: Option<Value>,
    pub sustainability_score: f64,
    pub carbon_footprint: f64,
    pub blockchain_hash: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct TrackingEvent {
    pub id: Uuid,
    pub product_id: Uuid,
    pub location: String,
    pub status: String,
    pub description: String,
    #[schema(value_type = Option<Object>)]
    pub coordinates: Option<Value>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub blockchain_tx_hash: Option<String>,
    pub scanned_by: Option<Uuid>,
    #[schema(value_type = Option<Object>)]
    pub device_info: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct BlockchainTransaction {
    pub id: Uuid,
    pub transaction_hash: String,
    pub block_number: Option<i64>,
    pub product_id: Uuid,
    pub action: String,
    pub from_address: String,
    pub to_address: String,
    pub gas_used: i64,
    pub gas_price: String,
    pub status: String,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct QrScanLog {
    pub id: Uuid,
    pub product_id: Uuid,
    pub scanned_by: Option<Uuid>,
    pub scan_location: String,
    #[schema(value_type = Option<Object>)]
    pub coordinates: Option<Value>,
    #[schema(value_type = Object)]
    pub device_info: Value,
    pub scan_result: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct InventoryRecord {
    pub id: Uuid,
    pub product_id: Uuid,
    pub store_location: String,
    pub quantity: i32,
    pub reserved_quantity: i32,
    pub reorder_point: i32,
    pub max_stock: i32,
    pub last_restocked: DateTime<Utc>,
    pub batch_number: Option<String>,
    pub last_updated: DateTime<Utc>,
}

/// Mock ledger hash: `0x` + 64 hex chars, assembled from two v4 UUIDs.
pub fn mock_transaction_hash() -> String {
    format!(
        "0x{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    )
}

/// Coarse device classification from a User-Agent header, mirroring what the
/// scanner frontend reports.
pub fn device_type_from_user_agent(user_agent: &str) -> &'static str {
    if user_agent.contains("Tablet") || user_agent.contains("iPad") {
        "tablet"
    } else if user_agent.contains("Mobile") {
        "mobile"
    } else {
        "desktop"
    }
}
