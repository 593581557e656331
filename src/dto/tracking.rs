use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::TrackingEvent;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTrackingEventRequest {
    pub product_id: Uuid,
    pub location: String,
    pub status: String,
    #[serde(default)]
    pub description: String,
    #[schema(value_type = Option<Object>)]
    pub coordinates: Option<Value>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub blockchain_tx_hash: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEventLocationRequest {
    pub location: String,
    #[schema(value_type = Option<Object>)]
    pub coordinates: Option<Value>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ScanRequest {
    pub product_id: Uuid,
    pub scan_location: String,
    #[schema(value_type = Option<Object>)]
    pub coordinates: Option<Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkEventsRequest {
    pub events: Vec<CreateTrackingEventRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkEventsResponse {
    pub created_events: Vec<TrackingEvent>,
    pub count: usize,
}

/// Event decorated with product/supplier/scanner names for feed views.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventWithNames {
    #[serde(flatten)]
    pub event: TrackingEvent,
    pub product_name: Option<String>,
    pub product_sku: Option<String>,
    pub product_category: Option<String>,
    pub supplier_name: Option<String>,
    pub scanned_by_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductEvents {
    pub product: crate::dto::products::ProductRef,
    pub events: Vec<EventWithNames>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LocationEvents {
    pub location: String,
    pub events: Vec<EventWithNames>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScannedProduct {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub supplier_name: String,
    pub sustainability_score: f64,
    pub price: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScanLogRef {
    pub id: Uuid,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScanResponse {
    pub product: ScannedProduct,
    pub latest_tracking: Option<TrackingEvent>,
    pub scan_log: ScanLogRef,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeviceBreakdown {
    pub mobile: i64,
    pub tablet: i64,
    pub desktop: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopScannedProduct {
    pub product_name: String,
    pub sku: String,
    pub scan_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScanStats {
    pub timeframe: String,
    pub total_scans: i64,
    pub unique_products_scanned: i64,
    pub unique_scanners: i64,
    pub successful_scans: i64,
    pub success_rate: f64,
    pub device_breakdown: DeviceBreakdown,
    pub top_products: Vec<TopScannedProduct>,
}
