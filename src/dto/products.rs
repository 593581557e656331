use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub category: String,
    pub sku: String,
    pub description: Option<String>,
    pub price: f64,
    pub weight: Option<f64>,
    #[schema(value_type = Option<Object>)]
    pub dimensions: Option<Value>,
    pub sustainability_score: f64,
    pub carbon_footprint: f64,
    /// Ignored for supplier users, who are pinned to their own supplier id.
    pub supplier_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub weight: Option<f64>,
    #[schema(value_type = Option<Object>)]
    pub dimensions: Option<Value>,
    pub sustainability_score: Option<f64>,
    pub carbon_footprint: Option<f64>,
}

/// Product row decorated with supplier info and latest tracking state.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub supplier_name: Option<String>,
    pub supplier_location: Option<String>,
    pub supplier_sustainability: Option<f64>,
    pub supplier_verified: Option<bool>,
    pub supplier_certification: Option<String>,
    pub tracking_events_count: i64,
    pub current_status: Option<String>,
    pub current_location: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub products: Vec<ProductDetail>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JourneyEvent {
    #[serde(flatten)]
    pub event: crate::models::TrackingEvent,
    pub scanned_by_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductJourney {
    pub product: ProductRef,
    pub journey: Vec<JourneyEvent>,
}
