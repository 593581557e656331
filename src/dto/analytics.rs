use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub products_tracked: i64,
    pub active_shipments: i64,
    pub verified_suppliers: i64,
    pub co2_saved: f64,
    pub daily_scans: i64,
    pub blockchain_transactions: i64,
    pub average_delivery_time: f64,
    pub customer_satisfaction: f64,
    pub revenue_impact: f64,
    pub cost_savings: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SupplyChainMetrics {
    pub on_time_delivery: f64,
    pub quality_score: f64,
    pub sustainability_score: f64,
    pub cost_efficiency: f64,
    pub carbon_footprint: f64,
    pub supplier_performance: f64,
    pub inventory_turnover: f64,
    pub waste_reduction: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategorySustainability {
    pub category: String,
    pub product_count: i64,
    pub avg_sustainability: f64,
    pub total_carbon_footprint: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopSustainableProduct {
    pub name: String,
    pub sku: String,
    pub category: String,
    pub sustainability_score: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CertificationShare {
    pub certification_level: String,
    pub supplier_count: i64,
    pub avg_sustainability: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SustainabilityReport {
    pub categories: Vec<CategorySustainability>,
    pub top_products: Vec<TopSustainableProduct>,
    pub certification_breakdown: Vec<CertificationShare>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DailyTrackingPoint {
    pub day: String,
    pub products_tracked: i64,
    pub total_events: i64,
    pub deliveries: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DailyScanPoint {
    pub day: String,
    pub scan_count: i64,
    pub unique_products_scanned: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopSupplierPoint {
    pub name: String,
    pub performance_rating: f64,
    pub product_count: i64,
    pub avg_sustainability: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopLocationPoint {
    pub location: String,
    pub event_count: i64,
    pub unique_products: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PerformanceReport {
    pub timeframe: String,
    pub daily_tracking: Vec<DailyTrackingPoint>,
    pub daily_scans: Vec<DailyScanPoint>,
    pub top_suppliers: Vec<TopSupplierPoint>,
    pub top_locations: Vec<TopLocationPoint>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PredictionEntry {
    pub prediction_type: String,
    pub predicted_value: f64,
    pub confidence_score: f64,
    pub factors: Vec<String>,
    pub time_horizon_days: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PredictionsSummary {
    pub summary: Vec<PredictionEntry>,
    pub generated_at: DateTime<Utc>,
    pub total_predictions: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ExportRequest {
    pub export_type: String,
    #[serde(default = "default_format")]
    pub format: String,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

fn default_format() -> String {
    "json".to_string()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExportResponse {
    pub export_type: String,
    pub format: String,
    #[schema(value_type = Object)]
    pub sections: Value,
}
