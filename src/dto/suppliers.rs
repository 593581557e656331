use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Supplier;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSupplierRequest {
    pub name: String,
    pub location: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub blockchain_address: Option<String>,
    pub sustainability_score: f64,
    pub certification_level: String,
    #[serde(default)]
    pub specialties: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSupplierRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub contact_phone: Option<String>,
    pub blockchain_address: Option<String>,
    pub sustainability_score: Option<f64>,
    pub performance_rating: Option<f64>,
    pub on_time_delivery: Option<f64>,
    pub quality_score: Option<f64>,
    pub cost_efficiency: Option<f64>,
    pub certification_level: Option<String>,
    pub specialties: Option<Vec<String>>,
}

impl UpdateSupplierRequest {
    /// Field names a supplier-role user is allowed to touch on its own profile.
    pub fn restricted_fields(&self) -> Vec<&'static str> {
        let mut blocked = Vec::new();
        if self.name.is_some() {
            blocked.push("name");
        }
        if self.location.is_some() {
            blocked.push("location");
        }
        if self.blockchain_address.is_some() {
            blocked.push("blockchain_address");
        }
        if self.sustainability_score.is_some() {
            blocked.push("sustainability_score");
        }
        if self.performance_rating.is_some() {
            blocked.push("performance_rating");
        }
        if self.on_time_delivery.is_some() {
            blocked.push("on_time_delivery");
        }
        if self.quality_score.is_some() {
            blocked.push("quality_score");
        }
        if self.cost_efficiency.is_some() {
            blocked.push("cost_efficiency");
        }
        if self.certification_level.is_some() {
            blocked.push("certification_level");
        }
        blocked
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifySupplierRequest {
    pub verified: Option<bool>,
}

/// Supplier row decorated with product aggregates and linked account count.
#[derive(Debug, Serialize, ToSchema)]
pub struct SupplierDetail {
    #[serde(flatten)]
    pub supplier: Supplier,
    pub total_products: i64,
    pub active_products: i64,
    pub avg_product_sustainability: Option<f64>,
    pub avg_product_price: Option<f64>,
    pub user_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SupplierList {
    pub suppliers: Vec<SupplierDetail>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SupplierSummary {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub verified: bool,
    pub certification_level: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PerformanceScores {
    pub sustainability_score: f64,
    pub performance_rating: f64,
    pub on_time_delivery: f64,
    pub quality_score: f64,
    pub cost_efficiency: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductAggregates {
    pub total_products: i64,
    pub products_last_30_days: i64,
    pub avg_sustainability: Option<f64>,
    pub avg_price: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityAggregates {
    pub events_last_30_days: i64,
    pub products_tracked_last_30_days: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SupplierPerformance {
    pub supplier: SupplierSummary,
    pub performance: PerformanceScores,
    pub products: ProductAggregates,
    pub activity: ActivityAggregates,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CertificationBucket {
    pub certification_level: String,
    pub supplier_count: i64,
    pub verified_count: i64,
    pub avg_sustainability: Option<f64>,
    pub avg_performance: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SpecialtyBucket {
    pub specialty: String,
    pub supplier_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SupplierCategoryStats {
    pub certification_levels: Vec<CertificationBucket>,
    pub top_specialties: Vec<SpecialtyBucket>,
}
