use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortBy {
    CreatedAt,
    Price,
    Name,
    SustainabilityScore,
    Category,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SupplierSortBy {
    CreatedAt,
    Name,
    Location,
    SustainabilityScore,
    PerformanceRating,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub category: Option<String>,
    pub supplier_id: Option<Uuid>,
    pub search: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort_by: Option<ProductSortBy>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SupplierQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub location: Option<String>,
    pub min_sustainability: Option<f64>,
    pub verified: Option<bool>,
    pub certification_level: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<SupplierSortBy>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransactionQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecentQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TimeframeQuery {
    pub timeframe: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct InventoryQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub product_id: Option<Uuid>,
    pub store_location: Option<String>,
}
