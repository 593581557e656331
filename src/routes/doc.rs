use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        analytics, auth as auth_dto, blockchain as blockchain_dto, inventory, products, suppliers,
        tracking,
    },
    models::{
        BlockchainTransaction, InventoryRecord, Product, QrScanLog, Role, Supplier,
        TrackingEvent, User,
    },
    response::{ApiResponse, Meta},
    routes::{
        analytics as analytics_routes, auth, blockchain, health, inventory as inventory_routes,
        params, products as product_routes, suppliers as supplier_routes,
        tracking as tracking_routes,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::refresh,
        auth::profile,
        auth::change_password,
        auth::logout,
        product_routes::list_products,
        product_routes::get_product,
        product_routes::create_product,
        product_routes::update_product,
        product_routes::delete_product,
        product_routes::get_journey,
        product_routes::list_by_supplier,
        supplier_routes::list_suppliers,
        supplier_routes::get_supplier,
        supplier_routes::create_supplier,
        supplier_routes::update_supplier,
        supplier_routes::delete_supplier,
        supplier_routes::get_performance,
        supplier_routes::verify_supplier,
        supplier_routes::category_stats,
        tracking_routes::create_event,
        tracking_routes::product_events,
        tracking_routes::recent_events,
        tracking_routes::update_event_location,
        tracking_routes::scan,
        tracking_routes::scan_stats,
        tracking_routes::events_by_location,
        tracking_routes::bulk_create,
        analytics_routes::dashboard,
        analytics_routes::supply_chain,
        analytics_routes::sustainability,
        analytics_routes::performance,
        analytics_routes::predictions,
        analytics_routes::export,
        blockchain::product_transactions,
        blockchain::create_transaction,
        blockchain::recent_transactions,
        blockchain::get_by_hash,
        blockchain::verify,
        blockchain::network_status,
        blockchain::contract_interact,
        inventory_routes::list_inventory,
        inventory_routes::upsert_inventory,
        inventory_routes::adjust_inventory,
        inventory_routes::list_low_stock
    ),
    components(
        schemas(
            User,
            Role,
            Supplier,
            Product,
            TrackingEvent,
            BlockchainTransaction,
            QrScanLog,
            InventoryRecord,
            health::HealthData,
            auth_dto::RegisterRequest,
            auth_dto::LoginRequest,
            auth_dto::RefreshRequest,
            auth_dto::ChangePasswordRequest,
            auth_dto::AuthResponse,
            auth_dto::TokenPair,
            products::CreateProductRequest,
            products::UpdateProductRequest,
            products::ProductDetail,
            products::ProductList,
            products::ProductJourney,
            products::JourneyEvent,
            suppliers::CreateSupplierRequest,
            suppliers::UpdateSupplierRequest,
            suppliers::VerifySupplierRequest,
            suppliers::SupplierDetail,
            suppliers::SupplierList,
            suppliers::SupplierPerformance,
            suppliers::SupplierCategoryStats,
            tracking::CreateTrackingEventRequest,
            tracking::UpdateEventLocationRequest,
            tracking::ScanRequest,
            tracking::ScanResponse,
            tracking::ScanStats,
            tracking::BulkEventsRequest,
            tracking::BulkEventsResponse,
            tracking::EventWithNames,
            tracking::ProductEvents,
            tracking::LocationEvents,
            analytics::DashboardStats,
            analytics::SupplyChainMetrics,
            analytics::SustainabilityReport,
            analytics::PerformanceReport,
            analytics::PredictionsSummary,
            analytics::ExportRequest,
            analytics::ExportResponse,
            blockchain_dto::CreateTransactionRequest,
            blockchain_dto::TransactionDetail,
            blockchain_dto::TransactionList,
            blockchain_dto::ProductTransactions,
            blockchain_dto::VerifyRequest,
            blockchain_dto::VerifyResponse,
            blockchain_dto::NetworkStatus,
            blockchain_dto::ContractInteractRequest,
            blockchain_dto::ContractInteractResponse,
            inventory::UpsertInventoryRequest,
            inventory::AdjustInventoryRequest,
            inventory::InventoryList,
            params::Pagination,
            Meta,
            ApiResponse<Product>,
            ApiResponse<products::ProductList>,
            ApiResponse<suppliers::SupplierList>,
            ApiResponse<tracking::ScanResponse>,
            ApiResponse<blockchain_dto::TransactionList>,
            ApiResponse<inventory::InventoryList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Products", description = "Product endpoints"),
        (name = "Suppliers", description = "Supplier endpoints"),
        (name = "Tracking", description = "Tracking and QR scan endpoints"),
        (name = "Analytics", description = "Analytics and reporting endpoints"),
        (name = "Blockchain", description = "Mock ledger endpoints"),
        (name = "Inventory", description = "Inventory endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
