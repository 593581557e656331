use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::suppliers::{
        CreateSupplierRequest, SupplierCategoryStats, SupplierDetail, SupplierList,
        SupplierPerformance, UpdateSupplierRequest, VerifySupplierRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Supplier,
    response::ApiResponse,
    routes::params::SupplierQuery,
    services::supplier_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_suppliers))
        .route("/", post(create_supplier))
        .route("/{id}", get(get_supplier))
        .route("/{id}", put(update_supplier))
        .route("/{id}", delete(delete_supplier))
        .route("/{id}/performance", get(get_performance))
        .route("/{id}/verify", post(verify_supplier))
        .route("/stats/categories", get(category_stats))
}

#[utoipa::path(
    get,
    path = "/api/suppliers",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("location" = Option<String>, Query, description = "Location substring filter"),
        ("min_sustainability" = Option<f64>, Query, description = "Minimum sustainability score"),
        ("verified" = Option<bool>, Query, description = "Filter by verification"),
        ("certification_level" = Option<String>, Query, description = "Bronze, Silver, Gold, Platinum"),
        ("search" = Option<String>, Query, description = "Search name and location"),
        ("sort_by" = Option<String>, Query, description = "name, location, sustainability_score, performance_rating, created_at"),
        ("sort_order" = Option<String>, Query, description = "asc or desc"),
    ),
    responses(
        (status = 200, description = "List suppliers", body = ApiResponse<SupplierList>)
    ),
    tag = "Suppliers"
)]
pub async fn list_suppliers(
    State(state): State<AppState>,
    Query(query): Query<SupplierQuery>,
) -> AppResult<Json<ApiResponse<SupplierList>>> {
    let resp = supplier_service::list_suppliers(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    responses(
        (status = 200, description = "Get supplier", body = ApiResponse<SupplierDetail>),
        (status = 404, description = "Supplier not found"),
    ),
    tag = "Suppliers"
)]
pub async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SupplierDetail>>> {
    let resp = supplier_service::get_supplier(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/suppliers",
    request_body = CreateSupplierRequest,
    responses(
        (status = 201, description = "Create supplier", body = ApiResponse<Supplier>),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Duplicate contact email"),
    ),
    security(("bearer_auth" = [])),
    tag = "Suppliers"
)]
pub async fn create_supplier(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateSupplierRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Supplier>>)> {
    let resp = supplier_service::create_supplier(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    request_body = UpdateSupplierRequest,
    responses(
        (status = 200, description = "Updated supplier", body = ApiResponse<Supplier>),
        (status = 400, description = "Restricted field for supplier role"),
        (status = 404, description = "Supplier not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Suppliers"
)]
pub async fn update_supplier(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSupplierRequest>,
) -> AppResult<Json<ApiResponse<Supplier>>> {
    let resp = supplier_service::update_supplier(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    responses(
        (status = 200, description = "Soft-deleted supplier"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Supplier not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Suppliers"
)]
pub async fn delete_supplier(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = supplier_service::delete_supplier(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/suppliers/{id}/performance",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    responses(
        (status = 200, description = "Supplier performance metrics", body = ApiResponse<SupplierPerformance>),
        (status = 404, description = "Supplier not found"),
    ),
    tag = "Suppliers"
)]
pub async fn get_performance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SupplierPerformance>>> {
    let resp = supplier_service::get_performance(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/suppliers/{id}/verify",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    request_body = VerifySupplierRequest,
    responses(
        (status = 200, description = "Verification updated", body = ApiResponse<Supplier>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Supplier not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Suppliers"
)]
pub async fn verify_supplier(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<VerifySupplierRequest>,
) -> AppResult<Json<ApiResponse<Supplier>>> {
    let resp = supplier_service::verify_supplier(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/suppliers/stats/categories", tag = "Suppliers")]
pub async fn category_stats(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<SupplierCategoryStats>>> {
    let resp = supplier_service::category_stats(&state).await?;
    Ok(Json(resp))
}
