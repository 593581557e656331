use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, put},
};
use uuid::Uuid;

use crate::{
    dto::inventory::{AdjustInventoryRequest, InventoryList, UpsertInventoryRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::InventoryRecord,
    response::ApiResponse,
    routes::params::InventoryQuery,
    services::inventory_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_inventory))
        .route("/", put(upsert_inventory))
        .route("/low-stock", get(list_low_stock))
        .route("/{id}/adjust", patch(adjust_inventory))
}

#[utoipa::path(
    get,
    path = "/api/inventory",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("product_id" = Option<Uuid>, Query, description = "Filter by product"),
        ("store_location" = Option<String>, Query, description = "Filter by store"),
    ),
    responses(
        (status = 200, description = "Inventory records", body = ApiResponse<InventoryList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn list_inventory(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<InventoryQuery>,
) -> AppResult<Json<ApiResponse<InventoryList>>> {
    let resp = inventory_service::list_inventory(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/inventory",
    request_body = UpsertInventoryRequest,
    responses(
        (status = 200, description = "Stock record upserted", body = ApiResponse<InventoryRecord>),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn upsert_inventory(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpsertInventoryRequest>,
) -> AppResult<Json<ApiResponse<InventoryRecord>>> {
    let resp = inventory_service::upsert_inventory(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/inventory/{id}/adjust",
    params(("id" = Uuid, Path, description = "Inventory record ID")),
    request_body = AdjustInventoryRequest,
    responses(
        (status = 200, description = "Stock adjusted", body = ApiResponse<InventoryRecord>),
        (status = 400, description = "Invalid adjustment"),
        (status = 404, description = "Record not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn adjust_inventory(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdjustInventoryRequest>,
) -> AppResult<Json<ApiResponse<InventoryRecord>>> {
    let resp = inventory_service::adjust_inventory(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/inventory/low-stock",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "Records at or below reorder point", body = ApiResponse<InventoryList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn list_low_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<InventoryQuery>,
) -> AppResult<Json<ApiResponse<InventoryList>>> {
    let resp = inventory_service::list_low_stock(&state, &user, query).await?;
    Ok(Json(resp))
}
