use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::products::{
        CreateProductRequest, ProductDetail, ProductJourney, ProductList, UpdateProductRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Product,
    response::ApiResponse,
    routes::params::{Pagination, ProductQuery},
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/", post(create_product))
        .route("/{id}", get(get_product))
        .route("/{id}", put(update_product))
        .route("/{id}", delete(delete_product))
        .route("/{id}/journey", get(get_journey))
        .route("/supplier/{supplier_id}", get(list_by_supplier))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("category" = Option<String>, Query, description = "Filter by category"),
        ("supplier_id" = Option<Uuid>, Query, description = "Filter by supplier"),
        ("search" = Option<String>, Query, description = "Search name, description, SKU"),
        ("min_price" = Option<f64>, Query, description = "Minimum price"),
        ("max_price" = Option<f64>, Query, description = "Maximum price"),
        ("sort_by" = Option<String>, Query, description = "name, price, created_at, sustainability_score, category"),
        ("sort_order" = Option<String>, Query, description = "asc or desc"),
    ),
    responses(
        (status = 200, description = "List products", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_products(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Get product", body = ApiResponse<ProductDetail>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let resp = product_service::get_product(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Create product", body = ApiResponse<Product>),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Duplicate SKU"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let resp = product_service::create_product(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated product", body = ApiResponse<Product>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::update_product(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Soft-deleted product"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = product_service::delete_product(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/journey",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product tracking journey", body = ApiResponse<ProductJourney>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_journey(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProductJourney>>> {
    let resp = product_service::get_journey(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/supplier/{supplier_id}",
    params(
        ("supplier_id" = Uuid, Path, description = "Supplier ID"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "Products for one supplier", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn list_by_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_by_supplier(&state, supplier_id, pagination).await?;
    Ok(Json(resp))
}
