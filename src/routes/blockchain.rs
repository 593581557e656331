use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::blockchain::{
        ContractInteractRequest, ContractInteractResponse, CreateTransactionRequest,
        NetworkStatus, ProductTransactions, TransactionDetail, TransactionList, VerifyRequest,
        VerifyResponse,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::BlockchainTransaction,
    response::ApiResponse,
    routes::params::{Pagination, TransactionQuery},
    services::blockchain_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(recent_transactions))
        .route("/transactions", post(create_transaction))
        .route("/transactions/{hash}", get(get_by_hash))
        .route("/products/{product_id}/transactions", get(product_transactions))
        .route("/verify", post(verify))
        .route("/status", get(network_status))
        .route("/contract/interact", post(contract_interact))
}

#[utoipa::path(
    get,
    path = "/api/blockchain/products/{product_id}/transactions",
    params(
        ("product_id" = Uuid, Path, description = "Product ID"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "Transactions for a product", body = ApiResponse<ProductTransactions>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Blockchain"
)]
pub async fn product_transactions(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ProductTransactions>>> {
    let resp = blockchain_service::product_transactions(&state, product_id, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/blockchain/transactions",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction recorded", body = ApiResponse<BlockchainTransaction>),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Duplicate transaction hash"),
    ),
    security(("bearer_auth" = [])),
    tag = "Blockchain"
)]
pub async fn create_transaction(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateTransactionRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<BlockchainTransaction>>)> {
    let resp = blockchain_service::create_transaction(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/blockchain/transactions",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "pending, confirmed, failed"),
    ),
    responses(
        (status = 200, description = "Recent transactions", body = ApiResponse<TransactionList>)
    ),
    tag = "Blockchain"
)]
pub async fn recent_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionQuery>,
) -> AppResult<Json<ApiResponse<TransactionList>>> {
    let resp = blockchain_service::recent_transactions(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/blockchain/transactions/{hash}",
    params(("hash" = String, Path, description = "Transaction hash")),
    responses(
        (status = 200, description = "Transaction", body = ApiResponse<TransactionDetail>),
        (status = 404, description = "Transaction not found"),
    ),
    tag = "Blockchain"
)]
pub async fn get_by_hash(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> AppResult<Json<ApiResponse<TransactionDetail>>> {
    let resp = blockchain_service::get_by_hash(&state, hash).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/blockchain/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Verification result", body = ApiResponse<VerifyResponse>),
        (status = 404, description = "No confirmed transactions found"),
    ),
    tag = "Blockchain"
)]
pub async fn verify(
    State(state): State<AppState>,
    Json(payload): Json<VerifyRequest>,
) -> AppResult<Json<ApiResponse<VerifyResponse>>> {
    let resp = blockchain_service::verify(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/blockchain/status", tag = "Blockchain")]
pub async fn network_status(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<NetworkStatus>>> {
    let resp = blockchain_service::network_status(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/blockchain/contract/interact",
    request_body = ContractInteractRequest,
    responses(
        (status = 200, description = "Mock contract call accepted", body = ApiResponse<ContractInteractResponse>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Blockchain"
)]
pub async fn contract_interact(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ContractInteractRequest>,
) -> AppResult<Json<ApiResponse<ContractInteractResponse>>> {
    let resp = blockchain_service::contract_interact(&state, &user, payload).await?;
    Ok(Json(resp))
}
