use std::collections::HashMap;

use chrono::{Duration, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::blockchain::{
        ContractInfo, ContractInteractRequest, ContractInteractResponse, CreateTransactionRequest,
        NetworkInfo, NetworkStatistics, NetworkStatus, ProductTransactions, TransactionDetail,
        TransactionList, VerificationDetails, VerifiedProduct, VerifiedSupplier,
        VerifiedTransaction, VerifyRequest, VerifyResponse,
    },
    dto::products::ProductRef,
    entity::blockchain_transactions::{
        ActiveModel, Column, Entity as Transactions, Model as TxModel,
    },
    entity::{products, suppliers},
    error::{AppError, AppResult},
    events::{EventKind, product_room},
    middleware::auth::{AuthUser, ensure_roles},
    models::{BlockchainTransaction, Role, TX_ACTIONS, TX_STATUSES, mock_transaction_hash},
    response::{ApiResponse, Meta},
    routes::params::{Pagination, TransactionQuery},
    state::AppState,
};

const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";
const BASE_BLOCK_NUMBER: i64 = 18_500_000;
const MOCK_GAS_USED: i64 = 21_000;
const MOCK_GAS_PRICE: &str = "20000000000";

fn contract_address() -> String {
    std::env::var("CONTRACT_ADDRESS")
        .unwrap_or_else(|_| "0x1234567890123456789012345678901234567890".to_string())
}

/// Mock block height: monotonic in the number of recorded transactions.
async fn next_block_number(state: &AppState) -> AppResult<i64> {
    let total = Transactions::find().count(&state.orm).await? as i64;
    Ok(BASE_BLOCK_NUMBER + total)
}

/// Write a confirmed mock ledger record. There is no chain client behind
/// this; confirmation happens synchronously at insert.
pub async fn record_confirmed_transaction(
    state: &AppState,
    product_id: Uuid,
    action: &str,
    metadata: serde_json::Value,
) -> AppResult<TxModel> {
    let block_number = next_block_number(state).await?;
    let model = ActiveModel {
        id: Set(Uuid::new_v4()),
        transaction_hash: Set(mock_transaction_hash()),
        block_number: Set(Some(block_number)),
        product_id: Set(product_id),
        action: Set(action.to_string()),
        from_address: Set(ZERO_ADDRESS.to_string()),
        to_address: Set(contract_address()),
        gas_used: Set(MOCK_GAS_USED),
        gas_price: Set(MOCK_GAS_PRICE.to_string()),
        status: Set("confirmed".to_string()),
        metadata: Set(Some(metadata)),
        timestamp: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(model)
}

pub async fn product_transactions(
    state: &AppState,
    product_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<ProductTransactions>> {
    let product = products::Entity::find_by_id(product_id)
        .filter(products::Column::IsActive.eq(true))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let (page, limit, offset) = pagination.normalize();

    let finder = Transactions::find()
        .filter(Column::ProductId.eq(product_id))
        .order_by_desc(Column::Timestamp);

    let total = finder.clone().count(&state.orm).await? as i64;

    let transactions = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(tx_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Blockchain transactions",
        ProductTransactions {
            product: ProductRef {
                id: product.id,
                name: product.name,
            },
            transactions,
        },
        Some(meta),
    ))
}

pub async fn create_transaction(
    state: &AppState,
    user: &AuthUser,
    payload: CreateTransactionRequest,
) -> AppResult<ApiResponse<BlockchainTransaction>> {
    ensure_roles(user, &[Role::Admin, Role::Staff, Role::Supplier])?;
    if !TX_ACTIONS.contains(&payload.action.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Invalid action: {}",
            payload.action
        )));
    }

    let product = products::Entity::find_by_id(payload.product_id)
        .filter(products::Column::IsActive.eq(true))
        .one(&state.orm)
        .await?;
    if product.is_none() {
        return Err(AppError::NotFound);
    }

    let transaction_hash = payload
        .blockchain_hash
        .unwrap_or_else(mock_transaction_hash);

    let existing = Transactions::find()
        .filter(Column::TransactionHash.eq(transaction_hash.clone()))
        .one(&state.orm)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "Transaction with this hash already exists".into(),
        ));
    }

    // The ledger is simulated, so confirmation is synchronous: no timer, no
    // pending window.
    let block_number = next_block_number(state).await?;
    let model = ActiveModel {
        id: Set(Uuid::new_v4()),
        transaction_hash: Set(transaction_hash),
        block_number: Set(Some(block_number)),
        product_id: Set(payload.product_id),
        action: Set(payload.action),
        from_address: Set(payload.from_address),
        to_address: Set(payload.to_address),
        gas_used: Set(MOCK_GAS_USED),
        gas_price: Set(MOCK_GAS_PRICE.to_string()),
        status: Set("confirmed".to_string()),
        metadata: Set(payload.metadata),
        timestamp: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "blockchain_tx_create",
        Some("blockchain_transactions"),
        Some(serde_json::json!({
            "transaction_id": model.id,
            "transaction_hash": model.transaction_hash,
            "product_id": model.product_id,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    state.events.publish(
        EventKind::ProductUpdate,
        product_room(model.product_id),
        serde_json::json!({
            "product_id": model.product_id,
            "transaction_hash": model.transaction_hash,
            "action": model.action,
        }),
    );

    Ok(ApiResponse::success(
        "Blockchain transaction submitted successfully",
        tx_from_entity(model),
        None,
    ))
}

pub async fn recent_transactions(
    state: &AppState,
    query: TransactionQuery,
) -> AppResult<ApiResponse<TransactionList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let mut finder = Transactions::find().order_by_desc(Column::Timestamp);
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        if !TX_STATUSES.contains(&status.as_str()) {
            return Err(AppError::BadRequest(format!("Invalid status: {status}")));
        }
        finder = finder.filter(Column::Status.eq(status.clone()));
    }

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let transactions = decorate_transactions(state, items).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Blockchain transactions",
        TransactionList { transactions },
        Some(meta),
    ))
}

pub async fn get_by_hash(
    state: &AppState,
    hash: String,
) -> AppResult<ApiResponse<TransactionDetail>> {
    let model = Transactions::find()
        .filter(Column::TransactionHash.eq(hash))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut decorated = decorate_transactions(state, vec![model]).await?;
    let detail = decorated
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("decoration dropped transaction")))?;
    Ok(ApiResponse::data(detail))
}

pub async fn verify(
    state: &AppState,
    payload: VerifyRequest,
) -> AppResult<ApiResponse<VerifyResponse>> {
    let mut finder = Transactions::find().filter(Column::Status.eq("confirmed"));

    match (payload.transaction_hash.as_ref(), payload.product_id) {
        (Some(hash), _) => {
            finder = finder.filter(Column::TransactionHash.eq(hash.clone()));
        }
        (None, Some(product_id)) => {
            finder = finder
                .filter(Column::ProductId.eq(product_id))
                .order_by_desc(Column::Timestamp);
        }
        (None, None) => {
            return Err(AppError::BadRequest(
                "Either product_id or transaction_hash is required".into(),
            ));
        }
    }

    let transaction = finder.one(&state.orm).await?.ok_or(AppError::NotFound)?;

    let product = products::Entity::find_by_id(transaction.product_id)
        .one(&state.orm)
        .await?;
    let supplier = match product.as_ref() {
        Some(p) => {
            suppliers::Entity::find_by_id(p.supplier_id)
                .one(&state.orm)
                .await?
        }
        None => None,
    };

    let supplier_verified = supplier.as_ref().map(|s| s.verified).unwrap_or(false);
    let verified = transaction.status == "confirmed" && supplier_verified;

    let data = VerifyResponse {
        verified,
        transaction: VerifiedTransaction {
            hash: transaction.transaction_hash.clone(),
            block_number: transaction.block_number,
            timestamp: transaction.timestamp.with_timezone(&Utc),
            status: transaction.status.clone(),
        },
        product: VerifiedProduct {
            id: transaction.product_id,
            name: product.as_ref().map(|p| p.name.clone()).unwrap_or_default(),
            sku: product.as_ref().map(|p| p.sku.clone()).unwrap_or_default(),
        },
        supplier: VerifiedSupplier {
            name: supplier.as_ref().map(|s| s.name.clone()).unwrap_or_default(),
            verified: supplier_verified,
        },
        verification_details: VerificationDetails {
            blockchain_verified: transaction.status == "confirmed",
            supplier_verified,
            authenticity_score: if verified { 100 } else { 75 },
        },
    };

    let message = if verified {
        "Product authenticity verified"
    } else {
        "Product verification incomplete"
    };
    Ok(ApiResponse::success(message, data, None))
}

pub async fn network_status(state: &AppState) -> AppResult<ApiResponse<NetworkStatus>> {
    let since = Utc::now() - Duration::hours(24);

    let stats: (i64, i64, i64, i64, Option<f64>, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*),
            COUNT(*) FILTER (WHERE status = 'confirmed'),
            COUNT(*) FILTER (WHERE status = 'pending'),
            COUNT(*) FILTER (WHERE status = 'failed'),
            AVG(gas_used),
            COUNT(DISTINCT product_id)
        FROM blockchain_transactions
        WHERE timestamp >= $1
        "#,
    )
    .bind(since)
    .fetch_one(&state.pool)
    .await?;

    let (total, confirmed, pending, failed, avg_gas, products_on_chain) = stats;
    let success_rate = if total > 0 {
        confirmed as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    let last_block = next_block_number(state).await?;

    let data = NetworkStatus {
        network: NetworkInfo {
            name: "Polygon Mumbai Testnet".to_string(),
            chain_id: 80001,
            status: "online".to_string(),
            last_block,
            average_block_time: "2.1s".to_string(),
            gas_price: "20 gwei".to_string(),
        },
        contract: ContractInfo {
            address: contract_address(),
            status: "deployed".to_string(),
            version: "1.0.0".to_string(),
        },
        statistics: NetworkStatistics {
            total_transactions_24h: total,
            confirmed_transactions_24h: confirmed,
            pending_transactions: pending,
            failed_transactions_24h: failed,
            average_gas_used: avg_gas.unwrap_or(0.0),
            products_on_chain,
            success_rate,
        },
    };

    Ok(ApiResponse::data(data))
}

pub async fn contract_interact(
    state: &AppState,
    user: &AuthUser,
    payload: ContractInteractRequest,
) -> AppResult<ApiResponse<ContractInteractResponse>> {
    ensure_roles(user, &[Role::Admin, Role::Staff])?;
    if payload.method.is_empty() {
        return Err(AppError::BadRequest("Contract method is required".into()));
    }

    let data = ContractInteractResponse {
        method: payload.method.clone(),
        parameters: payload.parameters.unwrap_or_else(|| serde_json::json!({})),
        transaction_hash: mock_transaction_hash(),
        gas_estimate: 45_000,
        status: "pending".to_string(),
        estimated_confirmation_time: "30 seconds".to_string(),
    };

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "contract_interact",
        Some("blockchain_transactions"),
        Some(serde_json::json!({ "method": payload.method })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Smart contract interaction submitted",
        data,
        None,
    ))
}

async fn decorate_transactions(
    state: &AppState,
    items: Vec<TxModel>,
) -> AppResult<Vec<TransactionDetail>> {
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let mut product_ids: Vec<Uuid> = items.iter().map(|t| t.product_id).collect();
    product_ids.sort();
    product_ids.dedup();

    let products: HashMap<Uuid, products::Model> = products::Entity::find()
        .filter(products::Column::Id.is_in(product_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mut supplier_ids: Vec<Uuid> = products.values().map(|p| p.supplier_id).collect();
    supplier_ids.sort();
    supplier_ids.dedup();

    let suppliers: HashMap<Uuid, String> = suppliers::Entity::find()
        .filter(suppliers::Column::Id.is_in(supplier_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect();

    Ok(items
        .into_iter()
        .map(|model| {
            let product = products.get(&model.product_id);
            let supplier_name =
                product.and_then(|p| suppliers.get(&p.supplier_id).cloned());
            TransactionDetail {
                product_name: product.map(|p| p.name.clone()),
                product_sku: product.map(|p| p.sku.clone()),
                supplier_name,
                transaction: tx_from_entity(model),
            }
        })
        .collect())
}

pub(crate) fn tx_from_entity(model: TxModel) -> BlockchainTransaction {
    BlockchainTransaction {
        id: model.id,
        transaction_hash: model.transaction_hash,
        block_number: model.block_number,
        product_id: model.product_id,
        action: model.action,
        from_address: model.from_address,
        to_address: model.to_address,
        gas_used: model.gas_used,
        gas_price: model.gas_price,
        status: model.status,
        metadata: model.metadata,
        timestamp: model.timestamp.with_timezone(&Utc),
    }
}
