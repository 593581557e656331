use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::inventory::{AdjustInventoryRequest, InventoryList, UpsertInventoryRequest},
    entity::inventory::{ActiveModel, Column, Entity as Inventory, Model as InventoryModel},
    entity::products,
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_roles},
    models::{InventoryRecord, Role},
    response::{ApiResponse, Meta},
    routes::params::InventoryQuery,
    state::AppState,
};

pub async fn list_inventory(
    state: &AppState,
    user: &AuthUser,
    query: InventoryQuery,
) -> AppResult<ApiResponse<InventoryList>> {
    ensure_roles(user, &[Role::Admin, Role::Staff])?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(product_id) = query.product_id {
        condition = condition.add(Column::ProductId.eq(product_id));
    }
    if let Some(store) = query.store_location.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Column::StoreLocation.eq(store.clone()));
    }

    let finder = Inventory::find()
        .filter(condition)
        .order_by_asc(Column::StoreLocation)
        .order_by_asc(Column::ProductId);

    let total = finder.clone().count(&state.orm).await? as i64;

    let records = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(record_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Inventory",
        InventoryList { records },
        Some(meta),
    ))
}

pub async fn upsert_inventory(
    state: &AppState,
    user: &AuthUser,
    payload: UpsertInventoryRequest,
) -> AppResult<ApiResponse<InventoryRecord>> {
    ensure_roles(user, &[Role::Admin, Role::Staff])?;
    if payload.quantity < 0 {
        return Err(AppError::BadRequest("Quantity cannot be negative".into()));
    }

    let product = products::Entity::find_by_id(payload.product_id)
        .filter(products::Column::IsActive.eq(true))
        .one(&state.orm)
        .await?;
    if product.is_none() {
        return Err(AppError::NotFound);
    }

    let existing = Inventory::find()
        .filter(Column::ProductId.eq(payload.product_id))
        .filter(Column::StoreLocation.eq(payload.store_location.clone()))
        .one(&state.orm)
        .await?;

    let record = match existing {
        Some(model) => {
            let restocked = payload.quantity > model.quantity;
            let mut active: ActiveModel = model.into();
            active.quantity = Set(payload.quantity);
            if let Some(reserved) = payload.reserved_quantity {
                active.reserved_quantity = Set(reserved);
            }
            if let Some(reorder) = payload.reorder_point {
                active.reorder_point = Set(reorder);
            }
            if let Some(max_stock) = payload.max_stock {
                active.max_stock = Set(max_stock);
            }
            if let Some(batch) = payload.batch_number {
                active.batch_number = Set(Some(batch));
            }
            if restocked {
                active.last_restocked = Set(Utc::now().into());
            }
            active.last_updated = Set(Utc::now().into());
            active.update(&state.orm).await?
        }
        None => {
            ActiveModel {
                id: Set(Uuid::new_v4()),
                product_id: Set(payload.product_id),
                store_location: Set(payload.store_location),
                quantity: Set(payload.quantity),
                reserved_quantity: Set(payload.reserved_quantity.unwrap_or(0)),
                reorder_point: Set(payload.reorder_point.unwrap_or(0)),
                max_stock: Set(payload.max_stock.unwrap_or(0)),
                last_restocked: NotSet,
                batch_number: Set(payload.batch_number),
                last_updated: NotSet,
            }
            .insert(&state.orm)
            .await?
        }
    };

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "inventory_upsert",
        Some("inventory"),
        Some(serde_json::json!({
            "inventory_id": record.id,
            "product_id": record.product_id,
            "store_location": record.store_location,
            "quantity": record.quantity,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Inventory updated",
        record_from_entity(record),
        None,
    ))
}

pub async fn adjust_inventory(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: AdjustInventoryRequest,
) -> AppResult<ApiResponse<InventoryRecord>> {
    ensure_roles(user, &[Role::Admin, Role::Staff])?;
    if payload.delta == 0 {
        return Err(AppError::BadRequest("delta must not be 0".into()));
    }

    let txn = state.orm.begin().await?;
    let record = Inventory::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let record = match record {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    let new_quantity = record.quantity + payload.delta;
    if new_quantity < 0 {
        return Err(AppError::BadRequest("Stock cannot be negative".into()));
    }

    let restocked = payload.delta > 0;
    let mut active: ActiveModel = record.into();
    active.quantity = Set(new_quantity);
    if restocked {
        active.last_restocked = Set(Utc::now().into());
    }
    active.last_updated = Set(Utc::now().into());
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "inventory_adjust",
        Some("inventory"),
        Some(serde_json::json!({ "inventory_id": updated.id, "delta": payload.delta })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Inventory updated",
        record_from_entity(updated),
        None,
    ))
}

pub async fn list_low_stock(
    state: &AppState,
    user: &AuthUser,
    query: InventoryQuery,
) -> AppResult<ApiResponse<InventoryList>> {
    ensure_roles(user, &[Role::Admin, Role::Staff])?;
    let (page, limit, offset) = query.pagination.normalize();

    let finder = Inventory::find()
        .filter(Expr::col(Column::Quantity).lte(Expr::col(Column::ReorderPoint)))
        .order_by_asc(Column::Quantity)
        .order_by_asc(Column::StoreLocation);

    let total = finder.clone().count(&state.orm).await? as i64;

    let records = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(record_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Low stock",
        InventoryList { records },
        Some(meta),
    ))
}

fn record_from_entity(model: InventoryModel) -> InventoryRecord {
    InventoryRecord {
        id: model.id,
        product_id: model.product_id,
        store_location: model.store_location,
        quantity: model.quantity,
        reserved_quantity: model.reserved_quantity,
        reorder_point: model.reorder_point,
        max_stock: model.max_stock,
        last_restocked: model.last_restocked.with_timezone(&Utc),
        batch_number: model.batch_number,
        last_updated: model.last_updated.with_timezone(&Utc),
    }
}
