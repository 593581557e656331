use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::products::{
        CreateProductRequest, JourneyEvent, ProductDetail, ProductJourney, ProductList,
        ProductRef, UpdateProductRequest,
    },
    entity::products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    entity::{suppliers, users},
    error::{AppError, AppResult},
    events::{EventKind, product_room},
    middleware::auth::{AuthUser, ensure_roles},
    models::{PRODUCT_CATEGORIES, Product, Role, TrackingEvent},
    response::{ApiResponse, Meta},
    routes::params::{Pagination, ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all().add(Column::IsActive.eq(true));

    if let Some(category) = query.category.as_ref().filter(|c| !c.is_empty()) {
        condition = condition.add(Column::Category.eq(category.clone()));
    }

    if let Some(supplier_id) = query.supplier_id {
        condition = condition.add(Column::SupplierId.eq(supplier_id));
    }

    if let Some(search) = query.search.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern.clone()))
                .add(Expr::col(Column::Sku).ilike(pattern)),
        );
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
        ProductSortBy::SustainabilityScore => Column::SustainabilityScore,
        ProductSortBy::Category => Column::Category,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let products = decorate_products(state, items).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Products",
        ProductList { products },
        Some(meta),
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ProductDetail>> {
    let model = find_active_product(state, id).await?;
    let mut decorated = decorate_products(state, vec![model]).await?;
    let product = decorated
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("decoration dropped product")))?;
    Ok(ApiResponse::data(product))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_roles(user, &[Role::Admin, Role::Staff, Role::Supplier])?;
    validate_category(&payload.category)?;
    validate_scores(payload.price, payload.sustainability_score, payload.carbon_footprint)?;

    // Suppliers may only create products under their own supplier record.
    let supplier_id = if user.role == Role::Supplier {
        user.supplier_id.ok_or_else(|| {
            AppError::BadRequest("Supplier user must have a supplier associated".into())
        })?
    } else {
        payload
            .supplier_id
            .ok_or_else(|| AppError::BadRequest("Supplier ID is required".into()))?
    };

    let supplier = suppliers::Entity::find_by_id(supplier_id)
        .filter(suppliers::Column::IsActive.eq(true))
        .one(&state.orm)
        .await?;
    if supplier.is_none() {
        return Err(AppError::NotFound);
    }

    let existing_sku = Products::find()
        .filter(Column::Sku.eq(payload.sku.clone()))
        .one(&state.orm)
        .await?;
    if existing_sku.is_some() {
        return Err(AppError::Conflict(
            "Product with this SKU already exists".into(),
        ));
    }

    let id = Uuid::new_v4();
    let active = ActiveModel {
        id: Set(id),
        name: Set(payload.name),
        category: Set(payload.category),
        supplier_id: Set(supplier_id),
        sku: Set(payload.sku),
        description: Set(payload.description),
        price: Set(payload.price),
        weight: Set(payload.weight),
        dimensions: Set(payload.dimensions),
        sustainability_score: Set(payload.sustainability_score),
        carbon_footprint: Set(payload.carbon_footprint),
        blockchain_hash: Set(None),
        is_active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let product = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id, "sku": product.sku })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    state.events.publish(
        EventKind::ProductUpdate,
        product_room(product.id),
        serde_json::json!({ "product_id": product.id, "action": "created" }),
    );

    Ok(ApiResponse::success(
        "Product created successfully",
        product_from_entity(product),
        None,
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_roles(user, &[Role::Admin, Role::Staff, Role::Supplier])?;
    let existing = find_active_product(state, id).await?;

    if user.role == Role::Supplier && Some(existing.supplier_id) != user.supplier_id {
        return Err(AppError::Forbidden);
    }

    if let Some(category) = payload.category.as_ref() {
        validate_category(category)?;
    }
    if let Some(score) = payload.sustainability_score {
        if !(0.0..=10.0).contains(&score) {
            return Err(AppError::BadRequest(
                "Sustainability score must be between 0 and 10".into(),
            ));
        }
    }

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(category) = payload.category {
        active.category = Set(category);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        if price < 0.0 {
            return Err(AppError::BadRequest("Price must be a positive number".into()));
        }
        active.price = Set(price);
    }
    if let Some(weight) = payload.weight {
        active.weight = Set(Some(weight));
    }
    if let Some(dimensions) = payload.dimensions {
        active.dimensions = Set(Some(dimensions));
    }
    if let Some(score) = payload.sustainability_score {
        active.sustainability_score = Set(score);
    }
    if let Some(footprint) = payload.carbon_footprint {
        active.carbon_footprint = Set(footprint);
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    state.events.publish(
        EventKind::ProductUpdate,
        product_room(product.id),
        serde_json::json!({ "product_id": product.id, "action": "updated" }),
    );

    Ok(ApiResponse::success(
        "Product updated successfully",
        product_from_entity(product),
        None,
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_roles(user, &[Role::Admin, Role::Staff])?;
    let existing = find_active_product(state, id).await?;

    let mut active: ActiveModel = existing.into();
    active.is_active = Set(false);
    active.updated_at = Set(Utc::now().into());
    let product = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id, "sku": product.sku })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    state.events.publish(
        EventKind::ProductUpdate,
        product_room(id),
        serde_json::json!({ "product_id": id, "action": "deleted" }),
    );

    Ok(ApiResponse::success(
        "Product deleted successfully",
        serde_json::json!({}),
        None,
    ))
}

pub async fn get_journey(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ProductJourney>> {
    let product = find_active_product(state, id).await?;

    let events: Vec<TrackingEvent> = sqlx::query_as(
        "SELECT * FROM tracking_events WHERE product_id = $1 ORDER BY timestamp ASC",
    )
    .bind(id)
    .fetch_all(&state.pool)
    .await?;

    let scanner_ids: Vec<Uuid> = events.iter().filter_map(|e| e.scanned_by).collect();
    let names = user_names(state, scanner_ids).await?;

    let journey = events
        .into_iter()
        .map(|event| {
            let scanned_by_name = event.scanned_by.and_then(|id| names.get(&id).cloned());
            JourneyEvent {
                event,
                scanned_by_name,
            }
        })
        .collect();

    Ok(ApiResponse::data(ProductJourney {
        product: ProductRef {
            id: product.id,
            name: product.name,
        },
        journey,
    }))
}

pub async fn list_by_supplier(
    state: &AppState,
    supplier_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = Products::find()
        .filter(Column::SupplierId.eq(supplier_id))
        .filter(Column::IsActive.eq(true))
        .order_by_desc(Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let products = decorate_products(state, items).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Supplier products",
        ProductList { products },
        Some(meta),
    ))
}

async fn find_active_product(state: &AppState, id: Uuid) -> AppResult<ProductModel> {
    Products::find_by_id(id)
        .filter(Column::IsActive.eq(true))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

fn validate_category(category: &str) -> Result<(), AppError> {
    if PRODUCT_CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("Invalid category: {category}")))
    }
}

fn validate_scores(price: f64, sustainability: f64, carbon: f64) -> Result<(), AppError> {
    if price < 0.0 {
        return Err(AppError::BadRequest("Price must be a positive number".into()));
    }
    if !(0.0..=10.0).contains(&sustainability) {
        return Err(AppError::BadRequest(
            "Sustainability score must be between 0 and 10".into(),
        ));
    }
    if carbon < 0.0 {
        return Err(AppError::BadRequest(
            "Carbon footprint must be a positive number".into(),
        ));
    }
    Ok(())
}

async fn user_names(state: &AppState, ids: Vec<Uuid>) -> AppResult<HashMap<Uuid, String>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = users::Entity::find()
        .filter(users::Column::Id.is_in(ids))
        .all(&state.orm)
        .await?;
    Ok(rows.into_iter().map(|u| (u.id, u.name)).collect())
}

/// Decorate product rows with supplier info and latest tracking state.
/// References are application-level, so this is done with follow-up lookups
/// rather than SQL joins.
async fn decorate_products(
    state: &AppState,
    items: Vec<ProductModel>,
) -> AppResult<Vec<ProductDetail>> {
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let product_ids: Vec<Uuid> = items.iter().map(|m| m.id).collect();
    let mut supplier_ids: Vec<Uuid> = items.iter().map(|m| m.supplier_id).collect();
    supplier_ids.sort();
    supplier_ids.dedup();

    let suppliers: HashMap<Uuid, suppliers::Model> = suppliers::Entity::find()
        .filter(suppliers::Column::Id.is_in(supplier_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    let counts: HashMap<Uuid, i64> = sqlx::query_as::<_, (Uuid, i64)>(
        "SELECT product_id, COUNT(*) FROM tracking_events WHERE product_id = ANY($1) GROUP BY product_id",
    )
    .bind(&product_ids)
    .fetch_all(&state.pool)
    .await?
    .into_iter()
    .collect();

    let latest: HashMap<Uuid, (String, String)> = sqlx::query_as::<_, (Uuid, String, String)>(
        r#"
        SELECT DISTINCT ON (product_id) product_id, status, location
        FROM tracking_events
        WHERE product_id = ANY($1)
        ORDER BY product_id, timestamp DESC
        "#,
    )
    .bind(&product_ids)
    .fetch_all(&state.pool)
    .await?
    .into_iter()
    .map(|(id, status, location)| (id, (status, location)))
    .collect();

    Ok(items
        .into_iter()
        .map(|model| {
            let supplier = suppliers.get(&model.supplier_id);
            let tracking_events_count = counts.get(&model.id).copied().unwrap_or(0);
            let current = latest.get(&model.id);
            ProductDetail {
                supplier_name: supplier.map(|s| s.name.clone()),
                supplier_location: supplier.map(|s| s.location.clone()),
                supplier_sustainability: supplier.map(|s| s.sustainability_score),
                supplier_verified: supplier.map(|s| s.verified),
                supplier_certification: supplier.map(|s| s.certification_level.clone()),
                tracking_events_count,
                current_status: current.map(|(status, _)| status.clone()),
                current_location: current.map(|(_, location)| location.clone()),
                product: product_from_entity(model),
            }
        })
        .collect())
}

pub(crate) fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        category: model.category,
        supplier_id: model.supplier_id,
        sku: model.sku,
        description: model.description,
        price: model.price,
        weight: model.weight,
        dimensions: model.dimensions,
        sustainability_score: model.sustainability_score,
        carbon_footprint: model.carbon_footprint,
        blockchain_hash: model.blockchain_hash,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
