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
    dto::suppliers::{
        ActivityAggregates, CertificationBucket, CreateSupplierRequest, PerformanceScores,
        ProductAggregates, SpecialtyBucket, SupplierCategoryStats, SupplierDetail, SupplierList,
        SupplierPerformance, SupplierSummary, UpdateSupplierRequest, VerifySupplierRequest,
    },
    entity::suppliers::{ActiveModel, Column, Entity as Suppliers, Model as SupplierModel},
    error::{AppError, AppResult},
    events::{EventKind, supplier_room},
    middleware::auth::{AuthUser, ensure_roles},
    models::{CERTIFICATION_LEVELS, Role, Supplier},
    response::{ApiResponse, Meta},
    routes::params::{SortOrder, SupplierQuery, SupplierSortBy},
    state::AppState,
};

pub async fn list_suppliers(
    state: &AppState,
    query: SupplierQuery,
) -> AppResult<ApiResponse<SupplierList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all().add(Column::IsActive.eq(true));

    if let Some(location) = query.location.as_ref().filter(|l| !l.is_empty()) {
        condition = condition.add(Expr::col(Column::Location).ilike(format!("%{location}%")));
    }

    if let Some(min) = query.min_sustainability {
        condition = condition.add(Column::SustainabilityScore.gte(min));
    }

    if let Some(verified) = query.verified {
        condition = condition.add(Column::Verified.eq(verified));
    }

    if let Some(level) = query.certification_level.as_ref().filter(|l| !l.is_empty()) {
        condition = condition.add(Column::CertificationLevel.eq(level.clone()));
    }

    if let Some(search) = query.search.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Location).ilike(pattern)),
        );
    }

    let sort_by = query.sort_by.unwrap_or(SupplierSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        SupplierSortBy::CreatedAt => Column::CreatedAt,
        SupplierSortBy::Name => Column::Name,
        SupplierSortBy::Location => Column::Location,
        SupplierSortBy::SustainabilityScore => Column::SustainabilityScore,
        SupplierSortBy::PerformanceRating => Column::PerformanceRating,
    };

    let mut finder = Suppliers::find().filter(condition);
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

    let suppliers = decorate_suppliers(state, items).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Suppliers",
        SupplierList { suppliers },
        Some(meta),
    ))
}

pub async fn get_supplier(state: &AppState, id: Uuid) -> AppResult<ApiResponse<SupplierDetail>> {
    let model = find_active_supplier(state, id).await?;
    let mut decorated = decorate_suppliers(state, vec![model]).await?;
    let supplier = decorated
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("decoration dropped supplier")))?;
    Ok(ApiResponse::data(supplier))
}

pub async fn create_supplier(
    state: &AppState,
    user: &AuthUser,
    payload: CreateSupplierRequest,
) -> AppResult<ApiResponse<Supplier>> {
    ensure_roles(user, &[Role::Admin, Role::Staff])?;
    validate_certification(&payload.certification_level)?;
    if !(0.0..=10.0).contains(&payload.sustainability_score) {
        return Err(AppError::BadRequest(
            "Sustainability score must be between 0 and 10".into(),
        ));
    }

    let existing = Suppliers::find()
        .filter(Column::ContactEmail.eq(payload.contact_email.clone()))
        .one(&state.orm)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "Supplier already exists with this email".into(),
        ));
    }

    let id = Uuid::new_v4();
    let active = ActiveModel {
        id: Set(id),
        name: Set(payload.name),
        location: Set(payload.location),
        contact_email: Set(payload.contact_email),
        contact_phone: Set(payload.contact_phone),
        blockchain_address: Set(payload.blockchain_address),
        sustainability_score: Set(payload.sustainability_score),
        // New suppliers start from the baseline metrics; real numbers accrue
        // from tracking activity.
        performance_rating: Set(5.0),
        on_time_delivery: Set(95.0),
        quality_score: Set(4.5),
        cost_efficiency: Set(85.0),
        verified: Set(false),
        certification_level: Set(payload.certification_level),
        specialties: Set(serde_json::json!(payload.specialties)),
        is_active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let supplier = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "supplier_create",
        Some("suppliers"),
        Some(serde_json::json!({ "supplier_id": supplier.id, "name": supplier.name })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Supplier created successfully",
        supplier_from_entity(supplier),
        None,
    ))
}

pub async fn update_supplier(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateSupplierRequest,
) -> AppResult<ApiResponse<Supplier>> {
    ensure_roles(user, &[Role::Admin, Role::Staff, Role::Supplier])?;
    let existing = find_active_supplier(state, id).await?;

    if user.role == Role::Supplier {
        if Some(id) != user.supplier_id {
            return Err(AppError::Forbidden);
        }
        let blocked = payload.restricted_fields();
        if !blocked.is_empty() {
            return Err(AppError::BadRequest(format!(
                "Suppliers cannot update these fields: {}",
                blocked.join(", ")
            )));
        }
    }

    if let Some(level) = payload.certification_level.as_ref() {
        validate_certification(level)?;
    }

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(location) = payload.location {
        active.location = Set(location);
    }
    if let Some(phone) = payload.contact_phone {
        active.contact_phone = Set(Some(phone));
    }
    if let Some(address) = payload.blockchain_address {
        active.blockchain_address = Set(Some(address));
    }
    if let Some(score) = payload.sustainability_score {
        active.sustainability_score = Set(score);
    }
    if let Some(rating) = payload.performance_rating {
        active.performance_rating = Set(rating);
    }
    if let Some(otd) = payload.on_time_delivery {
        active.on_time_delivery = Set(otd);
    }
    if let Some(quality) = payload.quality_score {
        active.quality_score = Set(quality);
    }
    if let Some(cost) = payload.cost_efficiency {
        active.cost_efficiency = Set(cost);
    }
    if let Some(level) = payload.certification_level {
        active.certification_level = Set(level);
    }
    if let Some(specialties) = payload.specialties {
        active.specialties = Set(serde_json::json!(specialties));
    }
    active.updated_at = Set(Utc::now().into());

    let supplier = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "supplier_update",
        Some("suppliers"),
        Some(serde_json::json!({ "supplier_id": supplier.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Supplier updated successfully",
        supplier_from_entity(supplier),
        None,
    ))
}

pub async fn delete_supplier(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_roles(user, &[Role::Admin])?;
    let existing = find_active_supplier(state, id).await?;

    let mut active: ActiveModel = existing.into();
    active.is_active = Set(false);
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "supplier_delete",
        Some("suppliers"),
        Some(serde_json::json!({ "supplier_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Supplier deleted successfully",
        serde_json::json!({}),
        None,
    ))
}

pub async fn get_performance(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<SupplierPerformance>> {
    let supplier = find_active_supplier(state, id).await?;

    let product_stats: (i64, i64, Option<f64>, Option<f64>) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*),
            COUNT(*) FILTER (WHERE created_at >= NOW() - INTERVAL '30 days'),
            AVG(sustainability_score),
            AVG(price)
        FROM products
        WHERE supplier_id = $1 AND is_active = TRUE
        "#,
    )
    .bind(id)
    .fetch_one(&state.pool)
    .await?;

    let activity: (i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*), COUNT(DISTINCT te.product_id)
        FROM tracking_events te
        JOIN products p ON p.id = te.product_id
        WHERE p.supplier_id = $1 AND te.timestamp >= NOW() - INTERVAL '30 days'
        "#,
    )
    .bind(id)
    .fetch_one(&state.pool)
    .await?;

    let data = SupplierPerformance {
        supplier: SupplierSummary {
            id: supplier.id,
            name: supplier.name.clone(),
            location: supplier.location.clone(),
            verified: supplier.verified,
            certification_level: supplier.certification_level.clone(),
        },
        performance: PerformanceScores {
            sustainability_score: supplier.sustainability_score,
            performance_rating: supplier.performance_rating,
            on_time_delivery: supplier.on_time_delivery,
            quality_score: supplier.quality_score,
            cost_efficiency: supplier.cost_efficiency,
        },
        products: ProductAggregates {
            total_products: product_stats.0,
            products_last_30_days: product_stats.1,
            avg_sustainability: product_stats.2,
            avg_price: product_stats.3,
        },
        activity: ActivityAggregates {
            events_last_30_days: activity.0,
            products_tracked_last_30_days: activity.1,
        },
    };

    Ok(ApiResponse::data(data))
}

pub async fn verify_supplier(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: VerifySupplierRequest,
) -> AppResult<ApiResponse<Supplier>> {
    ensure_roles(user, &[Role::Admin, Role::Staff])?;
    let verified = payload.verified.unwrap_or(true);
    let existing = find_active_supplier(state, id).await?;

    let mut active: ActiveModel = existing.into();
    active.verified = Set(verified);
    active.updated_at = Set(Utc::now().into());
    let supplier = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "supplier_verify",
        Some("suppliers"),
        Some(serde_json::json!({ "supplier_id": id, "verified": verified })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    state.events.publish(
        EventKind::Alert,
        supplier_room(id),
        serde_json::json!({ "supplier_id": id, "verified": verified }),
    );

    let message = if verified {
        "Supplier verified successfully"
    } else {
        "Supplier unverified successfully"
    };
    Ok(ApiResponse::success(
        message,
        supplier_from_entity(supplier),
        None,
    ))
}

pub async fn category_stats(state: &AppState) -> AppResult<ApiResponse<SupplierCategoryStats>> {
    let levels: Vec<(String, i64, i64, Option<f64>, Option<f64>)> = sqlx::query_as(
        r#"
        SELECT
            certification_level,
            COUNT(*),
            COUNT(*) FILTER (WHERE verified),
            AVG(sustainability_score),
            AVG(performance_rating)
        FROM suppliers
        WHERE is_active = TRUE
        GROUP BY certification_level
        ORDER BY COUNT(*) DESC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    let specialties: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT spec, COUNT(*)
        FROM suppliers, jsonb_array_elements_text(specialties) AS spec
        WHERE is_active = TRUE
        GROUP BY spec
        ORDER BY COUNT(*) DESC, spec
        LIMIT 10
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    let data = SupplierCategoryStats {
        certification_levels: levels
            .into_iter()
            .map(
                |(certification_level, supplier_count, verified_count, avg_s, avg_p)| {
                    CertificationBucket {
                        certification_level,
                        supplier_count,
                        verified_count,
                        avg_sustainability: avg_s,
                        avg_performance: avg_p,
                    }
                },
            )
            .collect(),
        top_specialties: specialties
            .into_iter()
            .map(|(specialty, supplier_count)| SpecialtyBucket {
                specialty,
                supplier_count,
            })
            .collect(),
    };

    Ok(ApiResponse::data(data))
}

async fn find_active_supplier(state: &AppState, id: Uuid) -> AppResult<SupplierModel> {
    Suppliers::find_by_id(id)
        .filter(Column::IsActive.eq(true))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

fn validate_certification(level: &str) -> Result<(), AppError> {
    if CERTIFICATION_LEVELS.contains(&level) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Invalid certification level: {level}"
        )))
    }
}

async fn decorate_suppliers(
    state: &AppState,
    items: Vec<SupplierModel>,
) -> AppResult<Vec<SupplierDetail>> {
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = items.iter().map(|m| m.id).collect();

    let product_stats: HashMap<Uuid, (i64, i64, Option<f64>, Option<f64>)> =
        sqlx::query_as::<_, (Uuid, i64, i64, Option<f64>, Option<f64>)>(
            r#"
            SELECT
                supplier_id,
                COUNT(*),
                COUNT(*) FILTER (WHERE is_active),
                AVG(sustainability_score) FILTER (WHERE is_active),
                AVG(price) FILTER (WHERE is_active)
            FROM products
            WHERE supplier_id = ANY($1)
            GROUP BY supplier_id
            "#,
        )
        .bind(&ids)
        .fetch_all(&state.pool)
        .await?
        .into_iter()
        .map(|(id, total, active, avg_s, avg_p)| (id, (total, active, avg_s, avg_p)))
        .collect();

    let user_counts: HashMap<Uuid, i64> = sqlx::query_as::<_, (Uuid, i64)>(
        r#"
        SELECT supplier_id, COUNT(*)
        FROM users
        WHERE supplier_id = ANY($1) AND is_active = TRUE
        GROUP BY supplier_id
        "#,
    )
    .bind(&ids)
    .fetch_all(&state.pool)
    .await?
    .into_iter()
    .collect();

    Ok(items
        .into_iter()
        .map(|model| {
            let stats = product_stats.get(&model.id).copied().unwrap_or((0, 0, None, None));
            let user_count = user_counts.get(&model.id).copied().unwrap_or(0);
            SupplierDetail {
                total_products: stats.0,
                active_products: stats.1,
                avg_product_sustainability: stats.2,
                avg_product_price: stats.3,
                user_count,
                supplier: supplier_from_entity(model),
            }
        })
        .collect())
}

pub(crate) fn supplier_from_entity(model: SupplierModel) -> Supplier {
    Supplier {
        id: model.id,
        name: model.name,
        location: model.location,
        contact_email: model.contact_email,
        contact_phone: model.contact_phone,
        blockchain_address: model.blockchain_address,
        sustainability_score: model.sustainability_score,
        performance_rating: model.performance_rating,
        on_time_delivery: model.on_time_delivery,
        quality_score: model.quality_score,
        cost_efficiency: model.cost_efficiency,
        verified: model.verified,
        certification_level: model.certification_level,
        specialties: model.specialties,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
