use std::collections::HashMap;

use chrono::{Duration, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::products::ProductRef,
    dto::tracking::{
        BulkEventsRequest, BulkEventsResponse, CreateTrackingEventRequest, DeviceBreakdown,
        EventWithNames, LocationEvents, ProductEvents, ScanLogRef, ScanRequest, ScanResponse,
        ScanStats, ScannedProduct, TopScannedProduct, UpdateEventLocationRequest,
    },
    entity::tracking_events::{ActiveModel, Column, Entity as TrackingEvents, Model as EventModel},
    entity::{products, qr_scan_logs, suppliers, users},
    error::{AppError, AppResult},
    events::{EventKind, product_room},
    middleware::auth::{AuthUser, OptionalAuthUser, ensure_roles},
    models::{Role, TRACKING_STATUSES, TrackingEvent, device_type_from_user_agent},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::blockchain_service,
    state::AppState,
};

pub async fn create_event(
    state: &AppState,
    user: &AuthUser,
    payload: CreateTrackingEventRequest,
) -> AppResult<ApiResponse<TrackingEvent>> {
    ensure_roles(user, &[Role::Admin, Role::Staff, Role::Supplier])?;
    validate_status(&payload.status)?;
    ensure_active_product(state, payload.product_id).await?;

    let event = insert_event(state, &payload, Some(user.user_id), None).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "tracking_event_create",
        Some("tracking_events"),
        Some(serde_json::json!({
            "event_id": event.id,
            "product_id": event.product_id,
            "status": event.status,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let result = event_from_entity(event);
    publish_tracking_update(state, &result);

    Ok(ApiResponse::success(
        "Tracking event created successfully",
        result,
        None,
    ))
}

pub async fn product_events(
    state: &AppState,
    product_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<ProductEvents>> {
    let product = ensure_active_product(state, product_id).await?;
    let (page, limit, offset) = pagination.normalize();

    let finder = TrackingEvents::find()
        .filter(Column::ProductId.eq(product_id))
        .order_by_desc(Column::Timestamp);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let scanner_ids: Vec<Uuid> = items.iter().filter_map(|e| e.scanned_by).collect();
    let names = user_names(state, scanner_ids).await?;

    let events = items
        .into_iter()
        .map(|model| {
            let scanned_by_name = model.scanned_by.and_then(|id| names.get(&id).cloned());
            EventWithNames {
                product_name: Some(product.name.clone()),
                product_sku: Some(product.sku.clone()),
                product_category: Some(product.category.clone()),
                supplier_name: None,
                scanned_by_name,
                event: event_from_entity(model),
            }
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Tracking events",
        ProductEvents {
            product: ProductRef {
                id: product.id,
                name: product.name,
            },
            events,
        },
        Some(meta),
    ))
}

#[derive(sqlx::FromRow)]
struct DecoratedEventRow {
    #[sqlx(flatten)]
    event: TrackingEvent,
    product_name: Option<String>,
    product_sku: Option<String>,
    product_category: Option<String>,
    supplier_name: Option<String>,
    scanned_by_name: Option<String>,
}

impl From<DecoratedEventRow> for EventWithNames {
    fn from(row: DecoratedEventRow) -> Self {
        EventWithNames {
            event: row.event,
            product_name: row.product_name,
            product_sku: row.product_sku,
            product_category: row.product_category,
            supplier_name: row.supplier_name,
            scanned_by_name: row.scanned_by_name,
        }
    }
}

pub async fn recent_events(
    state: &AppState,
    limit: Option<i64>,
) -> AppResult<ApiResponse<Vec<EventWithNames>>> {
    let limit = limit.unwrap_or(20).clamp(1, 100);

    let rows: Vec<DecoratedEventRow> = sqlx::query_as(
        r#"
        SELECT te.*,
               p.name AS product_name,
               p.sku AS product_sku,
               p.category AS product_category,
               s.name AS supplier_name,
               u.name AS scanned_by_name
        FROM tracking_events te
        JOIN products p ON p.id = te.product_id AND p.is_active = TRUE
        LEFT JOIN suppliers s ON s.id = p.supplier_id
        LEFT JOIN users u ON u.id = te.scanned_by
        ORDER BY te.timestamp DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::data(rows.into_iter().map(Into::into).collect()))
}

pub async fn update_event_location(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateEventLocationRequest,
) -> AppResult<ApiResponse<TrackingEvent>> {
    ensure_roles(user, &[Role::Admin, Role::Staff, Role::Supplier])?;
    if payload.location.is_empty() {
        return Err(AppError::BadRequest("Location is required".into()));
    }
    if let Some(status) = payload.status.as_ref() {
        validate_status(status)?;
    }

    let updated: Option<TrackingEvent> = sqlx::query_as(
        r#"
        UPDATE tracking_events
        SET location = $1, coordinates = $2, status = COALESCE($3, status)
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(payload.location)
    .bind(payload.coordinates)
    .bind(payload.status)
    .bind(id)
    .fetch_optional(&state.pool)
    .await?;

    let event = match updated {
        Some(e) => e,
        None => return Err(AppError::NotFound),
    };

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "tracking_event_relocate",
        Some("tracking_events"),
        Some(serde_json::json!({ "event_id": id, "location": event.location })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    publish_tracking_update(state, &event);

    Ok(ApiResponse::success(
        "Location updated successfully",
        event,
        None,
    ))
}

pub async fn scan(
    state: &AppState,
    user: &OptionalAuthUser,
    user_agent: Option<String>,
    payload: ScanRequest,
) -> AppResult<ApiResponse<ScanResponse>> {
    let product = ensure_active_product(state, payload.product_id).await?;
    let supplier = suppliers::Entity::find_by_id(product.supplier_id)
        .one(&state.orm)
        .await?;

    let scanned_by = user.0.as_ref().map(|u| u.user_id);
    let agent = user_agent.unwrap_or_else(|| "Unknown".to_string());
    let device_info = serde_json::json!({
        "user_agent": agent,
        "device_type": device_type_from_user_agent(&agent),
    });

    let scan_id = Uuid::new_v4();
    let scan_log = qr_scan_logs::ActiveModel {
        id: Set(scan_id),
        product_id: Set(product.id),
        scanned_by: Set(scanned_by),
        scan_location: Set(payload.scan_location.clone()),
        coordinates: Set(payload.coordinates.clone()),
        device_info: Set(device_info.clone()),
        scan_result: Set("success".to_string()),
        timestamp: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let event_request = CreateTrackingEventRequest {
        product_id: product.id,
        location: payload.scan_location.clone(),
        status: "in_store".to_string(),
        description: format!("QR code scanned at {}", payload.scan_location),
        coordinates: payload.coordinates,
        temperature: None,
        humidity: None,
        blockchain_tx_hash: None,
        metadata: None,
    };
    insert_event(state, &event_request, scanned_by, Some(device_info.clone())).await?;

    blockchain_service::record_confirmed_transaction(
        state,
        product.id,
        "verify",
        serde_json::json!({
            "scan_location": payload.scan_location,
            "device_type": device_info["device_type"],
        }),
    )
    .await?;

    let latest: Option<EventModel> = TrackingEvents::find()
        .filter(Column::ProductId.eq(product.id))
        .order_by_desc(Column::Timestamp)
        .one(&state.orm)
        .await?;
    let latest_tracking = latest.map(event_from_entity);

    tracing::info!(
        product_id = %product.id,
        scan_location = %payload.scan_location,
        "QR code scanned"
    );

    if let Some(event) = latest_tracking.as_ref() {
        publish_tracking_update(state, event);
    }

    let data = ScanResponse {
        product: ScannedProduct {
            id: product.id,
            name: product.name,
            sku: product.sku,
            category: product.category,
            supplier_name: supplier.map(|s| s.name).unwrap_or_else(|| "Unknown".into()),
            sustainability_score: product.sustainability_score,
            price: product.price,
        },
        latest_tracking,
        scan_log: ScanLogRef {
            id: scan_log.id,
            timestamp: scan_log.timestamp.with_timezone(&Utc),
        },
    };

    Ok(ApiResponse::success("Product scanned successfully", data, None))
}

pub async fn scan_stats(
    state: &AppState,
    timeframe: Option<String>,
) -> AppResult<ApiResponse<ScanStats>> {
    let timeframe = timeframe.unwrap_or_else(|| "7d".to_string());
    let days = match timeframe.as_str() {
        "1d" => 1,
        "7d" => 7,
        "30d" => 30,
        "90d" => 90,
        other => {
            return Err(AppError::BadRequest(format!("Invalid timeframe: {other}")));
        }
    };
    let since = Utc::now() - Duration::days(days);

    let totals: (i64, i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*),
            COUNT(DISTINCT product_id),
            COUNT(DISTINCT scanned_by),
            COUNT(*) FILTER (WHERE scan_result = 'success')
        FROM qr_scan_logs
        WHERE timestamp >= $1
        "#,
    )
    .bind(since)
    .fetch_one(&state.pool)
    .await?;

    let devices: (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*) FILTER (WHERE device_info->>'device_type' = 'mobile'),
            COUNT(*) FILTER (WHERE device_info->>'device_type' = 'tablet'),
            COUNT(*) FILTER (WHERE device_info->>'device_type' = 'desktop')
        FROM qr_scan_logs
        WHERE timestamp >= $1
        "#,
    )
    .bind(since)
    .fetch_one(&state.pool)
    .await?;

    let top: Vec<(String, String, i64)> = sqlx::query_as(
        r#"
        SELECT p.name, p.sku, COUNT(q.id)
        FROM qr_scan_logs q
        JOIN products p ON p.id = q.product_id
        WHERE q.timestamp >= $1
        GROUP BY p.id, p.name, p.sku
        ORDER BY COUNT(q.id) DESC
        LIMIT 10
        "#,
    )
    .bind(since)
    .fetch_all(&state.pool)
    .await?;

    let (total_scans, unique_products_scanned, unique_scanners, successful_scans) = totals;
    let success_rate = if total_scans > 0 {
        successful_scans as f64 / total_scans as f64 * 100.0
    } else {
        0.0
    };

    let data = ScanStats {
        timeframe,
        total_scans,
        unique_products_scanned,
        unique_scanners,
        successful_scans,
        success_rate,
        device_breakdown: DeviceBreakdown {
            mobile: devices.0,
            tablet: devices.1,
            desktop: devices.2,
        },
        top_products: top
            .into_iter()
            .map(|(product_name, sku, scan_count)| TopScannedProduct {
                product_name,
                sku,
                scan_count,
            })
            .collect(),
    };

    Ok(ApiResponse::data(data))
}

pub async fn events_by_location(
    state: &AppState,
    location: String,
    pagination: Pagination,
) -> AppResult<ApiResponse<LocationEvents>> {
    let (page, limit, offset) = pagination.normalize();
    let pattern = format!("%{location}%");

    let rows: Vec<DecoratedEventRow> = sqlx::query_as(
        r#"
        SELECT te.*,
               p.name AS product_name,
               p.sku AS product_sku,
               p.category AS product_category,
               s.name AS supplier_name,
               u.name AS scanned_by_name
        FROM tracking_events te
        JOIN products p ON p.id = te.product_id AND p.is_active = TRUE
        LEFT JOIN suppliers s ON s.id = p.supplier_id
        LEFT JOIN users u ON u.id = te.scanned_by
        WHERE te.location ILIKE $1
        ORDER BY te.timestamp DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(&pattern)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM tracking_events te
        JOIN products p ON p.id = te.product_id AND p.is_active = TRUE
        WHERE te.location ILIKE $1
        "#,
    )
    .bind(&pattern)
    .fetch_one(&state.pool)
    .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "Tracking events",
        LocationEvents {
            location,
            events: rows.into_iter().map(Into::into).collect(),
        },
        Some(meta),
    ))
}

pub async fn bulk_create(
    state: &AppState,
    user: &AuthUser,
    payload: BulkEventsRequest,
) -> AppResult<ApiResponse<BulkEventsResponse>> {
    ensure_roles(user, &[Role::Admin, Role::Staff])?;
    if payload.events.is_empty() {
        return Err(AppError::BadRequest("Events array is required".into()));
    }
    if payload.events.len() > 100 {
        return Err(AppError::BadRequest(
            "Maximum 100 events allowed per bulk request".into(),
        ));
    }

    // One transaction: a single invalid product id rolls back the batch.
    let txn = state.orm.begin().await?;
    let mut created = Vec::with_capacity(payload.events.len());
    for event in &payload.events {
        validate_status(&event.status)?;
        let exists = products::Entity::find_by_id(event.product_id)
            .filter(products::Column::IsActive.eq(true))
            .one(&txn)
            .await?;
        if exists.is_none() {
            return Err(AppError::BadRequest(format!(
                "Unknown product in bulk request: {}",
                event.product_id
            )));
        }

        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(event.product_id),
            location: Set(event.location.clone()),
            status: Set(event.status.clone()),
            description: Set(event.description.clone()),
            coordinates: Set(event.coordinates.clone()),
            temperature: Set(event.temperature),
            humidity: Set(event.humidity),
            blockchain_tx_hash: Set(event.blockchain_tx_hash.clone()),
            scanned_by: Set(Some(user.user_id)),
            device_info: Set(None),
            metadata: Set(event.metadata.clone()),
            timestamp: NotSet,
        }
        .insert(&txn)
        .await?;
        created.push(event_from_entity(model));
    }
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "tracking_events_bulk_create",
        Some("tracking_events"),
        Some(serde_json::json!({ "count": created.len() })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let count = created.len();
    Ok(ApiResponse::success(
        format!("{count} tracking events created successfully"),
        BulkEventsResponse {
            created_events: created,
            count,
        },
        None,
    ))
}

async fn insert_event(
    state: &AppState,
    payload: &CreateTrackingEventRequest,
    scanned_by: Option<Uuid>,
    device_info: Option<serde_json::Value>,
) -> AppResult<EventModel> {
    let model = ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(payload.product_id),
        location: Set(payload.location.clone()),
        status: Set(payload.status.clone()),
        description: Set(payload.description.clone()),
        coordinates: Set(payload.coordinates.clone()),
        temperature: Set(payload.temperature),
        humidity: Set(payload.humidity),
        blockchain_tx_hash: Set(payload.blockchain_tx_hash.clone()),
        scanned_by: Set(scanned_by),
        device_info: Set(device_info),
        metadata: Set(payload.metadata.clone()),
        timestamp: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(model)
}

async fn ensure_active_product(
    state: &AppState,
    id: Uuid,
) -> AppResult<products::Model> {
    products::Entity::find_by_id(id)
        .filter(products::Column::IsActive.eq(true))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
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

fn publish_tracking_update(state: &AppState, event: &TrackingEvent) {
    state.events.publish(
        EventKind::TrackingUpdate,
        product_room(event.product_id),
        serde_json::json!({
            "event_id": event.id,
            "product_id": event.product_id,
            "status": event.status,
            "location": event.location,
        }),
    );
}

fn validate_status(status: &str) -> Result<(), AppError> {
    if TRACKING_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("Invalid status: {status}")))
    }
}

pub(crate) fn event_from_entity(model: EventModel) -> TrackingEvent {
    TrackingEvent {
        id: model.id,
        product_id: model.product_id,
        location: model.location,
        status: model.status,
        description: model.description,
        coordinates: model.coordinates,
        temperature: model.temperature,
        humidity: model.humidity,
        blockchain_tx_hash: model.blockchain_tx_hash,
        scanned_by: model.scanned_by,
        device_info: model.device_info,
        metadata: model.metadata,
        timestamp: model.timestamp.with_timezone(&Utc),
    }
}
