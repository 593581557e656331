use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header::USER_AGENT},
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::tracking::{
        BulkEventsRequest, BulkEventsResponse, CreateTrackingEventRequest, EventWithNames,
        LocationEvents, ProductEvents, ScanRequest, ScanResponse, ScanStats,
        UpdateEventLocationRequest,
    },
    error::AppResult,
    middleware::auth::{AuthUser, OptionalAuthUser},
    models::TrackingEvent,
    response::ApiResponse,
    routes::params::{Pagination, RecentQuery, TimeframeQuery},
    services::tracking_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", post(create_event))
        .route("/events/recent", get(recent_events))
        .route("/events/bulk", post(bulk_create))
        .route("/events/{id}/location", put(update_event_location))
        .route("/products/{product_id}/events", get(product_events))
        .route("/scan", post(scan))
        .route("/scans/stats", get(scan_stats))
        .route("/locations/{location}/events", get(events_by_location))
}

#[utoipa::path(
    post,
    path = "/api/tracking/events",
    request_body = CreateTrackingEventRequest,
    responses(
        (status = 201, description = "Tracking event created", body = ApiResponse<TrackingEvent>),
        (status = 400, description = "Invalid status"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Tracking"
)]
pub async fn create_event(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateTrackingEventRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<TrackingEvent>>)> {
    let resp = tracking_service::create_event(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/tracking/products/{product_id}/events",
    params(
        ("product_id" = Uuid, Path, description = "Product ID"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "Tracking events for a product", body = ApiResponse<ProductEvents>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Tracking"
)]
pub async fn product_events(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ProductEvents>>> {
    let resp = tracking_service::product_events(&state, product_id, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/tracking/events/recent",
    params(("limit" = Option<i64>, Query, description = "Max events, default 20")),
    responses(
        (status = 200, description = "Recent tracking events", body = ApiResponse<Vec<EventWithNames>>)
    ),
    tag = "Tracking"
)]
pub async fn recent_events(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> AppResult<Json<ApiResponse<Vec<EventWithNames>>>> {
    let resp = tracking_service::recent_events(&state, query.limit).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/tracking/events/{id}/location",
    params(("id" = Uuid, Path, description = "Tracking event ID")),
    request_body = UpdateEventLocationRequest,
    responses(
        (status = 200, description = "Location updated", body = ApiResponse<TrackingEvent>),
        (status = 404, description = "Tracking event not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Tracking"
)]
pub async fn update_event_location(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEventLocationRequest>,
) -> AppResult<Json<ApiResponse<TrackingEvent>>> {
    let resp = tracking_service::update_event_location(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/tracking/scan",
    request_body = ScanRequest,
    responses(
        (status = 200, description = "Scan recorded", body = ApiResponse<ScanResponse>),
        (status = 404, description = "Product not found or inactive"),
    ),
    tag = "Tracking"
)]
pub async fn scan(
    State(state): State<AppState>,
    user: OptionalAuthUser,
    headers: axum::http::HeaderMap,
    Json(payload): Json<ScanRequest>,
) -> AppResult<Json<ApiResponse<ScanResponse>>> {
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());
    let resp = tracking_service::scan(&state, &user, user_agent, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/tracking/scans/stats",
    params(("timeframe" = Option<String>, Query, description = "1d, 7d, 30d, 90d; default 7d")),
    responses(
        (status = 200, description = "Scan statistics", body = ApiResponse<ScanStats>)
    ),
    tag = "Tracking"
)]
pub async fn scan_stats(
    State(state): State<AppState>,
    Query(query): Query<TimeframeQuery>,
) -> AppResult<Json<ApiResponse<ScanStats>>> {
    let resp = tracking_service::scan_stats(&state, query.timeframe).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/tracking/locations/{location}/events",
    params(
        ("location" = String, Path, description = "Location substring"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "Events at matching locations", body = ApiResponse<LocationEvents>)
    ),
    tag = "Tracking"
)]
pub async fn events_by_location(
    State(state): State<AppState>,
    Path(location): Path<String>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<LocationEvents>>> {
    let resp = tracking_service::events_by_location(&state, location, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/tracking/events/bulk",
    request_body = BulkEventsRequest,
    responses(
        (status = 201, description = "Bulk events created", body = ApiResponse<BulkEventsResponse>),
        (status = 400, description = "Too many events or unknown product"),
    ),
    security(("bearer_auth" = [])),
    tag = "Tracking"
)]
pub async fn bulk_create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<BulkEventsRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<BulkEventsResponse>>)> {
    let resp = tracking_service::bulk_create(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
