use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};

use crate::{
    dto::analytics::{
        DashboardStats, ExportRequest, ExportResponse, PerformanceReport, PredictionsSummary,
        SupplyChainMetrics, SustainabilityReport,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::TimeframeQuery,
    services::analytics_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/supply-chain", get(supply_chain))
        .route("/sustainability", get(sustainability))
        .route("/performance", get(performance))
        .route("/predictions", get(predictions))
        .route("/export", post(export))
}

#[utoipa::path(
    get,
    path = "/api/analytics/dashboard",
    responses(
        (status = 200, description = "Dashboard statistics", body = ApiResponse<DashboardStats>)
    ),
    tag = "Analytics"
)]
pub async fn dashboard(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    let resp = analytics_service::dashboard(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/analytics/supply-chain",
    responses(
        (status = 200, description = "Supply chain metrics", body = ApiResponse<SupplyChainMetrics>)
    ),
    tag = "Analytics"
)]
pub async fn supply_chain(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<SupplyChainMetrics>>> {
    let resp = analytics_service::supply_chain(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/analytics/sustainability", tag = "Analytics")]
pub async fn sustainability(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<SustainabilityReport>>> {
    let resp = analytics_service::sustainability(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/analytics/performance",
    params(("timeframe" = Option<String>, Query, description = "7d, 30d, 90d, 1y; default 30d")),
    responses(
        (status = 200, description = "Performance analytics", body = ApiResponse<PerformanceReport>)
    ),
    tag = "Analytics"
)]
pub async fn performance(
    State(state): State<AppState>,
    Query(query): Query<TimeframeQuery>,
) -> AppResult<Json<ApiResponse<PerformanceReport>>> {
    let resp = analytics_service::performance(&state, query.timeframe).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/analytics/predictions", tag = "Analytics")]
pub async fn predictions(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<PredictionsSummary>>> {
    let resp = analytics_service::predictions(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/analytics/export",
    request_body = ExportRequest,
    responses(
        (status = 200, description = "Exported record sets", body = ApiResponse<ExportResponse>),
        (status = 400, description = "Invalid export type or format"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn export(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ExportRequest>,
) -> AppResult<Json<ApiResponse<ExportResponse>>> {
    let resp = analytics_service::export(&state, &user, payload).await?;
    Ok(Json(resp))
}
