use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{response::ApiResponse, state::AppState};

#[derive(Serialize, ToSchema)]
pub struct HealthData {
    pub status: String,
    pub service: String,
    pub version: String,
    pub database: bool,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "OK", body = ApiResponse<HealthData>),
        (status = 503, description = "Database unreachable"),
    ),
    tag = "Health"
)]
pub async fn health_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<HealthData>>) {
    let database = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();

    let data = HealthData {
        status: if database { "ok" } else { "degraded" }.to_string(),
        service: "chaintrack-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
    };

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(ApiResponse::success("Health check", data, None)))
}
