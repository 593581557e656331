use chrono::{DateTime, Duration, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::{
    audit::log_audit,
    dto::analytics::{
        CategorySustainability, CertificationShare, DailyScanPoint, DailyTrackingPoint,
        DashboardStats, ExportRequest, ExportResponse, PerformanceReport, PredictionEntry,
        PredictionsSummary, SupplyChainMetrics, SustainabilityReport, TopLocationPoint,
        TopSupplierPoint, TopSustainableProduct,
    },
    entity::{blockchain_transactions, products, suppliers, tracking_events},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_roles},
    models::Role,
    response::ApiResponse,
    state::AppState,
};

// Demo-grade constants for figures the tracking data cannot produce yet.
const CO2_SAVINGS_FACTOR: f64 = 0.45;
const REVENUE_IMPACT_PER_PRODUCT: f64 = 1_500.0;
const COST_SAVINGS_PER_VERIFIED_SUPPLIER: f64 = 2_500.0;
const PLACEHOLDER_DELIVERY_DAYS: f64 = 3.2;
const PLACEHOLDER_SATISFACTION: f64 = 4.7;
const ON_TIME_WINDOW_HOURS: f64 = 72.0;

pub async fn dashboard(state: &AppState) -> AppResult<ApiResponse<DashboardStats>> {
    let month_ago = Utc::now() - Duration::days(30);
    let day_ago = Utc::now() - Duration::hours(24);

    let product_stats: (i64, i64, Option<f64>, Option<f64>) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*),
            COUNT(*) FILTER (WHERE is_active),
            AVG(sustainability_score),
            SUM(carbon_footprint)
        FROM products
        "#,
    )
    .fetch_one(&state.pool)
    .await?;

    let supplier_stats: (i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*), COUNT(*) FILTER (WHERE verified)
        FROM suppliers
        WHERE is_active = TRUE
        "#,
    )
    .fetch_one(&state.pool)
    .await?;

    let tracking_stats: (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*),
            COUNT(*) FILTER (WHERE status = 'in_transit'),
            COUNT(*) FILTER (WHERE timestamp >= $2)
        FROM tracking_events
        WHERE timestamp >= $1
        "#,
    )
    .bind(month_ago)
    .bind(day_ago)
    .fetch_one(&state.pool)
    .await?;

    let scan_stats: (i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*), COUNT(*) FILTER (WHERE timestamp >= $2)
        FROM qr_scan_logs
        WHERE timestamp >= $1
        "#,
    )
    .bind(month_ago)
    .bind(day_ago)
    .fetch_one(&state.pool)
    .await?;

    let blockchain_stats: (i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*), COUNT(*) FILTER (WHERE status = 'confirmed')
        FROM blockchain_transactions
        WHERE timestamp >= $1
        "#,
    )
    .bind(month_ago)
    .fetch_one(&state.pool)
    .await?;

    let (_, active_products, _, total_carbon) = product_stats;
    let (_, verified_suppliers) = supplier_stats;
    let (_, active_shipments, daily_tracking_scans) = tracking_stats;
    let (_, daily_qr_scans) = scan_stats;
    let (blockchain_transactions, _) = blockchain_stats;

    let total_carbon = total_carbon.unwrap_or(0.0);

    let data = DashboardStats {
        products_tracked: active_products,
        active_shipments,
        verified_suppliers,
        co2_saved: total_carbon * CO2_SAVINGS_FACTOR,
        daily_scans: daily_tracking_scans + daily_qr_scans,
        blockchain_transactions,
        average_delivery_time: PLACEHOLDER_DELIVERY_DAYS,
        customer_satisfaction: PLACEHOLDER_SATISFACTION,
        revenue_impact: active_products as f64 * REVENUE_IMPACT_PER_PRODUCT,
        cost_savings: verified_suppliers as f64 * COST_SAVINGS_PER_VERIFIED_SUPPLIER,
    };

    Ok(ApiResponse::data(data))
}

pub async fn supply_chain(state: &AppState) -> AppResult<ApiResponse<SupplyChainMetrics>> {
    let quarter_ago = Utc::now() - Duration::days(90);
    let month_ago = Utc::now() - Duration::days(30);

    // Delivery performance from created -> delivered event pairs per product.
    let delivery: (i64, i64, Option<f64>) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*),
            COUNT(*) FILTER (WHERE EXTRACT(EPOCH FROM (d.ts - c.ts)) / 3600.0 <= $2),
            AVG(EXTRACT(EPOCH FROM (d.ts - c.ts)) / 3600.0)
        FROM (
            SELECT product_id, MIN(timestamp) AS ts
            FROM tracking_events
            WHERE status = 'created' AND timestamp >= $1
            GROUP BY product_id
        ) c
        JOIN (
            SELECT product_id, MAX(timestamp) AS ts
            FROM tracking_events
            WHERE status = 'delivered'
            GROUP BY product_id
        ) d USING (product_id)
        "#,
    )
    .bind(quarter_ago)
    .bind(ON_TIME_WINDOW_HOURS)
    .fetch_one(&state.pool)
    .await?;

    let quality: (Option<f64>, Option<f64>, Option<f64>, Option<f64>) = sqlx::query_as(
        r#"
        SELECT
            AVG(performance_rating),
            AVG(cost_efficiency),
            AVG(CASE WHEN quality_score >= 4.0 THEN 100.0 ELSE quality_score * 20.0 END),
            AVG(sustainability_score)
        FROM suppliers
        WHERE is_active = TRUE
        "#,
    )
    .fetch_one(&state.pool)
    .await?;

    let sustainability: (Option<f64>, Option<f64>) = sqlx::query_as(
        r#"
        SELECT AVG(sustainability_score), SUM(carbon_footprint)
        FROM products
        WHERE is_active = TRUE
        "#,
    )
    .fetch_one(&state.pool)
    .await?;

    let inventory: (Option<f64>, i64) = sqlx::query_as(
        r#"
        SELECT SUM(p.price * i.quantity), COUNT(DISTINCT i.product_id)
        FROM inventory i
        JOIN products p ON p.id = i.product_id AND p.is_active = TRUE
        "#,
    )
    .fetch_one(&state.pool)
    .await?;

    let turnover: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(DISTINCT te.product_id)
        FROM tracking_events te
        JOIN inventory i ON i.product_id = te.product_id
        WHERE te.timestamp >= $1
        "#,
    )
    .bind(month_ago)
    .fetch_one(&state.pool)
    .await?;

    let (total_deliveries, on_time, _avg_hours) = delivery;
    let on_time_delivery = if total_deliveries > 0 {
        on_time as f64 / total_deliveries as f64 * 100.0
    } else {
        0.0
    };

    let total_carbon = sustainability.1.unwrap_or(0.0);
    let inventory_value = inventory.0.unwrap_or(0.0);
    let stocked_products = inventory.1;
    let inventory_turnover = if stocked_products > 0 {
        turnover.0 as f64 / stocked_products as f64
    } else {
        0.0
    };
    let waste_reduction = if inventory_value > 0.0 {
        (100.0 - total_carbon / inventory_value * 10_000.0).max(0.0)
    } else {
        0.0
    };

    let data = SupplyChainMetrics {
        on_time_delivery,
        quality_score: quality.2.unwrap_or(0.0),
        sustainability_score: sustainability.0.unwrap_or(0.0),
        cost_efficiency: quality.1.unwrap_or(0.0),
        carbon_footprint: total_carbon,
        supplier_performance: quality.0.unwrap_or(0.0),
        inventory_turnover,
        waste_reduction,
    };

    Ok(ApiResponse::data(data))
}

pub async fn sustainability(state: &AppState) -> AppResult<ApiResponse<SustainabilityReport>> {
    let categories: Vec<(String, i64, Option<f64>, Option<f64>)> = sqlx::query_as(
        r#"
        SELECT category, COUNT(*), AVG(sustainability_score), SUM(carbon_footprint)
        FROM products
        WHERE is_active = TRUE
        GROUP BY category
        ORDER BY AVG(sustainability_score) DESC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    let top_products: Vec<(String, String, String, f64)> = sqlx::query_as(
        r#"
        SELECT name, sku, category, sustainability_score
        FROM products
        WHERE is_active = TRUE
        ORDER BY sustainability_score DESC, created_at DESC
        LIMIT 10
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    let certifications: Vec<(String, i64, Option<f64>)> = sqlx::query_as(
        r#"
        SELECT certification_level, COUNT(*), AVG(sustainability_score)
        FROM suppliers
        WHERE is_active = TRUE
        GROUP BY certification_level
        ORDER BY COUNT(*) DESC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    let data = SustainabilityReport {
        categories: categories
            .into_iter()
            .map(|(category, product_count, avg, carbon)| CategorySustainability {
                category,
                product_count,
                avg_sustainability: avg.unwrap_or(0.0),
                total_carbon_footprint: carbon.unwrap_or(0.0),
            })
            .collect(),
        top_products: top_products
            .into_iter()
            .map(|(name, sku, category, sustainability_score)| TopSustainableProduct {
                name,
                sku,
                category,
                sustainability_score,
            })
            .collect(),
        certification_breakdown: certifications
            .into_iter()
            .map(|(certification_level, supplier_count, avg)| CertificationShare {
                certification_level,
                supplier_count,
                avg_sustainability: avg.unwrap_or(0.0),
            })
            .collect(),
    };

    Ok(ApiResponse::data(data))
}

pub async fn performance(
    state: &AppState,
    timeframe: Option<String>,
) -> AppResult<ApiResponse<PerformanceReport>> {
    let timeframe = timeframe.unwrap_or_else(|| "30d".to_string());
    let days = match timeframe.as_str() {
        "7d" => 7,
        "30d" => 30,
        "90d" => 90,
        "1y" => 365,
        other => {
            return Err(AppError::BadRequest(format!("Invalid timeframe: {other}")));
        }
    };
    let since = Utc::now() - Duration::days(days);

    let daily_tracking: Vec<(String, i64, i64, i64)> = sqlx::query_as(
        r#"
        SELECT
            TO_CHAR(DATE_TRUNC('day', timestamp), 'YYYY-MM-DD'),
            COUNT(DISTINCT product_id),
            COUNT(*),
            COUNT(*) FILTER (WHERE status = 'delivered')
        FROM tracking_events
        WHERE timestamp >= $1
        GROUP BY DATE_TRUNC('day', timestamp)
        ORDER BY DATE_TRUNC('day', timestamp)
        "#,
    )
    .bind(since)
    .fetch_all(&state.pool)
    .await?;

    let daily_scans: Vec<(String, i64, i64)> = sqlx::query_as(
        r#"
        SELECT
            TO_CHAR(DATE_TRUNC('day', timestamp), 'YYYY-MM-DD'),
            COUNT(*),
            COUNT(DISTINCT product_id)
        FROM qr_scan_logs
        WHERE timestamp >= $1
        GROUP BY DATE_TRUNC('day', timestamp)
        ORDER BY DATE_TRUNC('day', timestamp)
        "#,
    )
    .bind(since)
    .fetch_all(&state.pool)
    .await?;

    let top_suppliers: Vec<(String, f64, i64, Option<f64>)> = sqlx::query_as(
        r#"
        SELECT
            s.name,
            s.performance_rating,
            COUNT(p.id) FILTER (WHERE p.is_active),
            AVG(p.sustainability_score) FILTER (WHERE p.is_active)
        FROM suppliers s
        LEFT JOIN products p ON p.supplier_id = s.id
        WHERE s.is_active = TRUE
        GROUP BY s.id, s.name, s.performance_rating
        ORDER BY s.performance_rating DESC
        LIMIT 10
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    let top_locations: Vec<(String, i64, i64)> = sqlx::query_as(
        r#"
        SELECT location, COUNT(*), COUNT(DISTINCT product_id)
        FROM tracking_events
        WHERE timestamp >= $1
        GROUP BY location
        ORDER BY COUNT(*) DESC
        LIMIT 10
        "#,
    )
    .bind(since)
    .fetch_all(&state.pool)
    .await?;

    let data = PerformanceReport {
        timeframe,
        daily_tracking: daily_tracking
            .into_iter()
            .map(|(day, products_tracked, total_events, deliveries)| DailyTrackingPoint {
                day,
                products_tracked,
                total_events,
                deliveries,
            })
            .collect(),
        daily_scans: daily_scans
            .into_iter()
            .map(|(day, scan_count, unique_products_scanned)| DailyScanPoint {
                day,
                scan_count,
                unique_products_scanned,
            })
            .collect(),
        top_suppliers: top_suppliers
            .into_iter()
            .map(
                |(name, performance_rating, product_count, avg_sustainability)| TopSupplierPoint {
                    name,
                    performance_rating,
                    product_count,
                    avg_sustainability,
                },
            )
            .collect(),
        top_locations: top_locations
            .into_iter()
            .map(|(location, event_count, unique_products)| TopLocationPoint {
                location,
                event_count,
                unique_products,
            })
            .collect(),
    };

    Ok(ApiResponse::data(data))
}

/// Placeholder forecast numbers derived from recent activity; there is no
/// model behind these, only the week's scan and tracking volume.
pub async fn predictions(state: &AppState) -> AppResult<ApiResponse<PredictionsSummary>> {
    let week_ago = Utc::now() - Duration::days(7);

    let volume: (i64, i64) = sqlx::query_as(
        r#"
        SELECT
            (SELECT COUNT(*) FROM qr_scan_logs WHERE timestamp >= $1),
            (SELECT COUNT(*) FROM tracking_events WHERE timestamp >= $1)
        "#,
    )
    .bind(week_ago)
    .fetch_one(&state.pool)
    .await?;

    let (weekly_scans, weekly_events) = volume;
    let daily_scan_rate = weekly_scans as f64 / 7.0;
    let daily_event_rate = weekly_events as f64 / 7.0;

    let summary = vec![
        PredictionEntry {
            prediction_type: "demand".to_string(),
            predicted_value: daily_scan_rate * 1.15,
            confidence_score: 0.72,
            factors: vec!["scan_volume".to_string(), "seasonality".to_string()],
            time_horizon_days: 7,
        },
        PredictionEntry {
            prediction_type: "inventory".to_string(),
            predicted_value: daily_event_rate * 0.85,
            confidence_score: 0.68,
            factors: vec![
                "tracking_volume".to_string(),
                "reorder_history".to_string(),
            ],
            time_horizon_days: 14,
        },
        PredictionEntry {
            prediction_type: "trend".to_string(),
            predicted_value: (daily_scan_rate + daily_event_rate) / 2.0,
            confidence_score: 0.61,
            factors: vec!["combined_activity".to_string()],
            time_horizon_days: 30,
        },
    ];

    let total_predictions = summary.len();
    Ok(ApiResponse::data(PredictionsSummary {
        summary,
        generated_at: Utc::now(),
        total_predictions,
    }))
}

pub async fn export(
    state: &AppState,
    user: &AuthUser,
    payload: ExportRequest,
) -> AppResult<ApiResponse<ExportResponse>> {
    ensure_roles(user, &[Role::Admin, Role::Staff])?;

    const EXPORT_TYPES: [&str; 5] = ["products", "suppliers", "tracking", "blockchain", "all"];
    if !EXPORT_TYPES.contains(&payload.export_type.as_str()) {
        return Err(AppError::BadRequest("Invalid export type".into()));
    }
    if payload.format != "json" {
        return Err(AppError::BadRequest("Invalid export format".into()));
    }

    let date_from: DateTime<Utc> = payload
        .date_from
        .unwrap_or_else(|| Utc::now() - Duration::days(30));
    let date_to: DateTime<Utc> = payload.date_to.unwrap_or_else(Utc::now);

    let mut sections = serde_json::Map::new();
    let wants = |section: &str| payload.export_type == "all" || payload.export_type == section;

    if wants("products") {
        let records = products::Entity::find()
            .filter(products::Column::IsActive.eq(true))
            .filter(products::Column::CreatedAt.gte(date_from))
            .filter(products::Column::CreatedAt.lte(date_to))
            .into_json()
            .all(&state.orm)
            .await?;
        sections.insert(
            "products".to_string(),
            serde_json::json!({ "count": records.len(), "records": records }),
        );
    }

    if wants("suppliers") {
        let records = suppliers::Entity::find()
            .filter(suppliers::Column::IsActive.eq(true))
            .filter(suppliers::Column::CreatedAt.gte(date_from))
            .filter(suppliers::Column::CreatedAt.lte(date_to))
            .into_json()
            .all(&state.orm)
            .await?;
        sections.insert(
            "suppliers".to_string(),
            serde_json::json!({ "count": records.len(), "records": records }),
        );
    }

    if wants("tracking") {
        let records = tracking_events::Entity::find()
            .filter(tracking_events::Column::Timestamp.gte(date_from))
            .filter(tracking_events::Column::Timestamp.lte(date_to))
            .into_json()
            .all(&state.orm)
            .await?;
        sections.insert(
            "tracking_events".to_string(),
            serde_json::json!({ "count": records.len(), "records": records }),
        );
    }

    if wants("blockchain") {
        let records = blockchain_transactions::Entity::find()
            .filter(blockchain_transactions::Column::Timestamp.gte(date_from))
            .filter(blockchain_transactions::Column::Timestamp.lte(date_to))
            .into_json()
            .all(&state.orm)
            .await?;
        sections.insert(
            "blockchain_transactions".to_string(),
            serde_json::json!({ "count": records.len(), "records": records }),
        );
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "analytics_export",
        Some("analytics"),
        Some(serde_json::json!({ "export_type": payload.export_type })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let data = ExportResponse {
        export_type: payload.export_type,
        format: payload.format,
        sections: serde_json::Value::Object(sections),
    };

    Ok(ApiResponse::success("Export generated", data, None))
}
