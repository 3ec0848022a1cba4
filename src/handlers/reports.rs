use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::consts as perm;
use crate::handlers::common::DateRangeQuery;
use crate::services::reports::{LowStockRow, MethodBreakdownRow, SalesSummary, TopItemRow};
use crate::{auth::AuthUser, errors::ServiceError, ApiResponse, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct TopItemsQuery {
    pub from: chrono::NaiveDate,
    pub to: Option<chrono::NaiveDate>,
    #[serde(default = "default_top_limit")]
    pub limit: usize,
}

fn default_top_limit() -> usize {
    10
}

/// Sales summary over a date range (PAID orders only)
#[utoipa::path(
    get,
    path = "/api/v1/reports/sales",
    params(
        ("from" = chrono::NaiveDate, Query, description = "Range start (inclusive)"),
        ("to" = Option<chrono::NaiveDate>, Query, description = "Range end (inclusive, default: from)"),
    ),
    responses(
        (status = 200, description = "Summary computed", body = ApiResponse<SalesSummary>),
    ),
    security(("Bearer" = []))
)]
pub async fn sales_summary(
    State(state): State<AppState>,
    Query(query): Query<DateRangeQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<SalesSummary>>, ServiceError> {
    auth_user.require_permission(perm::REPORTS_READ)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let (from, to) = query.datetime_bounds()?;
    let summary = state
        .services
        .reports
        .sales_summary(restaurant_id, from, to)
        .await?;
    Ok(Json(ApiResponse::success(summary)))
}

/// Signed per-method totals over the payment ledger
#[utoipa::path(
    get,
    path = "/api/v1/reports/payment-methods",
    params(
        ("from" = chrono::NaiveDate, Query, description = "Range start (inclusive)"),
        ("to" = Option<chrono::NaiveDate>, Query, description = "Range end (inclusive, default: from)"),
    ),
    responses(
        (status = 200, description = "Breakdown computed", body = ApiResponse<Vec<MethodBreakdownRow>>),
    ),
    security(("Bearer" = []))
)]
pub async fn payment_method_breakdown(
    State(state): State<AppState>,
    Query(query): Query<DateRangeQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<MethodBreakdownRow>>>, ServiceError> {
    auth_user.require_permission(perm::REPORTS_READ)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let (from, to) = query.datetime_bounds()?;
    let rows = state
        .services
        .reports
        .payment_method_breakdown(restaurant_id, from, to)
        .await?;
    Ok(Json(ApiResponse::success(rows)))
}

/// Top-selling items over a date range
#[utoipa::path(
    get,
    path = "/api/v1/reports/top-items",
    params(
        ("from" = chrono::NaiveDate, Query, description = "Range start (inclusive)"),
        ("to" = Option<chrono::NaiveDate>, Query, description = "Range end (inclusive, default: from)"),
        ("limit" = Option<usize>, Query, description = "Row cap (default: 10)"),
    ),
    responses(
        (status = 200, description = "Top items computed", body = ApiResponse<Vec<TopItemRow>>),
    ),
    security(("Bearer" = []))
)]
pub async fn top_items(
    State(state): State<AppState>,
    Query(query): Query<TopItemsQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<TopItemRow>>>, ServiceError> {
    auth_user.require_permission(perm::REPORTS_READ)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let range = DateRangeQuery {
        from: query.from,
        to: query.to,
    };
    let (from, to) = range.datetime_bounds()?;
    let rows = state
        .services
        .reports
        .top_items(restaurant_id, from, to, query.limit)
        .await?;
    Ok(Json(ApiResponse::success(rows)))
}

/// Current low-stock snapshot
#[utoipa::path(
    get,
    path = "/api/v1/reports/low-stock",
    responses(
        (status = 200, description = "Snapshot computed", body = ApiResponse<Vec<LowStockRow>>),
    ),
    security(("Bearer" = []))
)]
pub async fn low_stock(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<LowStockRow>>>, ServiceError> {
    auth_user.require_permission(perm::REPORTS_READ)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let rows = state.services.reports.low_stock(restaurant_id).await?;
    Ok(Json(ApiResponse::success(rows)))
}
