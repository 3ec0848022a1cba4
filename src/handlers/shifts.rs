use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::auth::consts as perm;
use crate::entities::staff_shift::Model as StaffShiftModel;
use crate::handlers::common::DateRangeQuery;
use crate::services::shifts::ClockInRequest;
use crate::{auth::AuthUser, errors::ServiceError, ApiResponse, AppState};

/// Clock a staff member in
#[utoipa::path(
    post,
    path = "/api/v1/shifts/clock-in",
    request_body = ClockInRequest,
    responses(
        (status = 201, description = "Shift opened", body = ApiResponse<StaffShiftModel>),
        (status = 409, description = "Already clocked in", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn clock_in(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<ClockInRequest>,
) -> Result<(StatusCode, Json<ApiResponse<StaffShiftModel>>), ServiceError> {
    auth_user.require_permission(perm::SHIFTS_WRITE)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let shift = state.services.shifts.clock_in(restaurant_id, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(shift))))
}

/// Clock a staff member out
#[utoipa::path(
    post,
    path = "/api/v1/shifts/{id}/clock-out",
    params(("id" = Uuid, Path, description = "Shift id")),
    responses(
        (status = 200, description = "Shift closed", body = ApiResponse<StaffShiftModel>),
        (status = 400, description = "Shift already closed", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn clock_out(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<StaffShiftModel>>, ServiceError> {
    auth_user.require_permission(perm::SHIFTS_WRITE)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let shift = state.services.shifts.clock_out(restaurant_id, id).await?;
    Ok(Json(ApiResponse::success(shift)))
}

/// List shifts in a date range
#[utoipa::path(
    get,
    path = "/api/v1/shifts",
    params(
        ("from" = chrono::NaiveDate, Query, description = "Range start (inclusive)"),
        ("to" = Option<chrono::NaiveDate>, Query, description = "Range end (inclusive, default: from)"),
    ),
    responses(
        (status = 200, description = "Shifts retrieved", body = ApiResponse<Vec<StaffShiftModel>>),
    ),
    security(("Bearer" = []))
)]
pub async fn list_shifts(
    State(state): State<AppState>,
    Query(query): Query<DateRangeQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<StaffShiftModel>>>, ServiceError> {
    auth_user.require_permission(perm::SHIFTS_READ)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let (from, to) = query.bounds()?;
    let shifts = state
        .services
        .shifts
        .list_shifts(restaurant_id, from, to)
        .await?;
    Ok(Json(ApiResponse::success(shifts)))
}
