use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::consts as perm;
use crate::entities::reservation::Model as ReservationModel;
use crate::services::reservations::{parse_reservation_status, CreateReservationRequest};
use crate::{auth::AuthUser, errors::ServiceError, ApiResponse, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReservationListQuery {
    /// Defaults to today (UTC) when omitted
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetReservationStatusRequest {
    pub status: String,
}

/// List reservations for a day
#[utoipa::path(
    get,
    path = "/api/v1/reservations",
    params(("date" = Option<NaiveDate>, Query, description = "Day to list (default: today)")),
    responses(
        (status = 200, description = "Reservations retrieved", body = ApiResponse<Vec<ReservationModel>>),
    ),
    security(("Bearer" = []))
)]
pub async fn list_reservations(
    State(state): State<AppState>,
    Query(query): Query<ReservationListQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<ReservationModel>>>, ServiceError> {
    auth_user.require_permission(perm::RESERVATIONS_READ)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let date = query.date.unwrap_or_else(|| chrono::Utc::now().date_naive());
    let reservations = state
        .services
        .reservations
        .list_for_date(restaurant_id, date)
        .await?;
    Ok(Json(ApiResponse::success(reservations)))
}

/// Book a table
#[utoipa::path(
    post,
    path = "/api/v1/reservations",
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reservation created", body = ApiResponse<ReservationModel>),
        (status = 409, description = "Table already reserved in that window", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_reservation(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReservationModel>>), ServiceError> {
    auth_user.require_permission(perm::RESERVATIONS_WRITE)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let reservation = state
        .services
        .reservations
        .create_reservation(restaurant_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(reservation))))
}

/// Get a reservation
#[utoipa::path(
    get,
    path = "/api/v1/reservations/{id}",
    params(("id" = Uuid, Path, description = "Reservation id")),
    responses(
        (status = 200, description = "Reservation retrieved", body = ApiResponse<ReservationModel>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<ReservationModel>>, ServiceError> {
    auth_user.require_permission(perm::RESERVATIONS_READ)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let reservation = state
        .services
        .reservations
        .get_reservation(restaurant_id, id)
        .await?;
    Ok(Json(ApiResponse::success(reservation)))
}

/// Move a reservation through its lifecycle
#[utoipa::path(
    put,
    path = "/api/v1/reservations/{id}/status",
    params(("id" = Uuid, Path, description = "Reservation id")),
    request_body = SetReservationStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<ReservationModel>),
        (status = 409, description = "Reservation already terminal", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_reservation_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(payload): Json<SetReservationStatusRequest>,
) -> Result<Json<ApiResponse<ReservationModel>>, ServiceError> {
    auth_user.require_permission(perm::RESERVATIONS_WRITE)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let status = parse_reservation_status(&payload.status)?;
    let reservation = state
        .services
        .reservations
        .update_status(restaurant_id, id, status)
        .await?;
    Ok(Json(ApiResponse::success(reservation)))
}
