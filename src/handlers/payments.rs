use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::auth::consts as perm;
use crate::entities::payment::Model as PaymentModel;
use crate::services::payments::{
    PaymentReceipt, ProcessPaymentRequest, RefundPaymentRequest, SplitPaymentRequest,
};
use crate::{auth::AuthUser, errors::ServiceError, ApiResponse, AppState};

/// Record a payment against an order
#[utoipa::path(
    post,
    path = "/api/v1/payments",
    request_body = ProcessPaymentRequest,
    responses(
        (status = 201, description = "Payment recorded", body = ApiResponse<PaymentReceipt>),
        (status = 400, description = "Overpayment or cancelled order", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn process_payment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<ProcessPaymentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PaymentReceipt>>), ServiceError> {
    auth_user.require_permission(perm::PAYMENTS_PROCESS)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let receipt = state
        .services
        .payments
        .process_payment(restaurant_id, payload, Some(auth_user.user_id))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(receipt))))
}

/// Refund a payment, fully by default
#[utoipa::path(
    post,
    path = "/api/v1/payments/{id}/refund",
    params(("id" = Uuid, Path, description = "Payment id")),
    request_body = RefundPaymentRequest,
    responses(
        (status = 200, description = "Refund recorded", body = ApiResponse<PaymentReceipt>),
        (status = 400, description = "Refund exceeds payment", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn refund_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(payload): Json<RefundPaymentRequest>,
) -> Result<Json<ApiResponse<PaymentReceipt>>, ServiceError> {
    auth_user.require_permission(perm::PAYMENTS_REFUND)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let receipt = state
        .services
        .payments
        .refund_payment(restaurant_id, id, payload, Some(auth_user.user_id))
        .await?;
    Ok(Json(ApiResponse::success(receipt)))
}

/// Settle an order with several payments at once
#[utoipa::path(
    post,
    path = "/api/v1/payments/split",
    request_body = SplitPaymentRequest,
    responses(
        (status = 201, description = "Split recorded", body = ApiResponse<Vec<PaymentModel>>),
        (status = 400, description = "Split does not settle the balance", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn split_payment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<SplitPaymentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<PaymentModel>>>), ServiceError> {
    auth_user.require_permission(perm::PAYMENTS_PROCESS)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let rows = state
        .services
        .payments
        .split_payment(restaurant_id, payload, Some(auth_user.user_id))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(rows))))
}

/// Get a payment by id
#[utoipa::path(
    get,
    path = "/api/v1/payments/{id}",
    params(("id" = Uuid, Path, description = "Payment id")),
    responses(
        (status = 200, description = "Payment retrieved", body = ApiResponse<PaymentModel>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<PaymentModel>>, ServiceError> {
    auth_user.require_permission(perm::PAYMENTS_READ)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let payment = state.services.payments.get_payment(restaurant_id, id).await?;
    Ok(Json(ApiResponse::success(payment)))
}

/// List the payment ledger rows for an order
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/payments",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Payments retrieved", body = ApiResponse<Vec<PaymentModel>>),
    ),
    security(("Bearer" = []))
)]
pub async fn payments_for_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<PaymentModel>>>, ServiceError> {
    auth_user.require_permission(perm::PAYMENTS_READ)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let rows = state
        .services
        .payments
        .payments_for_order(restaurant_id, id)
        .await?;
    Ok(Json(ApiResponse::success(rows)))
}
