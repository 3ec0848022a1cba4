use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::consts as perm;
use crate::services::orders::{CreateOrderRequest, OrderLineRequest, OrderResponse, OrderStatus};
use crate::{
    auth::AuthUser, errors::ServiceError, ApiResponse, AppState, ListQuery, PaginatedResponse,
};

fn map_status_str(status: &str) -> Result<OrderStatus, ServiceError> {
    OrderStatus::from_str(&status.to_ascii_uppercase())
        .map_err(|_| ServiceError::ValidationError(format!("Unknown order status: {status}")))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddItemsRequest {
    pub items: Vec<OrderLineRequest>,
}

/// List orders
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
        ("status" = Option<String>, Query, description = "Filter by order status"),
    ),
    responses(
        (status = 200, description = "Orders retrieved", body = ApiResponse<PaginatedResponse<OrderResponse>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<PaginatedResponse<OrderResponse>>>, ServiceError> {
    auth_user.require_permission(perm::ORDERS_READ)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let status = query.status.as_deref().map(map_status_str).transpose()?;
    let (items, total) = state
        .services
        .orders
        .list_orders(restaurant_id, query.page, query.limit, status)
        .await?;

    let total_pages = total.div_ceil(query.limit.max(1));
    Ok(Json(ApiResponse::success(PaginatedResponse {
        items,
        total,
        page: query.page,
        limit: query.limit,
        total_pages,
    })))
}

/// Create a new order
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_order(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderResponse>>), ServiceError> {
    auth_user.require_permission(perm::ORDERS_CREATE)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let order = state
        .services
        .orders
        .create_order(restaurant_id, payload, Some(auth_user.user_id))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}

/// Get an order by id
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order retrieved", body = ApiResponse<OrderResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<OrderResponse>>, ServiceError> {
    auth_user.require_permission(perm::ORDERS_READ)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let order = state.services.orders.get_order(restaurant_id, id).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Get an order by its human-readable number
#[utoipa::path(
    get,
    path = "/api/v1/orders/by-number/{order_number}",
    params(("order_number" = String, Path, description = "Order number, e.g. ORD-000042")),
    responses(
        (status = 200, description = "Order retrieved", body = ApiResponse<OrderResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_order_by_number(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<OrderResponse>>, ServiceError> {
    auth_user.require_permission(perm::ORDERS_READ)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let order = state
        .services
        .orders
        .get_order_by_number(restaurant_id, &order_number)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Add items to an open order
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/items",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = AddItemsRequest,
    responses(
        (status = 200, description = "Items added", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Order closed or item unavailable", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn add_order_items(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(payload): Json<AddItemsRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>, ServiceError> {
    auth_user.require_permission(perm::ORDERS_UPDATE)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let order = state
        .services
        .orders
        .add_items(restaurant_id, id, payload.items)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Update an order's status
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<OrderResponse>),
        (status = 409, description = "Illegal transition", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>, ServiceError> {
    auth_user.require_permission(perm::ORDERS_UPDATE)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let status = map_status_str(&payload.status)?;
    let order = state
        .services
        .orders
        .update_status(restaurant_id, id, status)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Cancel an order
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order cancelled", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Order already completed", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<OrderResponse>>, ServiceError> {
    auth_user.require_permission(perm::ORDERS_CANCEL)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let order = state
        .services
        .orders
        .cancel_order(restaurant_id, id)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}
