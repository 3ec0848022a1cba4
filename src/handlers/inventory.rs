use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::consts as perm;
use crate::entities::{
    inventory_item::Model as InventoryItemModel, inventory_movement::Model as InventoryMovementModel,
};
use crate::services::inventory::{
    CreateInventoryItemRequest, RecordMovementRequest, TransferRequest, UpdateInventoryItemRequest,
};
use crate::services::stock::{AvailabilityReport, StockLine};
use crate::{auth::AuthUser, errors::ServiceError, ApiResponse, AppState, PaginatedResponse};

#[derive(Debug, Deserialize, ToSchema)]
pub struct InventoryListQuery {
    pub category: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MovementHistoryQuery {
    #[serde(default = "crate::default_page")]
    pub page: u64,
    #[serde(default = "crate::default_limit")]
    pub limit: u64,
    pub item_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AvailabilityRequest {
    pub lines: Vec<AvailabilityLine>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AvailabilityLine {
    pub menu_item_id: Uuid,
    pub quantity: i32,
}

/// List inventory items
#[utoipa::path(
    get,
    path = "/api/v1/inventory",
    params(
        ("category" = Option<String>, Query, description = "Filter by category"),
        ("include_inactive" = Option<bool>, Query, description = "Include deactivated items"),
    ),
    responses(
        (status = 200, description = "Items retrieved", body = ApiResponse<Vec<InventoryItemModel>>),
    ),
    security(("Bearer" = []))
)]
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<InventoryListQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<InventoryItemModel>>>, ServiceError> {
    auth_user.require_permission(perm::INVENTORY_READ)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let items = state
        .services
        .inventory
        .list_items(restaurant_id, query.category, query.include_inactive)
        .await?;
    Ok(Json(ApiResponse::success(items)))
}

/// Create an inventory item
#[utoipa::path(
    post,
    path = "/api/v1/inventory",
    request_body = CreateInventoryItemRequest,
    responses(
        (status = 201, description = "Item created", body = ApiResponse<InventoryItemModel>),
        (status = 409, description = "Duplicate SKU", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_item(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateInventoryItemRequest>,
) -> Result<(StatusCode, Json<ApiResponse<InventoryItemModel>>), ServiceError> {
    auth_user.require_permission(perm::INVENTORY_WRITE)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let item = state
        .services
        .inventory
        .create_item(restaurant_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(item))))
}

/// Get an inventory item
#[utoipa::path(
    get,
    path = "/api/v1/inventory/{id}",
    params(("id" = Uuid, Path, description = "Inventory item id")),
    responses(
        (status = 200, description = "Item retrieved", body = ApiResponse<InventoryItemModel>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<InventoryItemModel>>, ServiceError> {
    auth_user.require_permission(perm::INVENTORY_READ)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let item = state.services.inventory.get_item(restaurant_id, id).await?;
    Ok(Json(ApiResponse::success(item)))
}

/// Update an inventory item
#[utoipa::path(
    put,
    path = "/api/v1/inventory/{id}",
    params(("id" = Uuid, Path, description = "Inventory item id")),
    request_body = UpdateInventoryItemRequest,
    responses(
        (status = 200, description = "Item updated", body = ApiResponse<InventoryItemModel>),
    ),
    security(("Bearer" = []))
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(payload): Json<UpdateInventoryItemRequest>,
) -> Result<Json<ApiResponse<InventoryItemModel>>, ServiceError> {
    auth_user.require_permission(perm::INVENTORY_WRITE)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let item = state
        .services
        .inventory
        .update_item(restaurant_id, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(item)))
}

/// Deactivate an inventory item (soft delete)
#[utoipa::path(
    delete,
    path = "/api/v1/inventory/{id}",
    params(("id" = Uuid, Path, description = "Inventory item id")),
    responses(
        (status = 200, description = "Item deactivated", body = ApiResponse<InventoryItemModel>),
    ),
    security(("Bearer" = []))
)]
pub async fn deactivate_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<InventoryItemModel>>, ServiceError> {
    auth_user.require_permission(perm::INVENTORY_WRITE)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let item = state
        .services
        .inventory
        .deactivate_item(restaurant_id, id)
        .await?;
    Ok(Json(ApiResponse::success(item)))
}

/// Record a manual stock movement
#[utoipa::path(
    post,
    path = "/api/v1/inventory/movements",
    request_body = RecordMovementRequest,
    responses(
        (status = 201, description = "Movement recorded", body = ApiResponse<InventoryMovementModel>),
        (status = 400, description = "Invalid movement", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn record_movement(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<RecordMovementRequest>,
) -> Result<(StatusCode, Json<ApiResponse<InventoryMovementModel>>), ServiceError> {
    auth_user.require_permission(perm::INVENTORY_WRITE)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let movement = state
        .services
        .inventory
        .record_movement(restaurant_id, payload, Some(auth_user.user_id))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(movement))))
}

/// Transfer stock between two items
#[utoipa::path(
    post,
    path = "/api/v1/inventory/transfer",
    request_body = TransferRequest,
    responses(
        (status = 204, description = "Transfer completed"),
        (status = 400, description = "Insufficient stock", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn transfer(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<TransferRequest>,
) -> Result<StatusCode, ServiceError> {
    auth_user.require_permission(perm::INVENTORY_WRITE)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    state
        .services
        .inventory
        .transfer(restaurant_id, payload, Some(auth_user.user_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Movement ledger history
#[utoipa::path(
    get,
    path = "/api/v1/inventory/movements",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
        ("item_id" = Option<Uuid>, Query, description = "Scope to one item"),
    ),
    responses(
        (status = 200, description = "Movements retrieved", body = ApiResponse<PaginatedResponse<InventoryMovementModel>>),
    ),
    security(("Bearer" = []))
)]
pub async fn movement_history(
    State(state): State<AppState>,
    Query(query): Query<MovementHistoryQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<PaginatedResponse<InventoryMovementModel>>>, ServiceError> {
    auth_user.require_permission(perm::INVENTORY_READ)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let (items, total) = state
        .services
        .inventory
        .movement_history(restaurant_id, query.item_id, query.page, query.limit)
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

/// Items at or below their reorder threshold
#[utoipa::path(
    get,
    path = "/api/v1/inventory/low-stock",
    responses(
        (status = 200, description = "Low-stock items", body = ApiResponse<Vec<InventoryItemModel>>),
    ),
    security(("Bearer" = []))
)]
pub async fn low_stock(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<InventoryItemModel>>>, ServiceError> {
    auth_user.require_permission(perm::INVENTORY_READ)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let items = state
        .services
        .inventory
        .low_stock_items(restaurant_id)
        .await?;
    Ok(Json(ApiResponse::success(items)))
}

/// Check whether current stock covers a prospective set of order lines
#[utoipa::path(
    post,
    path = "/api/v1/inventory/availability",
    request_body = AvailabilityRequest,
    responses(
        (status = 200, description = "Availability report", body = ApiResponse<AvailabilityReport>),
    ),
    security(("Bearer" = []))
)]
pub async fn check_availability(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<AvailabilityRequest>,
) -> Result<Json<ApiResponse<AvailabilityReport>>, ServiceError> {
    auth_user.require_permission(perm::INVENTORY_READ)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let lines: Vec<StockLine> = payload
        .lines
        .into_iter()
        .map(|l| StockLine {
            menu_item_id: l.menu_item_id,
            quantity: l.quantity,
        })
        .collect();
    let report = state
        .services
        .stock
        .check_availability(restaurant_id, &lines)
        .await?;
    Ok(Json(ApiResponse::success(report)))
}
