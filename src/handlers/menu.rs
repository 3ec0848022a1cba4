use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::consts as perm;
use crate::entities::menu_item::Model as MenuItemModel;
use crate::services::menu::{
    CreateMenuItemRequest, DigitalMenu, TableQrPayload, UpdateMenuItemRequest,
};
use crate::{auth::AuthUser, errors::ServiceError, ApiResponse, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct MenuListQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetAvailabilityRequest {
    pub is_available: bool,
}

/// List menu items, including unavailable ones
#[utoipa::path(
    get,
    path = "/api/v1/menu",
    params(("category" = Option<String>, Query, description = "Filter by category")),
    responses(
        (status = 200, description = "Menu retrieved", body = ApiResponse<Vec<MenuItemModel>>),
    ),
    security(("Bearer" = []))
)]
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<MenuListQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<MenuItemModel>>>, ServiceError> {
    auth_user.require_permission(perm::MENU_READ)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let items = state
        .services
        .menu
        .list_items(restaurant_id, query.category)
        .await?;
    Ok(Json(ApiResponse::success(items)))
}

/// Create a menu item
#[utoipa::path(
    post,
    path = "/api/v1/menu",
    request_body = CreateMenuItemRequest,
    responses(
        (status = 201, description = "Menu item created", body = ApiResponse<MenuItemModel>),
    ),
    security(("Bearer" = []))
)]
pub async fn create_item(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateMenuItemRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MenuItemModel>>), ServiceError> {
    auth_user.require_permission(perm::MENU_WRITE)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let item = state.services.menu.create_item(restaurant_id, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(item))))
}

/// Get a menu item
#[utoipa::path(
    get,
    path = "/api/v1/menu/{id}",
    params(("id" = Uuid, Path, description = "Menu item id")),
    responses(
        (status = 200, description = "Menu item retrieved", body = ApiResponse<MenuItemModel>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<MenuItemModel>>, ServiceError> {
    auth_user.require_permission(perm::MENU_READ)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let item = state.services.menu.get_item(restaurant_id, id).await?;
    Ok(Json(ApiResponse::success(item)))
}

/// Update a menu item
#[utoipa::path(
    put,
    path = "/api/v1/menu/{id}",
    params(("id" = Uuid, Path, description = "Menu item id")),
    request_body = UpdateMenuItemRequest,
    responses(
        (status = 200, description = "Menu item updated", body = ApiResponse<MenuItemModel>),
    ),
    security(("Bearer" = []))
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(payload): Json<UpdateMenuItemRequest>,
) -> Result<Json<ApiResponse<MenuItemModel>>, ServiceError> {
    auth_user.require_permission(perm::MENU_WRITE)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let item = state
        .services
        .menu
        .update_item(restaurant_id, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(item)))
}

/// Toggle a menu item's availability (86 it or bring it back)
#[utoipa::path(
    put,
    path = "/api/v1/menu/{id}/availability",
    params(("id" = Uuid, Path, description = "Menu item id")),
    request_body = SetAvailabilityRequest,
    responses(
        (status = 200, description = "Availability updated", body = ApiResponse<MenuItemModel>),
    ),
    security(("Bearer" = []))
)]
pub async fn set_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(payload): Json<SetAvailabilityRequest>,
) -> Result<Json<ApiResponse<MenuItemModel>>, ServiceError> {
    auth_user.require_permission(perm::MENU_WRITE)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let item = state
        .services
        .menu
        .set_availability(restaurant_id, id, payload.is_available)
        .await?;
    Ok(Json(ApiResponse::success(item)))
}

/// URL payload for a table's QR code
#[utoipa::path(
    get,
    path = "/api/v1/tables/{id}/qr",
    params(("id" = Uuid, Path, description = "Table id")),
    responses(
        (status = 200, description = "QR payload", body = ApiResponse<TableQrPayload>),
    ),
    security(("Bearer" = []))
)]
pub async fn table_qr(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<TableQrPayload>>, ServiceError> {
    auth_user.require_permission(perm::TABLES_READ)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let payload = state
        .services
        .menu
        .table_qr_payload(restaurant_id, id)
        .await?;
    Ok(Json(ApiResponse::success(payload)))
}

/// Public digital menu, no authentication
#[utoipa::path(
    get,
    path = "/api/v1/public/menu/{slug}",
    params(("slug" = String, Path, description = "Restaurant slug")),
    responses(
        (status = 200, description = "Digital menu", body = ApiResponse<DigitalMenu>),
        (status = 404, description = "Unknown restaurant", body = crate::errors::ErrorResponse),
    )
)]
pub async fn digital_menu(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<DigitalMenu>>, ServiceError> {
    let menu = state.services.menu.digital_menu(&slug).await?;
    Ok(Json(ApiResponse::success(menu)))
}
