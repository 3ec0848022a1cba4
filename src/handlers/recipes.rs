use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::auth::consts as perm;
use crate::services::recipes::{RecipeDetail, UpsertRecipeRequest};
use crate::{auth::AuthUser, errors::ServiceError, ApiResponse, AppState};

/// Create or replace the recipe for a menu item
#[utoipa::path(
    put,
    path = "/api/v1/menu/{menu_item_id}/recipe",
    params(("menu_item_id" = Uuid, Path, description = "Menu item id")),
    request_body = UpsertRecipeRequest,
    responses(
        (status = 200, description = "Recipe saved", body = ApiResponse<RecipeDetail>),
        (status = 404, description = "Menu item or ingredient not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn upsert_recipe(
    State(state): State<AppState>,
    Path(menu_item_id): Path<Uuid>,
    auth_user: AuthUser,
    Json(payload): Json<UpsertRecipeRequest>,
) -> Result<Json<ApiResponse<RecipeDetail>>, ServiceError> {
    auth_user.require_permission(perm::RECIPES_WRITE)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let detail = state
        .services
        .recipes
        .upsert_recipe(restaurant_id, menu_item_id, payload)
        .await?;
    Ok(Json(ApiResponse::success(detail)))
}

/// Get a menu item's recipe with its current cost
#[utoipa::path(
    get,
    path = "/api/v1/menu/{menu_item_id}/recipe",
    params(("menu_item_id" = Uuid, Path, description = "Menu item id")),
    responses(
        (status = 200, description = "Recipe retrieved", body = ApiResponse<RecipeDetail>),
        (status = 404, description = "No recipe", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(menu_item_id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<RecipeDetail>>, ServiceError> {
    auth_user.require_permission(perm::RECIPES_READ)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let detail = state
        .services
        .recipes
        .get_recipe(restaurant_id, menu_item_id)
        .await?;
    Ok(Json(ApiResponse::success(detail)))
}

/// Delete a menu item's recipe
#[utoipa::path(
    delete,
    path = "/api/v1/menu/{menu_item_id}/recipe",
    params(("menu_item_id" = Uuid, Path, description = "Menu item id")),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 404, description = "No recipe", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(menu_item_id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<StatusCode, ServiceError> {
    auth_user.require_permission(perm::RECIPES_WRITE)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    state
        .services
        .recipes
        .delete_recipe(restaurant_id, menu_item_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
