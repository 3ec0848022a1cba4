use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::consts as perm;
use crate::entities::dining_table::Model as DiningTableModel;
use crate::services::tables::{parse_table_status, CreateTableRequest, UpdateTableRequest};
use crate::{auth::AuthUser, errors::ServiceError, ApiResponse, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct TableListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetTableStatusRequest {
    pub status: String,
}

/// List tables
#[utoipa::path(
    get,
    path = "/api/v1/tables",
    params(("status" = Option<String>, Query, description = "Filter by table status")),
    responses(
        (status = 200, description = "Tables retrieved", body = ApiResponse<Vec<DiningTableModel>>),
    ),
    security(("Bearer" = []))
)]
pub async fn list_tables(
    State(state): State<AppState>,
    Query(query): Query<TableListQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<DiningTableModel>>>, ServiceError> {
    auth_user.require_permission(perm::TABLES_READ)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let status = query.status.as_deref().map(parse_table_status).transpose()?;
    let tables = state
        .services
        .tables
        .list_tables(restaurant_id, status)
        .await?;
    Ok(Json(ApiResponse::success(tables)))
}

/// Create a table
#[utoipa::path(
    post,
    path = "/api/v1/tables",
    request_body = CreateTableRequest,
    responses(
        (status = 201, description = "Table created", body = ApiResponse<DiningTableModel>),
        (status = 409, description = "Duplicate table number", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_table(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateTableRequest>,
) -> Result<(StatusCode, Json<ApiResponse<DiningTableModel>>), ServiceError> {
    auth_user.require_permission(perm::TABLES_WRITE)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let table = state
        .services
        .tables
        .create_table(restaurant_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(table))))
}

/// Get a table
#[utoipa::path(
    get,
    path = "/api/v1/tables/{id}",
    params(("id" = Uuid, Path, description = "Table id")),
    responses(
        (status = 200, description = "Table retrieved", body = ApiResponse<DiningTableModel>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_table(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<DiningTableModel>>, ServiceError> {
    auth_user.require_permission(perm::TABLES_READ)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let table = state.services.tables.get_table(restaurant_id, id).await?;
    Ok(Json(ApiResponse::success(table)))
}

/// Update a table's capacity or zone
#[utoipa::path(
    put,
    path = "/api/v1/tables/{id}",
    params(("id" = Uuid, Path, description = "Table id")),
    request_body = UpdateTableRequest,
    responses(
        (status = 200, description = "Table updated", body = ApiResponse<DiningTableModel>),
    ),
    security(("Bearer" = []))
)]
pub async fn update_table(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(payload): Json<UpdateTableRequest>,
) -> Result<Json<ApiResponse<DiningTableModel>>, ServiceError> {
    auth_user.require_permission(perm::TABLES_WRITE)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let table = state
        .services
        .tables
        .update_table(restaurant_id, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(table)))
}

/// Set a table's status
#[utoipa::path(
    put,
    path = "/api/v1/tables/{id}/status",
    params(("id" = Uuid, Path, description = "Table id")),
    request_body = SetTableStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<DiningTableModel>),
        (status = 409, description = "Table has open orders", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn set_table_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(payload): Json<SetTableStatusRequest>,
) -> Result<Json<ApiResponse<DiningTableModel>>, ServiceError> {
    auth_user.require_permission(perm::TABLES_WRITE)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    let status = parse_table_status(&payload.status)?;
    let table = state
        .services
        .tables
        .set_status(restaurant_id, id, status)
        .await?;
    Ok(Json(ApiResponse::success(table)))
}

/// Delete a table without order history
#[utoipa::path(
    delete,
    path = "/api/v1/tables/{id}",
    params(("id" = Uuid, Path, description = "Table id")),
    responses(
        (status = 204, description = "Table deleted"),
        (status = 409, description = "Table has order history", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_table(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<StatusCode, ServiceError> {
    auth_user.require_permission(perm::TABLES_WRITE)?;
    let restaurant_id = auth_user.resolve_restaurant(None)?;

    state.services.tables.delete_table(restaurant_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
