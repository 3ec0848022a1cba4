//! Restaurant POS API Library
//!
//! Multi-tenant point-of-sale backend: orders, payments, tables and
//! reservations, recipe-driven inventory, reporting and staff shifts, with
//! per-tenant realtime push for dashboards.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod openapi;
pub mod realtime;
pub mod services;

use axum::{extract::State, response::Json, routing::get, Router};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub realtime: realtime::SharedHub,
    pub services: handlers::AppServices,
}

// Common query parameters for list endpoints
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub status: Option<String>,
}

pub(crate) fn default_page() -> u64 {
    1
}
pub(crate) fn default_limit() -> u64 {
    20
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    pub timestamp: String,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Full v1 API surface. Handlers enforce permissions internally through the
/// capability table; the public digital menu is the only unauthenticated
/// route here.
pub fn api_v1_routes() -> Router<AppState> {
    let orders = Router::new()
        .route(
            "/orders",
            get(handlers::orders::list_orders).post(handlers::orders::create_order),
        )
        .route("/orders/:id", get(handlers::orders::get_order))
        .route(
            "/orders/by-number/:order_number",
            get(handlers::orders::get_order_by_number),
        )
        .route(
            "/orders/:id/items",
            axum::routing::post(handlers::orders::add_order_items),
        )
        .route(
            "/orders/:id/status",
            axum::routing::put(handlers::orders::update_order_status),
        )
        .route(
            "/orders/:id/cancel",
            axum::routing::post(handlers::orders::cancel_order),
        )
        .route(
            "/orders/:id/payments",
            get(handlers::payments::payments_for_order),
        );

    let payments = Router::new()
        .route(
            "/payments",
            axum::routing::post(handlers::payments::process_payment),
        )
        .route(
            "/payments/split",
            axum::routing::post(handlers::payments::split_payment),
        )
        .route("/payments/:id", get(handlers::payments::get_payment))
        .route(
            "/payments/:id/refund",
            axum::routing::post(handlers::payments::refund_payment),
        );

    let inventory = Router::new()
        .route(
            "/inventory",
            get(handlers::inventory::list_items).post(handlers::inventory::create_item),
        )
        .route(
            "/inventory/movements",
            get(handlers::inventory::movement_history)
                .post(handlers::inventory::record_movement),
        )
        .route(
            "/inventory/transfer",
            axum::routing::post(handlers::inventory::transfer),
        )
        .route("/inventory/low-stock", get(handlers::inventory::low_stock))
        .route(
            "/inventory/availability",
            axum::routing::post(handlers::inventory::check_availability),
        )
        .route(
            "/inventory/:id",
            get(handlers::inventory::get_item)
                .put(handlers::inventory::update_item)
                .delete(handlers::inventory::deactivate_item),
        );

    let menu = Router::new()
        .route(
            "/menu",
            get(handlers::menu::list_items).post(handlers::menu::create_item),
        )
        .route(
            "/menu/:id",
            get(handlers::menu::get_item).put(handlers::menu::update_item),
        )
        .route(
            "/menu/:id/availability",
            axum::routing::put(handlers::menu::set_availability),
        )
        .route(
            "/menu/:menu_item_id/recipe",
            get(handlers::recipes::get_recipe)
                .put(handlers::recipes::upsert_recipe)
                .delete(handlers::recipes::delete_recipe),
        );

    let tables = Router::new()
        .route(
            "/tables",
            get(handlers::tables::list_tables).post(handlers::tables::create_table),
        )
        .route(
            "/tables/:id",
            get(handlers::tables::get_table)
                .put(handlers::tables::update_table)
                .delete(handlers::tables::delete_table),
        )
        .route(
            "/tables/:id/status",
            axum::routing::put(handlers::tables::set_table_status),
        )
        .route("/tables/:id/qr", get(handlers::menu::table_qr));

    let reservations = Router::new()
        .route(
            "/reservations",
            get(handlers::reservations::list_reservations)
                .post(handlers::reservations::create_reservation),
        )
        .route(
            "/reservations/:id",
            get(handlers::reservations::get_reservation),
        )
        .route(
            "/reservations/:id/status",
            axum::routing::put(handlers::reservations::update_reservation_status),
        );

    let reports = Router::new()
        .route("/reports/sales", get(handlers::reports::sales_summary))
        .route(
            "/reports/payment-methods",
            get(handlers::reports::payment_method_breakdown),
        )
        .route("/reports/top-items", get(handlers::reports::top_items))
        .route("/reports/low-stock", get(handlers::reports::low_stock));

    let shifts = Router::new()
        .route("/shifts", get(handlers::shifts::list_shifts))
        .route(
            "/shifts/clock-in",
            axum::routing::post(handlers::shifts::clock_in),
        )
        .route(
            "/shifts/:id/clock-out",
            axum::routing::post(handlers::shifts::clock_out),
        );

    // Guest-facing, no bearer token
    let public = Router::new().route("/public/menu/:slug", get(handlers::menu::digital_menu));

    Router::new()
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .merge(orders)
        .merge(payments)
        .merge(inventory)
        .merge(menu)
        .merge(tables)
        .merge(reservations)
        .merge(reports)
        .merge(shifts)
        .merge(public)
        .nest("/events", realtime::routes())
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let version = env!("CARGO_PKG_VERSION");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "service": "resto-api",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "database": db_status,
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn success_response_carries_data_and_timestamp() {
        let response = ApiResponse::success("ok");
        assert!(response.success);
        assert_eq!(response.data, Some("ok"));
        DateTime::parse_from_rfc3339(&response.timestamp).expect("timestamp should parse");
    }

    #[test]
    fn validation_errors_response_is_unsuccessful() {
        let response = ApiResponse::<()>::validation_errors(vec!["missing".into()]);
        assert!(!response.success);
        assert_eq!(response.errors.as_deref(), Some(&["missing".to_string()][..]));
    }
}
