use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Resto API",
        version = "1.0.0",
        description = r#"
# Restaurant POS API

Multi-tenant point-of-sale backend: orders, payments, tables and
reservations, recipe-driven inventory, reporting and staff shifts.

## Authentication

All endpoints except the public digital menu require a JWT bearer token:

```
Authorization: Bearer <your-jwt-token>
```

Tokens carry a single role; the capability table maps roles to permissions.
Tenant scoping comes from the `restaurant_id` claim.

## Realtime

Dashboards subscribe to `/api/v1/events/stream` (server-sent events) and
receive `order:*`, `table:statusChanged`, `inventory:lowStock` and
`reservation:*` pushes scoped to their restaurant.
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Orders", description = "Order lifecycle endpoints"),
        (name = "Payments", description = "Payment and refund endpoints"),
        (name = "Inventory", description = "Inventory and stock ledger endpoints"),
        (name = "Menu", description = "Menu, recipes and digital menu endpoints"),
        (name = "Tables", description = "Table management endpoints"),
        (name = "Reservations", description = "Reservation book endpoints"),
        (name = "Reports", description = "Reporting rollup endpoints"),
        (name = "Shifts", description = "Staff time clock endpoints")
    ),
    paths(
        // Orders
        crate::handlers::orders::list_orders,
        crate::handlers::orders::create_order,
        crate::handlers::orders::get_order,
        crate::handlers::orders::get_order_by_number,
        crate::handlers::orders::add_order_items,
        crate::handlers::orders::update_order_status,
        crate::handlers::orders::cancel_order,

        // Payments
        crate::handlers::payments::process_payment,
        crate::handlers::payments::refund_payment,
        crate::handlers::payments::split_payment,
        crate::handlers::payments::get_payment,
        crate::handlers::payments::payments_for_order,

        // Inventory
        crate::handlers::inventory::list_items,
        crate::handlers::inventory::create_item,
        crate::handlers::inventory::get_item,
        crate::handlers::inventory::update_item,
        crate::handlers::inventory::deactivate_item,
        crate::handlers::inventory::record_movement,
        crate::handlers::inventory::transfer,
        crate::handlers::inventory::movement_history,
        crate::handlers::inventory::low_stock,
        crate::handlers::inventory::check_availability,

        // Recipes
        crate::handlers::recipes::upsert_recipe,
        crate::handlers::recipes::get_recipe,
        crate::handlers::recipes::delete_recipe,

        // Menu
        crate::handlers::menu::list_items,
        crate::handlers::menu::create_item,
        crate::handlers::menu::get_item,
        crate::handlers::menu::update_item,
        crate::handlers::menu::set_availability,
        crate::handlers::menu::table_qr,
        crate::handlers::menu::digital_menu,

        // Tables
        crate::handlers::tables::list_tables,
        crate::handlers::tables::create_table,
        crate::handlers::tables::get_table,
        crate::handlers::tables::update_table,
        crate::handlers::tables::set_table_status,
        crate::handlers::tables::delete_table,

        // Reservations
        crate::handlers::reservations::list_reservations,
        crate::handlers::reservations::create_reservation,
        crate::handlers::reservations::get_reservation,
        crate::handlers::reservations::update_reservation_status,

        // Reports
        crate::handlers::reports::sales_summary,
        crate::handlers::reports::payment_method_breakdown,
        crate::handlers::reports::top_items,
        crate::handlers::reports::low_stock,

        // Shifts
        crate::handlers::shifts::clock_in,
        crate::handlers::shifts::clock_out,
        crate::handlers::shifts::list_shifts,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,
            crate::ListQuery,

            // Order types
            crate::services::orders::OrderResponse,
            crate::services::orders::OrderItemResponse,
            crate::services::orders::CreateOrderRequest,
            crate::services::orders::OrderLineRequest,
            crate::services::orders::OrderStatus,
            crate::services::orders::PaymentStatus,
            crate::handlers::orders::UpdateOrderStatusRequest,
            crate::handlers::orders::AddItemsRequest,

            // Payment types
            crate::services::payments::PaymentMethod,
            crate::services::payments::ProcessPaymentRequest,
            crate::services::payments::RefundPaymentRequest,
            crate::services::payments::SplitPaymentRequest,
            crate::services::payments::PaymentSplit,
            crate::services::payments::PaymentReceipt,
            crate::entities::payment::Model,

            // Inventory types
            crate::entities::inventory_item::Model,
            crate::entities::inventory_movement::Model,
            crate::services::inventory::CreateInventoryItemRequest,
            crate::services::inventory::UpdateInventoryItemRequest,
            crate::services::inventory::RecordMovementRequest,
            crate::services::inventory::TransferRequest,
            crate::services::inventory::MovementType,
            crate::services::stock::AvailabilityReport,
            crate::services::stock::Shortage,

            // Recipe types
            crate::services::recipes::UpsertRecipeRequest,
            crate::services::recipes::RecipeIngredientRequest,
            crate::services::recipes::RecipeDetail,
            crate::services::recipes::RecipeIngredientDetail,

            // Menu types
            crate::entities::menu_item::Model,
            crate::services::menu::CreateMenuItemRequest,
            crate::services::menu::UpdateMenuItemRequest,
            crate::services::menu::DigitalMenu,
            crate::services::menu::DigitalMenuCategory,
            crate::services::menu::DigitalMenuItem,
            crate::services::menu::TableQrPayload,

            // Table types
            crate::entities::dining_table::Model,
            crate::services::tables::CreateTableRequest,
            crate::services::tables::UpdateTableRequest,
            crate::services::tables::TableStatus,

            // Reservation types
            crate::entities::reservation::Model,
            crate::services::reservations::CreateReservationRequest,
            crate::services::reservations::ReservationStatus,

            // Report types
            crate::services::reports::SalesSummary,
            crate::services::reports::MethodBreakdownRow,
            crate::services::reports::TopItemRow,
            crate::services::reports::LowStockRow,

            // Shift types
            crate::entities::staff_shift::Model,
            crate::services::shifts::ClockInRequest,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_includes_core_paths() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string(&openapi).unwrap();
        assert!(json.contains("Resto API"));
        assert!(json.contains("/api/v1/orders"));
        assert!(json.contains("/api/v1/public/menu/{slug}"));
    }
}
