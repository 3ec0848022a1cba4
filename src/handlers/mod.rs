pub mod common;
pub mod inventory;
pub mod menu;
pub mod orders;
pub mod payments;
pub mod recipes;
pub mod reports;
pub mod reservations;
pub mod shifts;
pub mod tables;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::events::EventSender;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub orders: crate::services::orders::OrderService,
    pub stock: crate::services::stock::StockService,
    pub payments: crate::services::payments::PaymentService,
    pub tables: crate::services::tables::TableService,
    pub reservations: crate::services::reservations::ReservationService,
    pub inventory: crate::services::inventory::InventoryService,
    pub recipes: crate::services::recipes::RecipeService,
    pub menu: crate::services::menu::MenuService,
    pub reports: crate::services::reports::ReportService,
    pub shifts: crate::services::shifts::ShiftService,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: EventSender,
        config: &AppConfig,
    ) -> Self {
        let stock = crate::services::stock::StockService::new(db.clone(), event_sender.clone());
        let tables = crate::services::tables::TableService::new(db.clone(), event_sender.clone());

        Self {
            orders: crate::services::orders::OrderService::new(
                db.clone(),
                event_sender.clone(),
                stock.clone(),
            ),
            payments: crate::services::payments::PaymentService::new(
                db.clone(),
                event_sender.clone(),
            ),
            reservations: crate::services::reservations::ReservationService::new(
                db.clone(),
                event_sender.clone(),
                tables.clone(),
            ),
            inventory: crate::services::inventory::InventoryService::new(
                db.clone(),
                event_sender.clone(),
            ),
            recipes: crate::services::recipes::RecipeService::new(db.clone()),
            menu: crate::services::menu::MenuService::new(
                db.clone(),
                config.public_base_url.clone(),
            ),
            reports: crate::services::reports::ReportService::new(db.clone()),
            shifts: crate::services::shifts::ShiftService::new(db),
            stock,
            tables,
        }
    }
}
