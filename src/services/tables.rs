use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use strum::{Display, EnumString};
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        dining_table::{self, Entity as DiningTableEntity, Model as DiningTableModel},
        order::{self, Entity as OrderEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::orders::OrderStatus,
};

/// Table lifecycle states. Order and reservation flows drive OCCUPIED and
/// AVAILABLE; RESERVED and CLEANING are set by staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize, ToSchema)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    Available,
    Occupied,
    Reserved,
    Cleaning,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTableRequest {
    #[validate(range(min = 1, message = "Table number must be positive"))]
    pub number: i32,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: i32,
    pub zone: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTableRequest {
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: Option<i32>,
    pub zone: Option<String>,
}

#[derive(Clone)]
pub struct TableService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl TableService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, request), fields(%restaurant_id))]
    pub async fn create_table(
        &self,
        restaurant_id: Uuid,
        request: CreateTableRequest,
    ) -> Result<DiningTableModel, ServiceError> {
        request.validate()?;

        let duplicate = DiningTableEntity::find()
            .filter(dining_table::Column::RestaurantId.eq(restaurant_id))
            .filter(dining_table::Column::Number.eq(request.number))
            .one(self.db.as_ref())
            .await?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Table {} already exists",
                request.number
            )));
        }

        let table = dining_table::ActiveModel {
            id: Set(Uuid::new_v4()),
            restaurant_id: Set(restaurant_id),
            number: Set(request.number),
            capacity: Set(request.capacity),
            zone: Set(request.zone),
            status: Set(TableStatus::Available.to_string()),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(self.db.as_ref())
        .await?;

        info!(table_id = %table.id, number = table.number, "table created");
        Ok(table)
    }

    pub async fn get_table(
        &self,
        restaurant_id: Uuid,
        table_id: Uuid,
    ) -> Result<DiningTableModel, ServiceError> {
        DiningTableEntity::find_by_id(table_id)
            .filter(dining_table::Column::RestaurantId.eq(restaurant_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Table {} not found", table_id)))
    }

    /// Tables ordered by number; optional status filter.
    pub async fn list_tables(
        &self,
        restaurant_id: Uuid,
        status: Option<TableStatus>,
    ) -> Result<Vec<DiningTableModel>, ServiceError> {
        let mut query = DiningTableEntity::find()
            .filter(dining_table::Column::RestaurantId.eq(restaurant_id));
        if let Some(status) = status {
            query = query.filter(dining_table::Column::Status.eq(status.to_string()));
        }
        Ok(query
            .order_by_asc(dining_table::Column::Number)
            .all(self.db.as_ref())
            .await?)
    }

    #[instrument(skip(self, request), fields(%restaurant_id, %table_id))]
    pub async fn update_table(
        &self,
        restaurant_id: Uuid,
        table_id: Uuid,
        request: UpdateTableRequest,
    ) -> Result<DiningTableModel, ServiceError> {
        request.validate()?;
        let table = self.get_table(restaurant_id, table_id).await?;

        let mut active: dining_table::ActiveModel = table.into();
        if let Some(capacity) = request.capacity {
            active.capacity = Set(capacity);
        }
        if request.zone.is_some() {
            active.zone = Set(request.zone);
        }
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(self.db.as_ref()).await?)
    }

    /// Manual status write. Refuses to free a table that still carries an
    /// open order.
    #[instrument(skip(self), fields(%restaurant_id, %table_id, %status))]
    pub async fn set_status(
        &self,
        restaurant_id: Uuid,
        table_id: Uuid,
        status: TableStatus,
    ) -> Result<DiningTableModel, ServiceError> {
        let table = self.get_table(restaurant_id, table_id).await?;

        if status == TableStatus::Available {
            let open_orders = OrderEntity::find()
                .filter(order::Column::RestaurantId.eq(restaurant_id))
                .filter(order::Column::TableId.eq(table_id))
                .filter(order::Column::Status.is_in(OrderStatus::open_statuses()))
                .count(self.db.as_ref())
                .await?;
            if open_orders > 0 {
                return Err(ServiceError::TableConflict(format!(
                    "Table {} has {} open order(s)",
                    table.number, open_orders
                )));
            }
        }

        let mut active: dining_table::ActiveModel = table.into();
        active.status = Set(status.to_string());
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(self.db.as_ref()).await?;

        self.emit_status_changed(&updated).await;
        Ok(updated)
    }

    #[instrument(skip(self), fields(%restaurant_id, %table_id))]
    pub async fn delete_table(
        &self,
        restaurant_id: Uuid,
        table_id: Uuid,
    ) -> Result<(), ServiceError> {
        let table = self.get_table(restaurant_id, table_id).await?;

        let has_orders = OrderEntity::find()
            .filter(order::Column::TableId.eq(table_id))
            .count(self.db.as_ref())
            .await?
            > 0;
        if has_orders {
            return Err(ServiceError::Conflict(format!(
                "Table {} has order history and cannot be deleted",
                table.number
            )));
        }

        table.delete(self.db.as_ref()).await?;
        info!("table deleted");
        Ok(())
    }

    async fn emit_status_changed(&self, table: &DiningTableModel) {
        let event = Event::TableStatusChanged {
            restaurant_id: table.restaurant_id,
            table_id: table.id,
            status: table.status.clone(),
        };
        if let Err(e) = self.event_sender.send(event).await {
            error!("Failed to send TableStatusChanged event: {}", e);
        }
    }
}

/// Parses a status string from a request path or body.
pub fn parse_table_status(value: &str) -> Result<TableStatus, ServiceError> {
    TableStatus::from_str(value)
        .map_err(|_| ServiceError::ValidationError(format!("Unknown table status: {}", value)))
}
