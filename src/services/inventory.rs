use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
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
        inventory_item::{self, Entity as InventoryItemEntity, Model as InventoryItemModel},
        inventory_movement::{
            self, Entity as InventoryMovementEntity, Model as InventoryMovementModel,
        },
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize, ToSchema)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    In,
    Out,
    Return,
    Transfer,
    Loss,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateInventoryItemRequest {
    #[validate(length(min = 1, message = "SKU is required"))]
    pub sku: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Unit is required"))]
    pub unit: String,
    pub current_stock: Option<Decimal>,
    pub min_stock: Option<Decimal>,
    pub unit_cost: Option<Decimal>,
    pub category: Option<String>,
    pub supplier: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateInventoryItemRequest {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub min_stock: Option<Decimal>,
    pub unit_cost: Option<Decimal>,
    pub category: Option<String>,
    pub supplier: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordMovementRequest {
    pub inventory_item_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: Decimal,
    pub unit_cost: Option<Decimal>,
    pub reference: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TransferRequest {
    pub from_item_id: Uuid,
    pub to_item_id: Uuid,
    pub quantity: Decimal,
    pub reference: Option<String>,
}

/// Inventory master data and the manual side of the stock ledger. Order
/// driven movements live in `services::stock`; everything here is staff
/// initiated (receipts, losses, transfers, corrections).
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl InventoryService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, request), fields(%restaurant_id))]
    pub async fn create_item(
        &self,
        restaurant_id: Uuid,
        request: CreateInventoryItemRequest,
    ) -> Result<InventoryItemModel, ServiceError> {
        request.validate()?;

        let duplicate = InventoryItemEntity::find()
            .filter(inventory_item::Column::RestaurantId.eq(restaurant_id))
            .filter(inventory_item::Column::Sku.eq(request.sku.clone()))
            .one(self.db.as_ref())
            .await?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "SKU {} already exists",
                request.sku
            )));
        }

        let item = inventory_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            restaurant_id: Set(restaurant_id),
            sku: Set(request.sku),
            name: Set(request.name),
            unit: Set(request.unit),
            current_stock: Set(request.current_stock.unwrap_or(Decimal::ZERO)),
            min_stock: Set(request.min_stock.unwrap_or(Decimal::ZERO)),
            unit_cost: Set(request.unit_cost.unwrap_or(Decimal::ZERO)),
            category: Set(request.category),
            supplier: Set(request.supplier),
            location: Set(request.location),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(self.db.as_ref())
        .await?;

        info!(item_id = %item.id, sku = %item.sku, "inventory item created");
        Ok(item)
    }

    pub async fn get_item(
        &self,
        restaurant_id: Uuid,
        item_id: Uuid,
    ) -> Result<InventoryItemModel, ServiceError> {
        InventoryItemEntity::find_by_id(item_id)
            .filter(inventory_item::Column::RestaurantId.eq(restaurant_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Inventory item {} not found", item_id)))
    }

    /// Active items, optionally filtered by category, ordered by name.
    pub async fn list_items(
        &self,
        restaurant_id: Uuid,
        category: Option<String>,
        include_inactive: bool,
    ) -> Result<Vec<InventoryItemModel>, ServiceError> {
        let mut query = InventoryItemEntity::find()
            .filter(inventory_item::Column::RestaurantId.eq(restaurant_id));
        if !include_inactive {
            query = query.filter(inventory_item::Column::IsActive.eq(true));
        }
        if let Some(category) = category {
            query = query.filter(inventory_item::Column::Category.eq(category));
        }
        Ok(query
            .order_by_asc(inventory_item::Column::Name)
            .all(self.db.as_ref())
            .await?)
    }

    #[instrument(skip(self, request), fields(%restaurant_id, %item_id))]
    pub async fn update_item(
        &self,
        restaurant_id: Uuid,
        item_id: Uuid,
        request: UpdateInventoryItemRequest,
    ) -> Result<InventoryItemModel, ServiceError> {
        request.validate()?;
        let item = self.get_item(restaurant_id, item_id).await?;

        let mut active: inventory_item::ActiveModel = item.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(unit) = request.unit {
            active.unit = Set(unit);
        }
        if let Some(min_stock) = request.min_stock {
            active.min_stock = Set(min_stock);
        }
        if let Some(unit_cost) = request.unit_cost {
            active.unit_cost = Set(unit_cost);
        }
        if request.category.is_some() {
            active.category = Set(request.category);
        }
        if request.supplier.is_some() {
            active.supplier = Set(request.supplier);
        }
        if request.location.is_some() {
            active.location = Set(request.location);
        }
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(self.db.as_ref()).await?)
    }

    /// Soft delete. The ledger keeps referencing the item, so rows are never
    /// removed.
    #[instrument(skip(self), fields(%restaurant_id, %item_id))]
    pub async fn deactivate_item(
        &self,
        restaurant_id: Uuid,
        item_id: Uuid,
    ) -> Result<InventoryItemModel, ServiceError> {
        let item = self.get_item(restaurant_id, item_id).await?;
        let mut active: inventory_item::ActiveModel = item.into();
        active.is_active = Set(false);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(self.db.as_ref()).await?;
        info!("inventory item deactivated");
        Ok(updated)
    }

    /// Records a staff-initiated movement. IN and RETURN credit stock, the
    /// rest debit it with the same clamp-at-zero rule as order deduction.
    #[instrument(skip(self, request), fields(%restaurant_id))]
    pub async fn record_movement(
        &self,
        restaurant_id: Uuid,
        request: RecordMovementRequest,
        created_by: Option<String>,
    ) -> Result<InventoryMovementModel, ServiceError> {
        if request.quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Movement quantity must be positive".to_string(),
            ));
        }
        if request.movement_type == MovementType::Transfer {
            return Err(ServiceError::InvalidOperation(
                "Transfers must use the transfer operation".to_string(),
            ));
        }

        let txn = self.db.begin().await?;
        let item = InventoryItemEntity::find_by_id(request.inventory_item_id)
            .filter(inventory_item::Column::RestaurantId.eq(restaurant_id))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Inventory item {} not found",
                    request.inventory_item_id
                ))
            })?;

        let credits = matches!(request.movement_type, MovementType::In | MovementType::Return);
        let applied = if credits {
            request.quantity
        } else {
            request.quantity.min(item.current_stock)
        };
        let new_stock = if credits {
            item.current_stock + applied
        } else {
            item.current_stock - applied
        };
        let unit_cost = request.unit_cost.unwrap_or(item.unit_cost);

        let mut active: inventory_item::ActiveModel = item.into();
        active.current_stock = Set(new_stock);
        if request.movement_type == MovementType::In && request.unit_cost.is_some() {
            active.unit_cost = Set(unit_cost);
        }
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await?;

        let movement = inventory_movement::ActiveModel {
            id: Set(Uuid::new_v4()),
            restaurant_id: Set(restaurant_id),
            inventory_item_id: Set(updated.id),
            movement_type: Set(request.movement_type.to_string()),
            quantity: Set(request.quantity),
            applied_quantity: Set(applied),
            unit_cost: Set(Some(unit_cost)),
            total_cost: Set(Some(applied * unit_cost)),
            reference: Set(request.reference),
            created_by: Set(created_by),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        if updated.current_stock <= updated.min_stock {
            let event = Event::InventoryLowStock {
                restaurant_id,
                inventory_item_id: updated.id,
                name: updated.name.clone(),
                current_stock: updated.current_stock,
                min_stock: updated.min_stock,
            };
            if let Err(e) = self.event_sender.send(event).await {
                error!("Failed to send InventoryLowStock event: {}", e);
            }
        }

        info!(movement_id = %movement.id, "movement recorded");
        Ok(movement)
    }

    /// Moves stock between two items (typically location variants of the
    /// same ingredient) in one transaction, writing paired TRANSFER rows.
    #[instrument(skip(self, request), fields(%restaurant_id))]
    pub async fn transfer(
        &self,
        restaurant_id: Uuid,
        request: TransferRequest,
        created_by: Option<String>,
    ) -> Result<(), ServiceError> {
        if request.quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Transfer quantity must be positive".to_string(),
            ));
        }
        if request.from_item_id == request.to_item_id {
            return Err(ServiceError::ValidationError(
                "Cannot transfer an item onto itself".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let source = InventoryItemEntity::find_by_id(request.from_item_id)
            .filter(inventory_item::Column::RestaurantId.eq(restaurant_id))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Inventory item {} not found", request.from_item_id))
            })?;
        let target = InventoryItemEntity::find_by_id(request.to_item_id)
            .filter(inventory_item::Column::RestaurantId.eq(restaurant_id))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Inventory item {} not found", request.to_item_id))
            })?;

        if source.current_stock < request.quantity {
            return Err(ServiceError::InvalidOperation(format!(
                "insufficient stock: {} available, {} requested",
                source.current_stock, request.quantity
            )));
        }

        let unit_cost = source.unit_cost;
        let source_id = source.id;
        let target_id = target.id;

        let mut debit: inventory_item::ActiveModel = source.clone().into();
        debit.current_stock = Set(source.current_stock - request.quantity);
        debit.updated_at = Set(Some(Utc::now()));
        debit.update(&txn).await?;

        let mut credit: inventory_item::ActiveModel = target.clone().into();
        credit.current_stock = Set(target.current_stock + request.quantity);
        credit.updated_at = Set(Some(Utc::now()));
        credit.update(&txn).await?;

        for (item_id, counterpart) in [(source_id, target_id), (target_id, source_id)] {
            let reference = request
                .reference
                .clone()
                .unwrap_or_else(|| format!("transfer with {}", counterpart));
            inventory_movement::ActiveModel {
                id: Set(Uuid::new_v4()),
                restaurant_id: Set(restaurant_id),
                inventory_item_id: Set(item_id),
                movement_type: Set(MovementType::Transfer.to_string()),
                quantity: Set(request.quantity),
                applied_quantity: Set(request.quantity),
                unit_cost: Set(Some(unit_cost)),
                total_cost: Set(Some(request.quantity * unit_cost)),
                reference: Set(Some(reference)),
                created_by: Set(created_by.clone()),
                created_at: Set(Utc::now()),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        info!(from = %source_id, to = %target_id, "stock transferred");
        Ok(())
    }

    /// Ledger history, newest first, optionally scoped to one item.
    pub async fn movement_history(
        &self,
        restaurant_id: Uuid,
        item_id: Option<Uuid>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<InventoryMovementModel>, u64), ServiceError> {
        let mut query = InventoryMovementEntity::find()
            .filter(inventory_movement::Column::RestaurantId.eq(restaurant_id));
        if let Some(item_id) = item_id {
            query = query.filter(inventory_movement::Column::InventoryItemId.eq(item_id));
        }
        let paginator = query
            .order_by_desc(inventory_movement::Column::CreatedAt)
            .paginate(self.db.as_ref(), per_page.max(1));
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((rows, total))
    }

    /// Active items at or below their reorder threshold.
    pub async fn low_stock_items(
        &self,
        restaurant_id: Uuid,
    ) -> Result<Vec<InventoryItemModel>, ServiceError> {
        let items = InventoryItemEntity::find()
            .filter(
                Condition::all()
                    .add(inventory_item::Column::RestaurantId.eq(restaurant_id))
                    .add(inventory_item::Column::IsActive.eq(true)),
            )
            .order_by_asc(inventory_item::Column::Name)
            .all(self.db.as_ref())
            .await?;
        Ok(items
            .into_iter()
            .filter(|i| i.current_stock <= i.min_stock)
            .collect())
    }
}

pub fn parse_movement_type(value: &str) -> Result<MovementType, ServiceError> {
    MovementType::from_str(value)
        .map_err(|_| ServiceError::ValidationError(format!("Unknown movement type: {}", value)))
}
