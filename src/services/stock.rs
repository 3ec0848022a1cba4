use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entities::{
        inventory_item::{
            self, Entity as InventoryItemEntity, Model as InventoryItemModel,
        },
        inventory_movement::{self, Entity as InventoryMovementEntity},
        recipe::{self, Entity as RecipeEntity},
        recipe_ingredient::{self, Entity as RecipeIngredientEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

pub const MOVEMENT_OUT: &str = "OUT";
pub const MOVEMENT_RETURN: &str = "RETURN";

/// One order line as seen by the stock ledger.
#[derive(Debug, Clone)]
pub struct StockLine {
    pub menu_item_id: Uuid,
    pub quantity: i32,
}

/// Shortage reported by an availability check.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Shortage {
    pub inventory_item_id: Uuid,
    pub name: String,
    pub required: Decimal,
    pub available: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AvailabilityReport {
    pub available: bool,
    pub shortages: Vec<Shortage>,
}

/// Recipe-driven stock movements for orders.
///
/// Deduction never blocks a sale: items without a recipe are skipped, and a
/// decrement that would push stock negative is clamped at zero. The ledger
/// records both the intended and the applied amount so restoration credits
/// exactly what was taken.
#[derive(Clone)]
pub struct StockService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl StockService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Deducts ingredients for every line of an order in one transaction.
    /// Lines whose menu item has no recipe are a no-op.
    #[instrument(skip(self, lines), fields(%restaurant_id, order_number))]
    pub async fn deduct_for_order(
        &self,
        restaurant_id: Uuid,
        order_number: &str,
        lines: &[StockLine],
    ) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;
        let mut touched: Vec<InventoryItemModel> = Vec::new();

        for line in lines {
            let Some((recipe, ingredients)) =
                load_recipe(&txn, restaurant_id, line.menu_item_id).await?
            else {
                continue;
            };

            let ordered = Decimal::from(line.quantity);
            for ingredient in &ingredients {
                let item = InventoryItemEntity::find_by_id(ingredient.inventory_item_id)
                    .filter(inventory_item::Column::RestaurantId.eq(restaurant_id))
                    .one(&txn)
                    .await?;
                let Some(item) = item else {
                    warn!(
                        inventory_item_id = %ingredient.inventory_item_id,
                        "recipe references a missing inventory item"
                    );
                    continue;
                };

                let required = ingredient.quantity * ordered * recipe.portion_size;
                // Clamp at zero; the shortfall stays visible in the ledger as
                // the gap between quantity and applied_quantity.
                let applied = required.min(item.current_stock).max(Decimal::ZERO);
                let new_stock = item.current_stock - applied;
                let unit_cost = item.unit_cost;

                let mut active: inventory_item::ActiveModel = item.into();
                active.current_stock = Set(new_stock);
                active.updated_at = Set(Some(Utc::now()));
                let updated = active.update(&txn).await?;

                inventory_movement::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    restaurant_id: Set(restaurant_id),
                    inventory_item_id: Set(updated.id),
                    movement_type: Set(MOVEMENT_OUT.to_string()),
                    quantity: Set(required),
                    applied_quantity: Set(applied),
                    unit_cost: Set(Some(unit_cost)),
                    total_cost: Set(Some(applied * unit_cost)),
                    reference: Set(Some(order_number.to_string())),
                    created_by: Set(None),
                    created_at: Set(Utc::now()),
                }
                .insert(&txn)
                .await?;

                touched.push(updated);
            }
        }

        txn.commit().await?;

        for item in touched {
            if item.current_stock <= item.min_stock {
                self.emit_low_stock(&item).await;
            }
        }

        info!(order_number, "stock deducted for order");
        Ok(())
    }

    /// Credits back the applied quantities of an order's OUT movements,
    /// appending matching RETURN entries. Idempotent per order number.
    #[instrument(skip(self), fields(%restaurant_id, order_number))]
    pub async fn restore_for_order(
        &self,
        restaurant_id: Uuid,
        order_number: &str,
    ) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;

        let already_restored = InventoryMovementEntity::find()
            .filter(inventory_movement::Column::RestaurantId.eq(restaurant_id))
            .filter(inventory_movement::Column::Reference.eq(order_number))
            .filter(inventory_movement::Column::MovementType.eq(MOVEMENT_RETURN))
            .one(&txn)
            .await?
            .is_some();
        if already_restored {
            txn.commit().await?;
            warn!(order_number, "stock already restored for order");
            return Ok(());
        }

        let outgoing = InventoryMovementEntity::find()
            .filter(inventory_movement::Column::RestaurantId.eq(restaurant_id))
            .filter(inventory_movement::Column::Reference.eq(order_number))
            .filter(inventory_movement::Column::MovementType.eq(MOVEMENT_OUT))
            .all(&txn)
            .await?;

        for movement in outgoing {
            // Only what was actually taken comes back; the unclamped intent
            // must not inflate stock on restoration.
            let credit = movement.applied_quantity;
            if credit <= Decimal::ZERO {
                continue;
            }

            let item = InventoryItemEntity::find_by_id(movement.inventory_item_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!(
                        "Inventory item {} not found",
                        movement.inventory_item_id
                    ))
                })?;

            let new_stock = item.current_stock + credit;
            let unit_cost = item.unit_cost;
            let mut active: inventory_item::ActiveModel = item.into();
            active.current_stock = Set(new_stock);
            active.updated_at = Set(Some(Utc::now()));
            active.update(&txn).await?;

            inventory_movement::ActiveModel {
                id: Set(Uuid::new_v4()),
                restaurant_id: Set(restaurant_id),
                inventory_item_id: Set(movement.inventory_item_id),
                movement_type: Set(MOVEMENT_RETURN.to_string()),
                quantity: Set(credit),
                applied_quantity: Set(credit),
                unit_cost: Set(Some(unit_cost)),
                total_cost: Set(Some(credit * unit_cost)),
                reference: Set(Some(order_number.to_string())),
                created_by: Set(None),
                created_at: Set(Utc::now()),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        info!(order_number, "stock restored for order");
        Ok(())
    }

    /// Pure read: reports whether current stock covers the given lines.
    #[instrument(skip(self, lines), fields(%restaurant_id))]
    pub async fn check_availability(
        &self,
        restaurant_id: Uuid,
        lines: &[StockLine],
    ) -> Result<AvailabilityReport, ServiceError> {
        let mut shortages = Vec::new();

        for line in lines {
            let Some((recipe, ingredients)) =
                load_recipe(self.db.as_ref(), restaurant_id, line.menu_item_id).await?
            else {
                continue;
            };

            let ordered = Decimal::from(line.quantity);
            for ingredient in &ingredients {
                let Some(item) = InventoryItemEntity::find_by_id(ingredient.inventory_item_id)
                    .filter(inventory_item::Column::RestaurantId.eq(restaurant_id))
                    .one(self.db.as_ref())
                    .await?
                else {
                    continue;
                };

                let required = ingredient.quantity * ordered * recipe.portion_size;
                if item.current_stock < required {
                    shortages.push(Shortage {
                        inventory_item_id: item.id,
                        name: item.name,
                        required,
                        available: item.current_stock,
                    });
                }
            }
        }

        Ok(AvailabilityReport {
            available: shortages.is_empty(),
            shortages,
        })
    }

    async fn emit_low_stock(&self, item: &InventoryItemModel) {
        let event = Event::InventoryLowStock {
            restaurant_id: item.restaurant_id,
            inventory_item_id: item.id,
            name: item.name.clone(),
            current_stock: item.current_stock,
            min_stock: item.min_stock,
        };
        if let Err(e) = self.event_sender.send(event).await {
            error!("Failed to send InventoryLowStock event: {}", e);
        }
    }
}

/// Loads a menu item's recipe with its ingredients, if one exists.
async fn load_recipe<C: sea_orm::ConnectionTrait>(
    conn: &C,
    restaurant_id: Uuid,
    menu_item_id: Uuid,
) -> Result<Option<(recipe::Model, Vec<recipe_ingredient::Model>)>, ServiceError> {
    let Some(recipe) = RecipeEntity::find()
        .filter(recipe::Column::RestaurantId.eq(restaurant_id))
        .filter(recipe::Column::MenuItemId.eq(menu_item_id))
        .one(conn)
        .await?
    else {
        return Ok(None);
    };

    let ingredients = RecipeIngredientEntity::find()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe.id))
        .all(conn)
        .await?;

    Ok(Some((recipe, ingredients)))
}
