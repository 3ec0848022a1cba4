use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        inventory_item::{self, Entity as InventoryItemEntity},
        menu_item::{self, Entity as MenuItemEntity},
        recipe::{self, Entity as RecipeEntity, Model as RecipeModel},
        recipe_ingredient::{self, Entity as RecipeIngredientEntity},
    },
    errors::ServiceError,
};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecipeIngredientRequest {
    pub inventory_item_id: Uuid,
    pub quantity: Decimal,
    #[validate(length(min = 1, message = "Unit is required"))]
    pub unit: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpsertRecipeRequest {
    pub portion_size: Option<Decimal>,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "At least one ingredient is required"))]
    pub ingredients: Vec<RecipeIngredientRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecipeIngredientDetail {
    pub inventory_item_id: Uuid,
    pub name: String,
    pub quantity: Decimal,
    pub unit: String,
    pub unit_cost: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecipeDetail {
    pub id: Uuid,
    pub menu_item_id: Uuid,
    pub portion_size: Decimal,
    pub notes: Option<String>,
    pub ingredients: Vec<RecipeIngredientDetail>,
    /// Σ(ingredient quantity × unit cost) × portion size
    pub cost: Decimal,
}

/// Bill-of-materials management for menu items. One recipe per menu item;
/// writing a recipe replaces its ingredient list wholesale.
#[derive(Clone)]
pub struct RecipeService {
    db: Arc<DatabaseConnection>,
}

impl RecipeService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Creates or replaces the recipe for a menu item in one transaction.
    #[instrument(skip(self, request), fields(%restaurant_id, %menu_item_id))]
    pub async fn upsert_recipe(
        &self,
        restaurant_id: Uuid,
        menu_item_id: Uuid,
        request: UpsertRecipeRequest,
    ) -> Result<RecipeDetail, ServiceError> {
        request.validate()?;
        for ingredient in &request.ingredients {
            ingredient.validate()?;
            if ingredient.quantity <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Ingredient quantity must be positive".to_string(),
                ));
            }
        }

        let menu_item = MenuItemEntity::find_by_id(menu_item_id)
            .filter(menu_item::Column::RestaurantId.eq(restaurant_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Menu item {} not found", menu_item_id))
            })?;

        let txn = self.db.begin().await?;

        for ingredient in &request.ingredients {
            let exists = InventoryItemEntity::find_by_id(ingredient.inventory_item_id)
                .filter(inventory_item::Column::RestaurantId.eq(restaurant_id))
                .one(&txn)
                .await?
                .is_some();
            if !exists {
                return Err(ServiceError::NotFound(format!(
                    "Inventory item {} not found",
                    ingredient.inventory_item_id
                )));
            }
        }

        let existing = RecipeEntity::find()
            .filter(recipe::Column::RestaurantId.eq(restaurant_id))
            .filter(recipe::Column::MenuItemId.eq(menu_item.id))
            .one(&txn)
            .await?;

        let recipe = match existing {
            Some(model) => {
                RecipeIngredientEntity::delete_many()
                    .filter(recipe_ingredient::Column::RecipeId.eq(model.id))
                    .exec(&txn)
                    .await?;

                let mut active: recipe::ActiveModel = model.into();
                if let Some(portion_size) = request.portion_size {
                    active.portion_size = Set(portion_size);
                }
                active.notes = Set(request.notes.clone());
                active.updated_at = Set(Some(Utc::now()));
                active.update(&txn).await?
            }
            None => {
                recipe::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    restaurant_id: Set(restaurant_id),
                    menu_item_id: Set(menu_item.id),
                    portion_size: Set(request.portion_size.unwrap_or(Decimal::ONE)),
                    notes: Set(request.notes.clone()),
                    created_at: Set(Utc::now()),
                    updated_at: Set(None),
                }
                .insert(&txn)
                .await?
            }
        };

        for ingredient in &request.ingredients {
            recipe_ingredient::ActiveModel {
                id: Set(Uuid::new_v4()),
                recipe_id: Set(recipe.id),
                inventory_item_id: Set(ingredient.inventory_item_id),
                quantity: Set(ingredient.quantity),
                unit: Set(ingredient.unit.clone()),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        info!(recipe_id = %recipe.id, "recipe saved");
        self.load_detail(restaurant_id, recipe).await
    }

    /// Recipe with ingredients and current cost for a menu item.
    #[instrument(skip(self), fields(%restaurant_id, %menu_item_id))]
    pub async fn get_recipe(
        &self,
        restaurant_id: Uuid,
        menu_item_id: Uuid,
    ) -> Result<RecipeDetail, ServiceError> {
        let recipe = RecipeEntity::find()
            .filter(recipe::Column::RestaurantId.eq(restaurant_id))
            .filter(recipe::Column::MenuItemId.eq(menu_item_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("No recipe for menu item {}", menu_item_id))
            })?;
        self.load_detail(restaurant_id, recipe).await
    }

    #[instrument(skip(self), fields(%restaurant_id, %menu_item_id))]
    pub async fn delete_recipe(
        &self,
        restaurant_id: Uuid,
        menu_item_id: Uuid,
    ) -> Result<(), ServiceError> {
        let recipe = RecipeEntity::find()
            .filter(recipe::Column::RestaurantId.eq(restaurant_id))
            .filter(recipe::Column::MenuItemId.eq(menu_item_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("No recipe for menu item {}", menu_item_id))
            })?;

        let txn = self.db.begin().await?;
        RecipeIngredientEntity::delete_many()
            .filter(recipe_ingredient::Column::RecipeId.eq(recipe.id))
            .exec(&txn)
            .await?;
        recipe.delete(&txn).await?;
        txn.commit().await?;
        info!("recipe deleted");
        Ok(())
    }

    async fn load_detail(
        &self,
        restaurant_id: Uuid,
        recipe: RecipeModel,
    ) -> Result<RecipeDetail, ServiceError> {
        let rows = RecipeIngredientEntity::find()
            .filter(recipe_ingredient::Column::RecipeId.eq(recipe.id))
            .find_also_related(InventoryItemEntity)
            .all(self.db.as_ref())
            .await?;

        let mut ingredients = Vec::with_capacity(rows.len());
        let mut cost = Decimal::ZERO;
        for (row, item) in rows {
            let item = item.ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "recipe ingredient {} references a missing inventory item",
                    row.id
                ))
            })?;
            if item.restaurant_id != restaurant_id {
                continue;
            }
            cost += row.quantity * item.unit_cost;
            ingredients.push(RecipeIngredientDetail {
                inventory_item_id: item.id,
                name: item.name,
                quantity: row.quantity,
                unit: row.unit,
                unit_cost: item.unit_cost,
            });
        }

        Ok(RecipeDetail {
            id: recipe.id,
            menu_item_id: recipe.menu_item_id,
            portion_size: recipe.portion_size,
            notes: recipe.notes,
            ingredients,
            cost: (cost * recipe.portion_size).round_dp(2),
        })
    }
}
