use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        dining_table::{self, Entity as DiningTableEntity},
        menu_item::{self, Entity as MenuItemEntity, Model as MenuItemModel},
        restaurant::{self, Entity as RestaurantEntity},
    },
    errors::ServiceError,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMenuItemRequest {
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateMenuItemRequest {
    pub category: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DigitalMenuItem {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DigitalMenuCategory {
    pub category: String,
    pub items: Vec<DigitalMenuItem>,
}

/// Public menu rendered for guests scanning a table code.
#[derive(Debug, Serialize, ToSchema)]
pub struct DigitalMenu {
    pub restaurant: String,
    pub slug: String,
    pub currency: String,
    pub categories: Vec<DigitalMenuCategory>,
}

/// Payload a QR encoder turns into a table code. Encoding itself happens
/// outside this service; clients receive the URL.
#[derive(Debug, Serialize, ToSchema)]
pub struct TableQrPayload {
    pub table_id: Uuid,
    pub table_number: i32,
    pub url: String,
}

#[derive(Clone)]
pub struct MenuService {
    db: Arc<DatabaseConnection>,
    public_base_url: String,
}

impl MenuService {
    pub fn new(db: Arc<DatabaseConnection>, public_base_url: String) -> Self {
        Self {
            db,
            public_base_url,
        }
    }

    #[instrument(skip(self, request), fields(%restaurant_id))]
    pub async fn create_item(
        &self,
        restaurant_id: Uuid,
        request: CreateMenuItemRequest,
    ) -> Result<MenuItemModel, ServiceError> {
        request.validate()?;
        if request.price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Price cannot be negative".to_string(),
            ));
        }

        let item = menu_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            restaurant_id: Set(restaurant_id),
            category: Set(request.category),
            name: Set(request.name),
            description: Set(request.description),
            price: Set(request.price.round_dp(2)),
            is_available: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(self.db.as_ref())
        .await?;

        info!(menu_item_id = %item.id, "menu item created");
        Ok(item)
    }

    pub async fn get_item(
        &self,
        restaurant_id: Uuid,
        item_id: Uuid,
    ) -> Result<MenuItemModel, ServiceError> {
        MenuItemEntity::find_by_id(item_id)
            .filter(menu_item::Column::RestaurantId.eq(restaurant_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Menu item {} not found", item_id)))
    }

    /// Full menu for staff, including unavailable items.
    pub async fn list_items(
        &self,
        restaurant_id: Uuid,
        category: Option<String>,
    ) -> Result<Vec<MenuItemModel>, ServiceError> {
        let mut query =
            MenuItemEntity::find().filter(menu_item::Column::RestaurantId.eq(restaurant_id));
        if let Some(category) = category {
            query = query.filter(menu_item::Column::Category.eq(category));
        }
        Ok(query
            .order_by_asc(menu_item::Column::Category)
            .order_by_asc(menu_item::Column::Name)
            .all(self.db.as_ref())
            .await?)
    }

    #[instrument(skip(self, request), fields(%restaurant_id, %item_id))]
    pub async fn update_item(
        &self,
        restaurant_id: Uuid,
        item_id: Uuid,
        request: UpdateMenuItemRequest,
    ) -> Result<MenuItemModel, ServiceError> {
        request.validate()?;
        if matches!(request.price, Some(p) if p < Decimal::ZERO) {
            return Err(ServiceError::ValidationError(
                "Price cannot be negative".to_string(),
            ));
        }
        let item = self.get_item(restaurant_id, item_id).await?;

        let mut active: menu_item::ActiveModel = item.into();
        if let Some(category) = request.category {
            active.category = Set(category);
        }
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if request.description.is_some() {
            active.description = Set(request.description);
        }
        if let Some(price) = request.price {
            active.price = Set(price.round_dp(2));
        }
        if let Some(is_available) = request.is_available {
            active.is_available = Set(is_available);
        }
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(self.db.as_ref()).await?)
    }

    /// Quick 86 toggle for service.
    #[instrument(skip(self), fields(%restaurant_id, %item_id, available))]
    pub async fn set_availability(
        &self,
        restaurant_id: Uuid,
        item_id: Uuid,
        available: bool,
    ) -> Result<MenuItemModel, ServiceError> {
        let item = self.get_item(restaurant_id, item_id).await?;
        let mut active: menu_item::ActiveModel = item.into();
        active.is_available = Set(available);
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(self.db.as_ref()).await?)
    }

    /// Unauthenticated guest menu looked up by restaurant slug. Only active
    /// restaurants and available items are visible.
    #[instrument(skip(self))]
    pub async fn digital_menu(&self, slug: &str) -> Result<DigitalMenu, ServiceError> {
        let restaurant = RestaurantEntity::find()
            .filter(restaurant::Column::Slug.eq(slug))
            .filter(restaurant::Column::IsActive.eq(true))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Restaurant {} not found", slug)))?;

        let items = MenuItemEntity::find()
            .filter(menu_item::Column::RestaurantId.eq(restaurant.id))
            .filter(menu_item::Column::IsAvailable.eq(true))
            .order_by_asc(menu_item::Column::Name)
            .all(self.db.as_ref())
            .await?;

        let mut grouped: BTreeMap<String, Vec<DigitalMenuItem>> = BTreeMap::new();
        for item in items {
            grouped
                .entry(item.category.clone())
                .or_default()
                .push(DigitalMenuItem {
                    id: item.id,
                    name: item.name,
                    description: item.description,
                    price: item.price,
                });
        }

        Ok(DigitalMenu {
            restaurant: restaurant.name,
            slug: restaurant.slug,
            currency: restaurant.currency,
            categories: grouped
                .into_iter()
                .map(|(category, items)| DigitalMenuCategory { category, items })
                .collect(),
        })
    }

    /// URL payload a table QR code points at.
    #[instrument(skip(self), fields(%restaurant_id, %table_id))]
    pub async fn table_qr_payload(
        &self,
        restaurant_id: Uuid,
        table_id: Uuid,
    ) -> Result<TableQrPayload, ServiceError> {
        let restaurant = RestaurantEntity::find_by_id(restaurant_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Restaurant {} not found", restaurant_id))
            })?;
        let table = DiningTableEntity::find_by_id(table_id)
            .filter(dining_table::Column::RestaurantId.eq(restaurant_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Table {} not found", table_id)))?;

        Ok(TableQrPayload {
            table_id: table.id,
            table_number: table.number,
            url: format!(
                "{}/menu/{}?table={}",
                self.public_base_url.trim_end_matches('/'),
                restaurant.slug,
                table.number
            ),
        })
    }
}
