use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entities::{
        inventory_item::{self, Entity as InventoryItemEntity},
        order::{self, Entity as OrderEntity},
        order_item::{self, Entity as OrderItemEntity},
        payment::{self, Entity as PaymentEntity},
    },
    errors::ServiceError,
    services::orders::OrderStatus,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct SalesSummary {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub order_count: u64,
    pub gross: Decimal,
    pub tax: Decimal,
    pub service_charge: Decimal,
    pub discount: Decimal,
    pub net: Decimal,
    pub average_ticket: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MethodBreakdownRow {
    pub method: String,
    pub count: u64,
    /// Signed sum; refunds subtract from their method
    pub amount: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopItemRow {
    pub menu_item_id: Uuid,
    pub name: String,
    pub quantity_sold: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LowStockRow {
    pub inventory_item_id: Uuid,
    pub sku: String,
    pub name: String,
    pub current_stock: Decimal,
    pub min_stock: Decimal,
}

/// Read-only rollups over settled orders. Everything here aggregates PAID
/// orders only; open and cancelled orders never contribute.
#[derive(Clone)]
pub struct ReportService {
    db: Arc<DatabaseConnection>,
}

impl ReportService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(%restaurant_id))]
    pub async fn sales_summary(
        &self,
        restaurant_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<SalesSummary, ServiceError> {
        let orders = self.paid_orders(restaurant_id, from, to).await?;

        let mut gross = Decimal::ZERO;
        let mut tax = Decimal::ZERO;
        let mut service_charge = Decimal::ZERO;
        let mut discount = Decimal::ZERO;
        for order in &orders {
            gross += order.total;
            tax += order.tax;
            service_charge += order.service_charge;
            discount += order.discount;
        }

        let order_count = orders.len() as u64;
        let net = gross - tax - service_charge;
        let average_ticket = if order_count == 0 {
            Decimal::ZERO
        } else {
            (gross / Decimal::from(order_count)).round_dp(2)
        };

        Ok(SalesSummary {
            from,
            to,
            order_count,
            gross,
            tax,
            service_charge,
            discount,
            net,
            average_ticket,
        })
    }

    /// Signed per-method totals over the payment ledger in the range.
    #[instrument(skip(self), fields(%restaurant_id))]
    pub async fn payment_method_breakdown(
        &self,
        restaurant_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<MethodBreakdownRow>, ServiceError> {
        let payments = PaymentEntity::find()
            .filter(payment::Column::RestaurantId.eq(restaurant_id))
            .filter(payment::Column::CreatedAt.gte(from))
            .filter(payment::Column::CreatedAt.lt(to))
            .all(self.db.as_ref())
            .await?;

        let mut by_method: HashMap<String, (u64, Decimal)> = HashMap::new();
        for row in payments {
            let entry = by_method.entry(row.method).or_insert((0, Decimal::ZERO));
            entry.0 += 1;
            entry.1 += row.amount;
        }

        let mut rows: Vec<MethodBreakdownRow> = by_method
            .into_iter()
            .map(|(method, (count, amount))| MethodBreakdownRow {
                method,
                count,
                amount,
            })
            .collect();
        rows.sort_by(|a, b| b.amount.cmp(&a.amount));
        Ok(rows)
    }

    #[instrument(skip(self), fields(%restaurant_id))]
    pub async fn top_items(
        &self,
        restaurant_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<TopItemRow>, ServiceError> {
        let orders = self.paid_orders(restaurant_id, from, to).await?;
        if orders.is_empty() {
            return Ok(Vec::new());
        }
        let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();

        let items = OrderItemEntity::find()
            .filter(order_item::Column::OrderId.is_in(order_ids))
            .all(self.db.as_ref())
            .await?;

        let mut by_item: HashMap<Uuid, TopItemRow> = HashMap::new();
        for item in items {
            let entry = by_item.entry(item.menu_item_id).or_insert(TopItemRow {
                menu_item_id: item.menu_item_id,
                name: item.name.clone(),
                quantity_sold: 0,
                revenue: Decimal::ZERO,
            });
            entry.quantity_sold += i64::from(item.quantity);
            entry.revenue += item.total;
        }

        let mut rows: Vec<TopItemRow> = by_item.into_values().collect();
        rows.sort_by(|a, b| {
            b.quantity_sold
                .cmp(&a.quantity_sold)
                .then(b.revenue.cmp(&a.revenue))
        });
        rows.truncate(limit);
        Ok(rows)
    }

    /// Current low-stock snapshot; not range-bound.
    #[instrument(skip(self), fields(%restaurant_id))]
    pub async fn low_stock(&self, restaurant_id: Uuid) -> Result<Vec<LowStockRow>, ServiceError> {
        let items = InventoryItemEntity::find()
            .filter(inventory_item::Column::RestaurantId.eq(restaurant_id))
            .filter(inventory_item::Column::IsActive.eq(true))
            .order_by_asc(inventory_item::Column::Name)
            .all(self.db.as_ref())
            .await?;

        Ok(items
            .into_iter()
            .filter(|i| i.current_stock <= i.min_stock)
            .map(|i| LowStockRow {
                inventory_item_id: i.id,
                sku: i.sku,
                name: i.name,
                current_stock: i.current_stock,
                min_stock: i.min_stock,
            })
            .collect())
    }

    async fn paid_orders(
        &self,
        restaurant_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<order::Model>, ServiceError> {
        Ok(OrderEntity::find()
            .filter(order::Column::RestaurantId.eq(restaurant_id))
            .filter(order::Column::Status.eq(OrderStatus::Paid.to_string()))
            .filter(order::Column::CompletedAt.gte(from))
            .filter(order::Column::CompletedAt.lt(to))
            .all(self.db.as_ref())
            .await?)
    }
}
