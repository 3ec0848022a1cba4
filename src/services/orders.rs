use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use sea_orm::sea_query::Expr;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        dining_table::{self, Entity as TableEntity},
        menu_item::{self, Entity as MenuItemEntity},
        order::{self, ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel},
        order_counter::{self, Entity as OrderCounterEntity},
        order_item::{self, Entity as OrderItemEntity, Model as OrderItemModel},
        restaurant::Entity as RestaurantEntity,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::stock::{StockLine, StockService},
    services::tables::TableStatus,
};

/// Order lifecycle states. Orders advance through the forward sequence or
/// terminate at CANCELLED; PAID and CANCELLED are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Served,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Cancelled)
    }

    /// Explicit transition table. Each status advances to its successor;
    /// cancellation is reachable until the order has been served or paid.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Confirmed, Preparing)
                | (Preparing, Ready)
                | (Ready, Served)
                | (Served, Paid)
                | (Pending, Cancelled)
                | (Confirmed, Cancelled)
                | (Preparing, Cancelled)
                | (Ready, Cancelled)
        )
    }

    /// Status strings of orders still in flight, for table-release checks.
    pub fn open_statuses() -> Vec<String> {
        use OrderStatus::*;
        [Pending, Confirmed, Preparing, Ready, Served]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Paid,
    Refunded,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct OrderLineRequest {
    pub menu_item_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    pub table_id: Option<Uuid>,
    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<OrderLineRequest>,
    #[validate(range(min = 1, message = "Guest count must be at least 1"))]
    pub guest_count: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub menu_item_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total: Decimal,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub status: String,
    pub payment_status: String,
    pub table_id: Option<Uuid>,
    pub guest_count: i32,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub service_charge: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub notes: Option<String>,
    pub items: Vec<OrderItemResponse>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Derived monetary breakdown for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub service_charge: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

/// Recomputes tax and service charge from a subtotal using the restaurant's
/// configured percentage rates, then derives the total. Amounts are rounded
/// to two decimal places.
pub fn compute_totals(
    subtotal: Decimal,
    tax_rate: Decimal,
    service_charge_rate: Decimal,
    discount: Decimal,
) -> OrderTotals {
    let hundred = dec!(100);
    let tax = (subtotal * tax_rate / hundred).round_dp(2);
    let service_charge = (subtotal * service_charge_rate / hundred).round_dp(2);
    let total = subtotal + tax + service_charge - discount;
    OrderTotals {
        subtotal,
        tax,
        service_charge,
        discount,
        total,
    }
}

/// Service owning the order lifecycle: creation, item addition, status
/// transitions and cancellation.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
    stock: StockService,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender, stock: StockService) -> Self {
        Self {
            db,
            event_sender,
            stock,
        }
    }

    /// Creates an order with its items in a single transaction.
    ///
    /// Stock deduction runs detached from the request: the sale is
    /// authoritative even if inventory bookkeeping lags or fails.
    #[instrument(skip(self, request), fields(restaurant_id = %restaurant_id))]
    pub async fn create_order(
        &self,
        restaurant_id: Uuid,
        request: CreateOrderRequest,
        created_by: Option<String>,
    ) -> Result<OrderResponse, ServiceError> {
        request.validate()?;
        for line in &request.items {
            line.validate()?;
        }

        let restaurant = RestaurantEntity::find_by_id(restaurant_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Restaurant not found".to_string()))?;
        if !restaurant.is_active {
            return Err(ServiceError::Forbidden(
                "Restaurant is not active".to_string(),
            ));
        }

        let now = Utc::now();
        let order_id = Uuid::new_v4();

        let txn = self.db.begin().await?;

        let order_number = next_order_number(&txn, restaurant_id).await?;

        let mut subtotal = Decimal::ZERO;
        let mut item_rows = Vec::with_capacity(request.items.len());
        for line in &request.items {
            let menu_item = MenuItemEntity::find_by_id(line.menu_item_id)
                .filter(menu_item::Column::RestaurantId.eq(restaurant_id))
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::ItemUnavailable(format!(
                        "menu item {} not found",
                        line.menu_item_id
                    ))
                })?;
            if !menu_item.is_available {
                return Err(ServiceError::ItemUnavailable(menu_item.name));
            }

            let quantity = Decimal::from(line.quantity);
            let line_total = menu_item.price * quantity;
            subtotal += line_total;

            item_rows.push(order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                menu_item_id: Set(menu_item.id),
                name: Set(menu_item.name),
                quantity: Set(line.quantity),
                unit_price: Set(menu_item.price),
                total: Set(line_total),
                status: Set(OrderStatus::Pending.to_string()),
                sent_to_kitchen_at: Set(None),
                ready_at: Set(None),
                served_at: Set(None),
                created_at: Set(now),
            });
        }

        let totals = compute_totals(
            subtotal,
            restaurant.tax_rate,
            restaurant.service_charge_rate,
            Decimal::ZERO,
        );

        let mut table_event = None;
        if let Some(table_id) = request.table_id {
            let table = TableEntity::find_by_id(table_id)
                .filter(dining_table::Column::RestaurantId.eq(restaurant_id))
                .one(&txn)
                .await?
                .ok_or_else(|| ServiceError::NotFound("Table not found".to_string()))?;
            let mut active: dining_table::ActiveModel = table.into();
            active.status = Set(TableStatus::Occupied.to_string());
            active.updated_at = Set(Some(now));
            active.update(&txn).await?;
            table_event = Some(Event::TableStatusChanged {
                restaurant_id,
                table_id,
                status: TableStatus::Occupied.to_string(),
            });
        }

        let order_row = OrderActiveModel {
            id: Set(order_id),
            restaurant_id: Set(restaurant_id),
            order_number: Set(order_number.clone()),
            status: Set(OrderStatus::Pending.to_string()),
            payment_status: Set(PaymentStatus::Pending.to_string()),
            table_id: Set(request.table_id),
            guest_count: Set(request.guest_count),
            subtotal: Set(totals.subtotal),
            tax: Set(totals.tax),
            service_charge: Set(totals.service_charge),
            discount: Set(totals.discount),
            total: Set(totals.total),
            notes: Set(request.notes),
            created_by: Set(created_by),
            completed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };
        let order_model = order_row.insert(&txn).await?;

        let mut items = Vec::with_capacity(item_rows.len());
        for row in item_rows {
            items.push(row.insert(&txn).await?);
        }

        txn.commit().await?;

        info!(order_id = %order_id, order_number = %order_number, "order created");

        self.spawn_stock_deduction(
            restaurant_id,
            order_number.clone(),
            request
                .items
                .iter()
                .map(|line| StockLine {
                    menu_item_id: line.menu_item_id,
                    quantity: line.quantity,
                })
                .collect(),
        );

        if let Some(event) = table_event {
            self.emit(event).await;
        }
        self.emit(Event::OrderCreated {
            restaurant_id,
            order_id,
            order_number,
        })
        .await;

        Ok(to_response(order_model, items))
    }

    /// Adds items to an open order, re-deriving tax and service charge from
    /// the new subtotal (not additively) minus the existing discount.
    #[instrument(skip(self, items), fields(order_id = %order_id))]
    pub async fn add_items(
        &self,
        restaurant_id: Uuid,
        order_id: Uuid,
        items: Vec<OrderLineRequest>,
    ) -> Result<OrderResponse, ServiceError> {
        if items.is_empty() {
            return Err(ServiceError::ValidationError(
                "At least one item is required".to_string(),
            ));
        }
        for line in &items {
            line.validate()?;
        }

        let restaurant = RestaurantEntity::find_by_id(restaurant_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Restaurant not found".to_string()))?;

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let order = find_order(&txn, restaurant_id, order_id).await?;
        let status = parse_status(&order.status)?;
        if status.is_terminal() {
            return Err(ServiceError::OrderClosed(order.order_number));
        }

        let mut added = Decimal::ZERO;
        let mut new_rows = Vec::with_capacity(items.len());
        for line in &items {
            let menu_item = MenuItemEntity::find_by_id(line.menu_item_id)
                .filter(menu_item::Column::RestaurantId.eq(restaurant_id))
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::ItemUnavailable(format!(
                        "menu item {} not found",
                        line.menu_item_id
                    ))
                })?;
            if !menu_item.is_available {
                return Err(ServiceError::ItemUnavailable(menu_item.name));
            }

            let line_total = menu_item.price * Decimal::from(line.quantity);
            added += line_total;

            new_rows.push(order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                menu_item_id: Set(menu_item.id),
                name: Set(menu_item.name),
                quantity: Set(line.quantity),
                unit_price: Set(menu_item.price),
                total: Set(line_total),
                status: Set(order.status.clone()),
                sent_to_kitchen_at: Set(None),
                ready_at: Set(None),
                served_at: Set(None),
                created_at: Set(now),
            });
        }

        let totals = compute_totals(
            order.subtotal + added,
            restaurant.tax_rate,
            restaurant.service_charge_rate,
            order.discount,
        );

        let order_number = order.order_number.clone();
        let mut active: OrderActiveModel = order.into();
        active.subtotal = Set(totals.subtotal);
        active.tax = Set(totals.tax);
        active.service_charge = Set(totals.service_charge);
        active.total = Set(totals.total);
        active.updated_at = Set(Some(now));
        let updated = active.update(&txn).await?;

        for row in new_rows {
            row.insert(&txn).await?;
        }

        txn.commit().await?;

        info!(order_id = %order_id, added = %added, "items added to order");

        // Deduct only the newly added lines.
        self.spawn_stock_deduction(
            restaurant_id,
            order_number,
            items
                .iter()
                .map(|line| StockLine {
                    menu_item_id: line.menu_item_id,
                    quantity: line.quantity,
                })
                .collect(),
        );

        let status = updated.status.clone();
        self.emit(Event::OrderUpdated {
            restaurant_id,
            order_id,
            status,
        })
        .await;

        let all_items = OrderItemEntity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(to_response(updated, all_items))
    }

    /// Applies a status transition validated against the transition table.
    #[instrument(skip(self), fields(order_id = %order_id, new_status = %new_status))]
    pub async fn update_status(
        &self,
        restaurant_id: Uuid,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<OrderResponse, ServiceError> {
        if new_status == OrderStatus::Cancelled {
            return self.cancel_order(restaurant_id, order_id).await;
        }

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let order = find_order(&txn, restaurant_id, order_id).await?;
        let current = parse_status(&order.status)?;
        if !current.can_transition_to(new_status) {
            return Err(ServiceError::IllegalTransition {
                from: current.to_string(),
                to: new_status.to_string(),
            });
        }

        let mut active: OrderActiveModel = order.into();
        active.status = Set(new_status.to_string());
        active.updated_at = Set(Some(now));
        if matches!(new_status, OrderStatus::Served | OrderStatus::Paid) {
            active.completed_at = Set(Some(now));
        }
        let updated = active.update(&txn).await?;

        stamp_items(&txn, order_id, new_status, now).await?;

        txn.commit().await?;

        info!(order_id = %order_id, status = %new_status, "order status updated");

        self.emit(Event::OrderUpdated {
            restaurant_id,
            order_id,
            status: new_status.to_string(),
        })
        .await;

        let items = OrderItemEntity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(to_response(updated, items))
    }

    /// Cancels an order, releases its table when no other open orders remain
    /// on it, and restores stock detached from the request.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn cancel_order(
        &self,
        restaurant_id: Uuid,
        order_id: Uuid,
    ) -> Result<OrderResponse, ServiceError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let order = find_order(&txn, restaurant_id, order_id).await?;
        let current = parse_status(&order.status)?;
        if matches!(current, OrderStatus::Served | OrderStatus::Paid) {
            return Err(ServiceError::OrderAlreadyCompleted(order.order_number));
        }
        if current == OrderStatus::Cancelled {
            return Err(ServiceError::OrderCancelled(order.order_number));
        }

        let order_number = order.order_number.clone();
        let table_id = order.table_id;

        let mut active: OrderActiveModel = order.into();
        active.status = Set(OrderStatus::Cancelled.to_string());
        active.updated_at = Set(Some(now));
        let updated = active.update(&txn).await?;

        let mut table_event = None;
        if let Some(table_id) = table_id {
            let open_orders = OrderEntity::find()
                .filter(order::Column::TableId.eq(table_id))
                .filter(order::Column::Id.ne(order_id))
                .filter(
                    order::Column::Status.is_not_in([
                        OrderStatus::Paid.to_string(),
                        OrderStatus::Cancelled.to_string(),
                    ]),
                )
                .count(&txn)
                .await?;
            if open_orders == 0 {
                if let Some(table) = TableEntity::find_by_id(table_id).one(&txn).await? {
                    let mut table_active: dining_table::ActiveModel = table.into();
                    table_active.status = Set(TableStatus::Available.to_string());
                    table_active.updated_at = Set(Some(now));
                    table_active.update(&txn).await?;
                    table_event = Some(Event::TableStatusChanged {
                        restaurant_id,
                        table_id,
                        status: TableStatus::Available.to_string(),
                    });
                }
            }
        }

        txn.commit().await?;

        info!(order_id = %order_id, order_number = %order_number, "order cancelled");

        // Reverse the deduction; independent of the cancellation response.
        let stock = self.stock.clone();
        let number = order_number.clone();
        tokio::spawn(async move {
            if let Err(e) = stock.restore_for_order(restaurant_id, &number).await {
                error!(order_number = %number, error = %e, "stock restoration failed");
            }
        });

        if let Some(event) = table_event {
            self.emit(event).await;
        }
        self.emit(Event::OrderCancelled {
            restaurant_id,
            order_id,
            order_number,
        })
        .await;

        let items = OrderItemEntity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(to_response(updated, items))
    }

    /// Fetches an order with its items.
    #[instrument(skip(self))]
    pub async fn get_order(
        &self,
        restaurant_id: Uuid,
        order_id: Uuid,
    ) -> Result<OrderResponse, ServiceError> {
        let order = OrderEntity::find_by_id(order_id)
            .filter(order::Column::RestaurantId.eq(restaurant_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;
        let items = OrderItemEntity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(to_response(order, items))
    }

    /// Fetches an order by its human-readable number.
    #[instrument(skip(self))]
    pub async fn get_order_by_number(
        &self,
        restaurant_id: Uuid,
        order_number: &str,
    ) -> Result<OrderResponse, ServiceError> {
        let order = OrderEntity::find()
            .filter(order::Column::RestaurantId.eq(restaurant_id))
            .filter(order::Column::OrderNumber.eq(order_number))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;
        let items = OrderItemEntity::find()
            .filter(order_item::Column::OrderId.eq(order.id))
            .order_by_asc(order_item::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(to_response(order, items))
    }

    /// Lists orders with pagination and optional status filter.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        restaurant_id: Uuid,
        page: u64,
        per_page: u64,
        status: Option<OrderStatus>,
    ) -> Result<(Vec<OrderResponse>, u64), ServiceError> {
        let mut query = OrderEntity::find()
            .filter(order::Column::RestaurantId.eq(restaurant_id))
            .order_by_desc(order::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(order::Column::Status.eq(status.to_string()));
        }

        let paginator = query.paginate(&*self.db, per_page.max(1));
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page.saturating_sub(1)).await?;

        let mut responses = Vec::with_capacity(orders.len());
        for order in orders {
            let items = OrderItemEntity::find()
                .filter(order_item::Column::OrderId.eq(order.id))
                .order_by_asc(order_item::Column::CreatedAt)
                .all(&*self.db)
                .await?;
            responses.push(to_response(order, items));
        }
        Ok((responses, total))
    }

    fn spawn_stock_deduction(&self, restaurant_id: Uuid, order_number: String, lines: Vec<StockLine>) {
        let stock = self.stock.clone();
        tokio::spawn(async move {
            if let Err(e) = stock
                .deduct_for_order(restaurant_id, &order_number, &lines)
                .await
            {
                error!(order_number = %order_number, error = %e, "stock deduction failed");
            }
        });
    }

    async fn emit(&self, event: Event) {
        if let Err(e) = self.event_sender.send(event).await {
            warn!(error = %e, "failed to send event");
        }
    }
}

/// Increments the per-tenant counter inside the caller's transaction and
/// formats the next order number. The counter row lock serializes concurrent
/// creators.
async fn next_order_number(
    txn: &DatabaseTransaction,
    restaurant_id: Uuid,
) -> Result<String, ServiceError> {
    let updated = OrderCounterEntity::update_many()
        .col_expr(
            order_counter::Column::LastNumber,
            Expr::col(order_counter::Column::LastNumber).add(1),
        )
        .filter(order_counter::Column::RestaurantId.eq(restaurant_id))
        .exec(txn)
        .await?
        .rows_affected;

    if updated == 0 {
        order_counter::ActiveModel {
            restaurant_id: Set(restaurant_id),
            last_number: Set(1),
        }
        .insert(txn)
        .await?;
    }

    let counter = OrderCounterEntity::find_by_id(restaurant_id)
        .one(txn)
        .await?
        .ok_or_else(|| ServiceError::InternalError("order counter missing".to_string()))?;

    Ok(format_order_number(counter.last_number))
}

pub fn format_order_number(sequence: i64) -> String {
    format!("ORD-{:06}", sequence)
}

async fn find_order(
    txn: &DatabaseTransaction,
    restaurant_id: Uuid,
    order_id: Uuid,
) -> Result<OrderModel, ServiceError> {
    OrderEntity::find_by_id(order_id)
        .filter(order::Column::RestaurantId.eq(restaurant_id))
        .one(txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))
}

fn parse_status(raw: &str) -> Result<OrderStatus, ServiceError> {
    OrderStatus::from_str(raw)
        .map_err(|_| ServiceError::InternalError(format!("unknown order status {raw}")))
}

/// Mirrors relevant order transitions onto the item rows.
async fn stamp_items(
    txn: &DatabaseTransaction,
    order_id: Uuid,
    status: OrderStatus,
    now: DateTime<Utc>,
) -> Result<(), ServiceError> {
    let items = OrderItemEntity::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .all(txn)
        .await?;
    for item in items {
        let mut active: order_item::ActiveModel = item.into();
        active.status = Set(status.to_string());
        match status {
            OrderStatus::Preparing => active.sent_to_kitchen_at = Set(Some(now)),
            OrderStatus::Ready => active.ready_at = Set(Some(now)),
            OrderStatus::Served => active.served_at = Set(Some(now)),
            _ => {}
        }
        active.update(txn).await?;
    }
    Ok(())
}

fn to_response(order: OrderModel, items: Vec<OrderItemModel>) -> OrderResponse {
    OrderResponse {
        id: order.id,
        order_number: order.order_number,
        status: order.status,
        payment_status: order.payment_status,
        table_id: order.table_id,
        guest_count: order.guest_count,
        subtotal: order.subtotal,
        tax: order.tax,
        service_charge: order.service_charge,
        discount: order.discount,
        total: order.total,
        notes: order.notes,
        items: items
            .into_iter()
            .map(|item| OrderItemResponse {
                id: item.id,
                menu_item_id: item.menu_item_id,
                name: item.name,
                quantity: item.quantity,
                unit_price: item.unit_price,
                total: item.total,
                status: item.status,
            })
            .collect(),
        completed_at: order.completed_at,
        created_at: order.created_at,
    }
}
