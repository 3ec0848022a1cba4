use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
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
        order::{self, Entity as OrderEntity, Model as OrderModel},
        payment::{self, Entity as PaymentEntity, Model as PaymentModel},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::orders::{OrderStatus, PaymentStatus},
};

/// Tolerance for monetary comparisons.
pub const EPSILON: Decimal = dec!(0.01);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize, ToSchema)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Qr,
    Transfer,
    Voucher,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProcessPaymentRequest {
    pub order_id: Uuid,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub reference: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RefundPaymentRequest {
    /// Omitted means a full refund of the original payment
    pub amount: Option<Decimal>,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentSplit {
    pub amount: Decimal,
    pub method: PaymentMethod,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SplitPaymentRequest {
    pub order_id: Uuid,
    #[validate(length(min = 2, message = "A split needs at least two parts"))]
    pub splits: Vec<PaymentSplit>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentReceipt {
    pub payment: PaymentModel,
    pub order_id: Uuid,
    pub total: Decimal,
    pub total_paid: Decimal,
    pub remaining: Decimal,
    pub payment_status: String,
}

/// True when the payment would take the order past its balance.
pub(crate) fn exceeds_remaining(amount: Decimal, remaining: Decimal) -> bool {
    amount > remaining + EPSILON
}

/// True when the signed payment sum settles the order total.
pub(crate) fn settles_order(net_paid: Decimal, total: Decimal) -> bool {
    net_paid >= total - EPSILON
}

/// Payment ledger over orders. Rows are append-only; refunds are negated
/// rows referencing the original payment.
#[derive(Clone)]
pub struct PaymentService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl PaymentService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Records a payment against an order. Settling the balance (within the
    /// monetary tolerance) marks the order PAID and stamps completion.
    #[instrument(skip(self, request), fields(%restaurant_id, order_id = %request.order_id))]
    pub async fn process_payment(
        &self,
        restaurant_id: Uuid,
        request: ProcessPaymentRequest,
        created_by: Option<String>,
    ) -> Result<PaymentReceipt, ServiceError> {
        if request.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Payment amount must be positive".to_string(),
            ));
        }

        let txn = self.db.begin().await?;
        let order = find_order(&txn, restaurant_id, request.order_id).await?;

        if order.status == OrderStatus::Cancelled.to_string() {
            return Err(ServiceError::OrderCancelled(order.order_number));
        }

        let paid = paid_total_in(&txn, request.order_id).await?;
        let remaining = order.total - paid;
        if exceeds_remaining(request.amount, remaining) {
            return Err(ServiceError::OverPayment(format!(
                "amount {} exceeds remaining balance {}",
                request.amount, remaining
            )));
        }

        let row = payment::ActiveModel {
            id: Set(Uuid::new_v4()),
            restaurant_id: Set(restaurant_id),
            order_id: Set(order.id),
            amount: Set(request.amount.round_dp(2)),
            method: Set(request.method.to_string()),
            reference: Set(request.reference),
            created_by: Set(created_by),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;

        let total_paid = paid + row.amount;
        let payment_status = if settles_order(total_paid, order.total) {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Partial
        };
        let updated = self
            .apply_payment_status(&txn, order, payment_status)
            .await?;
        txn.commit().await?;

        self.emit_order_paid(&updated, total_paid).await;
        info!(payment_id = %row.id, %total_paid, "payment recorded");

        Ok(PaymentReceipt {
            order_id: updated.id,
            total: updated.total,
            total_paid,
            remaining: updated.total - total_paid,
            payment_status: updated.payment_status.clone(),
            payment: row,
        })
    }

    /// Refunds a payment, fully by default. The refund is a new negated row;
    /// the order's payment status is recomputed from the signed sum.
    #[instrument(skip(self, request), fields(%restaurant_id, %payment_id))]
    pub async fn refund_payment(
        &self,
        restaurant_id: Uuid,
        payment_id: Uuid,
        request: RefundPaymentRequest,
        created_by: Option<String>,
    ) -> Result<PaymentReceipt, ServiceError> {
        let txn = self.db.begin().await?;

        let original = PaymentEntity::find_by_id(payment_id)
            .filter(payment::Column::RestaurantId.eq(restaurant_id))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Payment {} not found", payment_id)))?;
        if original.amount <= Decimal::ZERO {
            return Err(ServiceError::InvalidOperation(
                "Cannot refund a refund".to_string(),
            ));
        }

        let amount = request.amount.unwrap_or(original.amount);
        if amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Refund amount must be positive".to_string(),
            ));
        }
        if amount > original.amount + EPSILON {
            return Err(ServiceError::RefundExceedsPayment(format!(
                "refund {} exceeds payment {}",
                amount, original.amount
            )));
        }

        let order = find_order(&txn, restaurant_id, original.order_id).await?;

        let reference = match request.reason {
            Some(reason) => format!("refund of {}: {}", original.id, reason),
            None => format!("refund of {}", original.id),
        };
        let row = payment::ActiveModel {
            id: Set(Uuid::new_v4()),
            restaurant_id: Set(restaurant_id),
            order_id: Set(order.id),
            amount: Set(-amount.round_dp(2)),
            method: Set(original.method.clone()),
            reference: Set(Some(reference)),
            created_by: Set(created_by),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;

        let net_paid = paid_total_in(&txn, order.id).await?;
        let payment_status = if net_paid <= Decimal::ZERO {
            PaymentStatus::Refunded
        } else if settles_order(net_paid, order.total) {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Partial
        };
        let updated = self
            .apply_payment_status(&txn, order, payment_status)
            .await?;
        txn.commit().await?;

        self.emit_order_paid(&updated, net_paid).await;
        info!(refund_id = %row.id, %net_paid, "payment refunded");

        Ok(PaymentReceipt {
            order_id: updated.id,
            total: updated.total,
            total_paid: net_paid,
            remaining: updated.total - net_paid,
            payment_status: updated.payment_status.clone(),
            payment: row,
        })
    }

    /// Settles an order with several payment rows at once. All-or-nothing:
    /// the split amounts must clear the remaining balance exactly (within the
    /// monetary tolerance) or nothing is written.
    #[instrument(skip(self, request), fields(%restaurant_id, order_id = %request.order_id))]
    pub async fn split_payment(
        &self,
        restaurant_id: Uuid,
        request: SplitPaymentRequest,
        created_by: Option<String>,
    ) -> Result<Vec<PaymentModel>, ServiceError> {
        request.validate()?;
        if request.splits.iter().any(|s| s.amount <= Decimal::ZERO) {
            return Err(ServiceError::ValidationError(
                "Every split amount must be positive".to_string(),
            ));
        }

        let txn = self.db.begin().await?;
        let order = find_order(&txn, restaurant_id, request.order_id).await?;
        if order.status == OrderStatus::Cancelled.to_string() {
            return Err(ServiceError::OrderCancelled(order.order_number));
        }

        let paid = paid_total_in(&txn, order.id).await?;
        let remaining = order.total - paid;
        let sum: Decimal = request.splits.iter().map(|s| s.amount).sum();
        if (sum - remaining).abs() > EPSILON {
            return Err(ServiceError::ValidationError(format!(
                "split sum {} does not settle the remaining balance {}",
                sum, remaining
            )));
        }

        let mut rows = Vec::with_capacity(request.splits.len());
        for split in request.splits {
            let row = payment::ActiveModel {
                id: Set(Uuid::new_v4()),
                restaurant_id: Set(restaurant_id),
                order_id: Set(order.id),
                amount: Set(split.amount.round_dp(2)),
                method: Set(split.method.to_string()),
                reference: Set(None),
                created_by: Set(created_by.clone()),
                created_at: Set(Utc::now()),
            }
            .insert(&txn)
            .await?;
            rows.push(row);
        }

        let total_paid = paid + sum;
        let updated = self
            .apply_payment_status(&txn, order, PaymentStatus::Paid)
            .await?;
        txn.commit().await?;

        self.emit_order_paid(&updated, total_paid).await;
        info!(parts = rows.len(), %total_paid, "split payment recorded");
        Ok(rows)
    }

    pub async fn get_payment(
        &self,
        restaurant_id: Uuid,
        payment_id: Uuid,
    ) -> Result<PaymentModel, ServiceError> {
        PaymentEntity::find_by_id(payment_id)
            .filter(payment::Column::RestaurantId.eq(restaurant_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Payment {} not found", payment_id)))
    }

    /// All ledger rows for an order, oldest first.
    pub async fn payments_for_order(
        &self,
        restaurant_id: Uuid,
        order_id: Uuid,
    ) -> Result<Vec<PaymentModel>, ServiceError> {
        Ok(PaymentEntity::find()
            .filter(payment::Column::RestaurantId.eq(restaurant_id))
            .filter(payment::Column::OrderId.eq(order_id))
            .order_by_asc(payment::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?)
    }

    /// Signed sum of an order's ledger rows.
    pub async fn paid_total(
        &self,
        _restaurant_id: Uuid,
        order_id: Uuid,
    ) -> Result<Decimal, ServiceError> {
        paid_total_in(self.db.as_ref(), order_id).await
    }

    async fn apply_payment_status<C: ConnectionTrait>(
        &self,
        conn: &C,
        order: OrderModel,
        payment_status: PaymentStatus,
    ) -> Result<OrderModel, ServiceError> {
        let settled = payment_status == PaymentStatus::Paid;
        let mut active: order::ActiveModel = order.into();
        active.payment_status = Set(payment_status.to_string());
        if settled {
            active.status = Set(OrderStatus::Paid.to_string());
            active.completed_at = Set(Some(Utc::now()));
        }
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(conn).await?)
    }

    async fn emit_order_paid(&self, order: &OrderModel, total_paid: Decimal) {
        let event = Event::OrderPaid {
            restaurant_id: order.restaurant_id,
            order_id: order.id,
            total: order.total,
            total_paid,
            payment_status: order.payment_status.clone(),
        };
        if let Err(e) = self.event_sender.send(event).await {
            error!("Failed to send OrderPaid event: {}", e);
        }
    }
}

async fn find_order<C: ConnectionTrait>(
    conn: &C,
    restaurant_id: Uuid,
    order_id: Uuid,
) -> Result<OrderModel, ServiceError> {
    OrderEntity::find_by_id(order_id)
        .filter(order::Column::RestaurantId.eq(restaurant_id))
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))
}

async fn paid_total_in<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> Result<Decimal, ServiceError> {
    let rows = PaymentEntity::find()
        .filter(payment::Column::OrderId.eq(order_id))
        .all(conn)
        .await?;
    Ok(rows.iter().map(|p| p.amount).sum())
}

/// Parses a payment method from a query or body string.
pub fn parse_payment_method(value: &str) -> Result<PaymentMethod, ServiceError> {
    PaymentMethod::from_str(value)
        .map_err(|_| ServiceError::ValidationError(format!("Unknown payment method: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overpayment_tolerates_one_cent() {
        assert!(!exceeds_remaining(dec!(100.00), dec!(100.00)));
        assert!(!exceeds_remaining(dec!(100.01), dec!(100.00)));
        assert!(exceeds_remaining(dec!(100.02), dec!(100.00)));
    }

    #[test]
    fn settlement_tolerates_one_cent() {
        assert!(settles_order(dec!(100.00), dec!(100.00)));
        assert!(settles_order(dec!(99.99), dec!(100.00)));
        assert!(!settles_order(dec!(99.98), dec!(100.00)));
    }

    #[test]
    fn payment_method_strings() {
        assert_eq!(PaymentMethod::Cash.to_string(), "CASH");
        assert_eq!(parse_payment_method("QR").unwrap(), PaymentMethod::Qr);
        assert!(parse_payment_method("BARTER").is_err());
    }
}
