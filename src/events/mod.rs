use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::realtime::RealtimeHub;

/// Domain events emitted by the services. Every event is scoped to a tenant
/// and fans out to that restaurant's realtime room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderCreated {
        restaurant_id: Uuid,
        order_id: Uuid,
        order_number: String,
    },
    OrderUpdated {
        restaurant_id: Uuid,
        order_id: Uuid,
        status: String,
    },
    OrderCancelled {
        restaurant_id: Uuid,
        order_id: Uuid,
        order_number: String,
    },
    OrderPaid {
        restaurant_id: Uuid,
        order_id: Uuid,
        total: Decimal,
        total_paid: Decimal,
        payment_status: String,
    },
    TableStatusChanged {
        restaurant_id: Uuid,
        table_id: Uuid,
        status: String,
    },
    InventoryLowStock {
        restaurant_id: Uuid,
        inventory_item_id: Uuid,
        name: String,
        current_stock: Decimal,
        min_stock: Decimal,
    },
    ReservationCreated {
        restaurant_id: Uuid,
        reservation_id: Uuid,
    },
    ReservationUpdated {
        restaurant_id: Uuid,
        reservation_id: Uuid,
        status: String,
    },
}

impl Event {
    /// Tenant the event belongs to.
    pub fn restaurant_id(&self) -> Uuid {
        match self {
            Event::OrderCreated { restaurant_id, .. }
            | Event::OrderUpdated { restaurant_id, .. }
            | Event::OrderCancelled { restaurant_id, .. }
            | Event::OrderPaid { restaurant_id, .. }
            | Event::TableStatusChanged { restaurant_id, .. }
            | Event::InventoryLowStock { restaurant_id, .. }
            | Event::ReservationCreated { restaurant_id, .. }
            | Event::ReservationUpdated { restaurant_id, .. } => *restaurant_id,
        }
    }

    /// Wire name pushed to realtime subscribers.
    pub fn name(&self) -> &'static str {
        match self {
            Event::OrderCreated { .. } => "order:created",
            Event::OrderUpdated { .. } => "order:updated",
            Event::OrderCancelled { .. } => "order:cancelled",
            Event::OrderPaid { .. } => "order:paid",
            Event::TableStatusChanged { .. } => "table:statusChanged",
            Event::InventoryLowStock { .. } => "inventory:lowStock",
            Event::ReservationCreated { .. } => "reservation:created",
            Event::ReservationUpdated { .. } => "reservation:updated",
        }
    }

    /// JSON payload pushed to realtime subscribers.
    pub fn payload(&self) -> serde_json::Value {
        match self {
            Event::OrderCreated {
                order_id,
                order_number,
                ..
            } => json!({ "orderId": order_id, "orderNumber": order_number }),
            Event::OrderUpdated {
                order_id, status, ..
            } => json!({ "orderId": order_id, "status": status }),
            Event::OrderCancelled {
                order_id,
                order_number,
                ..
            } => json!({ "orderId": order_id, "orderNumber": order_number }),
            Event::OrderPaid {
                order_id,
                total,
                total_paid,
                payment_status,
                ..
            } => json!({
                "orderId": order_id,
                "total": total,
                "totalPaid": total_paid,
                "paymentStatus": payment_status,
            }),
            Event::TableStatusChanged {
                table_id, status, ..
            } => json!({ "tableId": table_id, "status": status }),
            Event::InventoryLowStock {
                inventory_item_id,
                name,
                current_stock,
                min_stock,
                ..
            } => json!({
                "inventoryItemId": inventory_item_id,
                "name": name,
                "currentStock": current_stock,
                "minStock": min_stock,
            }),
            Event::ReservationCreated { reservation_id, .. } => {
                json!({ "reservationId": reservation_id })
            }
            Event::ReservationUpdated {
                reservation_id,
                status,
                ..
            } => json!({ "reservationId": reservation_id, "status": status }),
        }
    }
}

/// Envelope delivered to realtime clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushMessage {
    pub event: String,
    pub payload: serde_json::Value,
    pub emitted_at: DateTime<Utc>,
}

impl From<&Event> for PushMessage {
    fn from(event: &Event) -> Self {
        Self {
            event: event.name().to_string(),
            payload: event.payload(),
            emitted_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Drains the event channel and fans each event out to the emitting tenant's
/// realtime room. Best-effort: delivery failures are logged, never retried.
pub async fn process_events(mut rx: mpsc::Receiver<Event>, hub: Arc<RealtimeHub>) {
    info!("starting event processing loop");

    while let Some(event) = rx.recv().await {
        let restaurant_id = event.restaurant_id();
        let message = PushMessage::from(&event);
        let delivered = hub.publish(restaurant_id, message);
        tracing::debug!(
            event = event.name(),
            %restaurant_id,
            delivered,
            "event dispatched"
        );
    }

    warn!("event processing loop has ended");
}
