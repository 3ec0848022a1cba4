//! Per-tenant realtime push.
//!
//! Dashboard clients subscribe to their restaurant's room over server-sent
//! events; every domain event processed by `events::process_events` is pushed
//! to the room. Delivery is best-effort with no ordering guarantee beyond
//! in-order emission.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::State,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::get,
    Router,
};
use dashmap::DashMap;
use futures::stream::Stream;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::events::PushMessage;
use crate::AppState;

const ROOM_CAPACITY: usize = 256;

/// Broadcast rooms keyed by restaurant id.
pub struct RealtimeHub {
    rooms: DashMap<Uuid, broadcast::Sender<PushMessage>>,
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    fn room(&self, restaurant_id: Uuid) -> broadcast::Sender<PushMessage> {
        self.rooms
            .entry(restaurant_id)
            .or_insert_with(|| broadcast::channel(ROOM_CAPACITY).0)
            .clone()
    }

    /// Subscribes to a tenant's room.
    pub fn subscribe(&self, restaurant_id: Uuid) -> broadcast::Receiver<PushMessage> {
        self.room(restaurant_id).subscribe()
    }

    /// Publishes to a tenant's room; returns the number of receivers reached.
    pub fn publish(&self, restaurant_id: Uuid, message: PushMessage) -> usize {
        match self.rooms.get(&restaurant_id) {
            Some(sender) => sender.send(message).unwrap_or(0),
            None => 0,
        }
    }
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}

/// SSE stream for the authenticated user's restaurant.
async fn event_stream(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>, ServiceError> {
    let restaurant_id = user.require_restaurant()?;
    let receiver = state.realtime.subscribe(restaurant_id);

    let stream = futures::stream::unfold(receiver, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(message) => {
                    let data = serde_json::to_string(&message.payload)
                        .unwrap_or_else(|_| "{}".to_string());
                    let sse = SseEvent::default().event(message.event).data(data);
                    return Some((Ok(sse), rx));
                }
                // Lagged receivers drop missed messages; the stream stays up.
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/stream", get(event_stream))
}

pub type SharedHub = Arc<RealtimeHub>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn rooms_are_tenant_isolated() {
        let hub = RealtimeHub::new();
        let tenant_a = Uuid::new_v4();
        let tenant_b = Uuid::new_v4();

        let mut sub_a = hub.subscribe(tenant_a);
        let mut sub_b = hub.subscribe(tenant_b);

        let delivered = hub.publish(
            tenant_a,
            PushMessage {
                event: "order:created".into(),
                payload: serde_json::json!({"orderNumber": "ORD-000001"}),
                emitted_at: Utc::now(),
            },
        );
        assert_eq!(delivered, 1);

        let received = sub_a.recv().await.unwrap();
        assert_eq!(received.event, "order:created");
        assert!(sub_b.try_recv().is_err());
    }

    #[test]
    fn publish_without_subscribers_is_a_noop() {
        let hub = RealtimeHub::new();
        let delivered = hub.publish(
            Uuid::new_v4(),
            PushMessage {
                event: "table:statusChanged".into(),
                payload: serde_json::json!({}),
                emitted_at: Utc::now(),
            },
        );
        assert_eq!(delivered, 0);
    }
}
