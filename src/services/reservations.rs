use chrono::{NaiveDate, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
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
    entities::reservation::{self, Entity as ReservationEntity, Model as ReservationModel},
    errors::ServiceError,
    events::{Event, EventSender},
    services::tables::{TableService, TableStatus},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize, ToSchema)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Seated,
    Completed,
    Cancelled,
    NoShow,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReservationRequest {
    pub table_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Customer name is required"))]
    pub customer_name: String,
    pub customer_phone: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub customer_email: Option<String>,
    #[validate(range(min = 1, message = "Guest count must be at least 1"))]
    pub guest_count: i32,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub notes: Option<String>,
}

/// Half-open window overlap. A reservation without an end time is treated as
/// open-ended for the rest of the day.
fn windows_overlap(
    a_start: NaiveTime,
    a_end: Option<NaiveTime>,
    b_start: NaiveTime,
    b_end: Option<NaiveTime>,
) -> bool {
    let a_before_b = matches!(a_end, Some(end) if end <= b_start);
    let b_before_a = matches!(b_end, Some(end) if end <= a_start);
    !(a_before_b || b_before_a)
}

/// Reservation book. Double-booking protection covers PENDING and CONFIRMED
/// reservations only; terminal reservations free their window.
#[derive(Clone)]
pub struct ReservationService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
    tables: TableService,
}

impl ReservationService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: EventSender,
        tables: TableService,
    ) -> Self {
        Self {
            db,
            event_sender,
            tables,
        }
    }

    /// Books a table. The reservation is persisted CONFIRMED directly; a
    /// separate approval step does not exist in this flow.
    #[instrument(skip(self, request), fields(%restaurant_id))]
    pub async fn create_reservation(
        &self,
        restaurant_id: Uuid,
        request: CreateReservationRequest,
    ) -> Result<ReservationModel, ServiceError> {
        request.validate()?;

        if let (Some(start), Some(end)) = (Some(request.start_time), request.end_time) {
            if end <= start {
                return Err(ServiceError::ValidationError(
                    "End time must be after start time".to_string(),
                ));
            }
        }

        if let Some(table_id) = request.table_id {
            let table = self.tables.get_table(restaurant_id, table_id).await?;
            if request.guest_count > table.capacity {
                return Err(ServiceError::ValidationError(format!(
                    "Guest count {} exceeds table capacity {}",
                    request.guest_count, table.capacity
                )));
            }
            self.check_window(
                restaurant_id,
                table_id,
                request.date,
                request.start_time,
                request.end_time,
                None,
            )
            .await?;
        }

        let model = reservation::ActiveModel {
            id: Set(Uuid::new_v4()),
            restaurant_id: Set(restaurant_id),
            table_id: Set(request.table_id),
            customer_name: Set(request.customer_name),
            customer_phone: Set(request.customer_phone),
            customer_email: Set(request.customer_email),
            guest_count: Set(request.guest_count),
            date: Set(request.date),
            start_time: Set(request.start_time),
            end_time: Set(request.end_time),
            status: Set(ReservationStatus::Confirmed.to_string()),
            notes: Set(request.notes),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(self.db.as_ref())
        .await?;

        let event = Event::ReservationCreated {
            restaurant_id,
            reservation_id: model.id,
        };
        if let Err(e) = self.event_sender.send(event).await {
            error!("Failed to send ReservationCreated event: {}", e);
        }

        info!(reservation_id = %model.id, "reservation created");
        Ok(model)
    }

    /// Moves a reservation through its lifecycle. Seating occupies the table;
    /// completion frees it. Cancellations and no-shows leave the table alone
    /// since the party may never have arrived.
    #[instrument(skip(self), fields(%restaurant_id, %reservation_id, %status))]
    pub async fn update_status(
        &self,
        restaurant_id: Uuid,
        reservation_id: Uuid,
        status: ReservationStatus,
    ) -> Result<ReservationModel, ServiceError> {
        let existing = self.get_reservation(restaurant_id, reservation_id).await?;

        let current = ReservationStatus::from_str(&existing.status).map_err(|_| {
            ServiceError::InternalError(format!("corrupt reservation status {}", existing.status))
        })?;
        if matches!(
            current,
            ReservationStatus::Completed | ReservationStatus::Cancelled | ReservationStatus::NoShow
        ) {
            return Err(ServiceError::IllegalTransition {
                from: existing.status.clone(),
                to: status.to_string(),
            });
        }

        let table_id = existing.table_id;
        let mut active: reservation::ActiveModel = existing.into();
        active.status = Set(status.to_string());
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(self.db.as_ref()).await?;

        if let Some(table_id) = table_id {
            match status {
                ReservationStatus::Seated => {
                    self.tables
                        .set_status(restaurant_id, table_id, TableStatus::Occupied)
                        .await?;
                }
                ReservationStatus::Completed => {
                    self.tables
                        .set_status(restaurant_id, table_id, TableStatus::Available)
                        .await?;
                }
                _ => {}
            }
        }

        let event = Event::ReservationUpdated {
            restaurant_id,
            reservation_id: updated.id,
            status: updated.status.clone(),
        };
        if let Err(e) = self.event_sender.send(event).await {
            error!("Failed to send ReservationUpdated event: {}", e);
        }

        Ok(updated)
    }

    pub async fn get_reservation(
        &self,
        restaurant_id: Uuid,
        reservation_id: Uuid,
    ) -> Result<ReservationModel, ServiceError> {
        ReservationEntity::find_by_id(reservation_id)
            .filter(reservation::Column::RestaurantId.eq(restaurant_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Reservation {} not found", reservation_id))
            })
    }

    /// Reservations for a day, ordered by start time.
    pub async fn list_for_date(
        &self,
        restaurant_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<ReservationModel>, ServiceError> {
        Ok(ReservationEntity::find()
            .filter(reservation::Column::RestaurantId.eq(restaurant_id))
            .filter(reservation::Column::Date.eq(date))
            .order_by_asc(reservation::Column::StartTime)
            .all(self.db.as_ref())
            .await?)
    }

    /// Rejects the booking when an active reservation overlaps the window.
    async fn check_window(
        &self,
        restaurant_id: Uuid,
        table_id: Uuid,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: Option<NaiveTime>,
        exclude: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query = ReservationEntity::find()
            .filter(reservation::Column::RestaurantId.eq(restaurant_id))
            .filter(reservation::Column::TableId.eq(table_id))
            .filter(reservation::Column::Date.eq(date))
            .filter(reservation::Column::Status.is_in([
                ReservationStatus::Pending.to_string(),
                ReservationStatus::Confirmed.to_string(),
            ]));
        if let Some(id) = exclude {
            query = query.filter(reservation::Column::Id.ne(id));
        }

        let active = query.all(self.db.as_ref()).await?;
        for other in &active {
            if windows_overlap(start_time, end_time, other.start_time, other.end_time) {
                return Err(ServiceError::TableConflict(format!(
                    "table already reserved from {} on {}",
                    other.start_time, other.date
                )));
            }
        }
        Ok(())
    }

    /// Count of active reservations for a day, used by dashboards.
    pub async fn count_for_date(
        &self,
        restaurant_id: Uuid,
        date: NaiveDate,
    ) -> Result<u64, ServiceError> {
        Ok(ReservationEntity::find()
            .filter(reservation::Column::RestaurantId.eq(restaurant_id))
            .filter(reservation::Column::Date.eq(date))
            .filter(
                reservation::Column::Status
                    .is_not_in([ReservationStatus::Cancelled.to_string()]),
            )
            .count(self.db.as_ref())
            .await?)
    }
}

pub fn parse_reservation_status(value: &str) -> Result<ReservationStatus, ServiceError> {
    ReservationStatus::from_str(value).map_err(|_| {
        ServiceError::ValidationError(format!("Unknown reservation status: {}", value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn half_open_windows_do_not_conflict_when_touching() {
        // [18:00, 20:00) and [20:00, 22:00) share a boundary, not a window.
        assert!(!windows_overlap(t(18, 0), Some(t(20, 0)), t(20, 0), Some(t(22, 0))));
        assert!(!windows_overlap(t(20, 0), Some(t(22, 0)), t(18, 0), Some(t(20, 0))));
    }

    #[test]
    fn overlapping_windows_conflict() {
        assert!(windows_overlap(t(18, 0), Some(t(20, 0)), t(19, 0), Some(t(21, 0))));
        assert!(windows_overlap(t(19, 0), Some(t(21, 0)), t(18, 0), Some(t(20, 0))));
        assert!(windows_overlap(t(18, 0), Some(t(22, 0)), t(19, 0), Some(t(20, 0))));
    }

    #[test]
    fn open_ended_windows_conflict_with_anything_later() {
        assert!(windows_overlap(t(18, 0), None, t(21, 0), Some(t(22, 0))));
        assert!(windows_overlap(t(21, 0), Some(t(22, 0)), t(18, 0), None));
        // An earlier bounded window still clears an open-ended later one.
        assert!(!windows_overlap(t(16, 0), Some(t(17, 0)), t(17, 0), None));
    }

    #[test]
    fn reservation_status_round_trip() {
        assert_eq!(ReservationStatus::NoShow.to_string(), "NO_SHOW");
        assert_eq!(
            parse_reservation_status("SEATED").unwrap(),
            ReservationStatus::Seated
        );
        assert!(parse_reservation_status("LOST").is_err());
    }
}
