use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::staff_shift::{self, Entity as StaffShiftEntity, Model as StaffShiftModel},
    errors::ServiceError,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ClockInRequest {
    #[validate(length(min = 1, message = "Staff name is required"))]
    pub staff_name: String,
    #[validate(length(min = 1, message = "Role is required"))]
    pub role: String,
    pub notes: Option<String>,
}

/// Simple time clock. One open shift per staff member; closing a shift
/// stamps it, nothing is ever deleted.
#[derive(Clone)]
pub struct ShiftService {
    db: Arc<DatabaseConnection>,
}

impl ShiftService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(%restaurant_id))]
    pub async fn clock_in(
        &self,
        restaurant_id: Uuid,
        request: ClockInRequest,
    ) -> Result<StaffShiftModel, ServiceError> {
        request.validate()?;

        let open = self
            .open_shift(restaurant_id, &request.staff_name)
            .await?;
        if let Some(shift) = open {
            return Err(ServiceError::Conflict(format!(
                "{} already clocked in at {}",
                shift.staff_name, shift.clock_in
            )));
        }

        let now = Utc::now();
        let shift = staff_shift::ActiveModel {
            id: Set(Uuid::new_v4()),
            restaurant_id: Set(restaurant_id),
            staff_name: Set(request.staff_name),
            role: Set(request.role),
            date: Set(now.date_naive()),
            clock_in: Set(now),
            clock_out: Set(None),
            notes: Set(request.notes),
            created_at: Set(now),
        }
        .insert(self.db.as_ref())
        .await?;

        info!(shift_id = %shift.id, staff = %shift.staff_name, "clocked in");
        Ok(shift)
    }

    #[instrument(skip(self), fields(%restaurant_id, %shift_id))]
    pub async fn clock_out(
        &self,
        restaurant_id: Uuid,
        shift_id: Uuid,
    ) -> Result<StaffShiftModel, ServiceError> {
        let shift = StaffShiftEntity::find_by_id(shift_id)
            .filter(staff_shift::Column::RestaurantId.eq(restaurant_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Shift {} not found", shift_id)))?;

        if shift.clock_out.is_some() {
            return Err(ServiceError::InvalidOperation(
                "Shift is already closed".to_string(),
            ));
        }

        let mut active: staff_shift::ActiveModel = shift.into();
        active.clock_out = Set(Some(Utc::now()));
        let updated = active.update(self.db.as_ref()).await?;
        info!(staff = %updated.staff_name, "clocked out");
        Ok(updated)
    }

    /// Shifts within a date range, newest first.
    pub async fn list_shifts(
        &self,
        restaurant_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<StaffShiftModel>, ServiceError> {
        Ok(StaffShiftEntity::find()
            .filter(staff_shift::Column::RestaurantId.eq(restaurant_id))
            .filter(staff_shift::Column::Date.gte(from))
            .filter(staff_shift::Column::Date.lte(to))
            .order_by_desc(staff_shift::Column::ClockIn)
            .all(self.db.as_ref())
            .await?)
    }

    async fn open_shift(
        &self,
        restaurant_id: Uuid,
        staff_name: &str,
    ) -> Result<Option<StaffShiftModel>, ServiceError> {
        Ok(StaffShiftEntity::find()
            .filter(staff_shift::Column::RestaurantId.eq(restaurant_id))
            .filter(staff_shift::Column::StaffName.eq(staff_name))
            .filter(staff_shift::Column::ClockOut.is_null())
            .one(self.db.as_ref())
            .await?)
    }
}
