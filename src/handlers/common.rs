use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::errors::ServiceError;

/// Inclusive date range used by report and shift endpoints. `to` defaults to
/// `from` for single-day queries.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DateRangeQuery {
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
}

impl DateRangeQuery {
    pub fn bounds(&self) -> Result<(NaiveDate, NaiveDate), ServiceError> {
        let to = self.to.unwrap_or(self.from);
        if to < self.from {
            return Err(ServiceError::ValidationError(
                "`to` cannot be before `from`".to_string(),
            ));
        }
        Ok((self.from, to))
    }

    /// UTC half-open `[from 00:00, to+1day 00:00)` window.
    pub fn datetime_bounds(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), ServiceError> {
        let (from, to) = self.bounds()?;
        let start = from
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| ServiceError::ValidationError("Invalid date".to_string()))?
            .and_utc();
        let end = to
            .succ_opt()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(|| ServiceError::ValidationError("Invalid date".to_string()))?
            .and_utc();
        Ok((start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_day_range_covers_whole_day() {
        let query = DateRangeQuery {
            from: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            to: None,
        };
        let (start, end) = query.datetime_bounds().unwrap();
        assert_eq!(start.to_rfc3339(), "2025-03-10T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-03-11T00:00:00+00:00");
    }

    #[test]
    fn reversed_range_is_rejected() {
        let query = DateRangeQuery {
            from: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            to: NaiveDate::from_ymd_opt(2025, 3, 1),
        };
        assert!(query.bounds().is_err());
    }
}
