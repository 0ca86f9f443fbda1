use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    domain::status::{FulfillmentStatus, PaymentStatus},
    error::{AppError, AppResult},
};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub fulfillment_status: Option<FulfillmentStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub customer_phone: Option<String>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PendingPaymentsQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Minimum age in hours, default 24.
    pub hours_old: Option<i64>,
}

macro_rules! paginated {
    ($($query:ty),+) => {
        $(impl $query {
            pub fn pagination(&self) -> Pagination {
                Pagination {
                    page: self.page,
                    per_page: self.per_page,
                }
            }
        })+
    };
}

// Flattening into `Query` breaks numeric parsing, so the fields are repeated.
paginated!(OrderListQuery, PendingPaymentsQuery, TodaysOrdersQuery, ServiceQuery, CustomerQuery);

/// `now - age`, rejecting ages chrono cannot represent.
fn age_cutoff(
    now: DateTime<Utc>,
    age: Option<TimeDelta>,
    field: &str,
) -> AppResult<DateTime<Utc>> {
    age.and_then(|age| now.checked_sub_signed(age))
        .ok_or_else(|| AppError::BadRequest(format!("{field} is out of range")))
}

impl PendingPaymentsQuery {
    pub fn hours(&self) -> i64 {
        self.hours_old.unwrap_or(24).max(0)
    }

    /// Orders created at or before this instant count as overdue.
    pub fn cutoff(&self, now: DateTime<Utc>) -> AppResult<DateTime<Utc>> {
        age_cutoff(now, TimeDelta::try_hours(self.hours()), "hours_old")
    }
}

/// Customers whose activity stopped at least `days` ago.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct InactivityQuery {
    pub days: Option<i64>,
    /// Maximum rows returned, default 100.
    pub limit: Option<i64>,
}

impl InactivityQuery {
    pub fn days_or(&self, default: i64) -> i64 {
        self.days.unwrap_or(default).max(0)
    }

    pub fn cutoff(&self, now: DateTime<Utc>, default_days: i64) -> AppResult<DateTime<Utc>> {
        age_cutoff(now, TimeDelta::try_days(self.days_or(default_days)), "days")
    }

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(100).clamp(1, 500) as usize
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TodaysOrdersQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub fulfillment_status: Option<FulfillmentStatus>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ServiceQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CustomerQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub q: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_is_clamped() {
        let p = Pagination {
            page: Some(0),
            per_page: Some(1_000),
        };
        assert_eq!(p.normalize(), (1, 100, 0));
        let p = Pagination {
            page: Some(3),
            per_page: Some(10),
        };
        assert_eq!(p.normalize(), (3, 10, 20));
    }

    #[test]
    fn out_of_range_ages_are_bad_requests() {
        let now = Utc::now();
        let query = PendingPaymentsQuery {
            hours_old: Some(i64::MAX),
            ..Default::default()
        };
        assert!(matches!(query.cutoff(now), Err(AppError::BadRequest(_))));

        let query = PendingPaymentsQuery {
            hours_old: Some(-5),
            ..Default::default()
        };
        assert_eq!(query.cutoff(now).unwrap(), now);

        let query = InactivityQuery {
            days: Some(i64::MAX),
            limit: None,
        };
        assert!(matches!(query.cutoff(now, 14), Err(AppError::BadRequest(_))));
        assert_eq!(
            InactivityQuery::default().cutoff(now, 14).unwrap(),
            now - TimeDelta::days(14)
        );
    }
}
