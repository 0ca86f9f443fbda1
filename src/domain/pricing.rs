use chrono::{DateTime, TimeDelta, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PricingMode {
    /// price × quantity
    #[sea_orm(string_value = "unit")]
    Unit,
    /// price × kilograms
    #[sea_orm(string_value = "weight")]
    Weight,
    /// both apply to the same line
    #[sea_orm(string_value = "combined")]
    Combined,
}

impl PricingMode {
    pub fn uses_quantity(&self) -> bool {
        matches!(self, PricingMode::Unit | PricingMode::Combined)
    }

    pub fn uses_weight(&self) -> bool {
        matches!(self, PricingMode::Weight | PricingMode::Combined)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    #[sea_orm(string_value = "hours")]
    Hours,
    #[sea_orm(string_value = "days")]
    Days,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ServiceDuration {
    pub value: i32,
    pub unit: DurationUnit,
}

/// Longest turnaround a service may declare: one year.
pub const MAX_DURATION_HOURS: i64 = 365 * 24;

impl ServiceDuration {
    pub fn as_duration(&self) -> Option<TimeDelta> {
        match self.unit {
            DurationUnit::Hours => TimeDelta::try_hours(self.value as i64),
            DurationUnit::Days => TimeDelta::try_days(self.value as i64),
        }
    }

    pub fn total_hours(&self) -> i64 {
        match self.unit {
            DurationUnit::Hours => self.value as i64,
            DurationUnit::Days => self.value as i64 * 24,
        }
    }

    pub fn is_within_limit(&self) -> bool {
        self.value > 0 && self.total_hours() <= MAX_DURATION_HOURS
    }

    /// `None` when the due date is out of range.
    pub fn due_from(&self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        start.checked_add_signed(self.as_duration()?)
    }
}

/// A catalog entry as the assembler sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDefinition {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub pricing_mode: PricingMode,
    pub unit_price: Option<i64>,
    pub weight_price: Option<i64>,
    /// `None` means a pure product with no turnaround.
    pub duration: Option<ServiceDuration>,
}

/// Rounds to the nearest integer with exact halves going up
/// (2.49 → 2, 2.5 → 3). Inputs are never negative here.
pub fn round_half_up(value: f64) -> i64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor as i64 + 1
    } else {
        floor as i64
    }
}

/// Money total for one line. Weight charges are rounded half-up to a whole
/// currency unit. `None` when the amount does not fit in an `i64`.
pub fn line_total(
    mode: PricingMode,
    unit_price: i64,
    weight_price: i64,
    quantity: f64,
    weight_kg: f64,
) -> Option<i64> {
    let part = |price: i64, amount: f64| {
        let value = price as f64 * amount;
        (value.is_finite() && value.abs() < i64::MAX as f64).then(|| round_half_up(value))
    };
    match mode {
        PricingMode::Unit => part(unit_price, quantity),
        PricingMode::Weight => part(weight_price, weight_kg),
        PricingMode::Combined => {
            part(unit_price, quantity)?.checked_add(part(weight_price, weight_kg)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_halves_up() {
        assert_eq!(round_half_up(2.49), 2);
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(3.5), 4);
        assert_eq!(round_half_up(0.0), 0);
        assert_eq!(round_half_up(3.7), 4);
    }

    #[test]
    fn prices_each_mode() {
        assert_eq!(line_total(PricingMode::Unit, 5_000, 0, 3.0, 0.0), Some(15_000));
        assert_eq!(line_total(PricingMode::Weight, 0, 7_000, 0.0, 2.3), Some(16_100));
        assert_eq!(
            line_total(PricingMode::Combined, 2_000, 7_000, 2.0, 3.7),
            Some(4_000 + 25_900)
        );
    }

    #[test]
    fn weight_charges_round_to_whole_units() {
        // 6_500 × 1.25 = 8_125; 3_333 × 1.5 = 4_999.5 → 5_000
        assert_eq!(line_total(PricingMode::Weight, 0, 6_500, 0.0, 1.25), Some(8_125));
        assert_eq!(line_total(PricingMode::Weight, 0, 3_333, 0.0, 1.5), Some(5_000));
    }

    #[test]
    fn duration_due_date() {
        let start = DateTime::parse_from_rfc3339("2026-01-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let two_days = ServiceDuration {
            value: 2,
            unit: DurationUnit::Days,
        };
        let six_hours = ServiceDuration {
            value: 6,
            unit: DurationUnit::Hours,
        };
        assert_eq!(
            two_days.due_from(start).unwrap().to_rfc3339(),
            "2026-01-03T08:00:00+00:00"
        );
        assert_eq!(
            six_hours.due_from(start).unwrap().to_rfc3339(),
            "2026-01-01T14:00:00+00:00"
        );
    }

    #[test]
    fn oversized_totals_are_rejected() {
        assert_eq!(line_total(PricingMode::Unit, 10, 0, 1e19, 0.0), None);
        assert_eq!(
            line_total(PricingMode::Combined, i64::MAX / 2, i64::MAX / 2, 1.5, 1.5),
            None
        );
    }

    #[test]
    fn durations_are_bounded() {
        let year = ServiceDuration {
            value: 365,
            unit: DurationUnit::Days,
        };
        let huge = ServiceDuration {
            value: i32::MAX,
            unit: DurationUnit::Days,
        };
        assert!(year.is_within_limit());
        assert!(!huge.is_within_limit());
        assert!(
            !ServiceDuration {
                value: 0,
                unit: DurationUnit::Hours
            }
            .is_within_limit()
        );
        let start = DateTime::parse_from_rfc3339("2026-01-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert!(huge.due_from(start).is_none());
    }
}
