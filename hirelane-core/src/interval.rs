use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// The pickup/return window of a hire, as entered by the customer.
///
/// A return at or before pickup is legal data here; it prices to zero rather
/// than erroring. Ordering is enforced at the draft mutation boundary instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingInterval {
    pub pickup_date: NaiveDate,
    pub pickup_time: NaiveTime,
    pub return_date: NaiveDate,
    pub return_time: NaiveTime,
}

impl BillingInterval {
    pub fn new(
        pickup_date: NaiveDate,
        pickup_time: NaiveTime,
        return_date: NaiveDate,
        return_time: NaiveTime,
    ) -> Self {
        Self {
            pickup_date,
            pickup_time,
            return_date,
            return_time,
        }
    }

    pub fn pickup_at(&self) -> NaiveDateTime {
        self.pickup_date.and_time(self.pickup_time)
    }

    pub fn return_at(&self) -> NaiveDateTime {
        self.return_date.and_time(self.return_time)
    }

    /// Total duration in decimal hours, rounded to 2 places half-up.
    /// Negative when the return precedes the pickup.
    pub fn duration_hours(&self) -> Decimal {
        let seconds = (self.return_at() - self.pickup_at()).num_seconds();
        (Decimal::from(seconds) / Decimal::from(3600))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Same-day hires bill hourly regardless of the configured strategy.
    pub fn is_same_day(&self) -> bool {
        self.pickup_date == self.return_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn duration_is_decimal_hours() {
        let interval =
            BillingInterval::new(date(2025, 3, 10), time(9, 0), date(2025, 3, 10), time(11, 30));
        assert_eq!(interval.duration_hours(), "2.50".parse::<Decimal>().unwrap());
        assert!(interval.is_same_day());
    }

    #[test]
    fn overnight_hire_spans_calendar_days() {
        let interval =
            BillingInterval::new(date(2025, 3, 10), time(22, 0), date(2025, 3, 11), time(8, 0));
        assert_eq!(interval.duration_hours(), Decimal::from(10));
        assert!(!interval.is_same_day());
    }

    #[test]
    fn return_before_pickup_goes_negative() {
        let interval =
            BillingInterval::new(date(2025, 3, 11), time(9, 0), date(2025, 3, 10), time(9, 0));
        assert!(interval.duration_hours() < Decimal::ZERO);
    }
}
