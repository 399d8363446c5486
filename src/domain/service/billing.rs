//! Length-of-stay billing
//!
//! A container is billed per whole day in the terminal at its vessel's daily
//! rate. A stay that starts and ends the same day but has a positive duration
//! counts as one day; a zero-length stay is free.

use crate::domain::model::PortOperation;
use chrono::{DateTime, Utc};

/// Billable days between arrival and departure.
///
/// `None` when departure precedes arrival (not billable).
pub fn stay_days(arrival: DateTime<Utc>, departure: DateTime<Utc>) -> Option<i64> {
    if departure < arrival {
        return None;
    }
    let stay = departure - arrival;
    let days = stay.num_days();
    if days == 0 && stay.num_seconds() > 0 {
        Some(1)
    } else {
        Some(days)
    }
}

/// Billing amount for one record given the vessel's daily rate.
///
/// Records without a complete arrival/departure window, or with departure
/// before arrival, bill as 0.
pub fn container_cost(op: &PortOperation, daily_rate: f64) -> f64 {
    match (op.arrival_date, op.departure_date) {
        (Some(arrival), Some(departure)) => stay_days(arrival, departure)
            .map(|days| days as f64 * daily_rate)
            .unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ContainerId;
    use chrono::TimeZone;

    fn ts(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_multi_day_stay() {
        assert_eq!(stay_days(ts(2024, 3, 1, 8), ts(2024, 3, 4, 8)), Some(3));
    }

    #[test]
    fn test_same_day_positive_duration_counts_one() {
        assert_eq!(stay_days(ts(2024, 3, 1, 8), ts(2024, 3, 1, 17)), Some(1));
    }

    #[test]
    fn test_zero_duration_is_free() {
        assert_eq!(stay_days(ts(2024, 3, 1, 8), ts(2024, 3, 1, 8)), Some(0));
    }

    #[test]
    fn test_departure_before_arrival_not_billable() {
        assert_eq!(stay_days(ts(2024, 3, 4, 8), ts(2024, 3, 1, 8)), None);
    }

    #[test]
    fn test_container_cost() {
        let mut op = PortOperation::new(ContainerId::parse("CSQU3054383").unwrap());
        assert_eq!(container_cost(&op, 50.0), 0.0);

        op.arrival_date = Some(ts(2024, 3, 1, 8));
        op.departure_date = Some(ts(2024, 3, 6, 8));
        assert!((container_cost(&op, 50.0) - 250.0).abs() < f64::EPSILON);

        // Inverted window bills nothing
        op.departure_date = Some(ts(2024, 2, 1, 8));
        assert_eq!(container_cost(&op, 50.0), 0.0);
    }
}
