//! Date arithmetic used by the valuation rules.
//!
//! Two different "age" conventions coexist on purpose:
//!
//! - the target's age is a calendar-month difference (year/month fields only,
//!   day-of-month ignored), which is what the penalty rates were tuned against
//! - a ledger row's `age_at_auction_months` is precomputed by the cleaning step
//!   as elapsed days / 30.44, truncated

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};

/// Average month length used by the ledger cleaning step.
pub const DAYS_PER_MONTH: f64 = 30.44;

const MILLIS_PER_DAY: u64 = 86_400_000;

/// Absolute month difference from calendar fields (`Δyear * 12 + Δmonth`).
pub fn months_between(from: NaiveDate, to: NaiveDate) -> u32 {
    let months = (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32);
    months.unsigned_abs()
}

/// Whole days between two instants, rounded up (any partial day counts).
pub fn days_between_ceil(a: DateTime<Utc>, b: DateTime<Utc>) -> u64 {
    let millis = (b - a).num_milliseconds().unsigned_abs();
    millis.div_ceil(MILLIS_PER_DAY)
}

/// Age at auction close, as derived by the ledger cleaning step.
///
/// Registrations after the close (bad data) clamp to zero.
pub fn age_at_auction_months(first_registration: NaiveDate, end_time: DateTime<Utc>) -> u32 {
    let registered = first_registration.and_time(NaiveTime::MIN).and_utc();
    let seconds = (end_time - registered).num_seconds();
    if seconds <= 0 {
        return 0;
    }
    let days = seconds as f64 / 86_400.0;
    (days / DAYS_PER_MONTH) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn months_between_ignores_day_of_month() {
        // One day apart, but different calendar months.
        assert_eq!(months_between(date(2022, 6, 30), date(2022, 7, 1)), 1);
        // Almost two months apart, same month delta.
        assert_eq!(months_between(date(2022, 6, 1), date(2022, 7, 31)), 1);
        assert_eq!(months_between(date(2022, 6, 15), date(2024, 10, 1)), 28);
    }

    #[test]
    fn months_between_is_symmetric() {
        assert_eq!(months_between(date(2024, 3, 1), date(2022, 6, 1)), 21);
        assert_eq!(months_between(date(2022, 6, 1), date(2024, 3, 1)), 21);
    }

    #[test]
    fn days_between_rounds_partial_days_up() {
        let a = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 1, 3, 13, 0, 0).unwrap();
        assert_eq!(days_between_ceil(a, b), 3);
        assert_eq!(days_between_ceil(b, a), 3);
        assert_eq!(days_between_ceil(a, a), 0);

        let c = Utc.with_ymd_and_hms(2024, 1, 3, 12, 0, 0).unwrap();
        assert_eq!(days_between_ceil(a, c), 2);
    }

    #[test]
    fn age_at_auction_uses_average_month_length() {
        let end = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        // 731 days / 30.44 = 24.01
        assert_eq!(age_at_auction_months(date(2022, 6, 1), end), 24);
        // 29 days is not yet a month.
        assert_eq!(age_at_auction_months(date(2024, 5, 3), end), 0);
        assert_eq!(age_at_auction_months(date(2025, 1, 1), end), 0);
    }
}
