//! # Recency Decay
//! Linear per-day decay with a floor, measured against the newest entry of a
//! batch. An entry dated after `latest` counts as equally recent.
//!
//! `weight = max(MIN_WEIGHT, 1.0 - days * DECAY_PER_DAY)`, where `days` is the
//! number of whole days between the two timestamps (clamped at 0). The floor
//! is reached after ~6.7 days.

use chrono::{DateTime, Utc};

/// Weight lost per whole day of age.
pub const DECAY_PER_DAY: f64 = 0.15;

/// Old entries never drop below this weight.
pub const MIN_WEIGHT: f64 = 0.1;

/// Weight of the newest entry.
pub const MAX_WEIGHT: f64 = 1.0;

/// Recency weight of an entry dated `entry_date` in a batch whose newest
/// entry is dated `latest_date`. Always in `[MIN_WEIGHT, MAX_WEIGHT]`.
pub fn weight(entry_date: DateTime<Utc>, latest_date: DateTime<Utc>) -> f64 {
    let days = (latest_date - entry_date).num_days().max(0);
    weight_for_days(days as u64)
}

/// Same curve, keyed directly by age in whole days.
pub fn weight_for_days(days: u64) -> f64 {
    (MAX_WEIGHT - days as f64 * DECAY_PER_DAY).max(MIN_WEIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 21, 30, 0).unwrap()
    }

    #[test]
    fn same_instant_is_full_weight() {
        assert_eq!(weight(t0(), t0()), 1.0);
    }

    #[test]
    fn partial_days_do_not_count() {
        let entry = t0() - Duration::hours(23);
        assert_eq!(weight(entry, t0()), 1.0);
    }

    #[test]
    fn future_entry_is_clamped_to_latest() {
        let entry = t0() + Duration::days(3);
        assert_eq!(weight(entry, t0()), 1.0);
    }

    #[test]
    fn known_points_on_the_curve() {
        let w1 = weight(t0() - Duration::days(1), t0());
        let w2 = weight(t0() - Duration::days(2), t0());
        let w6 = weight(t0() - Duration::days(6), t0());
        assert!((w1 - 0.85).abs() < 1e-12);
        assert!((w2 - 0.70).abs() < 1e-12);
        assert!((w6 - 0.10).abs() < 1e-9);
    }

    #[test]
    fn thirty_days_hits_the_floor() {
        let w = weight(t0() - Duration::days(30), t0());
        assert_eq!(w, MIN_WEIGHT);
    }

    #[test]
    fn monotone_and_bounded() {
        let mut prev = f64::INFINITY;
        for d in 0..60 {
            let w = weight(t0() - Duration::days(d), t0());
            assert!(w <= prev, "day {d}: {w} > {prev}");
            assert!((MIN_WEIGHT..=MAX_WEIGHT).contains(&w));
            prev = w;
        }
    }
}
