//! Deadline estimation from the coarse time-left buckets.
//!
//! The four buckets map to fixed, non-overlapping duration ranges. An
//! observation alone only gives the earliest possible expiry; a prior
//! observation time (when the listing was not yet present, or carried a
//! different bucket) gives a latest-possible bound too. Estimates only
//! ever narrow as observations accumulate, so we always keep the minimum
//! of the valid candidates.

use crate::{
    listing::TimeLeft,
    types::Timestamp,
};
use chrono::Duration;

/// The [lower, upper) duration range a bucket stands for.
pub fn bucket_bounds(bucket: TimeLeft) -> (Duration, Duration) {
    match bucket {
        TimeLeft::Short => (Duration::zero(), Duration::minutes(30)),
        TimeLeft::Medium => (Duration::minutes(30), Duration::hours(2)),
        TimeLeft::Long => (Duration::hours(2), Duration::hours(12)),
        TimeLeft::VeryLong => (Duration::hours(12), Duration::hours(48)),
    }
}

/// Estimate the deadline for a listing first seen at `observed_at`.
///
/// With no prior observation the estimate is the earliest-possible
/// `observed_at + lower(bucket)`. When the realm already had a high-water
/// mark, the listing did not exist (or not with this bucket) at `prior`,
/// so `prior + upper(bucket)` bounds the deadline from above; the tighter
/// of the two candidates is retained.
pub fn estimate(bucket: TimeLeft, observed_at: Timestamp, prior: Option<Timestamp>) -> Timestamp {
    let (lower, upper) = bucket_bounds(bucket);
    let earliest = observed_at + lower;
    match prior {
        Some(prior) => {
            let latest = prior + upper;
            earliest.min(latest)
        }
        None => earliest,
    }
}

/// Re-estimate after a tracked listing's bucket changed between
/// observations. No narrowing applies across a tracked change: the
/// estimate resets to the latest-possible expiry for the new bucket.
pub fn reset_estimate(bucket: TimeLeft, observed_at: Timestamp) -> Timestamp {
    let (_, upper) = bucket_bounds(bucket);
    observed_at + upper
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(minutes: i64) -> Timestamp {
        Utc.timestamp_opt(minutes * 60, 0).unwrap()
    }

    #[test]
    fn bounds_are_contiguous_and_ordered() {
        let buckets = [
            TimeLeft::Short,
            TimeLeft::Medium,
            TimeLeft::Long,
            TimeLeft::VeryLong,
        ];
        for pair in buckets.windows(2) {
            let (_, upper) = bucket_bounds(pair[0]);
            let (lower, _) = bucket_bounds(pair[1]);
            assert_eq!(upper, lower);
        }
    }

    #[test]
    fn no_prior_uses_lower_bound() {
        let deadline = estimate(TimeLeft::Medium, at(0), None);
        assert_eq!(deadline, at(30));
    }

    #[test]
    fn prior_narrows_when_tighter() {
        // Seen as SHORT at t=10m, absent at prior t=5m: latest candidate
        // is 5m + 30m = 35m, later than the 10m lower bound, so keep 10m.
        let deadline = estimate(TimeLeft::Short, at(10), Some(at(5)));
        assert_eq!(deadline, at(10));

        // VERY_LONG at t=10m with prior t=5m: lower candidate 10m + 12h,
        // upper candidate 5m + 48h; the lower one wins.
        let deadline = estimate(TimeLeft::VeryLong, at(10), Some(at(5)));
        assert_eq!(deadline, at(10) + Duration::hours(12));
    }

    #[test]
    fn prior_based_estimate_never_exceeds_lower_only_estimate() {
        // Monotonic narrowing: adding a prior can only pull the deadline in.
        for bucket in [
            TimeLeft::Short,
            TimeLeft::Medium,
            TimeLeft::Long,
            TimeLeft::VeryLong,
        ] {
            let lower_only = estimate(bucket, at(60), None);
            let narrowed = estimate(bucket, at(60), Some(at(55)));
            assert!(narrowed <= lower_only, "bucket {bucket} widened");
        }
    }

    #[test]
    fn reset_uses_upper_bound() {
        let deadline = reset_estimate(TimeLeft::Medium, at(100));
        assert_eq!(deadline, at(100) + Duration::hours(2));
    }
}
