use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::insights::types::TimestampedObservation;

/// Anything with a timestamp and a numeric value can be bucketed and aligned.
pub trait Measured {
    fn timestamp(&self) -> DateTime<Utc>;
    fn value(&self) -> f64;
}

impl Measured for TimestampedObservation {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn value(&self) -> f64 {
        self.value
    }
}

impl<T: Measured + ?Sized> Measured for &T {
    fn timestamp(&self) -> DateTime<Utc> {
        (**self).timestamp()
    }

    fn value(&self) -> f64 {
        (**self).value()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BucketSummary {
    pub mean: f64,
    pub count: usize,
    pub min: f64,
    pub max: f64,
}

/// Group observations by `key_fn` and return the arithmetic mean per bucket.
pub fn bucket_average<T, K, F>(observations: &[T], key_fn: F) -> BTreeMap<K, f64>
where
    T: Measured,
    K: Ord,
    F: Fn(&T) -> K,
{
    bucket_summaries(observations, key_fn)
        .into_iter()
        .map(|(key, summary)| (key, summary.mean))
        .collect()
}

/// Mean, count and range per bucket. Extreme values are not clipped.
pub fn bucket_summaries<T, K, F>(observations: &[T], key_fn: F) -> BTreeMap<K, BucketSummary>
where
    T: Measured,
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut totals: BTreeMap<K, (f64, usize, f64, f64)> = BTreeMap::new();

    for observation in observations {
        let value = observation.value();
        let entry = totals
            .entry(key_fn(observation))
            .or_insert((0.0, 0, f64::INFINITY, f64::NEG_INFINITY));
        entry.0 += value;
        entry.1 += 1;
        entry.2 = entry.2.min(value);
        entry.3 = entry.3.max(value);
    }

    totals
        .into_iter()
        .map(|(key, (sum, count, min, max))| {
            (
                key,
                BucketSummary {
                    mean: sum / count as f64,
                    count,
                    min,
                    max,
                },
            )
        })
        .collect()
}

pub fn by_date<T: Measured>(observation: &T) -> NaiveDate {
    observation.timestamp().date_naive()
}

/// Hour of day, 0-23 (UTC).
pub fn by_hour<T: Measured>(observation: &T) -> u32 {
    observation.timestamp().hour()
}

/// Weekday as days from Monday, 0-6.
pub fn by_weekday<T: Measured>(observation: &T) -> u32 {
    observation.timestamp().weekday().num_days_from_monday()
}
