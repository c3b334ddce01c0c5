//! Feature analyses built on the shared insight utilities.
//!
//! Each analyzer is a pure function of the observations it is handed and an
//! `InsightConfig`; loading from storage happens in `commands`.

pub mod biometrics;
pub mod location;
pub mod nutrition;
pub mod social;
pub mod timing;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::db::models::{Observation, ObservationKind};
use crate::insights::{
    bucket_summaries, buckets::by_date, trend::mean, InsightConfig, Measured,
    TimestampedObservation,
};

pub use biometrics::{analyze_biometrics, BiometricsReport, MetricInsight};
pub use location::{analyze_locations, LocationReport};
pub use nutrition::{analyze_nutrition, NutritionReport};
pub use social::{analyze_social, SocialReport};
pub use timing::{analyze_timing, TimingReport};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    Energizing,
    Neutral,
    Draining,
}

/// Average energy that followed one label (a food, a person, a place).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabelImpact {
    pub label: String,
    pub average_energy: f64,
    pub samples: usize,
    pub impact: ImpactLevel,
}

pub(crate) fn of_kind(observations: &[Observation], kind: ObservationKind) -> Vec<&Observation> {
    observations.iter().filter(|o| o.kind == kind).collect()
}

pub(crate) fn mean_value<T: Measured>(observations: &[T]) -> Option<f64> {
    if observations.is_empty() {
        return None;
    }
    let values: Vec<f64> = observations.iter().map(|o| o.value()).collect();
    Some(mean(&values))
}

/// Sum of values per calendar day, stamped at the first observation of that day.
pub(crate) fn daily_totals<T: Measured>(observations: &[T]) -> Vec<TimestampedObservation> {
    let mut totals: BTreeMap<chrono::NaiveDate, TimestampedObservation> = BTreeMap::new();
    for observation in observations {
        totals
            .entry(by_date(observation))
            .and_modify(|total| total.value += observation.value())
            .or_insert_with(|| {
                TimestampedObservation::new(observation.timestamp(), observation.value())
            });
    }
    totals.into_values().collect()
}

pub(crate) fn impact_level(average: f64, baseline: f64, config: &InsightConfig) -> ImpactLevel {
    let deviation = if baseline.abs() > f64::EPSILON {
        (average - baseline) / baseline.abs()
    } else {
        average - baseline
    };

    if deviation >= config.impact_threshold {
        ImpactLevel::Energizing
    } else if deviation <= -config.impact_threshold {
        ImpactLevel::Draining
    } else {
        ImpactLevel::Neutral
    }
}

/// Bucket matched `(event, energy after)` pairs by event label, best first.
pub(crate) fn rank_labels(
    pairs: &[(&&Observation, f64)],
    baseline: f64,
    config: &InsightConfig,
) -> Vec<LabelImpact> {
    let responses: Vec<LabeledResponse> = pairs
        .iter()
        .filter_map(|(event, energy)| {
            event.label.as_ref().map(|label| LabeledResponse {
                label: label.trim().to_lowercase(),
                event_timestamp: event.timestamp,
                energy: *energy,
            })
        })
        .collect();

    let mut ranked: Vec<LabelImpact> = bucket_summaries(&responses, |r| r.label.clone())
        .into_iter()
        .map(|(label, summary)| LabelImpact {
            impact: impact_level(summary.mean, baseline, config),
            label,
            average_energy: summary.mean,
            samples: summary.count,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.average_energy
            .total_cmp(&a.average_energy)
            .then_with(|| a.label.cmp(&b.label))
    });
    ranked
}

/// Highest and lowest ranked labels with enough samples to trust.
pub(crate) fn best_and_worst(
    ranked: &[LabelImpact],
    config: &InsightConfig,
) -> (Option<String>, Option<String>) {
    let mut eligible = ranked
        .iter()
        .filter(|impact| impact.samples >= config.min_bucket_samples);
    let best = eligible.next().map(|impact| impact.label.clone());
    let worst = eligible.last().map(|impact| impact.label.clone());
    (best, worst)
}

pub(crate) fn labels_with_impact(
    ranked: &[LabelImpact],
    level: ImpactLevel,
    config: &InsightConfig,
) -> Vec<String> {
    ranked
        .iter()
        .filter(|impact| impact.samples >= config.min_bucket_samples && impact.impact == level)
        .map(|impact| impact.label.clone())
        .collect()
}

struct LabeledResponse {
    label: String,
    event_timestamp: chrono::DateTime<chrono::Utc>,
    energy: f64,
}

impl Measured for LabeledResponse {
    fn timestamp(&self) -> chrono::DateTime<chrono::Utc> {
        self.event_timestamp
    }

    fn value(&self) -> f64 {
        self.energy
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, TimeZone, Utc};

    use crate::db::models::{Observation, ObservationKind, ObservationSource};

    pub fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, day, hour, minute, 0).unwrap()
    }

    pub fn obs(kind: ObservationKind, at: DateTime<Utc>, value: f64) -> Observation {
        Observation {
            id: format!("{}-{}", kind.as_str(), at.timestamp()),
            kind,
            timestamp: at,
            value,
            label: None,
            note: None,
            source: ObservationSource::Manual,
            created_at: at,
        }
    }

    pub fn labeled(
        kind: ObservationKind,
        at: DateTime<Utc>,
        value: f64,
        label: &str,
    ) -> Observation {
        Observation {
            label: Some(label.to_string()),
            ..obs(kind, at, value)
        }
    }
}
