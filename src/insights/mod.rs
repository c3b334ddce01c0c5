//! Shared correlation and insight utilities.
//!
//! Every feature analysis reduces to the same steps: align two series,
//! correlate them, classify where the target series is heading, and render a
//! sentence. Nothing in here performs I/O or returns an error; degenerate
//! input (empty, mismatched, zero variance) maps to a defined default.

pub mod align;
pub mod buckets;
pub mod config;
pub mod correlation;
pub mod text;
pub mod trend;
mod types;

pub use align::{align_by_date, align_by_window, match_window};
pub use buckets::{bucket_average, bucket_summaries, BucketSummary, Measured};
pub use config::{AlignmentWindow, InsightConfig, TrendSplit, MAX_WINDOW_MINUTES};
pub use correlation::{compute_correlation, correlate};
pub use text::{derive_insight_text, describe_relationship};
pub use trend::{classify_trend, classify_trend_by_elapsed_time};
pub use types::{
    AlignedSeries, Confidence, CorrelationResult, Insight, TimestampedObservation,
    TrendClassification,
};

/// Classify the trend of time-stamped observations using the configured split.
pub fn trend_of<T: Measured>(observations: &[T], config: &InsightConfig) -> TrendClassification {
    let mut points: Vec<TimestampedObservation> = observations
        .iter()
        .map(|o| TimestampedObservation::new(o.timestamp(), o.value()))
        .collect();
    points.sort_by_key(|point| point.timestamp);

    match config.trend_split {
        TrendSplit::Index => {
            let values: Vec<f64> = points.iter().map(|point| point.value).collect();
            classify_trend(&values, true, config.trend_tolerance)
        }
        TrendSplit::ElapsedTime => classify_trend_by_elapsed_time(&points, config.trend_tolerance),
    }
}

/// Correlate an aligned pair and describe it. The trend is taken over the
/// aligned target values, which must be oldest first.
pub fn analyze_pair(
    subject: &str,
    target: &str,
    aligned: &AlignedSeries,
    config: &InsightConfig,
) -> Insight {
    let correlation = correlate(&aligned.left, &aligned.right, config);
    let trend = classify_trend(&aligned.right, true, config.trend_tolerance);
    let text = describe_relationship(
        subject,
        target,
        correlation.coefficient,
        trend,
        correlation.sample_size,
        config,
    );

    Insight {
        subject: subject.to_string(),
        target: target.to_string(),
        correlation,
        trend,
        dropped_points: aligned.dropped(),
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn analyze_pair_combines_steps() {
        let aligned = AlignedSeries {
            left: vec![5.0, 6.0, 7.0, 8.0, 9.0, 10.0],
            right: vec![3.0, 3.5, 4.0, 6.0, 7.0, 8.0],
            dropped_left: 2,
            dropped_right: 1,
        };

        let insight = analyze_pair("sleep", "energy", &aligned, &InsightConfig::default());

        assert!(insight.correlation.coefficient > 0.9);
        assert_eq!(insight.correlation.sample_size, 6);
        assert_eq!(insight.correlation.confidence, Confidence::Medium);
        assert_eq!(insight.trend, TrendClassification::Improving);
        assert_eq!(insight.dropped_points, 3);
        assert!(insight.text.starts_with("Strong positive correlation between sleep and energy"));
    }

    #[test]
    fn trend_of_sorts_before_splitting() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        // Logged out of order: the late readings are high.
        let observations = vec![
            TimestampedObservation::new(start + Duration::days(3), 9.0),
            TimestampedObservation::new(start, 3.0),
            TimestampedObservation::new(start + Duration::days(2), 9.0),
            TimestampedObservation::new(start + Duration::days(1), 3.0),
        ];

        let config = InsightConfig::default();
        assert_eq!(trend_of(&observations, &config), TrendClassification::Improving);

        let elapsed = InsightConfig {
            trend_split: TrendSplit::ElapsedTime,
            ..InsightConfig::default()
        };
        assert_eq!(trend_of(&observations, &elapsed), TrendClassification::Improving);
    }
}
