use crate::insights::config::InsightConfig;
use crate::insights::types::{Confidence, CorrelationResult};

/// Pearson product-moment correlation of two equal-length series.
///
/// r = (nΣxy - ΣxΣy) / sqrt((nΣx² - (Σx)²)(nΣy² - (Σy)²))
///
/// Returns 0.0 when either series is empty, the lengths differ, or either
/// series has no variance.
pub fn compute_correlation(series_a: &[f64], series_b: &[f64]) -> f64 {
    if series_a.is_empty() || series_a.len() != series_b.len() {
        return 0.0;
    }

    let n = series_a.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    let mut sum_y2 = 0.0;

    for (&x, &y) in series_a.iter().zip(series_b) {
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
        sum_y2 += y * y;
    }

    let numerator = n * sum_xy - sum_x * sum_y;
    let variance_x = n * sum_x2 - sum_x * sum_x;
    let variance_y = n * sum_y2 - sum_y * sum_y;
    let denominator = (variance_x * variance_y).sqrt();

    if !denominator.is_finite() || denominator <= f64::EPSILON {
        return 0.0;
    }

    let r = numerator / denominator;
    if r.is_finite() {
        r.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Step function from sample size to confidence.
pub fn confidence_for(sample_size: usize, config: &InsightConfig) -> Confidence {
    if sample_size < config.medium_confidence_min_samples {
        Confidence::Low
    } else if sample_size > config.high_confidence_above_samples {
        Confidence::High
    } else {
        Confidence::Medium
    }
}

pub fn correlate(series_a: &[f64], series_b: &[f64], config: &InsightConfig) -> CorrelationResult {
    let coefficient = compute_correlation(series_a, series_b);
    let sample_size = if series_a.len() == series_b.len() {
        series_a.len()
    } else {
        0
    };

    CorrelationResult {
        coefficient,
        sample_size,
        confidence: confidence_for(sample_size, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_series_have_no_correlation() {
        assert_eq!(compute_correlation(&[], &[]), 0.0);
    }

    #[test]
    fn identical_series_correlate_perfectly() {
        assert!(approx(compute_correlation(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]), 1.0));
    }

    #[test]
    fn reversed_series_correlate_negatively() {
        assert!(approx(compute_correlation(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]), -1.0));
    }

    #[test]
    fn constant_series_has_zero_denominator() {
        assert_eq!(compute_correlation(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(compute_correlation(&[1.0, 2.0, 3.0], &[4.0, 4.0, 4.0]), 0.0);
    }

    #[test]
    fn single_point_has_no_variance() {
        assert_eq!(compute_correlation(&[3.0], &[7.0]), 0.0);
    }

    #[test]
    fn mismatched_lengths_are_degenerate() {
        assert_eq!(compute_correlation(&[1.0, 2.0, 3.0], &[1.0, 2.0]), 0.0);
        let result = correlate(&[1.0, 2.0, 3.0], &[1.0, 2.0], &InsightConfig::default());
        assert_eq!(result.sample_size, 0);
        assert_eq!(result.confidence, Confidence::Low);
    }

    #[test]
    fn partial_correlation_stays_in_range() {
        let r = compute_correlation(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 1.0, 4.0, 3.0, 5.0]);
        assert!(r > 0.0 && r < 1.0);
        assert!(approx(r, 0.8));
    }

    #[test]
    fn confidence_steps_at_five_and_fifteen() {
        let config = InsightConfig::default();
        assert_eq!(confidence_for(0, &config), Confidence::Low);
        assert_eq!(confidence_for(4, &config), Confidence::Low);
        assert_eq!(confidence_for(5, &config), Confidence::Medium);
        assert_eq!(confidence_for(15, &config), Confidence::Medium);
        assert_eq!(confidence_for(16, &config), Confidence::High);
    }
}
