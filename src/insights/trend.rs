use crate::insights::types::{TimestampedObservation, TrendClassification};

/// Classify a series by comparing the mean of its earlier half with the mean
/// of its later half.
///
/// The split is by index: for an odd length the middle point belongs to the
/// later half. Fewer than two points is `Stable`.
pub fn classify_trend(
    series: &[f64],
    ordered_oldest_first: bool,
    tolerance: f64,
) -> TrendClassification {
    if series.len() < 2 {
        return TrendClassification::Stable;
    }

    let mid = series.len() / 2;
    let (earlier, later) = if ordered_oldest_first {
        (mean(&series[..mid]), mean(&series[mid..]))
    } else {
        // Newest first: the tail of the slice is the earlier period.
        let oldest_first: Vec<f64> = series.iter().rev().copied().collect();
        (mean(&oldest_first[..mid]), mean(&oldest_first[mid..]))
    };

    compare_halves(earlier, later, tolerance)
}

/// Like `classify_trend`, but splits at the midpoint between the first and
/// last timestamp so dense recent logging does not skew the later half.
pub fn classify_trend_by_elapsed_time(
    observations: &[TimestampedObservation],
    tolerance: f64,
) -> TrendClassification {
    let Some(first) = observations.iter().map(|o| o.timestamp).min() else {
        return TrendClassification::Stable;
    };
    let Some(last) = observations.iter().map(|o| o.timestamp).max() else {
        return TrendClassification::Stable;
    };
    if first == last {
        return TrendClassification::Stable;
    }

    let midpoint = first + (last - first) / 2;
    let (earlier, later): (Vec<f64>, Vec<f64>) = {
        let mut earlier = Vec::new();
        let mut later = Vec::new();
        for observation in observations {
            if observation.timestamp < midpoint {
                earlier.push(observation.value);
            } else {
                later.push(observation.value);
            }
        }
        (earlier, later)
    };

    if earlier.is_empty() || later.is_empty() {
        return TrendClassification::Stable;
    }

    compare_halves(mean(&earlier), mean(&later), tolerance)
}

fn compare_halves(earlier: f64, later: f64, tolerance: f64) -> TrendClassification {
    // Band is taken from |earlier| so negative means keep upper > lower.
    let band = earlier.abs() * tolerance;
    if later > earlier + band {
        TrendClassification::Improving
    } else if later < earlier - band {
        TrendClassification::Declining
    } else {
        TrendClassification::Stable
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
