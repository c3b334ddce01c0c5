use chrono::Duration;
use serde::{Deserialize, Serialize};

/// How `classify_trend` splits a series into an earlier and a later half.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TrendSplit {
    /// Split at the index midpoint, regardless of when points were logged.
    #[default]
    Index,
    /// Split at the midpoint between the first and last timestamp.
    ElapsedTime,
}

/// Longest offset a window may reach after its event: one week.
pub const MAX_WINDOW_MINUTES: i64 = 7 * 24 * 60;

/// Fixed offset range after an event within which responses are matched to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentWindow {
    pub min_offset: Duration,
    pub max_offset: Duration,
}

impl AlignmentWindow {
    /// Offsets are clamped to `±MAX_WINDOW_MINUTES`.
    pub fn minutes(min: i64, max: i64) -> Self {
        let clamp = |minutes: i64| minutes.clamp(-MAX_WINDOW_MINUTES, MAX_WINDOW_MINUTES);
        Self {
            min_offset: Duration::minutes(clamp(min)),
            max_offset: Duration::minutes(clamp(max)),
        }
    }
}

/// Thresholds for correlation, trend and insight text.
#[derive(Debug, Clone)]
pub struct InsightConfig {
    /// Relative band around the earlier mean inside which a trend is stable
    pub trend_tolerance: f64,
    pub trend_split: TrendSplit,

    /// |r| above this reads as a strong correlation
    pub strong_threshold: f64,
    /// |r| above this reads as a moderate correlation
    pub moderate_threshold: f64,

    /// Sample sizes below this have low confidence
    pub medium_confidence_min_samples: usize,
    /// Sample sizes above this have high confidence
    pub high_confidence_above_samples: usize,

    /// Buckets with fewer samples are left out of best/worst rankings
    pub min_bucket_samples: usize,

    /// Relative deviation from the overall mean that marks a bucket as
    /// energizing or draining
    pub impact_threshold: f64,

    pub meal_window: AlignmentWindow,
    pub social_window: AlignmentWindow,
    pub location_window: AlignmentWindow,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            trend_tolerance: 0.10,
            trend_split: TrendSplit::Index,
            strong_threshold: 0.5,
            moderate_threshold: 0.3,
            medium_confidence_min_samples: 5,
            high_confidence_above_samples: 15,
            min_bucket_samples: 2,
            impact_threshold: 0.10,
            meal_window: AlignmentWindow::minutes(60, 120),
            social_window: AlignmentWindow::minutes(0, 180),
            location_window: AlignmentWindow::minutes(0, 120),
        }
    }
}
