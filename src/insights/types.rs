use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One measurement of a tracked quantity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimestampedObservation {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl TimestampedObservation {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationResult {
    pub coefficient: f64,
    pub sample_size: usize,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrendClassification {
    Improving,
    Stable,
    Declining,
}

impl TrendClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendClassification::Improving => "improving",
            TrendClassification::Stable => "stable",
            TrendClassification::Declining => "declining",
        }
    }
}

/// Two series joined point-for-point, with the number of points on each side
/// that found no partner.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlignedSeries {
    pub left: Vec<f64>,
    pub right: Vec<f64>,
    pub dropped_left: usize,
    pub dropped_right: usize,
}

impl AlignedSeries {
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    pub fn dropped(&self) -> usize {
        self.dropped_left + self.dropped_right
    }
}

/// Correlation between a subject series and a target series, the direction
/// the target is heading, and a sentence describing both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub subject: String,
    pub target: String,
    pub correlation: CorrelationResult,
    pub trend: TrendClassification,
    pub dropped_points: usize,
    pub text: String,
}
