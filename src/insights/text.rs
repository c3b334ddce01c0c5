use crate::insights::config::InsightConfig;
use crate::insights::correlation::confidence_for;
use crate::insights::types::{Confidence, TrendClassification};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strength {
    Strong,
    Moderate,
    Weak,
}

fn strength_of(coefficient: f64, config: &InsightConfig) -> Strength {
    let magnitude = coefficient.abs();
    if magnitude > config.strong_threshold {
        Strength::Strong
    } else if magnitude > config.moderate_threshold {
        Strength::Moderate
    } else {
        Strength::Weak
    }
}

/// Generic insight sentence for a correlation and a trend.
pub fn derive_insight_text(
    coefficient: f64,
    trend: TrendClassification,
    sample_size: usize,
) -> String {
    describe_relationship(
        "these measures",
        "energy",
        coefficient,
        trend,
        sample_size,
        &InsightConfig::default(),
    )
}

/// Insight sentence naming the two measures involved.
pub fn describe_relationship(
    subject: &str,
    target: &str,
    coefficient: f64,
    trend: TrendClassification,
    sample_size: usize,
    config: &InsightConfig,
) -> String {
    let direction = if coefficient >= 0.0 { "positive" } else { "negative" };

    let headline = match strength_of(coefficient, config) {
        Strength::Strong => format!(
            "Strong {direction} correlation between {subject} and {target} (r={coefficient:.2})."
        ),
        Strength::Moderate => format!(
            "Moderate {direction} correlation between {subject} and {target} (r={coefficient:.2})."
        ),
        Strength::Weak => format!("Weak or no correlation between {subject} and {target}."),
    };

    let trend_line = match trend {
        TrendClassification::Improving => format!("Your {target} has been improving recently."),
        TrendClassification::Stable => format!("Your {target} has been holding steady."),
        TrendClassification::Declining => format!("Your {target} has been declining recently."),
    };

    let caveat = match confidence_for(sample_size, config) {
        Confidence::Low => format!(" Based on only {sample_size} data points, so keep logging."),
        Confidence::Medium | Confidence::High => String::new(),
    };

    format!("{headline} {trend_line}{caveat}")
}
