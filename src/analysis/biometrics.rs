use serde::{Deserialize, Serialize};

use crate::analysis::{mean_value, of_kind};
use crate::db::models::{Observation, ObservationKind};
use crate::insights::{
    align_by_date, analyze_pair, trend_of, Confidence, Insight, InsightConfig,
    TrendClassification,
};

const METRICS: [ObservationKind; 5] = [
    ObservationKind::Hrv,
    ObservationKind::RestingHeartRate,
    ObservationKind::Sleep,
    ObservationKind::Stress,
    ObservationKind::Steps,
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricInsight {
    pub kind: ObservationKind,
    pub readings: usize,
    pub average: f64,
    /// Direction of the metric itself, independent of energy
    pub metric_trend: TrendClassification,
    pub insight: Insight,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BiometricsReport {
    pub metrics: Vec<MetricInsight>,
    /// Metric with the largest |r| against energy among non-low-confidence ones
    pub strongest: Option<ObservationKind>,
    pub recommendation: String,
}

pub fn analyze_biometrics(
    observations: &[Observation],
    config: &InsightConfig,
) -> BiometricsReport {
    let energy = of_kind(observations, ObservationKind::Energy);

    let metrics: Vec<MetricInsight> = METRICS
        .iter()
        .filter_map(|&kind| {
            let readings = of_kind(observations, kind);
            let average = mean_value(&readings)?;
            let aligned = align_by_date(&readings, &energy);
            Some(MetricInsight {
                kind,
                readings: readings.len(),
                average,
                metric_trend: trend_of(&readings, config),
                insight: analyze_pair(kind.display_name(), "energy", &aligned, config),
            })
        })
        .collect();

    let strongest = metrics
        .iter()
        .filter(|metric| metric.insight.correlation.confidence != Confidence::Low)
        .filter(|metric| metric.insight.correlation.coefficient.abs() > config.moderate_threshold)
        .max_by(|a, b| {
            a.insight
                .correlation
                .coefficient
                .abs()
                .total_cmp(&b.insight.correlation.coefficient.abs())
        })
        .map(|metric| metric.kind);

    let recommendation = recommend(strongest, &metrics);

    BiometricsReport {
        metrics,
        strongest,
        recommendation,
    }
}

fn recommend(strongest: Option<ObservationKind>, metrics: &[MetricInsight]) -> String {
    if metrics.is_empty() {
        return "Connect a device or log sleep, HRV, stress or steps to see how your body affects your energy.".to_string();
    }

    let Some(kind) = strongest else {
        return "None of your body metrics clearly tracks your energy yet. Keep logging to build a clearer picture.".to_string();
    };

    let positive = metrics
        .iter()
        .find(|metric| metric.kind == kind)
        .map(|metric| metric.insight.correlation.coefficient > 0.0)
        .unwrap_or(true);

    match (kind, positive) {
        (ObservationKind::Sleep, true) => {
            "More sleep lines up with more energy for you. Protect a consistent bedtime.".to_string()
        }
        (ObservationKind::Stress, false) => {
            "Stress is your biggest energy drain. Short breathing breaks on high-stress days may help.".to_string()
        }
        (ObservationKind::Hrv, true) => {
            "Higher HRV days are your high-energy days. Treat a low morning HRV as a cue to take it easy.".to_string()
        }
        (ObservationKind::Steps, true) => {
            "Active days come with more energy. A short walk may be worth it when you feel flat.".to_string()
        }
        (kind, true) => format!(
            "Your {} rises and falls with your energy. Keep an eye on it.",
            kind.display_name()
        ),
        (kind, false) => format!(
            "Higher {} comes with lower energy for you. Watch for it on flat days.",
            kind.display_name()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::*;

    #[test]
    fn no_metrics_gives_prompt() {
        let observations = vec![obs(ObservationKind::Energy, at(1, 9, 0), 5.0)];
        let report = analyze_biometrics(&observations, &InsightConfig::default());

        assert!(report.metrics.is_empty());
        assert_eq!(report.strongest, None);
        assert!(report.recommendation.starts_with("Connect a device"));
    }

    #[test]
    fn picks_strongest_confident_metric() {
        let mut observations = Vec::new();
        let sleep_hours = [5.0, 6.0, 7.0, 8.0, 6.5, 7.5];
        let stress = [3.0, 6.0, 2.0, 5.0, 4.0, 3.0];
        for (index, day) in (1..=6).enumerate() {
            observations.push(obs(ObservationKind::Sleep, at(day, 7, 0), sleep_hours[index]));
            observations.push(obs(ObservationKind::Stress, at(day, 12, 0), stress[index]));
            // Energy tracks sleep exactly.
            observations.push(obs(ObservationKind::Energy, at(day, 10, 0), sleep_hours[index]));
        }
        // HRV only on two days: low confidence, never the strongest.
        observations.push(obs(ObservationKind::Hrv, at(1, 6, 0), 30.0));
        observations.push(obs(ObservationKind::Hrv, at(2, 6, 0), 60.0));

        let report = analyze_biometrics(&observations, &InsightConfig::default());

        let kinds: Vec<ObservationKind> = report.metrics.iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![ObservationKind::Hrv, ObservationKind::Sleep, ObservationKind::Stress]
        );

        let hrv = &report.metrics[0];
        assert_eq!(hrv.insight.correlation.confidence, Confidence::Low);
        assert_eq!(hrv.insight.dropped_points, 4);

        let sleep = &report.metrics[1];
        assert_eq!(sleep.readings, 6);
        assert!((sleep.insight.correlation.coefficient - 1.0).abs() < 1e-9);
        assert_eq!(report.strongest, Some(ObservationKind::Sleep));
        assert!(report.recommendation.contains("More sleep"));
    }
}
