use serde::{Deserialize, Serialize};

use crate::analysis::of_kind;
use crate::db::models::{Observation, ObservationKind};
use crate::insights::{
    align_by_date, analyze_pair,
    buckets::{by_hour, by_weekday},
    bucket_summaries, trend_of, Insight, InsightConfig, TrendClassification,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HourlyEnergy {
    pub hour: u32,
    pub average: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayEnergy {
    pub weekday: String,
    pub average: f64,
    pub samples: usize,
}

/// When in the day and week your energy peaks, and where it is heading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimingReport {
    pub energy_readings: usize,
    pub hourly: Vec<HourlyEnergy>,
    pub weekdays: Vec<WeekdayEnergy>,
    pub peak_hour: Option<u32>,
    pub low_hour: Option<u32>,
    pub best_weekday: Option<String>,
    pub energy_trend: TrendClassification,
    pub mood_vs_energy: Insight,
    pub meditation_vs_energy: Insight,
    pub recommendation: String,
}

pub fn analyze_timing(observations: &[Observation], config: &InsightConfig) -> TimingReport {
    let energy = of_kind(observations, ObservationKind::Energy);
    let mood = of_kind(observations, ObservationKind::Mood);
    let meditation = of_kind(observations, ObservationKind::Meditation);

    let hourly: Vec<HourlyEnergy> = bucket_summaries(&energy, by_hour)
        .into_iter()
        .map(|(hour, summary)| HourlyEnergy {
            hour,
            average: summary.mean,
            samples: summary.count,
        })
        .collect();

    let weekdays: Vec<WeekdayEnergy> = bucket_summaries(&energy, by_weekday)
        .into_iter()
        .map(|(day, summary)| WeekdayEnergy {
            weekday: weekday_name(day).to_string(),
            average: summary.mean,
            samples: summary.count,
        })
        .collect();

    let trusted_hours: Vec<&HourlyEnergy> = hourly
        .iter()
        .filter(|bucket| bucket.samples >= config.min_bucket_samples)
        .collect();
    let peak_hour = trusted_hours
        .iter()
        .max_by(|a, b| a.average.total_cmp(&b.average))
        .map(|bucket| bucket.hour);
    let low_hour = trusted_hours
        .iter()
        .min_by(|a, b| a.average.total_cmp(&b.average))
        .map(|bucket| bucket.hour)
        .filter(|hour| Some(*hour) != peak_hour);
    let best_weekday = weekdays
        .iter()
        .filter(|bucket| bucket.samples >= config.min_bucket_samples)
        .max_by(|a, b| a.average.total_cmp(&b.average))
        .map(|bucket| bucket.weekday.clone());

    let energy_trend = trend_of(&energy, config);
    let mood_vs_energy = analyze_pair("mood", "energy", &align_by_date(&mood, &energy), config);
    let meditation_vs_energy = analyze_pair(
        "meditation",
        "energy",
        &align_by_date(&meditation, &energy),
        config,
    );

    let recommendation = recommend(peak_hour, low_hour, energy_trend, energy.len());

    TimingReport {
        energy_readings: energy.len(),
        hourly,
        weekdays,
        peak_hour,
        low_hour,
        best_weekday,
        energy_trend,
        mood_vs_energy,
        meditation_vs_energy,
        recommendation,
    }
}

fn weekday_name(days_from_monday: u32) -> &'static str {
    match days_from_monday {
        0 => "Monday",
        1 => "Tuesday",
        2 => "Wednesday",
        3 => "Thursday",
        4 => "Friday",
        5 => "Saturday",
        _ => "Sunday",
    }
}

fn recommend(
    peak_hour: Option<u32>,
    low_hour: Option<u32>,
    trend: TrendClassification,
    readings: usize,
) -> String {
    if readings == 0 {
        return "Log your energy a few times a day to discover your peak hours.".to_string();
    }

    let timing = match (peak_hour, low_hour) {
        (Some(peak), Some(low)) => format!(
            "Your energy peaks around {peak:02}:00 and dips around {low:02}:00. Schedule demanding work near your peak."
        ),
        (Some(peak), None) => format!("Your energy peaks around {peak:02}:00."),
        _ => "Log energy at the same hours on several days to find your peak time.".to_string(),
    };

    let direction = match trend {
        TrendClassification::Improving => " Overall, your energy is improving.",
        TrendClassification::Stable => " Overall, your energy is steady.",
        TrendClassification::Declining => {
            " Overall, your energy is declining; consider more rest this week."
        }
    };

    format!("{timing}{direction}")
}
