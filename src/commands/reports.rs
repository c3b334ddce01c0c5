use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    analysis::{
        analyze_biometrics, analyze_locations, analyze_nutrition, analyze_social, analyze_timing,
        BiometricsReport, LocationReport, NutritionReport, SocialReport, TimingReport,
    },
    db::models::{Observation, ObservationKind, TimeRange},
    insights::InsightConfig,
    AppState,
};

/// Every report over the same range, loaded in one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewReport {
    pub range: TimeRange,
    pub observations_analyzed: usize,
    pub nutrition: NutritionReport,
    pub social: SocialReport,
    pub biometrics: BiometricsReport,
    pub location: LocationReport,
    pub timing: TimingReport,
}

async fn load(
    state: &AppState,
    kinds: &[ObservationKind],
    days: Option<u32>,
) -> Result<(TimeRange, Vec<Observation>, InsightConfig)> {
    let settings = state.settings.insights();
    let range = TimeRange::last_days(Utc::now(), days.unwrap_or(settings.analysis_days));
    let observations = state.db.get_observations(kinds, Some(range)).await?;
    Ok((range, observations, settings.to_config()))
}

pub async fn get_nutrition_report(state: &AppState, days: Option<u32>) -> Result<NutritionReport> {
    let kinds = [ObservationKind::Meal, ObservationKind::Energy];
    let (_, observations, config) = load(state, &kinds, days).await?;
    Ok(analyze_nutrition(&observations, &config))
}

pub async fn get_social_report(state: &AppState, days: Option<u32>) -> Result<SocialReport> {
    let kinds = [ObservationKind::Social, ObservationKind::Energy];
    let (_, observations, config) = load(state, &kinds, days).await?;
    Ok(analyze_social(&observations, &config))
}

pub async fn get_biometrics_report(
    state: &AppState,
    days: Option<u32>,
) -> Result<BiometricsReport> {
    let kinds = [
        ObservationKind::Energy,
        ObservationKind::Hrv,
        ObservationKind::RestingHeartRate,
        ObservationKind::Sleep,
        ObservationKind::Stress,
        ObservationKind::Steps,
    ];
    let (_, observations, config) = load(state, &kinds, days).await?;
    Ok(analyze_biometrics(&observations, &config))
}

pub async fn get_location_report(state: &AppState, days: Option<u32>) -> Result<LocationReport> {
    let kinds = [ObservationKind::Location, ObservationKind::Energy];
    let (_, observations, config) = load(state, &kinds, days).await?;
    Ok(analyze_locations(&observations, &config))
}

pub async fn get_timing_report(state: &AppState, days: Option<u32>) -> Result<TimingReport> {
    let kinds = [
        ObservationKind::Energy,
        ObservationKind::Mood,
        ObservationKind::Meditation,
    ];
    let (_, observations, config) = load(state, &kinds, days).await?;
    Ok(analyze_timing(&observations, &config))
}

pub async fn get_overview(state: &AppState, days: Option<u32>) -> Result<OverviewReport> {
    let (range, observations, config) = load(state, &[], days).await?;

    Ok(OverviewReport {
        range,
        observations_analyzed: observations.len(),
        nutrition: analyze_nutrition(&observations, &config),
        social: analyze_social(&observations, &config),
        biometrics: analyze_biometrics(&observations, &config),
        location: analyze_locations(&observations, &config),
        timing: analyze_timing(&observations, &config),
    })
}
