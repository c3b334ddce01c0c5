use serde::{Deserialize, Serialize};

use crate::analysis::{
    daily_totals, labels_with_impact, mean_value, of_kind, rank_labels, ImpactLevel, LabelImpact,
};
use crate::db::models::{Observation, ObservationKind};
use crate::insights::{align_by_date, analyze_pair, match_window, Insight, InsightConfig};

/// Who leaves you with more or less energy, and whether time with people
/// tracks your daily energy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SocialReport {
    pub interactions_logged: usize,
    pub interactions_matched: usize,
    pub people: Vec<LabelImpact>,
    pub energizers: Vec<String>,
    pub drainers: Vec<String>,
    pub social_time_vs_energy: Insight,
    pub recommendation: String,
}

pub fn analyze_social(observations: &[Observation], config: &InsightConfig) -> SocialReport {
    let interactions = of_kind(observations, ObservationKind::Social);
    let energy = of_kind(observations, ObservationKind::Energy);
    let baseline = mean_value(&energy).unwrap_or(0.0);

    let matches = match_window(&interactions, &energy, config.social_window);
    let people = rank_labels(&matches.pairs, baseline, config);
    let energizers = labels_with_impact(&people, ImpactLevel::Energizing, config);
    let drainers = labels_with_impact(&people, ImpactLevel::Draining, config);

    let daily_minutes = daily_totals(&interactions);
    let aligned = align_by_date(&daily_minutes, &energy);
    let social_time_vs_energy = analyze_pair("time with others", "energy", &aligned, config);

    let recommendation = recommend(&energizers, &drainers, interactions.len());

    SocialReport {
        interactions_logged: interactions.len(),
        interactions_matched: matches.pairs.len(),
        people,
        energizers,
        drainers,
        social_time_vs_energy,
        recommendation,
    }
}

fn recommend(energizers: &[String], drainers: &[String], interactions_logged: usize) -> String {
    if interactions_logged == 0 {
        return "Log who you spend time with to learn which relationships recharge you.".to_string();
    }

    match (energizers.first(), drainers.first()) {
        (Some(energizer), Some(drainer)) => format!(
            "Time with {energizer} tends to lift your energy, while time with {drainer} tends to lower it. Plan recovery time after demanding encounters."
        ),
        (Some(energizer), None) => format!(
            "Time with {energizer} tends to lift your energy; schedule it for days you need a boost."
        ),
        (None, Some(drainer)) => format!(
            "Time with {drainer} tends to lower your energy; protect some quiet time afterwards."
        ),
        (None, None) => {
            "No one stands out yet as clearly energizing or draining. Keep logging interactions."
                .to_string()
        }
    }
}
