use serde::{Deserialize, Serialize};

use crate::analysis::{best_and_worst, mean_value, of_kind, rank_labels, LabelImpact};
use crate::db::models::{Observation, ObservationKind};
use crate::insights::{match_window, InsightConfig};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationReport {
    pub visits_logged: usize,
    pub visits_matched: usize,
    pub places: Vec<LabelImpact>,
    pub best_place: Option<String>,
    pub worst_place: Option<String>,
    pub recommendation: String,
}

pub fn analyze_locations(observations: &[Observation], config: &InsightConfig) -> LocationReport {
    let visits = of_kind(observations, ObservationKind::Location);
    let energy = of_kind(observations, ObservationKind::Energy);
    let baseline = mean_value(&energy).unwrap_or(0.0);

    let matches = match_window(&visits, &energy, config.location_window);
    let places = rank_labels(&matches.pairs, baseline, config);
    let (best_place, worst_place) = best_and_worst(&places, config);

    let recommendation = match (&best_place, &worst_place) {
        _ if visits.is_empty() => {
            "Log the places you spend time to find where you feel most energized.".to_string()
        }
        (Some(best), Some(worst)) => format!(
            "You feel most energized at {best} and least at {worst}. Save focused work for {best} when you can."
        ),
        (Some(best), None) => format!("You feel most energized at {best}."),
        _ => format!(
            "Visit places at least {} times with an energy reading to compare them.",
            config.min_bucket_samples
        ),
    };

    LocationReport {
        visits_logged: visits.len(),
        visits_matched: matches.pairs.len(),
        places,
        best_place,
        worst_place,
        recommendation,
    }
}
