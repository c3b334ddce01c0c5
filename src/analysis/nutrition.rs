use serde::{Deserialize, Serialize};

use crate::analysis::{
    best_and_worst, daily_totals, mean_value, of_kind, rank_labels, LabelImpact,
};
use crate::db::models::{Observation, ObservationKind};
use crate::insights::{
    analyze_pair, match_window, trend_of, AlignedSeries, Insight, InsightConfig,
    TrendClassification,
};

/// How meals relate to the energy readings logged in the hours after them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NutritionReport {
    pub meals_logged: usize,
    /// Meals with at least one energy reading inside the post-meal window
    pub meals_matched: usize,
    pub foods: Vec<LabelImpact>,
    pub best_food: Option<String>,
    pub worst_food: Option<String>,
    pub calories_vs_energy: Insight,
    pub daily_calories_trend: TrendClassification,
    pub recommendation: String,
}

pub fn analyze_nutrition(observations: &[Observation], config: &InsightConfig) -> NutritionReport {
    let mut meals = of_kind(observations, ObservationKind::Meal);
    meals.sort_by_key(|meal| meal.timestamp);
    let energy = of_kind(observations, ObservationKind::Energy);
    let baseline = mean_value(&energy).unwrap_or(0.0);

    let matches = match_window(&meals, &energy, config.meal_window);
    let foods = rank_labels(&matches.pairs, baseline, config);
    let (best_food, worst_food) = best_and_worst(&foods, config);

    let aligned = AlignedSeries {
        left: matches.pairs.iter().map(|(meal, _)| meal.value).collect(),
        right: matches.pairs.iter().map(|(_, energy)| *energy).collect(),
        dropped_left: meals.len() - matches.pairs.len(),
        dropped_right: matches.unclaimed_responses,
    };
    let calories_vs_energy = analyze_pair("meal calories", "post-meal energy", &aligned, config);

    let daily_calories_trend = trend_of(&daily_totals(&meals), config);

    let recommendation = recommend(
        &calories_vs_energy,
        best_food.as_deref(),
        worst_food.as_deref(),
        meals.len(),
        config,
    );

    NutritionReport {
        meals_logged: meals.len(),
        meals_matched: matches.pairs.len(),
        foods,
        best_food,
        worst_food,
        calories_vs_energy,
        daily_calories_trend,
        recommendation,
    }
}

fn recommend(
    insight: &Insight,
    best_food: Option<&str>,
    worst_food: Option<&str>,
    meals_logged: usize,
    config: &InsightConfig,
) -> String {
    if meals_logged == 0 {
        return "Log your meals and an energy reading an hour or two afterwards to see how food affects you.".to_string();
    }

    let coefficient = insight.correlation.coefficient;
    let calorie_advice = if coefficient < -config.moderate_threshold {
        "Heavier meals tend to leave you with less energy; try smaller portions spread through the day."
    } else if coefficient > config.moderate_threshold {
        "More substantial meals seem to keep your energy up; avoid skipping meals."
    } else {
        "Meal size has little effect on your energy so far."
    };

    match (best_food, worst_food) {
        (Some(best), Some(worst)) => format!(
            "{calorie_advice} Your energy is highest after {best} and lowest after {worst}."
        ),
        (Some(best), None) => format!("{calorie_advice} Your energy is highest after {best}."),
        _ => format!(
            "{calorie_advice} Log foods at least {} times each to compare them.",
            config.min_bucket_samples
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::*;
    use crate::analysis::ImpactLevel;

    #[test]
    fn empty_log_gives_empty_report() {
        let report = analyze_nutrition(&[], &InsightConfig::default());

        assert_eq!(report.meals_logged, 0);
        assert!(report.foods.is_empty());
        assert_eq!(report.best_food, None);
        assert_eq!(report.calories_vs_energy.correlation.coefficient, 0.0);
        assert_eq!(report.daily_calories_trend, TrendClassification::Stable);
        assert!(!report.recommendation.is_empty());
    }

    #[test]
    fn heavy_meals_followed_by_low_energy() {
        let mut observations = Vec::new();
        for day in 1..=6 {
            // Light breakfast, good energy 90 minutes later.
            observations.push(labeled(ObservationKind::Meal, at(day, 8, 0), 350.0, "oatmeal"));
            observations.push(obs(ObservationKind::Energy, at(day, 9, 30), 8.0));
            // Heavy lunch, slump 90 minutes later.
            observations.push(labeled(ObservationKind::Meal, at(day, 12, 0), 1200.0, "burger"));
            observations.push(obs(ObservationKind::Energy, at(day, 13, 30), 4.0));
            // Reading long after dinner is outside the window.
            observations.push(labeled(ObservationKind::Meal, at(day, 19, 0), 700.0, "pasta"));
            observations.push(obs(ObservationKind::Energy, at(day, 23, 0), 5.0));
        }

        let report = analyze_nutrition(&observations, &InsightConfig::default());

        assert_eq!(report.meals_logged, 18);
        assert_eq!(report.meals_matched, 12);
        assert_eq!(report.calories_vs_energy.dropped_points, 6 + 6);
        assert!(report.calories_vs_energy.correlation.coefficient < -0.99);
        assert_eq!(report.best_food.as_deref(), Some("oatmeal"));
        assert_eq!(report.worst_food.as_deref(), Some("burger"));

        let burger = report.foods.iter().find(|f| f.label == "burger").unwrap();
        assert_eq!(burger.impact, ImpactLevel::Draining);
        assert!(report.recommendation.contains("smaller portions"));
        assert!(report.recommendation.contains("after oatmeal"));
    }

    #[test]
    fn post_meal_trend_ignores_input_order() {
        let mut observations = Vec::new();
        for day in (1..=6).rev() {
            let energy = f64::from(day) + 2.0;
            observations.push(obs(ObservationKind::Energy, at(day, 9, 30), energy));
            observations.push(labeled(ObservationKind::Meal, at(day, 8, 0), 400.0, "eggs"));
        }

        let report = analyze_nutrition(&observations, &InsightConfig::default());

        assert_eq!(report.meals_matched, 6);
        assert_eq!(report.calories_vs_energy.trend, TrendClassification::Improving);
    }
}
