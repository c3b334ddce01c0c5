use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::insights::{AlignmentWindow, InsightConfig, TrendSplit, MAX_WINDOW_MINUTES};
use crate::log_warn;

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WindowMinutes {
    pub min: i64,
    pub max: i64,
}

impl WindowMinutes {
    fn to_window(self) -> AlignmentWindow {
        AlignmentWindow::minutes(self.min, self.max)
    }
}

/// User-tunable analysis thresholds. Missing fields in the settings file
/// fall back to their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct InsightSettings {
    pub analysis_days: u32,
    pub trend_tolerance: f64,
    pub trend_split: TrendSplit,
    pub strong_threshold: f64,
    pub moderate_threshold: f64,
    pub medium_confidence_min_samples: usize,
    pub high_confidence_above_samples: usize,
    pub min_bucket_samples: usize,
    pub impact_threshold: f64,
    pub meal_window: WindowMinutes,
    pub social_window: WindowMinutes,
    pub location_window: WindowMinutes,
}

impl Default for InsightSettings {
    fn default() -> Self {
        let config = InsightConfig::default();
        Self {
            analysis_days: 30,
            trend_tolerance: config.trend_tolerance,
            trend_split: config.trend_split,
            strong_threshold: config.strong_threshold,
            moderate_threshold: config.moderate_threshold,
            medium_confidence_min_samples: config.medium_confidence_min_samples,
            high_confidence_above_samples: config.high_confidence_above_samples,
            min_bucket_samples: config.min_bucket_samples,
            impact_threshold: config.impact_threshold,
            meal_window: WindowMinutes { min: 60, max: 120 },
            social_window: WindowMinutes { min: 0, max: 180 },
            location_window: WindowMinutes { min: 0, max: 120 },
        }
    }
}

impl InsightSettings {
    pub fn validate(&self) -> Result<()> {
        if self.analysis_days == 0 {
            bail!("analysisDays must be at least 1");
        }
        for (name, value) in [
            ("trendTolerance", self.trend_tolerance),
            ("strongThreshold", self.strong_threshold),
            ("moderateThreshold", self.moderate_threshold),
            ("impactThreshold", self.impact_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{name} must be between 0 and 1, got {value}");
            }
        }
        if self.moderate_threshold > self.strong_threshold {
            bail!("moderateThreshold cannot exceed strongThreshold");
        }
        if self.medium_confidence_min_samples > self.high_confidence_above_samples {
            bail!("mediumConfidenceMinSamples cannot exceed highConfidenceAboveSamples");
        }
        for (name, window) in [
            ("mealWindow", self.meal_window),
            ("socialWindow", self.social_window),
            ("locationWindow", self.location_window),
        ] {
            if window.min < 0 || window.min > window.max || window.max > MAX_WINDOW_MINUTES {
                bail!(
                    "{name} must satisfy 0 <= min <= max <= {MAX_WINDOW_MINUTES}, got {}..{}",
                    window.min,
                    window.max
                );
            }
        }
        Ok(())
    }

    pub fn to_config(&self) -> InsightConfig {
        InsightConfig {
            trend_tolerance: self.trend_tolerance,
            trend_split: self.trend_split,
            strong_threshold: self.strong_threshold,
            moderate_threshold: self.moderate_threshold,
            medium_confidence_min_samples: self.medium_confidence_min_samples,
            high_confidence_above_samples: self.high_confidence_above_samples,
            min_bucket_samples: self.min_bucket_samples,
            impact_threshold: self.impact_threshold,
            meal_window: self.meal_window.to_window(),
            social_window: self.social_window.to_window(),
            location_window: self.location_window.to_window(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct UserSettings {
    insights: InsightSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            match serde_json::from_str::<UserSettings>(&contents) {
                Ok(data) => match data.insights.validate() {
                    Ok(()) => data,
                    Err(err) => {
                        log_warn!(
                            "Ignoring invalid settings at {}: {err}; using defaults",
                            path.display()
                        );
                        UserSettings::default()
                    }
                },
                Err(err) => {
                    log_warn!(
                        "Ignoring malformed settings at {}: {err}; using defaults",
                        path.display()
                    );
                    UserSettings::default()
                }
            }
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn insights(&self) -> InsightSettings {
        self.read().insights.clone()
    }

    pub fn update_insights(&self, settings: InsightSettings) -> Result<()> {
        settings.validate()?;
        let mut guard = self.write();
        let previous = std::mem::replace(&mut guard.insights, settings);
        if let Err(err) = self.persist(&guard) {
            guard.insights = previous;
            return Err(err);
        }
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, UserSettings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, UserSettings> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
