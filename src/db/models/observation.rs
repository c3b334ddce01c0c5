//! Observation data models.
//!
//! An observation is one logged measurement: an energy reading, a night of
//! sleep, a meal, time spent with someone. Observations are never edited,
//! only inserted and deleted.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::helpers::parse_timestamp;
use crate::insights::Measured;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ObservationKind {
    /// Energy score, the target most insights are computed against
    Energy,
    Mood,
    /// Hours slept
    Sleep,
    Stress,
    /// Heart-rate variability, ms
    Hrv,
    RestingHeartRate,
    Steps,
    /// Label is the food, value the calories
    Meal,
    /// Label is the person, value the minutes spent together
    Social,
    /// Label is the place, value the minutes spent there
    Location,
    /// Minutes meditated
    Meditation,
}

impl ObservationKind {
    pub const ALL: [ObservationKind; 11] = [
        ObservationKind::Energy,
        ObservationKind::Mood,
        ObservationKind::Sleep,
        ObservationKind::Stress,
        ObservationKind::Hrv,
        ObservationKind::RestingHeartRate,
        ObservationKind::Steps,
        ObservationKind::Meal,
        ObservationKind::Social,
        ObservationKind::Location,
        ObservationKind::Meditation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObservationKind::Energy => "energy",
            ObservationKind::Mood => "mood",
            ObservationKind::Sleep => "sleep",
            ObservationKind::Stress => "stress",
            ObservationKind::Hrv => "hrv",
            ObservationKind::RestingHeartRate => "resting_heart_rate",
            ObservationKind::Steps => "steps",
            ObservationKind::Meal => "meal",
            ObservationKind::Social => "social",
            ObservationKind::Location => "location",
            ObservationKind::Meditation => "meditation",
        }
    }

    /// Kinds whose observations are meaningless without a label.
    pub fn requires_label(&self) -> bool {
        matches!(
            self,
            ObservationKind::Meal | ObservationKind::Social | ObservationKind::Location
        )
    }

    /// Human-readable name used in insight text.
    pub fn display_name(&self) -> &'static str {
        match self {
            ObservationKind::Energy => "energy",
            ObservationKind::Mood => "mood",
            ObservationKind::Sleep => "sleep",
            ObservationKind::Stress => "stress",
            ObservationKind::Hrv => "HRV",
            ObservationKind::RestingHeartRate => "resting heart rate",
            ObservationKind::Steps => "step count",
            ObservationKind::Meal => "meal calories",
            ObservationKind::Social => "social time",
            ObservationKind::Location => "time at places",
            ObservationKind::Meditation => "meditation",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ObservationSource {
    #[default]
    Manual,
    Device,
    Import,
}

impl ObservationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObservationSource::Manual => "manual",
            ObservationSource::Device => "device",
            ObservationSource::Import => "import",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub id: String,
    pub kind: ObservationKind,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub label: Option<String>,
    pub note: Option<String>,
    pub source: ObservationSource,
    pub created_at: DateTime<Utc>,
}

impl Observation {
    /// Validate input and stamp it with a fresh id.
    pub fn from_input(
        input: ObservationInput,
        source: ObservationSource,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if !input.value.is_finite() {
            bail!("value must be a finite number");
        }

        let label = input
            .label
            .map(|label| label.trim().to_string())
            .filter(|label| !label.is_empty());
        if input.kind.requires_label() && label.is_none() {
            bail!("{} observations need a label", input.kind.as_str());
        }

        let timestamp = match input.timestamp.as_deref() {
            Some(raw) => parse_timestamp(raw)?,
            None => now,
        };

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            kind: input.kind,
            timestamp,
            value: input.value,
            label,
            note: input.note.filter(|note| !note.trim().is_empty()),
            source,
            created_at: now,
        })
    }
}

impl Measured for Observation {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn value(&self) -> f64 {
        self.value
    }
}

/// Input data for logging a new observation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationInput {
    pub kind: ObservationKind,
    /// ISO-8601 date or date-time; defaults to now
    pub timestamp: Option<String>,
    pub value: f64,
    pub label: Option<String>,
    pub note: Option<String>,
}

/// Inclusive time range for queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// The last `days` days up to `now`.
    pub fn last_days(now: DateTime<Utc>, days: u32) -> Self {
        Self {
            start: now - chrono::Duration::days(i64::from(days)),
            end: now,
        }
    }
}

/// Per-kind row count
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KindCount {
    pub kind: ObservationKind,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn input(kind: ObservationKind, value: f64, label: Option<&str>) -> ObservationInput {
        ObservationInput {
            kind,
            timestamp: Some("2024-05-06T12:30".into()),
            value,
            label: label.map(str::to_string),
            note: None,
        }
    }

    #[test]
    fn builds_observation_from_input() {
        let now = Utc.with_ymd_and_hms(2024, 5, 7, 0, 0, 0).unwrap();
        let observation = Observation::from_input(
            input(ObservationKind::Meal, 520.0, Some("  salad ")),
            ObservationSource::Manual,
            now,
        )
        .unwrap();

        assert_eq!(observation.label.as_deref(), Some("salad"));
        assert_eq!(
            observation.timestamp,
            Utc.with_ymd_and_hms(2024, 5, 6, 12, 30, 0).unwrap()
        );
        assert_eq!(observation.created_at, now);
        assert!(Uuid::parse_str(&observation.id).is_ok());
    }

    #[test]
    fn missing_timestamp_defaults_to_now() {
        let now = Utc.with_ymd_and_hms(2024, 5, 7, 9, 0, 0).unwrap();
        let mut energy = input(ObservationKind::Energy, 7.0, None);
        energy.timestamp = None;

        let observation = Observation::from_input(energy, ObservationSource::Device, now).unwrap();
        assert_eq!(observation.timestamp, now);
        assert_eq!(observation.source, ObservationSource::Device);
    }

    #[test]
    fn rejects_invalid_input() {
        let now = Utc::now();
        assert!(Observation::from_input(
            input(ObservationKind::Social, 30.0, Some("   ")),
            ObservationSource::Manual,
            now
        )
        .is_err());
        assert!(Observation::from_input(
            input(ObservationKind::Energy, f64::NAN, None),
            ObservationSource::Manual,
            now
        )
        .is_err());
    }
}
