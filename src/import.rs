//! Bulk import of observations exported by a device or another app.
//!
//! The file is a JSON array of `{kind, timestamp, value, label?, note?}`
//! objects. Entries that do not parse or validate are skipped and counted.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::models::{Observation, ObservationInput, ObservationSource};
use crate::{log_info, log_warn};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

pub struct ParsedImport {
    pub observations: Vec<Observation>,
    pub skipped: usize,
}

pub fn parse_import(contents: &str, now: DateTime<Utc>) -> Result<ParsedImport> {
    let entries: Vec<Value> =
        serde_json::from_str(contents).context("import file must be a JSON array")?;

    let mut observations = Vec::with_capacity(entries.len());
    let mut skipped = 0;

    for (index, entry) in entries.into_iter().enumerate() {
        let parsed = serde_json::from_value::<ObservationInput>(entry)
            .map_err(anyhow::Error::from)
            .and_then(|input| {
                if input.timestamp.is_none() {
                    anyhow::bail!("missing timestamp");
                }
                Observation::from_input(input, ObservationSource::Import, now)
            });

        match parsed {
            Ok(observation) => observations.push(observation),
            Err(err) => {
                log_warn!("Skipping import entry {index}: {err:#}");
                skipped += 1;
            }
        }
    }

    log_info!(
        "Parsed import: {} observations, {} skipped",
        observations.len(),
        skipped
    );

    Ok(ParsedImport {
        observations,
        skipped,
    })
}

pub fn read_import_file(path: &Path, now: DateTime<Utc>) -> Result<ParsedImport> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read import file {}", path.display()))?;
    parse_import(&contents, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::ObservationKind;

    #[test]
    fn skips_bad_entries_and_keeps_good_ones() {
        let contents = r#"[
            {"kind": "energy", "timestamp": "2024-05-01T09:00:00Z", "value": 7},
            {"kind": "hrv", "timestamp": "2024-05-01", "value": 48.5},
            {"kind": "horoscope", "timestamp": "2024-05-01", "value": 1},
            {"kind": "meal", "timestamp": "2024-05-01T12:00", "value": 600},
            {"kind": "energy", "value": 5},
            {"kind": "sleep", "timestamp": "not a date", "value": 7}
        ]"#;

        let parsed = parse_import(contents, Utc::now()).unwrap();

        assert_eq!(parsed.observations.len(), 2);
        assert_eq!(parsed.skipped, 4);
        assert_eq!(parsed.observations[1].kind, ObservationKind::Hrv);
        assert!(parsed
            .observations
            .iter()
            .all(|o| o.source == ObservationSource::Import));
    }

    #[test]
    fn non_array_is_an_error() {
        assert!(parse_import(r#"{"kind": "energy"}"#, Utc::now()).is_err());
        assert!(parse_import("garbage", Utc::now()).is_err());
    }
}
