use std::path::Path;

use anyhow::{bail, Result};
use chrono::Utc;

use crate::{
    db::models::{
        KindCount, Observation, ObservationInput, ObservationKind, ObservationSource, TimeRange,
    },
    import::{read_import_file, ImportSummary},
    log_info, AppState,
};

const ENABLE_LOGS: bool = true;

pub async fn log_observation(
    state: &AppState,
    input: ObservationInput,
    source: ObservationSource,
) -> Result<Observation> {
    let observation = Observation::from_input(input, source, Utc::now())?;
    state.db.insert_observation(&observation).await?;
    log_info!(
        "Logged {} observation {} at {}",
        observation.kind.as_str(),
        observation.id,
        observation.timestamp
    );
    Ok(observation)
}

/// Observations of `kinds` (all kinds when empty), optionally limited to the
/// last `days` days, oldest first.
pub async fn list_observations(
    state: &AppState,
    kinds: &[ObservationKind],
    days: Option<u32>,
) -> Result<Vec<Observation>> {
    let range = days.map(|days| TimeRange::last_days(Utc::now(), days));
    state.db.get_observations(kinds, range).await
}

pub async fn delete_observation(state: &AppState, observation_id: &str) -> Result<()> {
    if !state.db.delete_observation(observation_id).await? {
        bail!("Observation {observation_id} not found");
    }
    log_info!("Deleted observation {observation_id}");
    Ok(())
}

pub async fn import_observations(state: &AppState, path: &Path) -> Result<ImportSummary> {
    let parsed = read_import_file(path, Utc::now())?;
    let imported = state.db.insert_observations(parsed.observations).await?;
    Ok(ImportSummary {
        imported,
        skipped: parsed.skipped,
    })
}

pub async fn count_observations(state: &AppState) -> Result<Vec<KindCount>> {
    state.db.count_observations_by_kind().await
}
