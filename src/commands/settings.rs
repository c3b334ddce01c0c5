use anyhow::{bail, Context, Result};
use serde_json::Value;

use crate::{log_info, settings::InsightSettings, AppState};

const ENABLE_LOGS: bool = true;

pub fn get_settings(state: &AppState) -> InsightSettings {
    state.settings.insights()
}

/// Apply a partial JSON object on top of the current settings.
pub fn update_settings(state: &AppState, patch: Value) -> Result<InsightSettings> {
    let Value::Object(patch) = patch else {
        bail!("settings patch must be a JSON object");
    };

    let mut current = serde_json::to_value(state.settings.insights())
        .context("failed to serialize current settings")?;
    if let Value::Object(fields) = &mut current {
        for (key, value) in patch {
            if !fields.contains_key(&key) {
                bail!("unknown setting {key}");
            }
            fields.insert(key, value);
        }
    }

    let updated: InsightSettings =
        serde_json::from_value(current).context("invalid settings value")?;
    state.settings.update_insights(updated.clone())?;
    log_info!("Settings updated");
    Ok(updated)
}
