//! Command-line front end. Every subcommand maps onto one function in
//! [`crate::commands`] and prints its result as pretty JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::{
    commands::{observations, reports, settings},
    db::{
        helpers::{parse_kind, parse_source},
        models::{ObservationInput, ObservationKind, ObservationSource},
    },
    AppState,
};

#[derive(Debug, Parser)]
#[command(
    name = "tidewell",
    version,
    about = "Log wellness observations and see what drives your energy"
)]
pub struct Cli {
    /// Directory holding the database and settings file
    #[arg(long, global = true, env = "TIDEWELL_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|dir| dir.join("tidewell"))
                .unwrap_or_else(|| PathBuf::from(".tidewell"))
        })
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log a single observation
    Log {
        #[arg(long, value_parser = parse_kind)]
        kind: ObservationKind,
        #[arg(long, allow_negative_numbers = true)]
        value: f64,
        /// ISO-8601 date or date-time; defaults to now
        #[arg(long)]
        at: Option<String>,
        /// Food, person or place for meal/social/location
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        note: Option<String>,
        #[arg(long, value_parser = parse_source, default_value = "manual")]
        source: ObservationSource,
    },
    /// List stored observations, oldest first
    List {
        #[arg(long = "kind", value_parser = parse_kind)]
        kinds: Vec<ObservationKind>,
        #[arg(long)]
        days: Option<u32>,
    },
    /// Delete an observation by id
    Delete { id: String },
    /// Import observations from a JSON array file
    Import { path: PathBuf },
    /// Print an insight report
    Report {
        #[arg(value_enum)]
        report: ReportKind,
        /// Look-back window; defaults to the analysisDays setting
        #[arg(long)]
        days: Option<u32>,
    },
    /// Show or change insight settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Observation counts per kind
    Stats,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReportKind {
    Nutrition,
    Social,
    Biometrics,
    Location,
    Timing,
    Overview,
}

#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    Show,
    /// Merge a JSON object of camelCase fields into the current settings
    Set {
        #[arg(long)]
        json: String,
    },
}

pub async fn dispatch(state: &AppState, command: Command) -> Result<()> {
    match command {
        Command::Log {
            kind,
            value,
            at,
            label,
            note,
            source,
        } => {
            let input = ObservationInput {
                kind,
                timestamp: at,
                value,
                label,
                note,
            };
            print_json(&observations::log_observation(state, input, source).await?)
        }
        Command::List { kinds, days } => {
            print_json(&observations::list_observations(state, &kinds, days).await?)
        }
        Command::Delete { id } => {
            observations::delete_observation(state, &id).await?;
            print_json(&serde_json::json!({ "deleted": id }))
        }
        Command::Import { path } => {
            print_json(&observations::import_observations(state, &path).await?)
        }
        Command::Report { report, days } => match report {
            ReportKind::Nutrition => print_json(&reports::get_nutrition_report(state, days).await?),
            ReportKind::Social => print_json(&reports::get_social_report(state, days).await?),
            ReportKind::Biometrics => {
                print_json(&reports::get_biometrics_report(state, days).await?)
            }
            ReportKind::Location => print_json(&reports::get_location_report(state, days).await?),
            ReportKind::Timing => print_json(&reports::get_timing_report(state, days).await?),
            ReportKind::Overview => print_json(&reports::get_overview(state, days).await?),
        },
        Command::Settings { action } => match action {
            SettingsAction::Show => print_json(&settings::get_settings(state)),
            SettingsAction::Set { json } => {
                let patch = serde_json::from_str(&json).context("settings must be valid JSON")?;
                print_json(&settings::update_settings(state, patch)?)
            }
        },
        Command::Stats => print_json(&observations::count_observations(state).await?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}
