//! Application operations over `AppState`: the surface the CLI (or any other
//! front end) calls into.

pub mod observations;
pub mod reports;
pub mod settings;
