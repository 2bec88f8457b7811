// Brand-Compliance Video Audit - API front door
//
// Maps HTTP requests onto the audit pipeline: request validation, CORS,
// routing, config loading. All audit semantics live in the `audit` crate.

pub mod app;
pub mod config;
pub mod routes;

pub use app::{build_app, AppState};
pub use config::Config;
