//! Process-level plumbing shared by the binaries: layered configuration and
//! logging initialisation.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{AppConfig, CliArgs, LoggingConfig, Section};
