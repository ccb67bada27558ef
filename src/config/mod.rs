//! Configuration module for minute-ninja
//!
//! Handles loading settings from TOML files and environment variables.

mod settings;

pub use settings::{GeneralSettings, LlmSettings, OutputSettings, Settings, SummarySettings};
