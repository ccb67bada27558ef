//! minute-ninja - Turn raw meeting transcripts into formatted meeting minutes
//!
//! The pipeline cleans a subtitle-style or plain-text transcript, splits it into
//! word-bounded chunks, summarizes every chunk with a language model ("map") and
//! consolidates the chunk summaries into one minutes document ("reduce").

pub mod cli;
pub mod config;
pub mod llm;
pub mod summary;
pub mod transcript;

use thiserror::Error;

use crate::llm::ServiceError;

/// Main error type for minute-ninja
#[derive(Error, Debug)]
pub enum MinuteNinjaError {
    /// The consolidation call failed; no partial document exists.
    #[error("Failed to consolidate chunk summaries: {0}")]
    Reduce(#[source] ServiceError),
}

pub type Result<T> = std::result::Result<T, MinuteNinjaError>;

/// Application name
pub const APP_NAME: &str = "minute-ninja";
