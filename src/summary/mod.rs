//! Summary module for minute-ninja
//!
//! Turns a transcript into meeting minutes with a map/reduce pass over a
//! completion service.

mod pipeline;

pub use pipeline::{
    consolidate, ChunkSummary, ModelParams, Phase, ProgressCallback, Summarizer, SummaryRequest,
    SUMMARY_SEPARATOR,
};
