//! Map/reduce summarization orchestration

use futures::stream::{self, StreamExt};
use std::fmt;

use crate::llm::{CompletionRequest, CompletionService, PromptCatalog};
use crate::transcript::{chunk_words, estimate_tokens, prepare};
use crate::{MinuteNinjaError, Result};

/// Separator between chunk summaries in the consolidation input.
pub const SUMMARY_SEPARATOR: &str = "\n\n---\n\n";

/// Progress callback type
pub type ProgressCallback = Box<dyn Fn(Phase) + Send + Sync>;

/// Where a summarization run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Normalizing,
    Chunking,
    /// Summarizing chunk `chunk` (1-based) of `total`
    Mapping { chunk: usize, total: usize },
    Reducing,
    Done,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Normalizing => write!(f, "cleaning transcript"),
            Phase::Chunking => write!(f, "splitting into chunks"),
            Phase::Mapping { chunk, total } => write!(f, "summarizing chunk {chunk}/{total}"),
            Phase::Reducing => write!(f, "consolidating minutes"),
            Phase::Done => write!(f, "done"),
            Phase::Failed => write!(f, "failed"),
        }
    }
}

/// Model parameters for a run. `top_p` and `max_tokens` only apply to the
/// consolidation call.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: Option<u32>,
}

/// Summary generation request payload.
#[derive(Debug, Clone, Copy)]
pub struct SummaryRequest<'a> {
    /// Raw transcript, subtitle-formatted or plain
    pub transcript: &'a str,
    pub language: &'a str,
    /// Words per chunk
    pub chunk_size: usize,
    pub params: &'a ModelParams,
    pub title: Option<&'a str>,
    pub date: Option<&'a str>,
}

/// Outcome of summarizing one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkSummary {
    Summary(String),
    /// The completion call failed; `index` is 1-based.
    Failed { index: usize },
}

impl fmt::Display for ChunkSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkSummary::Summary(text) => f.write_str(text),
            ChunkSummary::Failed { index } => write!(f, "[Error summarizing chunk {index}]"),
        }
    }
}

/// Join chunk summaries in order, failures rendered as inline markers.
pub fn consolidate(summaries: &[ChunkSummary]) -> String {
    summaries
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(SUMMARY_SEPARATOR)
}

/// Drives the map phase (one call per chunk) and the reduce phase (one call
/// over all chunk summaries).
pub struct Summarizer<'a> {
    service: &'a dyn CompletionService,
    prompts: &'a PromptCatalog,
    concurrency: usize,
    progress: Option<ProgressCallback>,
}

impl<'a> Summarizer<'a> {
    pub fn new(service: &'a dyn CompletionService, prompts: &'a PromptCatalog) -> Self {
        Self {
            service,
            prompts,
            concurrency: 1,
            progress: None,
        }
    }

    /// Allow up to `concurrency` chunk calls in flight. Summaries still reach
    /// the consolidation call in chunk order.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Produce the minutes document for a transcript.
    ///
    /// Chunk failures are replaced by `[Error summarizing chunk N]` markers;
    /// only a failed consolidation call fails the run.
    pub async fn summarize(&self, request: SummaryRequest<'_>) -> Result<String> {
        self.notify(Phase::Normalizing);
        let text = prepare(request.transcript);

        self.notify(Phase::Chunking);
        let chunks = chunk_words(&text, request.chunk_size);
        tracing::info!(
            "Split transcript into {} chunk(s) of up to {} words",
            chunks.len(),
            request.chunk_size
        );

        let summaries = self.map_chunks(&chunks, &request).await;
        let failed = summaries
            .iter()
            .filter(|s| matches!(s, ChunkSummary::Failed { .. }))
            .count();
        if failed > 0 {
            tracing::warn!("{} of {} chunk summaries failed", failed, summaries.len());
        }

        self.reduce(&consolidate(&summaries), &request).await
    }

    /// Summarize every chunk, in chunk order.
    pub async fn map_chunks(
        &self,
        chunks: &[String],
        request: &SummaryRequest<'_>,
    ) -> Vec<ChunkSummary> {
        let total = chunks.len();

        stream::iter(chunks.iter().enumerate())
            .map(|(i, chunk)| self.map_chunk(i + 1, total, chunk, request))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    async fn map_chunk(
        &self,
        index: usize,
        total: usize,
        chunk: &str,
        request: &SummaryRequest<'_>,
    ) -> ChunkSummary {
        self.notify(Phase::Mapping {
            chunk: index,
            total,
        });
        tracing::debug!(
            "Chunk {}/{}: ~{} tokens",
            index,
            total,
            estimate_tokens(chunk)
        );

        let prompt = self.prompts.map_prompt(request.language, chunk);
        let result = self
            .service
            .complete(CompletionRequest {
                system: None,
                user: &prompt,
                model: &request.params.model,
                temperature: request.params.temperature,
                top_p: None,
                max_tokens: None,
            })
            .await;

        match result {
            Ok(summary) => ChunkSummary::Summary(summary),
            Err(e) => {
                tracing::warn!("Failed to summarize chunk {}/{}: {}", index, total, e);
                ChunkSummary::Failed { index }
            }
        }
    }

    async fn reduce(&self, summaries: &str, request: &SummaryRequest<'_>) -> Result<String> {
        self.notify(Phase::Reducing);

        let messages =
            self.prompts
                .reduce_messages(request.language, request.title, request.date, summaries);

        let result = self
            .service
            .complete(CompletionRequest {
                system: Some(messages.system.as_str()),
                user: &messages.user,
                model: &request.params.model,
                temperature: request.params.temperature,
                top_p: Some(request.params.top_p),
                max_tokens: request.params.max_tokens,
            })
            .await;

        match result {
            Ok(minutes) => {
                self.notify(Phase::Done);
                Ok(minutes)
            }
            Err(e) => {
                self.notify(Phase::Failed);
                Err(MinuteNinjaError::Reduce(e))
            }
        }
    }

    fn notify(&self, phase: Phase) {
        tracing::debug!("Phase: {}", phase);
        if let Some(progress) = &self.progress {
            progress(phase);
        }
    }
}
