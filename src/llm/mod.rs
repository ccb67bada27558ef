//! LLM module for minute-ninja
//!
//! Completion providers (OpenAI-compatible and Gemini) behind the
//! [`CompletionService`] trait, plus the language-specific prompt catalog.

mod client;
mod gemini;
mod openai;
mod prompts;

pub use client::{build_provider, CompletionRequest, CompletionService, ServiceError};
pub use gemini::GeminiClient;
pub use openai::{OpenAiClient, DEFAULT_OPENAI_API_BASE};
pub use prompts::{
    LanguagePrompts, PromptCatalog, ReduceMessages, ReducePrompts, FALLBACK_LANGUAGE,
};
