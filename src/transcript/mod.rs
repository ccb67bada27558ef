//! Transcript module for minute-ninja
//!
//! Cleans raw subtitle or plain-text transcripts and splits them into chunks
//! sized for a language model.

mod chunker;
mod essentials;
mod normalize;

pub use chunker::{chunk_words, estimate_tokens, CHARS_PER_TOKEN};
pub use essentials::{extract_essentials, Essentials};
pub use normalize::{consolidate_fragments, normalize, prepare};
