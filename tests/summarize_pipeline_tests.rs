use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use minute_ninja::llm::{CompletionRequest, CompletionService, PromptCatalog, ServiceError};
use minute_ninja::summary::{ModelParams, Phase, Summarizer, SummaryRequest, SUMMARY_SEPARATOR};
use minute_ninja::MinuteNinjaError;

#[derive(Debug, Clone)]
struct RecordedCall {
    system: Option<String>,
    user: String,
    temperature: f32,
    top_p: Option<f32>,
    max_tokens: Option<u32>,
}

/// Answers map calls with "summary of <first word>" and fails any call whose
/// prompt contains one of `fail_on`.
#[derive(Default)]
struct ScriptedService {
    fail_on: Vec<&'static str>,
    fail_reduce: bool,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedService {
    fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn reduce_call(&self) -> RecordedCall {
        self.calls()
            .into_iter()
            .find(|c| c.system.is_some())
            .expect("reduce call issued")
    }
}

#[async_trait]
impl CompletionService for ScriptedService {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ServiceError> {
        self.calls.lock().expect("calls lock").push(RecordedCall {
            system: request.system.map(str::to_string),
            user: request.user.to_string(),
            temperature: request.temperature,
            top_p: request.top_p,
            max_tokens: request.max_tokens,
        });

        if request.system.is_some() {
            if self.fail_reduce {
                return Err(ServiceError::Status {
                    status: 500,
                    body: "reduce down".to_string(),
                });
            }
            return Ok(format!("MINUTES\n{}", request.user));
        }

        if self.fail_on.iter().any(|w| request.user.contains(w)) {
            return Err(ServiceError::EmptyResponse);
        }

        let first_word = request
            .user
            .rsplit('\n')
            .next()
            .and_then(|chunk| chunk.split_whitespace().next())
            .unwrap_or_default();
        Ok(format!("summary of {first_word}"))
    }
}

fn params() -> ModelParams {
    ModelParams {
        model: "test-model".to_string(),
        temperature: 0.3,
        top_p: 0.9,
        max_tokens: Some(2048),
    }
}

fn request<'a>(transcript: &'a str, params: &'a ModelParams, chunk_size: usize) -> SummaryRequest<'a> {
    SummaryRequest {
        transcript,
        language: "english",
        chunk_size,
        params,
        title: None,
        date: None,
    }
}

#[tokio::test]
async fn failed_second_chunk_yields_single_sentinel_in_order() {
    let service = ScriptedService {
        fail_on: vec!["gamma"],
        ..Default::default()
    };
    let prompts = PromptCatalog::builtin();
    let params = params();

    let minutes = Summarizer::new(&service, &prompts)
        .summarize(request("alpha beta gamma delta epsilon", &params, 2))
        .await
        .expect("chunk failures are tolerated");

    let calls = service.calls();
    assert_eq!(calls.len(), 4, "three map calls and one reduce call");

    let reduce_input = service.reduce_call().user;
    assert_eq!(reduce_input.matches("[Error summarizing chunk 2]").count(), 1);
    assert_eq!(reduce_input.matches("[Error summarizing chunk").count(), 1);

    let expected = [
        "summary of Alpha",
        "[Error summarizing chunk 2]",
        "summary of epsilon",
    ]
    .join(SUMMARY_SEPARATOR);
    assert!(reduce_input.contains(&expected), "reduce input:\n{reduce_input}");

    assert!(minutes.starts_with("MINUTES\n"));
}

#[tokio::test]
async fn map_calls_use_temperature_only_and_reduce_uses_all_params() {
    let service = ScriptedService::default();
    let prompts = PromptCatalog::builtin();
    let params = params();

    Summarizer::new(&service, &prompts)
        .summarize(request("one two three", &params, 2))
        .await
        .expect("summarize succeeds");

    let calls = service.calls();
    let (reduce, map) = calls.split_last().expect("calls recorded");

    assert_eq!(map.len(), 2);
    for call in map {
        assert!(call.system.is_none());
        assert_eq!(call.temperature, 0.3);
        assert_eq!(call.top_p, None);
        assert_eq!(call.max_tokens, None);
        assert!(call.user.starts_with(prompts.map_prefix("english")));
    }

    assert_eq!(reduce.system.as_deref(), Some(prompts.reduce_prompts("english").system.as_str()));
    assert_eq!(reduce.temperature, 0.3);
    assert_eq!(reduce.top_p, Some(0.9));
    assert_eq!(reduce.max_tokens, Some(2048));
}

#[tokio::test]
async fn output_is_reduce_content_unmodified() {
    let service = ScriptedService::default();
    let prompts = PromptCatalog::builtin();
    let params = params();

    let minutes = Summarizer::new(&service, &prompts)
        .summarize(request("hello team", &params, 10))
        .await
        .expect("summarize succeeds");

    let reduce = service.reduce_call();
    assert_eq!(minutes, format!("MINUTES\n{}", reduce.user));
}

#[tokio::test]
async fn reduce_failure_is_fatal() {
    let service = ScriptedService {
        fail_reduce: true,
        ..Default::default()
    };
    let prompts = PromptCatalog::builtin();
    let params = params();

    let err = Summarizer::new(&service, &prompts)
        .summarize(request("some words here", &params, 2))
        .await
        .expect_err("reduce failure must fail the run");

    assert!(matches!(err, MinuteNinjaError::Reduce(ServiceError::Status { status: 500, .. })));
}

#[tokio::test]
async fn empty_transcript_reduces_over_empty_summaries() {
    let service = ScriptedService::default();
    let prompts = PromptCatalog::builtin();
    let params = params();

    let minutes = Summarizer::new(&service, &prompts)
        .summarize(request("WEBVTT\n\n1\n00:00:00.000 --> 00:00:01.000\n[silence]\n", &params, 5))
        .await
        .expect("empty input must not crash");

    let calls = service.calls();
    assert_eq!(calls.len(), 1, "only the reduce call is issued");
    assert!(calls[0].user.ends_with("Partial summaries:\n"));
    assert!(minutes.starts_with("MINUTES"));
}

#[tokio::test]
async fn unknown_language_uses_english_prompts() {
    let service = ScriptedService::default();
    let prompts = PromptCatalog::builtin();
    let params = params();

    let mut req = request("hello team", &params, 10);
    req.language = "klingon";
    Summarizer::new(&service, &prompts)
        .summarize(req)
        .await
        .expect("summarize succeeds");

    let calls = service.calls();
    assert!(calls[0].user.starts_with(prompts.map_prefix("english")));
    assert_eq!(
        calls[1].system.as_deref(),
        Some(prompts.reduce_prompts("english").system.as_str())
    );
}

#[tokio::test]
async fn title_and_date_reach_the_reduce_prompt() {
    let service = ScriptedService::default();
    let prompts = PromptCatalog::builtin();
    let params = params();

    let mut req = request("hello team", &params, 10);
    req.title = Some("Weekly Sync");
    Summarizer::new(&service, &prompts)
        .summarize(req)
        .await
        .expect("summarize succeeds");

    let user = service.reduce_call().user;
    assert!(user.contains("Title: Weekly Sync"));
    assert!(user.contains("Date: To be inferred from the content"));
    assert!(!user.contains("None"));
}

#[tokio::test]
async fn concurrent_mapping_preserves_chunk_order() {
    let service = ScriptedService::default();
    let prompts = PromptCatalog::builtin();
    let params = params();

    let transcript: String = (1..=9).map(|i| format!("w{i} ")).collect();
    Summarizer::new(&service, &prompts)
        .with_concurrency(4)
        .summarize(request(&transcript, &params, 1))
        .await
        .expect("summarize succeeds");

    let expected = (1..=9)
        .map(|i| {
            if i == 1 {
                "summary of W1".to_string()
            } else {
                format!("summary of w{i}")
            }
        })
        .collect::<Vec<_>>()
        .join(SUMMARY_SEPARATOR);
    assert!(service.reduce_call().user.contains(&expected));
}

#[tokio::test]
async fn progress_reports_every_phase_in_order() {
    let service = ScriptedService::default();
    let prompts = PromptCatalog::builtin();
    let params = params();
    let phases = Arc::new(Mutex::new(Vec::<Phase>::new()));
    let sink = Arc::clone(&phases);

    Summarizer::new(&service, &prompts)
        .with_progress(Box::new(move |phase: Phase| sink.lock().expect("phases lock").push(phase)))
        .summarize(request("a b c", &params, 2))
        .await
        .expect("summarize succeeds");

    let phases = phases.lock().expect("phases lock").clone();
    assert_eq!(
        phases,
        vec![
            Phase::Normalizing,
            Phase::Chunking,
            Phase::Mapping { chunk: 1, total: 2 },
            Phase::Mapping { chunk: 2, total: 2 },
            Phase::Reducing,
            Phase::Done,
        ]
    );
}

#[test]
fn summarize_can_be_driven_without_a_runtime_macro() {
    let service = ScriptedService::default();
    let prompts = PromptCatalog::builtin();
    let params = params();

    let minutes = tokio_test::block_on(
        Summarizer::new(&service, &prompts).summarize(request("quick check", &params, 5)),
    )
    .expect("summarize succeeds");

    assert!(minutes.contains("summary of Quick"));
}
