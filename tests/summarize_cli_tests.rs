mod common;

use common::TestEnv;
use mockito::Matcher;

const TRANSCRIPT: &str = "WEBVTT\n\n1\n00:00:01.000 --> 00:00:04.000\nAlice: we decided to ship on friday\n\n2\n00:00:04.000 --> 00:00:06.000\nBob: I will update the changelog\n";

fn completion_body(content: &str) -> String {
    serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
    .to_string()
}

#[test]
fn summarize_subcommand_is_available() {
    let output = TestEnv::new().run(&["summarize", "--help"]);

    assert!(
        output.status.success(),
        "summarize --help should succeed\nstdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn summarize_writes_minutes_next_to_transcript() {
    let mut server = mockito::Server::new();
    let map = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::Regex("Transcript excerpt".to_string()))
        .with_status(200)
        .with_body(completion_body("Alice and Bob agreed to ship on Friday."))
        .expect(1)
        .create();
    let reduce = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("Partial summaries".to_string()),
            Matcher::Regex("Title: Weekly Sync".to_string()),
            Matcher::Regex("Date: To be inferred from the content".to_string()),
            Matcher::Regex("Alice and Bob agreed to ship on Friday.".to_string()),
            Matcher::PartialJson(serde_json::json!({"top_p": 0.5, "max_tokens": 800})),
        ]))
        .with_status(200)
        .with_body(completion_body("# Weekly Sync\n\n## Decisions\n- Ship on Friday"))
        .expect(1)
        .create();

    let env = TestEnv::new();
    let file = env.write_file("weekly sync.vtt", TRANSCRIPT);
    let output = env.run(&[
        "summarize",
        file.to_str().expect("utf-8 path"),
        "--model",
        "test-model",
        "--api-base",
        &server.url(),
        "--api-key",
        "sk-test",
        "--title",
        "Weekly Sync",
        "--top-p",
        "0.5",
        "--max-tokens",
        "800",
    ]);

    assert!(
        output.status.success(),
        "summarize should succeed\nstdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );

    let minutes_path = env.work_path().join("weekly_sync_summary_english.txt");
    let minutes = std::fs::read_to_string(&minutes_path).expect("minutes file written");
    assert_eq!(minutes, "# Weekly Sync\n\n## Decisions\n- Ship on Friday");
    assert!(String::from_utf8_lossy(&output.stdout).contains("Minutes saved to:"));

    map.assert();
    reduce.assert();
}

#[test]
fn failed_chunk_becomes_inline_marker() {
    let mut server = mockito::Server::new();
    let map = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::Regex("Transcript excerpt".to_string()))
        .with_status(503)
        .with_body("overloaded")
        .expect(1)
        .create();
    let reduce = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::Regex(r"\[Error summarizing chunk 1\]".to_string()))
        .with_status(200)
        .with_body(completion_body("# Minutes\n\n[Error summarizing chunk 1]"))
        .expect(1)
        .create();

    let env = TestEnv::new();
    let file = env.write_file("retro.txt", TRANSCRIPT);
    let output_path = env.work_path().join("out").join("retro.md");
    let output = env.run(&[
        "summarize",
        file.to_str().expect("utf-8 path"),
        "--model",
        "test-model",
        "--api-base",
        &server.url(),
        "--output",
        output_path.to_str().expect("utf-8 path"),
    ]);

    assert!(
        output.status.success(),
        "chunk failures must not abort the run\nstderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let minutes = std::fs::read_to_string(&output_path).expect("minutes file written");
    assert!(minutes.contains("[Error summarizing chunk 1]"));

    map.assert();
    reduce.assert();
}

#[test]
fn reduce_failure_fails_without_output() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::Regex("Transcript excerpt".to_string()))
        .with_status(200)
        .with_body(completion_body("chunk summary"))
        .create();
    server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::Regex("Partial summaries".to_string()))
        .with_status(500)
        .with_body("boom")
        .create();

    let env = TestEnv::new();
    let file = env.write_file("planning.txt", TRANSCRIPT);
    let output = env.run(&[
        "summarize",
        file.to_str().expect("utf-8 path"),
        "--model",
        "test-model",
        "--api-base",
        &server.url(),
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Failed to consolidate chunk summaries"),
        "expected reduce failure, got:\n{}",
        stderr
    );
    assert!(!env
        .work_path()
        .join("planning_summary_english.txt")
        .exists());
}
