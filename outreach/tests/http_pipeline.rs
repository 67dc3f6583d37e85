//! Pipeline runs against a mock provider over HTTP

mod helpers;

use std::time::Duration;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fixtures::*;
use helpers::*;
use outreach::services::RealModelClient;
use outreach::{UsageTracker, ValidationPolicy};
use shared::{LedgerExport, ProviderId, SequenceSource};

async fn anthropic_server(reply_text: String) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{ "type": "text", "text": reply_text }],
            "usage": { "input_tokens": 2000, "output_tokens": 1000 }
        })))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_generated_sequence_over_http_and_ledger_export() {
    let fenced = format!("Voici la séquence :\n```json\n{}\n```", valid_sequence_json());
    let server = anthropic_server(fenced).await;

    let client = RealModelClient::new(ProviderId::Anthropic, "test-model", "test-key", Duration::from_secs(5))
        .with_base_url(server.uri());
    let (pipeline, tracker) = build_pipeline(client, ValidationPolicy::Strict);

    let outcome = pipeline.run(&marie_at_acme(), &data_engineer_context()).await;
    assert_eq!(outcome.source, SequenceSource::Generated);

    let dir = tempfile::tempdir().unwrap();
    let ledger_path = dir.path().join("ledger.json");
    tracker.export(&ledger_path).await.unwrap();

    let export: LedgerExport = serde_json::from_str(&std::fs::read_to_string(&ledger_path).unwrap()).unwrap();
    assert_eq!(export.summary.total_calls, 1);
    assert_eq!(export.summary.total_tokens, 3000);
    assert_eq!(export.summary.total_cost_usd, 0.021);
    assert_eq!(export.calls[0].cost_usd, 0.021);
}

#[tokio::test]
async fn test_rate_limited_provider_degrades_to_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .expect(1)
        .mount(&server)
        .await;

    let client = RealModelClient::new(ProviderId::OpenAI, "test-model", "test-key", Duration::from_secs(5))
        .with_base_url(server.uri());
    let (pipeline, tracker) = build_pipeline(client, ValidationPolicy::Strict);

    let outcome = pipeline.run(&marie_at_acme(), &data_engineer_context()).await;

    assert_eq!(outcome.source, SequenceSource::Fallback);
    assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);
    assert!(tracker.records().await.is_empty());
}
