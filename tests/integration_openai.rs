#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

// Integration tests that call a real OpenAI-compatible provider
// Run with: OPENAI_API_KEY=... cargo test --test integration_openai -- --ignored

use accessibility_advisor::advisor::{Classification, parse_classification, prompts};
use accessibility_advisor::config::{Config, Credentials};
use accessibility_advisor::embeddings::Embedder;
use accessibility_advisor::llm::ChatModel;
use accessibility_advisor::openai::OpenAiClient;
use std::time::Duration;
use tracing::info;

fn create_integration_test_client() -> (OpenAiClient, Config) {
    let mut config = Config::default();
    config
        .apply_env_overrides()
        .expect("environment overrides should be valid");
    config.provider.embedding_batch_size = 4;

    let credentials = Credentials::from_env().expect("OPENAI_API_KEY should be set");
    let client = OpenAiClient::new(&config, &credentials)
        .expect("Failed to create client")
        .with_timeout(Duration::from_secs(60));
    (client, config)
}

fn init_test_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init()
        .ok();
}

#[test]
#[ignore = "requires OPENAI_API_KEY"]
fn real_provider_health_check() {
    init_test_tracing();
    let (client, _) = create_integration_test_client();

    client.health_check().expect("health check should pass");
}

#[test]
#[ignore = "requires OPENAI_API_KEY"]
fn real_embeddings_are_consistent() {
    init_test_tracing();
    let (client, _) = create_integration_test_client();

    let texts: Vec<String> = [
        "The Accessible Canada Act applies to federally regulated entities.",
        "AODA applies to organizations in Ontario.",
        "WCAG 2.1 success criterion 1.4.3 covers contrast.",
        "Accessibility plans must be published every three years.",
        "Feedback processes must be established.",
    ]
    .iter()
    .map(ToString::to_string)
    .collect();

    let vectors = client.embed_batch(&texts).expect("embedding should succeed");

    assert_eq!(vectors.len(), texts.len());
    let dimension = vectors[0].len();
    assert!(dimension > 0);
    assert!(vectors.iter().all(|v| v.len() == dimension));
    info!("Embedding dimension: {}", dimension);
}

#[test]
#[ignore = "requires OPENAI_API_KEY"]
fn real_verifier_returns_a_verdict() {
    init_test_tracing();
    let (client, config) = create_integration_test_client();

    let on_topic = client
        .complete(
            &config.models.verifier_model,
            &prompts::verifier_prompt("Who needs to comply with AODA?"),
        )
        .expect("completion should succeed");
    let off_topic = client
        .complete(
            &config.models.verifier_model,
            &prompts::verifier_prompt("What's the best pizza topping?"),
        )
        .expect("completion should succeed");

    info!("Verifier replies: {:?} / {:?}", on_topic, off_topic);
    assert_eq!(parse_classification(&on_topic), Classification::Parsed(true));
    assert_eq!(parse_classification(&off_topic), Classification::Parsed(false));
}
