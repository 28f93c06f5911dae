//! Integration tests against a live OpenAI-compatible endpoint.
//!
//! These tests make real API calls.
//! Run with: CHAOS_LLM_API_BASE=http://localhost:4000 CHAOS_LLM_API_KEY=your_key \
//!     cargo test --test llm_integration -- --ignored

use std::sync::Arc;
use std::time::Duration;

use chaos_forge::catalog::Domain;
use chaos_forge::difficulty::DifficultyLevel;
use chaos_forge::enhance::RemoteEnhancer;
use chaos_forge::generator::{ChaosGenerator, EnhancementOptions};
use chaos_forge::llm::{GenerationRequest, LiteLlmClient, LlmProvider, Message};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn create_test_client() -> LiteLlmClient {
    LiteLlmClient::from_env()
        .expect("CHAOS_LLM_API_BASE environment variable must be set for integration tests")
}

#[tokio::test]
#[ignore] // Run with: cargo test --test llm_integration -- --ignored
async fn test_simple_generation() {
    let client = create_test_client();

    let request = GenerationRequest::new(
        "",
        vec![
            Message::system("You are a helpful assistant. Reply concisely."),
            Message::user("What is 2 + 2? Reply with just the number."),
        ],
    )
    .with_max_tokens(10)
    .with_temperature(0.0);

    let response = client.generate(request).await;
    assert!(response.is_ok(), "Generation failed: {:?}", response.err());

    let response = response.expect("Should have response");
    let content = response.first_content().expect("Should have content");
    assert!(
        content.contains('4'),
        "Response should contain '4', got: {}",
        content
    );
}

#[tokio::test]
#[ignore]
async fn test_multi_turn_conversation() {
    let client = create_test_client();

    let request = GenerationRequest::new(
        "",
        vec![
            Message::system("You are a math tutor. Be concise."),
            Message::user("Remember the number 42."),
            Message::assistant("I'll remember 42."),
            Message::user("What number did I ask you to remember?"),
        ],
    )
    .with_max_tokens(20)
    .with_temperature(0.0);

    let response = client
        .generate(request)
        .await
        .expect("Generation should succeed");
    let content = response.first_content().expect("Should have content");

    assert!(
        content.contains("42"),
        "Response should mention 42, got: {}",
        content
    );
}

#[tokio::test]
#[ignore]
async fn test_remote_enhancement_of_generated_scenario() {
    let client = Arc::new(create_test_client());
    let enhancer = RemoteEnhancer::new(client, "").expect("enhancer should build");

    let generator = ChaosGenerator::standard().expect("standard generator");
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let scenario = generator
        .generate_progressive_scenario(Domain::Business, DifficultyLevel::Chaotic, &mut rng)
        .expect("generation should succeed");

    let options = EnhancementOptions {
        timeout: Duration::from_secs(60),
        include_voices: true,
    };
    let enhanced = generator
        .enhance_scenario(scenario.clone(), &enhancer, &options)
        .await
        .expect("enhanced scenario should stay valid");

    assert_eq!(enhanced.id, scenario.id);
    assert_eq!(enhanced.confidence_trajectory, scenario.confidence_trajectory);
    assert!(!enhanced.scenario_text.is_empty());
}
