//! Enhancement pass behavior with stub providers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chaos_forge::catalog::Domain;
use chaos_forge::difficulty::DifficultyLevel;
use chaos_forge::enhance::{NullEnhancer, RemoteEnhancer};
use chaos_forge::generator::{ChaosGenerator, EnhancementOptions, Scenario};
use chaos_forge::llm::{
    Choice, ChoiceMessage, GenerationRequest, GenerationResponse, LlmProvider, Usage,
};
use chaos_forge::LlmError;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

enum Behavior {
    Reply(&'static str),
    Fail,
    Hang,
}

struct StubProvider {
    behavior: Behavior,
    calls: AtomicUsize,
}

impl StubProvider {
    fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl LlmProvider for StubProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Reply(text) => Ok(GenerationResponse {
                id: "stub".to_string(),
                model: request.model,
                choices: vec![Choice {
                    index: 0,
                    message: ChoiceMessage {
                        role: "assistant".to_string(),
                        content: Some(text.to_string()),
                    },
                    finish_reason: Some("stop".to_string()),
                }],
                usage: Usage::default(),
            }),
            Behavior::Fail => Err(LlmError::ApiError {
                code: 500,
                message: "upstream exploded".to_string(),
            }),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err(LlmError::RequestFailed("unreachable".to_string()))
            }
        }
    }
}

fn scenario(generator: &ChaosGenerator) -> Scenario {
    let mut rng = ChaCha8Rng::seed_from_u64(77);
    generator
        .generate_progressive_scenario(Domain::Technical, DifficultyLevel::Advanced, &mut rng)
        .unwrap()
}

fn options(include_voices: bool) -> EnhancementOptions {
    EnhancementOptions {
        timeout: Duration::from_millis(200),
        include_voices,
    }
}

#[tokio::test]
async fn null_enhancer_changes_nothing() {
    let generator = ChaosGenerator::standard().unwrap();
    let original = scenario(&generator);

    let enhanced = generator
        .enhance_scenario(original.clone(), &NullEnhancer, &options(true))
        .await
        .unwrap();
    assert_eq!(enhanced, original);
}

#[tokio::test]
async fn remote_reply_replaces_scenario_text() {
    let generator = ChaosGenerator::standard().unwrap();
    let original = scenario(&generator);
    let provider = StubProvider::new(Behavior::Reply("A storage cluster is failing at peak traffic."));
    let enhancer = RemoteEnhancer::new(provider.clone(), "stub-model").unwrap();

    let enhanced = generator
        .enhance_scenario(original.clone(), &enhancer, &options(false))
        .await
        .unwrap();

    assert_eq!(enhanced.scenario_text, "A storage cluster is failing at peak traffic.");
    assert_eq!(enhanced.internal_dialogue, original.internal_dialogue);
    assert_eq!(enhanced.confidence_trajectory, original.confidence_trajectory);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn remote_reply_rewrites_voices_when_asked() {
    let generator = ChaosGenerator::standard().unwrap();
    let original = scenario(&generator);
    let provider = StubProvider::new(Behavior::Reply("Rewritten."));
    let enhancer = RemoteEnhancer::new(provider.clone(), "stub-model").unwrap();

    let enhanced = generator
        .enhance_scenario(original.clone(), &enhancer, &options(true))
        .await
        .unwrap();

    let voice_count: usize = original.internal_dialogue.iter().map(|d| d.voices.len()).sum();
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1 + voice_count);
    assert!(enhanced
        .internal_dialogue
        .iter()
        .flat_map(|d| d.voices.values())
        .all(|statement| statement == "Rewritten."));
}

#[tokio::test]
async fn failing_backend_keeps_synthesized_text() {
    let generator = ChaosGenerator::standard().unwrap();
    let original = scenario(&generator);
    let enhancer = RemoteEnhancer::new(StubProvider::new(Behavior::Fail), "stub-model").unwrap();

    let enhanced = generator
        .enhance_scenario(original.clone(), &enhancer, &options(true))
        .await
        .unwrap();
    assert_eq!(enhanced, original);
}

#[tokio::test]
async fn slow_backend_times_out_and_keeps_text() {
    let generator = ChaosGenerator::standard().unwrap();
    let original = scenario(&generator);
    let enhancer = RemoteEnhancer::new(StubProvider::new(Behavior::Hang), "stub-model").unwrap();

    let enhanced = generator
        .enhance_scenario(original.clone(), &enhancer, &options(false))
        .await
        .unwrap();
    assert_eq!(enhanced.scenario_text, original.scenario_text);
}
