//! LLM integration for chaos-forge.
//!
//! A thin client for OpenAI-compatible chat completion APIs, used only by the
//! optional remote enhancer.
//!
//! ```ignore
//! use chaos_forge::llm::{GenerationRequest, LiteLlmClient, LlmProvider, Message};
//!
//! let client = LiteLlmClient::from_env()?;
//! let request = GenerationRequest::new("", vec![Message::user("Hello")]);
//! let response = client.generate(request).await?;
//! ```

pub mod litellm;

pub use litellm::{
    Choice, ChoiceMessage, GenerationRequest, GenerationResponse, LiteLlmClient, LlmProvider,
    Message, Usage, DEFAULT_MODEL,
};
