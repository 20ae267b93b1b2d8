//! Generation service trait and implementations.
//!
//! - `RemoteGenerationClient` calls an OpenAI-compatible chat completions
//!   API over HTTP. This is the production generation backend.
//! - `MockGeneration` records prompts and echoes them back for testing.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use outfitter_core::config::GenerationConfig;
use outfitter_core::error::OutfitterError;

use crate::template::{PromptParams, ResolvedTemplate};

/// Service for generating answer text from a prompt.
pub trait GenerationService: Send + Sync {
    /// Generate text for the given prompt.
    fn generate(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<String, OutfitterError>> + Send;
}

/// Object-safe version of [`GenerationService`] for dynamic dispatch.
///
/// Mirrors the embedding service split: the ergonomic trait returns
/// `impl Future`, this one boxes it so `Arc<dyn DynGenerationService>` can
/// live in shared state.
pub trait DynGenerationService: Send + Sync {
    /// Generate text for the given prompt (boxed future).
    fn generate_boxed<'a>(
        &'a self,
        prompt: &'a str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<String, OutfitterError>> + Send + 'a>,
    >;
}

/// Blanket impl: any `GenerationService` automatically implements `DynGenerationService`.
impl<T: GenerationService> DynGenerationService for T {
    fn generate_boxed<'a>(
        &'a self,
        prompt: &'a str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<String, OutfitterError>> + Send + 'a>,
    > {
        Box::pin(self.generate(prompt))
    }
}

/// Bind the five template parameters and invoke the generation provider.
///
/// Provider failure propagates unchanged; no fallback text is substituted
/// here.
pub async fn invoke_generation(
    service: &dyn DynGenerationService,
    template: &ResolvedTemplate,
    params: &PromptParams,
) -> Result<String, OutfitterError> {
    let prompt = params.bind(&template.instructions);
    service.generate_boxed(&prompt).await
}

// ---------------------------------------------------------------------------
// RemoteGenerationClient - OpenAI-compatible chat completions over HTTP
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Generation service backed by an OpenAI-compatible `/chat/completions`
/// endpoint.
pub struct RemoteGenerationClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl std::fmt::Debug for RemoteGenerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteGenerationClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl RemoteGenerationClient {
    /// Build a client from the `[generation]` config section.
    pub fn from_config(config: &GenerationConfig) -> Result<Self, OutfitterError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                OutfitterError::Generation(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

impl GenerationService for RemoteGenerationClient {
    async fn generate(&self, prompt: &str) -> Result<String, OutfitterError> {
        if prompt.is_empty() {
            return Err(OutfitterError::Generation(
                "Cannot generate from an empty prompt".to_string(),
            ));
        }

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        };

        debug!(model = %self.model, chars = prompt.len(), "Requesting generation");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                OutfitterError::Generation(format!("Generation request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OutfitterError::Generation(format!(
                "Generation API error ({}): {}",
                status, body
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            OutfitterError::Generation(format!("Invalid generation response: {}", e))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| OutfitterError::Generation("Empty generation response".to_string()))
    }
}

// ---------------------------------------------------------------------------
// MockGeneration - records prompts and echoes them for testing
// ---------------------------------------------------------------------------

/// Mock generation service for tests.
///
/// Records every prompt it receives. By default it echoes the prompt back
/// as the "generated" text, so tests can assert on exactly what was bound
/// into the template; a canned reply can be set instead.
#[derive(Debug, Clone, Default)]
pub struct MockGeneration {
    reply: Option<String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock that always answers with the given text.
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The prompts seen so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl GenerationService for MockGeneration {
    async fn generate(&self, prompt: &str) -> Result<String, OutfitterError> {
        if prompt.is_empty() {
            return Err(OutfitterError::Generation(
                "Cannot generate from an empty prompt".to_string(),
            ));
        }

        self.prompts
            .lock()
            .map_err(|e| OutfitterError::Generation(format!("Mock lock poisoned: {}", e)))?
            .push(prompt.to_string());

        Ok(match &self.reply {
            Some(reply) => reply.clone(),
            None => prompt.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{TemplateSource, INLINE_TEMPLATE};
    use outfitter_core::types::ProductRecord;

    #[tokio::test]
    async fn test_mock_echoes_prompt() {
        let service = MockGeneration::new();
        let text = service.generate("tell me about tents").await.unwrap();
        assert_eq!(text, "tell me about tents");
    }

    #[tokio::test]
    async fn test_mock_with_reply() {
        let service = MockGeneration::with_reply("canned answer");
        let text = service.generate("anything").await.unwrap();
        assert_eq!(text, "canned answer");
    }

    #[tokio::test]
    async fn test_mock_records_prompts() {
        let service = MockGeneration::new();
        service.generate("first").await.unwrap();
        service.generate("second").await.unwrap();

        let prompts = service.prompts();
        assert_eq!(prompts, vec!["first".to_string(), "second".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_clone_shares_recorded_prompts() {
        let service = MockGeneration::new();
        let handle = service.clone();

        service.generate("observed").await.unwrap();
        assert_eq!(handle.prompts(), vec!["observed".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_empty_prompt_errors() {
        let service = MockGeneration::new();
        let result = service.generate("").await;
        assert!(matches!(result, Err(OutfitterError::Generation(_))));
    }

    #[tokio::test]
    async fn test_dyn_dispatch_through_arc() {
        let service: Arc<dyn DynGenerationService> = Arc::new(MockGeneration::with_reply("ok"));
        let text = service.generate_boxed("prompt").await.unwrap();
        assert_eq!(text, "ok");
    }

    #[tokio::test]
    async fn test_invoke_generation_binds_params() {
        let service = MockGeneration::new();
        let template = ResolvedTemplate {
            source: TemplateSource::Inline,
            instructions: INLINE_TEMPLATE.to_string(),
        };
        let product = ProductRecord::new(1, "Tent", "A waterproof tent", 199.99, "");
        let params = crate::template::PromptParams::for_product("need shelter", &product);

        let text = invoke_generation(&service, &template, &params).await.unwrap();

        // Echo mode returns the bound prompt itself.
        assert!(text.contains("Product Id: 1"));
        assert!(text.contains("Tent"));
        assert!(text.contains("199.99"));
        assert!(text.contains("need shelter"));
        assert!(!text.contains("{{"));

        let prompts = service.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Product Name: Tent"));
    }

    #[test]
    fn test_remote_client_from_config() {
        let config = GenerationConfig {
            endpoint: "https://api.example.test/v1/".to_string(),
            api_key: "sk-test".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 128,
            temperature: 0.4,
            timeout_secs: 5,
        };
        let client = RemoteGenerationClient::from_config(&config).unwrap();
        assert_eq!(client.endpoint, "https://api.example.test/v1");
        assert_eq!(client.max_tokens, 128);
    }
}
