//! CompletionApiClient -- concrete [`CompletionClient`] for an
//! OpenAI-compatible chat-completion endpoint.
//!
//! Sends non-streaming requests to `POST {base}/chat/completions` and decodes
//! the first choice into an [`AssistantReply`]. The model catalog is fetched
//! once from `GET {base}/model` at startup with a short timeout, falling back
//! to a built-in list when the endpoint is slow or unreachable.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use arbor_core::llm::provider::CompletionClient;
use arbor_types::error::LlmError;
use arbor_types::llm::{AssistantReply, ChatTurn};

use super::reasoning::split_reasoning;

/// Catalog used when model discovery fails.
const FALLBACK_MODELS: &[&str] = &[
    "qwen/qwen3-32b",
    "openai/gpt-oss-120b",
    "openai/gpt-oss-20b",
    "meta-llama/llama-4-maverick-17b-128e-instruct",
];

/// Budget for the one-shot model discovery call.
const MODEL_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for an OpenAI-compatible completion endpoint.
pub struct CompletionApiClient {
    client: reqwest::Client,
    base_url: String,
    models: Vec<String>,
}

impl CompletionApiClient {
    /// Create a client and discover the live model catalog.
    pub async fn discover(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300)) // 5 min budget for long generations
            .build()
            .expect("failed to create reqwest client");

        let models = match fetch_models(&client, &base_url).await {
            Ok(models) if !models.is_empty() => models,
            Ok(_) | Err(_) => {
                warn!(base_url = %base_url, "model discovery failed, using fallback catalog");
                FALLBACK_MODELS.iter().map(|m| m.to_string()).collect()
            }
        };

        Self {
            client,
            base_url,
            models,
        }
    }

    /// Create a client with a fixed catalog (no discovery call).
    pub fn with_models(base_url: impl Into<String>, models: Vec<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(300))
                .build()
                .expect("failed to create reqwest client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            models,
        }
    }
}

async fn fetch_models(client: &reqwest::Client, base_url: &str) -> Result<Vec<String>, reqwest::Error> {
    let text = client
        .get(format!("{base_url}/model"))
        .timeout(MODEL_DISCOVERY_TIMEOUT)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    Ok(text
        .split(',')
        .map(|model| model.trim().to_string())
        .filter(|model| !model.is_empty())
        .collect())
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct CompletionsRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
}

#[derive(Debug, Deserialize)]
struct CompletionsResponse {
    model: String,
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
    #[serde(default)]
    reasoning: Option<String>,
}

/// Turn a decoded response into a reply for `requested_model`.
///
/// Contract checks, in order: the provider must answer with the requested
/// model, and must return at least one choice. A `<think>` prefix in the
/// content takes precedence over the provider's own reasoning field.
fn reply_from_response(
    requested_model: &str,
    response: CompletionsResponse,
) -> Result<AssistantReply, LlmError> {
    if response.model != requested_model {
        return Err(LlmError::ModelMismatch {
            requested: requested_model.to_string(),
            answered: response.model,
        });
    }

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(LlmError::EmptyCompletion)?;

    let (tag_reasoning, content) = split_reasoning(&choice.message.content);
    let reasoning = tag_reasoning.or(choice.message.reasoning);

    Ok(AssistantReply { content, reasoning })
}

impl CompletionClient for CompletionApiClient {
    fn models(&self) -> &[String] {
        &self.models
    }

    async fn complete(&self, model: &str, turns: &[ChatTurn]) -> Result<AssistantReply, LlmError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&CompletionsRequest {
                model,
                messages: turns,
            })
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::Provider {
                message: format!("completion endpoint returned {status}"),
            });
        }

        let decoded: CompletionsResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(e.to_string()))?;

        reply_from_response(model, decoded)
    }
}
