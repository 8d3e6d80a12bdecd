use crate::llm::provider::{
    ChatTurn, CompletionOptions, CompletionResponse, LLMProvider, ProviderConnector,
};
use crate::utils::error::EditorError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-pro";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub struct GeminiProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

/// Error envelope returned by Google APIs.
#[derive(Debug, Deserialize)]
struct GeminiError {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
    status: Option<String>,
}

impl GeminiProvider {
    /// Create a provider for `model` served under `base_url` (the public
    /// endpoint, a gateway or a mock server).
    ///
    /// # Errors
    ///
    /// Returns `EditorError::Config` if the HTTP client cannot be built.
    pub fn with_base_url(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, EditorError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EditorError::Config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        let model = self.model.strip_prefix("models/").unwrap_or(&self.model);
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    /// Map a non-success reply to an error kind.
    ///
    /// Google reports a bad key as 400 `INVALID_ARGUMENT` with an
    /// "API key not valid" message rather than 401. The message is only
    /// consulted for that exact combination.
    fn classify_error(status: StatusCode, body: &str) -> EditorError {
        let detail = serde_json::from_str::<GeminiError>(body).ok().map(|e| e.error);

        let message = detail
            .as_ref()
            .map_or_else(|| body.trim().to_string(), |d| d.message.clone());
        let api_status = detail.as_ref().and_then(|d| d.status.as_deref());

        let rejected_key = matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
            || matches!(api_status, Some("UNAUTHENTICATED" | "PERMISSION_DENIED"))
            || (status == StatusCode::BAD_REQUEST
                && api_status == Some("INVALID_ARGUMENT")
                && message.to_ascii_lowercase().contains("api key"));

        if rejected_key {
            EditorError::auth(format!("API key rejected by Gemini: {message}"))
        } else {
            EditorError::generation(format!("Gemini returned HTTP {status}: {message}"))
        }
    }

    /// Concatenate the text parts of the first candidate.
    fn extract_text(response: GenerateContentResponse) -> Result<CompletionResponse, EditorError> {
        let usage = response.usage_metadata;
        let block_reason = response.prompt_feedback.and_then(|f| f.block_reason);

        let Some(candidate) = response.candidates.into_iter().next() else {
            let reason = block_reason.unwrap_or_else(|| "no candidates".to_string());
            return Err(EditorError::generation(format!(
                "Gemini returned no reply ({reason})"
            )));
        };

        let content = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let finish_reason = candidate.finish_reason.unwrap_or_default();
        if content.is_empty() {
            return Err(EditorError::generation(format!(
                "Gemini reply contained no text (finish reason: {})",
                if finish_reason.is_empty() { "unknown" } else { finish_reason.as_str() }
            )));
        }
        if finish_reason == "MAX_TOKENS" {
            tracing::warn!("reply was cut off at the output token limit");
        }

        Ok(CompletionResponse {
            content,
            prompt_tokens: usage.as_ref().map_or(0, |u| u.prompt_token_count),
            completion_tokens: usage.as_ref().map_or(0, |u| u.candidates_token_count),
        })
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    async fn complete(
        &self,
        turns: &[ChatTurn],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, EditorError> {
        let request_body = GenerateContentRequest {
            contents: turns
                .iter()
                .map(|t| Content {
                    role: t.role.as_str(),
                    parts: [RequestPart { text: &t.text }],
                })
                .collect(),
            generation_config: GenerationConfig {
                max_output_tokens: options.max_tokens,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(EditorError::generation_transport)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let err = Self::classify_error(status, &error_text);
            tracing::warn!(%status, "Gemini rejected the request");
            return Err(err);
        }

        let body = response
            .text()
            .await
            .map_err(EditorError::generation_transport)?;
        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| EditorError::Generation {
                message: "Gemini reply was not valid JSON".to_string(),
                source: Some(Box::new(e)),
            })?;

        Self::extract_text(parsed)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Opens [`GeminiProvider`] handles for a fixed model and endpoint.
#[derive(Debug, Clone)]
pub struct GeminiConnector {
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for GeminiConnector {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: GEMINI_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ProviderConnector for GeminiConnector {
    fn open(&self, credential: &str) -> Result<Box<dyn LLMProvider>, EditorError> {
        if credential.trim().is_empty() {
            return Err(EditorError::missing_credential());
        }
        let provider = GeminiProvider::with_base_url(
            credential.to_string(),
            self.model.clone(),
            self.base_url.clone(),
            self.timeout,
        )?;
        Ok(Box::new(provider))
    }
}
