use crate::generator::rules::GenerationResult;
use crate::llm::provider::{
    ChatTurn, CompletionOptions, LLMProvider, ProviderConnector, validate_alternation,
};
use crate::utils::error::EditorError;

/// Fixed model reply that closes the seed exchange ("Understood.").
pub const DEFAULT_ACKNOWLEDGMENT: &str = "分かりました。";

/// Output cap applied to every generation request.
pub const DEFAULT_MAX_OUTPUT_TOKENS: usize = 100;

/// Per-session settings shared by every `send`.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub options: CompletionOptions,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            options: CompletionOptions {
                max_tokens: Some(DEFAULT_MAX_OUTPUT_TOKENS),
            },
        }
    }
}

/// A single-shot chat session against a generative model.
///
/// Every `send` builds a fresh conversation: the system instruction as a user
/// turn, a synthetic acknowledgment as the model turn, then the prompt. The
/// remote protocol rejects histories that do not alternate starting from
/// `user`, so the acknowledgment is mandatory. Nothing carries over between
/// calls.
pub struct GenerationClient {
    provider: Box<dyn LLMProvider>,
    settings: SessionSettings,
}

impl GenerationClient {
    pub fn new(provider: Box<dyn LLMProvider>, settings: SessionSettings) -> Self {
        Self { provider, settings }
    }

    /// Bind a model handle to `credential`.
    ///
    /// # Errors
    ///
    /// `EditorError::AuthConfig` if the credential is empty. A credential
    /// the service rejects only fails later, on the first `send`.
    pub fn open(
        connector: &dyn ProviderConnector,
        credential: &str,
        settings: SessionSettings,
    ) -> Result<Self, EditorError> {
        if credential.trim().is_empty() {
            return Err(EditorError::missing_credential());
        }
        let provider = connector.open(credential)?;
        Ok(Self::new(provider, settings))
    }

    /// The full conversation submitted for `prompt`.
    pub fn conversation(&self, system_instruction: &str, prompt: &str) -> Vec<ChatTurn> {
        vec![
            ChatTurn::user(system_instruction),
            ChatTurn::model(DEFAULT_ACKNOWLEDGMENT),
            ChatTurn::user(prompt),
        ]
    }

    /// Submit `prompt` after the seeded exchange and return the reply text.
    ///
    /// # Errors
    ///
    /// `EditorError::Generation` when the call fails or the reply carries no
    /// text; `EditorError::AuthConfig` when the service rejects the
    /// credential. No retries are attempted.
    pub async fn send(
        &self,
        system_instruction: &str,
        prompt: &str,
    ) -> Result<GenerationResult, EditorError> {
        let turns = self.conversation(system_instruction, prompt);
        validate_alternation(&turns)?;

        tracing::debug!(
            model = self.provider.model(),
            turns = turns.len(),
            prompt_bytes = prompt.len(),
            max_tokens = ?self.settings.options.max_tokens,
            "sending generation request"
        );

        let response = self.provider.complete(&turns, &self.settings.options).await?;

        if response.content.is_empty() {
            return Err(EditorError::generation("model reply contained no text"));
        }

        tracing::debug!(
            prompt_tokens = response.prompt_tokens,
            completion_tokens = response.completion_tokens,
            "generation complete"
        );

        Ok(GenerationResult {
            text: response.content,
            model: self.provider.model().to_string(),
            prompt_tokens: response.prompt_tokens,
            completion_tokens: response.completion_tokens,
        })
    }

    /// Get the model name from the provider.
    pub fn model(&self) -> &str {
        self.provider.model()
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }
}
