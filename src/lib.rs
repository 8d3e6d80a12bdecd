//! # fisca-editor
//!
//! Drafts OpenFisca rule source code with a generative model. Given a rule
//! name and the URL of a page describing it, the editor:
//!
//! 1. **Exemplar** - fetches the live description of a fixed worked example
//! 2. **Target** - fetches the description of the new rule
//! 3. **Prompt** - renders a few-shot prompt from both descriptions and the
//!    exemplar's reference source
//! 4. **Generate** - opens a Gemini session seeded with the system instruction
//!    and a synthetic acknowledgment, sends the prompt, and returns the reply
//!
//! Steps run strictly in order; the first failure aborts the run and is
//! returned unchanged. Pages are memoized in a [`PageCache`] shared by every
//! run that uses the same [`RuleFetcher`].
//!
//! Configuration follows hierarchical precedence:
//! 1. User config (~/.config/fisca-editor/config.toml)
//! 2. Current directory (fisca-editor.toml)
//! 3. Explicit --config path
//! 4. Environment variables (FISCA_EDITOR_*)
//! 5. CLI flags (highest precedence)

pub mod cli;
pub mod fetch;
pub mod generator;
pub mod llm;
pub mod utils;

use fetch::{FetchSettings, RuleFetcher, rewrite};
use generator::{ExemplarRecord, GenerationResult, build_rule_prompt, system_instruction};
use llm::provider::CompletionOptions;
use llm::providers::gemini::GeminiConnector;
use llm::{GenerationClient, ProviderConnector, SessionSettings};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use utils::cache::PageCache;
use utils::error::EditorError;

/// Final resolved configuration after merging all sources (CLI, env, config files).
#[derive(Clone)]
pub struct MergedConfig {
    /// Display name of the rule to draft
    pub rule_name: String,
    /// Page describing the rule
    pub rule_url: String,
    /// Gemini API key (never logged)
    pub api_key: Option<String>,
    pub model: String,
    pub max_output_tokens: usize,
    pub gemini_base_url: String,
    pub gemini_timeout_secs: u64,
    pub fetch_timeout_secs: u64,
    pub user_agent: Option<String>,
    /// `(relay prefix, upstream origin)` for cross-origin page access
    pub proxy: Option<(String, String)>,
    /// Print the prompt instead of calling the model
    pub dry_run: bool,
    /// Verbosity level (0-2)
    pub verbose: u8,
    /// Quiet mode (suppress all output)
    pub quiet: bool,
}

impl std::fmt::Debug for MergedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergedConfig")
            .field("rule_name", &self.rule_name)
            .field("rule_url", &self.rule_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("proxy", &self.proxy)
            .field("dry_run", &self.dry_run)
            .field("verbose", &self.verbose)
            .field("quiet", &self.quiet)
            .finish_non_exhaustive()
    }
}

/// Tracks the current step of a run, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Exemplar,
    Target,
    Prompt,
    Generate,
    Complete,
}

/// Sequences exemplar lookup, page fetching, prompt rendering and generation.
pub struct RuleEditor {
    fetcher: RuleFetcher,
    connector: Arc<dyn ProviderConnector>,
    exemplar: ExemplarRecord,
    instruction: String,
    session: SessionSettings,
}

impl RuleEditor {
    /// Create an editor using the compiled-in exemplar and instruction.
    pub fn new(fetcher: RuleFetcher, connector: Arc<dyn ProviderConnector>) -> Self {
        Self {
            fetcher,
            connector,
            exemplar: ExemplarRecord::default(),
            instruction: system_instruction().to_string(),
            session: SessionSettings::default(),
        }
    }

    /// Build the editor described by `config`, talking to Gemini.
    pub fn from_config(config: &MergedConfig, cache: Arc<PageCache>) -> Result<Self, EditorError> {
        let mut settings = FetchSettings {
            timeout: Duration::from_secs(config.fetch_timeout_secs),
            ..FetchSettings::default()
        };
        if let Some(user_agent) = &config.user_agent {
            settings.user_agent = user_agent.clone();
        }
        if let Some((prefix, upstream)) = &config.proxy {
            settings.rewrite = rewrite::relay(prefix.as_str(), upstream.as_str());
        }
        let fetcher = RuleFetcher::new(cache, settings)?;

        let connector = GeminiConnector {
            model: config.model.clone(),
            base_url: config.gemini_base_url.clone(),
            timeout: Duration::from_secs(config.gemini_timeout_secs),
        };

        let session = SessionSettings {
            options: CompletionOptions {
                max_tokens: Some(config.max_output_tokens),
            },
        };

        Ok(Self::new(fetcher, Arc::new(connector)).with_session_settings(session))
    }

    pub fn with_exemplar(mut self, exemplar: ExemplarRecord) -> Self {
        self.exemplar = exemplar;
        self
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    pub fn with_session_settings(mut self, session: SessionSettings) -> Self {
        self.session = session;
        self
    }

    pub fn fetcher(&self) -> &RuleFetcher {
        &self.fetcher
    }

    /// Fetch both descriptions and render the prompt, without touching the
    /// model.
    pub async fn preview_prompt(&self, rule_name: &str, rule_url: &str) -> Result<String, EditorError> {
        tracing::info!("Pipeline stage: {:?}", PipelineStage::Exemplar);
        let exemplar = self.exemplar.describe(&self.fetcher).await?;

        tracing::info!("Pipeline stage: {:?}", PipelineStage::Target);
        let target = self.fetcher.fetch_rule(rule_name, rule_url).await?;

        tracing::info!("Pipeline stage: {:?}", PipelineStage::Prompt);
        let prompt = build_rule_prompt(&exemplar, &self.exemplar.source, &target);
        tracing::debug!(bytes = prompt.len(), "rendered prompt");

        Ok(prompt)
    }

    /// Draft source for `rule_name` from the page at `rule_url`.
    ///
    /// # Errors
    ///
    /// The first failing step's error, unchanged: `EditorError::Fetch` from
    /// either page, `EditorError::AuthConfig` for a missing or rejected
    /// credential, `EditorError::Generation` from the model call. No partial
    /// result is returned.
    pub async fn run(
        &self,
        credential: &str,
        rule_name: &str,
        rule_url: &str,
    ) -> Result<GenerationResult, EditorError> {
        let prompt = self.preview_prompt(rule_name, rule_url).await?;

        tracing::info!("Pipeline stage: {:?}", PipelineStage::Generate);
        let client =
            GenerationClient::open(&*self.connector, credential, self.session.clone())?;
        let result = client.send(&self.instruction, &prompt).await?;

        tracing::info!("Pipeline stage: {:?}", PipelineStage::Complete);
        Ok(result)
    }
}

/// Initialize the tracing subscriber on stderr.
///
/// `RUST_LOG` takes precedence; otherwise the level follows `-v` count.
pub fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("fisca_editor={level},{}", if verbose > 1 { "info" } else { "warn" }))
    });

    // A subscriber may already be installed (e.g. by a test harness).
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .ok();
}
