//! Configuration management using the `config` crate for hierarchical discovery and merging.
//!
//! ## Configuration Sources (in precedence order, highest to lowest):
//! 1. **CLI flags** - Highest precedence
//! 2. **Environment variables** - `FISCA_EDITOR_<SECTION>__<KEY>`, e.g.
//!    `FISCA_EDITOR_GEMINI__MAX_OUTPUT_TOKENS=2048`
//! 3. **Config files** - Lowest precedence
//!
//! ## Config File Discovery (in merge order, later overrides earlier):
//! 1. `~/.config/fisca-editor/config.toml` (user config directory)
//! 2. `./fisca-editor.toml` in the current directory
//! 3. Explicit `--config` path (must exist)
//!
//! ## Example file
//! ```toml
//! [gemini]
//! model = "gemini-pro"
//! max_output_tokens = 100
//!
//! [fetch]
//! timeout_secs = 30
//! proxy_prefix = "http://localhost:5173/proxy"
//! proxy_upstream = "https://www.fukushi.metro.tokyo.lg.jp"
//! ```

use crate::MergedConfig;
use crate::cli::args::Args;
use crate::llm::client::DEFAULT_MAX_OUTPUT_TOKENS;
use crate::llm::providers::gemini::{DEFAULT_MODEL, GEMINI_API_URL};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "fisca-editor.toml";
const ENV_PREFIX: &str = "FISCA_EDITOR";

/// Root configuration structure loaded from config files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// Generative model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: usize,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_gemini_timeout")]
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_output_tokens: default_max_output_tokens(),
            base_url: default_base_url(),
            timeout_secs: default_gemini_timeout(),
        }
    }
}

/// Rule page fetching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
    /// Relay prefix used to reach `proxy_upstream` (both must be set).
    pub proxy_prefix: Option<String>,
    pub proxy_upstream: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            user_agent: None,
            proxy_prefix: None,
            proxy_upstream: None,
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_output_tokens() -> usize {
    DEFAULT_MAX_OUTPUT_TOKENS
}

fn default_base_url() -> String {
    GEMINI_API_URL.to_string()
}

fn default_gemini_timeout() -> u64 {
    120
}

fn default_fetch_timeout() -> u64 {
    30
}

fn get_user_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|config_dir| config_dir.join("fisca-editor").join("config.toml"))
        .filter(|path| path.exists())
}

fn discover_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(user_config) = get_user_config_path() {
        paths.push(user_config);
    }

    let current_dir_config = PathBuf::from(CONFIG_FILE_NAME);
    if current_dir_config.exists() {
        paths.push(current_dir_config);
    }

    paths
}

/// Load configuration from discovered config files and environment variables.
pub fn load(args: &Args) -> Result<Config> {
    load_from(&discover_config_paths(), args.config.as_deref())
}

/// Load configuration from `paths` (optional, in merge order), then an
/// explicit file that must exist, then the environment.
pub fn load_from(paths: &[PathBuf], explicit: Option<&Path>) -> Result<Config> {
    let mut builder = config::Config::builder();

    for config_path in paths {
        builder = builder.add_source(config::File::from(config_path.as_path()).required(false));
    }

    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        builder = builder.add_source(config::File::from(path));
    }

    builder = builder.add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let settings = builder.build().context("Failed to build configuration")?;

    settings
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

/// Merge CLI arguments over file/env configuration.
pub fn merge_config(args: &Args, config: Config) -> MergedConfig {
    let proxy = match (config.fetch.proxy_prefix, config.fetch.proxy_upstream) {
        (Some(prefix), Some(upstream)) => Some((prefix, upstream)),
        (Some(_), None) | (None, Some(_)) => {
            tracing::warn!("fetch.proxy_prefix and fetch.proxy_upstream must be set together; ignoring");
            None
        }
        (None, None) => None,
    };

    MergedConfig {
        rule_name: args.rule_name.clone(),
        rule_url: args.rule_url.clone(),
        api_key: args.api_key.clone(),
        model: args.model.clone().unwrap_or(config.gemini.model),
        max_output_tokens: args
            .max_output_tokens
            .unwrap_or(config.gemini.max_output_tokens),
        gemini_base_url: config.gemini.base_url,
        gemini_timeout_secs: config.gemini.timeout_secs,
        fetch_timeout_secs: config.fetch.timeout_secs,
        user_agent: config.fetch.user_agent,
        proxy,
        dry_run: args.dry_run,
        verbose: args.verbose,
        quiet: args.quiet,
    }
}
