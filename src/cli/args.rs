use clap::Parser;
use std::path::PathBuf;

/// CLI argument parsing with environment variable support.
///
/// `GEMINI_API_KEY` supplies the credential when `--api-key` is absent; other
/// flags fall back to `FISCA_EDITOR_*` variables and then to config files.
#[derive(Parser, Debug)]
#[command(name = "fisca-editor")]
#[command(about = "Draft OpenFisca rule source from a rule description page")]
#[command(version)]
pub struct Args {
    /// Display name of the rule to draft
    pub rule_name: String,

    /// URL of the page describing the rule
    pub rule_url: String,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model to use
    #[arg(short, long, env = "FISCA_EDITOR_MODEL")]
    pub model: Option<String>,

    /// Maximum number of tokens the model may generate
    #[arg(long, env = "FISCA_EDITOR_MAX_OUTPUT_TOKENS")]
    pub max_output_tokens: Option<usize>,

    /// Config file path
    #[arg(short, long, env = "FISCA_EDITOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the assembled prompt without calling the model
    #[arg(long)]
    pub dry_run: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short)]
    pub quiet: bool,
}

pub fn parse() -> Args {
    Args::parse()
}
