use anyhow::Result;
use fisca_editor::utils::cache::PageCache;
use fisca_editor::utils::error::{EditorError, format_error};
use fisca_editor::utils::progress::StepSpinner;
use fisca_editor::{RuleEditor, cli};
use std::io::Write;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Decide verbose mode early for better error formatting
    let verbose = std::env::args().any(|arg| arg == "--verbose" || arg == "-v" || arg.starts_with("-vv"));

    if let Err(e) = run_main().await {
        display_error(&e, verbose);
        std::process::exit(1);
    }
}

/// Display an error with contextual formatting.
///
/// Tries to downcast to `EditorError` for rich formatting, falls back to
/// anyhow's error chain display for other errors.
fn display_error(error: &anyhow::Error, verbose: bool) {
    if let Some(editor_error) = error.downcast_ref::<EditorError>() {
        eprintln!("{}", format_error(editor_error, verbose));
        return;
    }

    eprintln!("\n\u{26a0} Error: {}", error);

    let causes: Vec<_> = error.chain().skip(1).collect();
    if !causes.is_empty() {
        eprintln!("\nCaused by:");
        for (i, cause) in causes.iter().enumerate() {
            let prefix = if i == causes.len() - 1 {
                "\u{2514}\u{2500}"
            } else {
                "\u{251c}\u{2500}"
            };
            eprintln!("{} {}", prefix, cause);
        }
    }
}

async fn run_main() -> Result<()> {
    let args = cli::args::parse();
    let config = cli::config::load(&args)?;
    let merged_config = cli::config::merge_config(&args, config);

    fisca_editor::init_logging(merged_config.verbose, merged_config.quiet);
    tracing::info!("fisca-editor v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Configuration: {:?}", merged_config);

    let editor = RuleEditor::from_config(&merged_config, Arc::new(PageCache::new()))?;

    if merged_config.dry_run {
        let prompt = editor
            .preview_prompt(&merged_config.rule_name, &merged_config.rule_url)
            .await?;
        write_stdout(&prompt)?;
        return Ok(());
    }

    let credential = merged_config.api_key.clone().unwrap_or_default();
    let spinner = StepSpinner::start(merged_config.quiet, "Drafting rule source...");
    let outcome = editor
        .run(
            &credential,
            &merged_config.rule_name,
            &merged_config.rule_url,
        )
        .await;
    spinner.finish();

    let result = outcome?;
    if !merged_config.quiet {
        eprintln!(
            "Generated with {} ({} prompt / {} completion tokens). Review before use.",
            result.model, result.prompt_tokens, result.completion_tokens
        );
    }
    write_stdout(&result.text)?;

    Ok(())
}

fn write_stdout(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}")?;
    stdout.flush()?;
    Ok(())
}
