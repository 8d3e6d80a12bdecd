// Copyright (c) 2025-2026 the fisca-editor contributors
// SPDX-License-Identifier: Apache-2.0

use std::sync::LazyLock;
use thiserror::Error;

/// Compiled regex patterns for redacting credentials from provider messages.
///
/// The patterns are literals validated by the tests below, so the `expect`
/// calls can only fire on a programming error.
static REDACTION_PATTERNS: LazyLock<[(regex::Regex, &'static str); 4]> = LazyLock::new(|| {
    [
        (
            regex::Regex::new(r"((?:api[_-]?)?key\s*[=:]\s*)[^\s&]+")
                .expect("key redaction pattern is invalid"),
            "${1}[REDACTED]",
        ),
        (
            regex::Regex::new(r"(token\s*[=:]\s*)[^\s&]+").expect("token redaction pattern is invalid"),
            "${1}[REDACTED]",
        ),
        (
            regex::Regex::new(r"(?i)(bearer\s+)[^\s]+")
                .expect("bearer redaction pattern is invalid"),
            "${1}[REDACTED]",
        ),
        (
            regex::Regex::new(r"AIza[0-9A-Za-z_\-]{20,}")
                .expect("google key redaction pattern is invalid"),
            "[REDACTED]",
        ),
    ]
});

/// Every failure the editor can surface to its caller.
///
/// `Fetch`, `AuthConfig` and `Generation` are the pipeline failures; `Config`
/// covers setup around it.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Failed to fetch rule page {url}: {message}")]
    Fetch {
        url: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Credential error: {}", redact_sensitive_data(message))]
    AuthConfig { message: String },

    #[error("Generation failed: {}", redact_sensitive_data(message))]
    Generation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Redact credentials from a message that may echo request details.
pub fn redact_sensitive_data(message: &str) -> String {
    let mut result = message.to_string();
    for (pattern, replacement) in REDACTION_PATTERNS.iter() {
        result = pattern.replace_all(&result, *replacement).to_string();
    }
    result
}

impl EditorError {
    pub fn fetch(url: &str, message: impl Into<String>) -> Self {
        EditorError::Fetch {
            url: url.to_string(),
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a transport failure that happened while fetching `url`.
    pub fn fetch_transport(url: &str, err: reqwest::Error) -> Self {
        EditorError::Fetch {
            url: url.to_string(),
            message: describe_transport_error(&err),
            source: Some(Box::new(err)),
        }
    }

    pub fn generation(message: impl Into<String>) -> Self {
        EditorError::Generation {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a transport failure that happened while calling the model.
    pub fn generation_transport(err: reqwest::Error) -> Self {
        EditorError::Generation {
            message: describe_transport_error(&err),
            source: Some(Box::new(err)),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        EditorError::AuthConfig {
            message: message.into(),
        }
    }

    pub fn missing_credential() -> Self {
        EditorError::AuthConfig {
            message: "no API key was supplied".to_string(),
        }
    }

    /// A one-line hint telling the user what to try next.
    pub fn suggestion(&self) -> &'static str {
        match self {
            EditorError::Fetch { .. } => {
                "Check that the rule URL is reachable and returns a non-empty page"
            }
            EditorError::AuthConfig { .. } => {
                "Pass --api-key or set the GEMINI_API_KEY environment variable"
            }
            EditorError::Generation { .. } => {
                "The model call failed; run again or try a different --model"
            }
            EditorError::Config(_) => "Check fisca-editor.toml and FISCA_EDITOR_* variables",
        }
    }
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "Request timed out. Check your network connection.".to_string()
    } else if err.is_connect() {
        "Failed to connect to server. Check your network connection.".to_string()
    } else if err.is_decode() {
        "Failed to read response body".to_string()
    } else {
        "Network request failed".to_string()
    }
}

/// Render an error for the terminal: headline, suggestion, and in verbose
/// mode the full source chain.
pub fn format_error(error: &EditorError, verbose: bool) -> String {
    let mut out = format!("\n\u{26a0} Error: {error}\n\nSuggestion: {}", error.suggestion());

    if verbose {
        let mut source = std::error::Error::source(error);
        if source.is_some() {
            out.push_str("\n\nCaused by:");
        }
        while let Some(cause) = source {
            out.push_str(&format!("\n  {}", redact_sensitive_data(&cause.to_string())));
            source = cause.source();
        }
    }

    out
}
