// Copyright (c) 2025-2026 the fisca-editor contributors
// SPDX-License-Identifier: Apache-2.0

use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown on stderr while a pipeline step is in flight.
///
/// When stderr is not a TTY (piped output, CI) or quiet mode is on, the
/// spinner is hidden and every call is a no-op, so generated text on stdout
/// is never interleaved with terminal control codes.
pub struct StepSpinner {
    bar: ProgressBar,
}

impl StepSpinner {
    #[must_use]
    pub fn start(quiet: bool, message: &'static str) -> Self {
        let bar = if quiet || !Term::stderr().is_term() {
            ProgressBar::hidden()
        } else {
            let spinner = ProgressBar::new_spinner();
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner
        };

        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to parse spinner template: {e}");
                ProgressStyle::default_spinner()
            });
        bar.set_style(style);
        bar.set_message(message);

        Self { bar }
    }

    /// Clear the spinner from the terminal.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }
}
