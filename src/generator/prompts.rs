// Copyright (c) 2025-2026 the fisca-editor contributors
// SPDX-License-Identifier: Apache-2.0

//! Prompt generation for rule drafting.
//!
//! The rule prompt shows the model one worked example (description plus
//! source) followed by the new rule's description, and ends on an open
//! `source code:` label for the model to complete.
//!
//! # Example
//!
//! ```
//! use fisca_editor::generator::prompts::build_rule_prompt;
//! use fisca_editor::generator::rules::RuleDescriptor;
//!
//! let exemplar = RuleDescriptor::new("Example Rule", "DESC_A");
//! let target = RuleDescriptor::new("New Rule", "DESC_B");
//! let prompt = build_rule_prompt(&exemplar, "SRC", &target);
//! assert!(prompt.ends_with("source code:"));
//! ```

use crate::generator::rules::RuleDescriptor;

/// Load the rule prompt template.
pub fn rule_prompt_template() -> &'static str {
    include_str!("../../prompts/rule_prompt.md")
}

/// Load the system instruction sent as the first turn of every session.
pub fn system_instruction() -> &'static str {
    include_str!("../../prompts/instruction.md")
}

/// Build the few-shot prompt for drafting `target` by analogy with the
/// exemplar.
///
/// Rendering is deterministic: identical inputs give byte-identical output.
/// Descriptions and source are inserted verbatim inside literal fences, and an
/// empty description still produces its (empty) fenced block.
pub fn build_rule_prompt(
    exemplar: &RuleDescriptor,
    exemplar_source: &str,
    target: &RuleDescriptor,
) -> String {
    let template = rule_prompt_template().trim_end();

    render_template(
        template,
        &[
            ("exemplar_name", exemplar.name.as_str()),
            ("exemplar_content", exemplar.content()),
            ("exemplar_source", exemplar_source),
            ("target_name", target.name.as_str()),
            ("target_content", target.content()),
        ],
    )
}

/// Substitute `{{key}}` placeholders in a single left-to-right pass.
///
/// Substituted values are never rescanned, so placeholder-like text inside a
/// fetched page is emitted literally. Unknown placeholders are left as they
/// are.
fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let capacity = template.len() + vars.iter().map(|(_, v)| v.len()).sum::<usize>();
    let mut out = String::with_capacity(capacity);
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];

        let Some(end) = after_open.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let key = &after_open[..end];
        match vars.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push_str("{{");
                out.push_str(key);
                out.push_str("}}");
            }
        }
        rest = &after_open[end + 2..];
    }

    out.push_str(rest);
    out
}
