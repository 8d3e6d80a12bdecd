//! Rule drafting inputs.
//!
//! This module provides:
//! - The compiled-in few-shot exemplar
//! - Prompt generation from an exemplar and a target rule
//! - Descriptor and result types passed through the pipeline

pub mod exemplar;
pub mod prompts;
pub mod rules;

pub use exemplar::{EXEMPLAR_NAME, EXEMPLAR_URL, ExemplarRecord, exemplar_source};
pub use prompts::{build_rule_prompt, system_instruction};
pub use rules::{GenerationResult, RuleDescriptor};
