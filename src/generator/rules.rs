use std::sync::Arc;

/// A rule's display name and the raw text describing it.
///
/// The content is shared with the page cache and cannot be modified once
/// fetched; only the name is caller-supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDescriptor {
    pub name: String,
    content: Arc<str>,
}

impl RuleDescriptor {
    pub fn new(name: impl Into<String>, content: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// The generated rule source as returned by the model.
///
/// No structural validation is performed; review is left to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub text: String,
    pub model: String,
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
}
