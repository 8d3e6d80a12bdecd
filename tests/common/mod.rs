//! Common test utilities and fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use fisca_editor::fetch::{FetchSettings, RuleFetcher, rewrite};
use fisca_editor::llm::provider::{
    ChatTurn, CompletionOptions, CompletionResponse, LLMProvider, ProviderConnector,
};
use fisca_editor::utils::cache::PageCache;
use fisca_editor::utils::error::EditorError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Origin used for rule pages in tests; rewritten to the mock server.
pub const RULE_ORIGIN: &str = "https://example.test";

/// Creates a fetcher over `cache` whose requests for [`RULE_ORIGIN`] land on
/// `server_url`.
pub fn fetcher_for(server_url: &str, cache: Arc<PageCache>) -> RuleFetcher {
    let settings = FetchSettings {
        rewrite: rewrite::relay(server_url, RULE_ORIGIN),
        ..FetchSettings::default()
    };
    RuleFetcher::new(cache, settings).expect("Failed to create fetcher")
}

/// A successful `generateContent` body carrying `text`.
pub fn gemini_reply(text: &str) -> String {
    serde_json::json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 20, "candidatesTokenCount": 5, "totalTokenCount": 25}
    })
    .to_string()
}

/// Connector that records every session it opens and every conversation
/// submitted through it.
#[derive(Clone)]
pub struct RecordingConnector {
    pub reply: String,
    pub opens: Arc<AtomicUsize>,
    pub requests: Arc<Mutex<Vec<Vec<ChatTurn>>>>,
}

impl RecordingConnector {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            opens: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Vec<ChatTurn>> {
        self.requests.lock().expect("lock").clone()
    }
}

struct RecordingProvider {
    reply: String,
    requests: Arc<Mutex<Vec<Vec<ChatTurn>>>>,
}

#[async_trait]
impl LLMProvider for RecordingProvider {
    async fn complete(
        &self,
        turns: &[ChatTurn],
        _options: &CompletionOptions,
    ) -> Result<CompletionResponse, EditorError> {
        self.requests.lock().expect("lock").push(turns.to_vec());
        Ok(CompletionResponse {
            content: self.reply.clone(),
            prompt_tokens: 0,
            completion_tokens: 0,
        })
    }

    fn model(&self) -> &str {
        "recording"
    }
}

impl ProviderConnector for RecordingConnector {
    fn open(&self, _credential: &str) -> Result<Box<dyn LLMProvider>, EditorError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(RecordingProvider {
            reply: self.reply.clone(),
            requests: Arc::clone(&self.requests),
        }))
    }
}
