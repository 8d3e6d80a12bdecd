pub mod client;
pub mod provider;
pub mod providers;

pub use client::{GenerationClient, SessionSettings};
pub use provider::{ChatTurn, LLMProvider, ProviderConnector, Role};
