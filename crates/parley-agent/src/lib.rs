//! Parley Agent — a named chat session bound to a system prompt.
//!
//! This crate contains:
//! - **loader**: prompt and intro-message file loading
//! - **client**: the prompt-bound chat client and its history-aware wrapper
//! - **log**: the sink every chat exchange is reported to
//! - **agent**: the `Agent` itself, tying the above together

pub mod agent;
pub mod client;
pub mod error;
pub mod loader;
pub mod log;

pub use agent::{Agent, AgentBuilder};
pub use client::{ChatClient, ChatReply, HistoryClient};
pub use error::AgentError;
pub use loader::IntroMessages;
pub use log::{ChatLog, TracingChatLog};

#[cfg(test)]
mod testing;
