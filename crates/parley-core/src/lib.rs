//! Parley core — shared types, configuration, and conversation history.
//!
//! - **types**: chat messages, completion request/response, sessions
//! - **config**: `~/.parley/config.json` schema and loader
//! - **session**: per-session history store (in-memory, optional JSONL on disk)
//! - **utils**: data paths and string helpers

pub mod config;
pub mod session;
pub mod types;
pub mod utils;

pub use session::SessionManager;
pub use types::{LlmResponse, Message, Session};
