//! Conversation history store.
//!
//! Sessions always live in an in-memory cache. When a sessions directory is
//! configured each session is also mirrored to `{dir}/{safe_key}.jsonl`:
//! - Line 1: `{"_type": "metadata", "created_at": "...", "updated_at": "...", "metadata": {}}`
//! - Lines 2+: `{"role": "user", "content": "hello"}`

pub mod manager;

pub use manager::{SessionManager, SessionSummary};
