//! Chat clients bound to a system prompt.
//!
//! [`ChatClient`] is stateless: every call sends the system prompt followed by
//! exactly the messages it was given. [`HistoryClient`] decorates it, replaying
//! the session's past turns before the new message and recording the exchange
//! once the model has answered.

use std::sync::Arc;

use tracing::trace;

use parley_core::session::SessionManager;
use parley_core::types::Message;
use parley_providers::{LlmProvider, LlmRequestConfig, ProviderError};

/// Default number of past turns replayed per call.
pub const DEFAULT_HISTORY_WINDOW: usize = 50;

/// The model's answer. Only the text is kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatReply {
    pub content: String,
}

// ─────────────────────────────────────────────
// ChatClient
// ─────────────────────────────────────────────

/// A provider handle with the system prompt baked in.
#[derive(Clone)]
pub struct ChatClient {
    provider: Arc<dyn LlmProvider>,
    system_prompt: String,
    model: String,
    request_config: LlmRequestConfig,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("provider", &self.provider.display_name())
            .field("model", &self.model)
            .finish()
    }
}

impl ChatClient {
    /// Bind `system_prompt` to `provider`. `model` defaults to the provider's own.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        system_prompt: impl Into<String>,
        model: Option<String>,
        request_config: LlmRequestConfig,
    ) -> Self {
        let model = model.unwrap_or_else(|| provider.default_model().to_string());
        Self {
            provider,
            system_prompt: system_prompt.into(),
            model,
            request_config,
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send `[system prompt] + messages` in a single completion call.
    pub async fn invoke(&self, messages: &[Message]) -> Result<ChatReply, ProviderError> {
        let mut full = Vec::with_capacity(messages.len() + 1);
        full.push(Message::system(self.system_prompt.clone()));
        full.extend_from_slice(messages);

        let response = self
            .provider
            .chat(&full, &self.model, &self.request_config)
            .await?;

        Ok(ChatReply {
            content: response.content.unwrap_or_default(),
        })
    }
}

// ─────────────────────────────────────────────
// HistoryClient
// ─────────────────────────────────────────────

/// A [`ChatClient`] that threads session history through each call.
#[derive(Clone)]
pub struct HistoryClient {
    inner: ChatClient,
    sessions: Arc<SessionManager>,
    max_messages: usize,
}

impl std::fmt::Debug for HistoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryClient")
            .field("inner", &self.inner)
            .field("persistent", &self.sessions.is_persistent())
            .field("max_messages", &self.max_messages)
            .finish()
    }
}

impl HistoryClient {
    pub fn new(inner: ChatClient, sessions: Arc<SessionManager>, max_messages: usize) -> Self {
        Self {
            inner,
            sessions,
            max_messages,
        }
    }

    /// The wrapped stateless client.
    pub fn inner(&self) -> &ChatClient {
        &self.inner
    }

    /// The store the turns are recorded in.
    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Send `message` after the last `max_messages` turns of `session_id`.
    ///
    /// The user turn and the reply are appended only when the call succeeds,
    /// so a failed call leaves the history untouched.
    pub async fn invoke(&self, message: &str, session_id: &str) -> Result<ChatReply, ProviderError> {
        let mut messages = self.sessions.get_history(session_id, self.max_messages);
        trace!(session = session_id, history = messages.len(), "replaying history");
        messages.push(Message::user(message));

        let reply = self.inner.invoke(&messages).await?;

        self.sessions.add_messages(
            session_id,
            [Message::user(message), Message::assistant(reply.content.clone())],
        );
        Ok(reply)
    }
}
