//! Chat-exchange logging.
//!
//! Every agent reply is reported as one line, `[ChatBot][<name>] <content>`,
//! to a [`ChatLog`] held by the agent. The default forwards to `tracing`.

/// Sink for chat-exchange lines.
pub trait ChatLog: Send + Sync {
    /// Record one debug-level line.
    fn debug(&self, line: &str);
}

/// Emits each line as a `tracing` debug event.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingChatLog;

impl ChatLog for TracingChatLog {
    fn debug(&self, line: &str) {
        tracing::debug!("{line}");
    }
}
