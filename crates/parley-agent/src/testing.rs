//! Test doubles for the provider and the chat log.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use parley_core::types::{LlmResponse, Message};
use parley_providers::{LlmProvider, LlmRequestConfig, ProviderError};

use crate::log::ChatLog;

/// Returns canned responses in order and records every message list it saw.
pub struct MockProvider {
    responses: Mutex<VecDeque<Result<LlmResponse, ProviderError>>>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl MockProvider {
    pub fn from_responses(responses: Vec<Result<LlmResponse, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn replies<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_responses(texts.into_iter().map(|t| Ok(LlmResponse::text(t))).collect())
    }

    pub fn api_error(status: u16) -> ProviderError {
        ProviderError::Api {
            provider: "MockProvider".into(),
            status,
            body: "boom".into(),
        }
    }

    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn chat(
        &self,
        messages: &[Message],
        _model: &str,
        _config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(LlmResponse::text("(no more responses)")))
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    fn display_name(&self) -> &str {
        "MockProvider"
    }
}

/// Keeps every logged line.
#[derive(Default)]
pub struct RecordingLog {
    lines: Mutex<Vec<String>>,
}

impl RecordingLog {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl ChatLog for RecordingLog {
    fn debug(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}

/// A `tracing` writer that keeps formatted output in memory.
#[derive(Clone, Default)]
pub struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

impl CapturedOutput {
    /// A plain-text subscriber writing here, at `max_level` and above.
    pub fn subscriber(&self, max_level: tracing::Level) -> impl tracing::Subscriber + Send + Sync {
        tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_max_level(max_level)
            .with_ansi(false)
            .without_time()
            .with_target(false)
            .finish()
    }

    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl std::io::Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedOutput {
    type Writer = CapturedOutput;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
