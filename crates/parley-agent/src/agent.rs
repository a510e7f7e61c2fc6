//! The agent: a named chat session bound to a prompt and a set of intro messages.
//!
//! Construction loads both files up front and either returns a complete
//! [`Agent`] or an [`AgentError`]; nothing half-built is ever handed out.
//! After that the agent is read-only, except for the turns its history
//! client records in the session store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use parley_core::session::SessionManager;
use parley_core::types::Message;
use parley_providers::{LlmProvider, LlmRequestConfig, ProviderError};

use crate::client::{ChatClient, HistoryClient, DEFAULT_HISTORY_WINDOW};
use crate::error::AgentError;
use crate::loader::{self, IntroMessages};
use crate::log::{ChatLog, TracingChatLog};

// ─────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────

/// A prompt-bound chat agent.
///
/// Calls on one session are not ordered against each other, but every
/// completed exchange is recorded as one user/assistant pair. Callers that
/// need strict turn order should serialize calls per session.
pub struct Agent {
    name: String,
    session_id: String,
    prompt: String,
    intro_messages: IntroMessages,
    chat_client: ChatClient,
    history_client: HistoryClient,
    log: Arc<dyn ChatLog>,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("session_id", &self.session_id)
            .field("intro_messages", &self.intro_messages.len())
            .field("history_client", &self.history_client)
            .finish()
    }
}

impl Agent {
    /// Load `prompt_file` and, if given, `intro_file`, then wire both clients
    /// with default collaborators (in-memory history, tracing log).
    pub fn new(
        name: impl Into<String>,
        prompt_file: impl Into<PathBuf>,
        intro_file: Option<&Path>,
        provider: Arc<dyn LlmProvider>,
    ) -> Result<Self, AgentError> {
        let mut builder = Self::builder(name, prompt_file, provider);
        if let Some(path) = intro_file {
            builder = builder.intro_file(path);
        }
        builder.build()
    }

    /// Start configuring an agent with non-default collaborators.
    pub fn builder(
        name: impl Into<String>,
        prompt_file: impl Into<PathBuf>,
        provider: Arc<dyn LlmProvider>,
    ) -> AgentBuilder {
        AgentBuilder {
            name: name.into(),
            prompt_file: prompt_file.into(),
            intro_file: None,
            provider,
            session_id: None,
            sessions: None,
            log: None,
            model: None,
            request_config: LlmRequestConfig::default(),
            max_history: DEFAULT_HISTORY_WINDOW,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The session this agent chats in by default. Defaults to its name.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn intro_messages(&self) -> &IntroMessages {
        &self.intro_messages
    }

    /// The stateless, prompt-bound client.
    pub fn chat_client(&self) -> &ChatClient {
        &self.chat_client
    }

    pub fn history_client(&self) -> &HistoryClient {
        &self.history_client
    }

    /// Send `message` in the agent's own session and return the reply text.
    ///
    /// Makes exactly one model call and logs `[ChatBot][<name>] <reply>` once.
    /// Provider errors are returned as-is and nothing is logged for them.
    pub async fn chat_with_history(&self, message: &str) -> Result<String, ProviderError> {
        self.chat_with_history_in(&self.session_id, message).await
    }

    /// Like [`chat_with_history`](Self::chat_with_history), in another session.
    pub async fn chat_with_history_in(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<String, ProviderError> {
        let reply = self.history_client.invoke(message, session_id).await?;
        self.log
            .debug(&format!("[ChatBot][{}] {}", self.name, reply.content));
        Ok(reply.content)
    }

    /// Clear the agent's session and seed it with an intro message.
    ///
    /// Picks the intro under `intro_key`, or the first one when `None`, and
    /// records it as the assistant's opening turn. Returns `None`, leaving
    /// the session empty, when there is no such intro.
    pub fn start_new_session(&self, intro_key: Option<&str>) -> Option<String> {
        self.reset_session();

        let value = match intro_key {
            Some(key) => self.intro_messages.get(key),
            None => self.intro_messages.values().next(),
        }?;

        let text = loader::intro_text(value);
        self.history_client
            .sessions()
            .add_message(&self.session_id, Message::assistant(text.clone()));
        debug!(agent = %self.name, intro = intro_key.unwrap_or("<first>"), "session started");
        Some(text)
    }

    /// Forget every turn of the agent's session.
    pub fn reset_session(&self) {
        self.history_client.sessions().clear(&self.session_id);
    }

    /// The turns recorded so far in the agent's session.
    pub fn history(&self) -> Vec<Message> {
        self.history_client
            .sessions()
            .get_or_create(&self.session_id)
            .messages
    }
}

// ─────────────────────────────────────────────
// Builder
// ─────────────────────────────────────────────

/// Configures and builds an [`Agent`].
pub struct AgentBuilder {
    name: String,
    prompt_file: PathBuf,
    intro_file: Option<PathBuf>,
    provider: Arc<dyn LlmProvider>,
    session_id: Option<String>,
    sessions: Option<Arc<SessionManager>>,
    log: Option<Arc<dyn ChatLog>>,
    model: Option<String>,
    request_config: LlmRequestConfig,
    max_history: usize,
}

impl AgentBuilder {
    /// JSON object of intro messages. Without one the agent has none.
    pub fn intro_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.intro_file = Some(path.into());
        self
    }

    /// Default session id; the agent name otherwise.
    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Shared history store; a private in-memory one otherwise.
    pub fn sessions(mut self, sessions: Arc<SessionManager>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    /// Where chat-exchange lines go; `tracing` otherwise.
    pub fn log(mut self, log: Arc<dyn ChatLog>) -> Self {
        self.log = Some(log);
        self
    }

    /// Model id; the provider's default otherwise.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn request_config(mut self, config: LlmRequestConfig) -> Self {
        self.request_config = config;
        self
    }

    /// How many past turns are replayed per call.
    pub fn max_history(mut self, max_messages: usize) -> Self {
        self.max_history = max_messages;
        self
    }

    /// Load the prompt and intro files and wire the clients.
    ///
    /// Fails with `NotFound` for a missing or unreadable file and `Parse`
    /// for an intro file that is not a JSON object.
    pub fn build(self) -> Result<Agent, AgentError> {
        let prompt = loader::load_prompt(&self.prompt_file)?;
        let intro_messages = match &self.intro_file {
            Some(path) => loader::load_intro(path)?,
            None => IntroMessages::new(),
        };

        let chat_client = ChatClient::new(self.provider, prompt.clone(), self.model, self.request_config);
        let sessions = self
            .sessions
            .unwrap_or_else(|| Arc::new(SessionManager::in_memory()));
        let history_client = HistoryClient::new(chat_client.clone(), sessions, self.max_history);

        let session_id = self.session_id.unwrap_or_else(|| self.name.clone());

        info!(
            agent = %self.name,
            session = %session_id,
            model = chat_client.model(),
            intro_messages = intro_messages.len(),
            "agent initialized"
        );

        Ok(Agent {
            name: self.name,
            session_id,
            prompt,
            intro_messages,
            chat_client,
            history_client,
            log: self.log.unwrap_or_else(|| Arc::new(TracingChatLog)),
        })
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CapturedOutput, MockProvider, RecordingLog};
    use serde_json::json;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        prompt: PathBuf,
        intro: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let prompt = dir.path().join("mock_prompt.txt");
        std::fs::write(&prompt, "Test Prompt").unwrap();
        let intro = dir.path().join("mock_intro.json");
        std::fs::write(&intro, r#"{"intro": "test"}"#).unwrap();
        Fixture {
            _dir: dir,
            prompt,
            intro,
        }
    }

    fn test_agent(
        fx: &Fixture,
        provider: Arc<MockProvider>,
    ) -> (Agent, Arc<RecordingLog>) {
        let log = Arc::new(RecordingLog::default());
        let agent = Agent::builder("TestAgent", &fx.prompt, provider)
            .intro_file(&fx.intro)
            .log(log.clone())
            .build()
            .unwrap();
        (agent, log)
    }

    // ── Construction ──

    #[test]
    fn loads_prompt_and_intro() {
        let fx = fixture();
        let provider = Arc::new(MockProvider::replies(["unused"]));
        let agent = Agent::new("TestAgent", &fx.prompt, Some(fx.intro.as_path()), provider).unwrap();

        assert_eq!(agent.name(), "TestAgent");
        assert_eq!(agent.prompt(), "Test Prompt");
        assert_eq!(agent.intro_messages().len(), 1);
        assert_eq!(agent.intro_messages()["intro"], json!("test"));
    }

    #[test]
    fn builds_both_clients_from_prompt() {
        let fx = fixture();
        let (agent, _) = test_agent(&fx, Arc::new(MockProvider::replies(["unused"])));

        assert_eq!(agent.chat_client().system_prompt(), "Test Prompt");
        assert_eq!(agent.history_client().inner().system_prompt(), "Test Prompt");
        assert_eq!(agent.chat_client().model(), "mock-model");
    }

    #[test]
    fn intro_is_optional() {
        let fx = fixture();
        let agent = Agent::new("TestAgent", &fx.prompt, None, Arc::new(MockProvider::replies(["x"]))).unwrap();
        assert!(agent.intro_messages().is_empty());
    }

    #[test]
    fn missing_prompt_fails_with_not_found() {
        let fx = fixture();
        let missing = fx.prompt.with_file_name("invalid_prompt.txt");
        let err = Agent::new("TestAgent", &missing, None, Arc::new(MockProvider::replies(["x"])))
            .unwrap_err();

        assert!(matches!(err, AgentError::NotFound { .. }));
        assert_eq!(err.path(), missing.as_path());
    }

    #[test]
    fn missing_intro_fails_with_not_found() {
        let fx = fixture();
        let missing = fx.intro.with_file_name("invalid_intro.json");
        let err = Agent::new(
            "TestAgent",
            &fx.prompt,
            Some(missing.as_path()),
            Arc::new(MockProvider::replies(["x"])),
        )
        .unwrap_err();

        assert!(matches!(err, AgentError::NotFound { .. }));
    }

    #[test]
    fn invalid_intro_json_fails_with_parse_error() {
        let fx = fixture();
        std::fs::write(&fx.intro, "{ not json").unwrap();
        let err = Agent::new(
            "TestAgent",
            &fx.prompt,
            Some(fx.intro.as_path()),
            Arc::new(MockProvider::replies(["x"])),
        )
        .unwrap_err();

        assert!(matches!(err, AgentError::Parse { .. }));
    }

    #[test]
    fn construction_makes_no_model_calls() {
        let fx = fixture();
        let provider = Arc::new(MockProvider::replies(["x"]));
        let _ = test_agent(&fx, provider.clone());
        assert!(provider.calls().is_empty());
    }

    #[test]
    fn session_id_defaults_to_name() {
        let fx = fixture();
        let (agent, _) = test_agent(&fx, Arc::new(MockProvider::replies(["x"])));
        assert_eq!(agent.session_id(), "TestAgent");

        let custom = Agent::builder("TestAgent", &fx.prompt, Arc::new(MockProvider::replies(["x"])))
            .session_id("cli:default")
            .build()
            .unwrap();
        assert_eq!(custom.session_id(), "cli:default");
    }

    // ── chat_with_history ──

    #[tokio::test]
    async fn chat_returns_content_and_logs_once() {
        let fx = fixture();
        let provider = Arc::new(MockProvider::replies(["Hello!"]));
        let (agent, log) = test_agent(&fx, provider.clone());

        let response = agent.chat_with_history("Hello").await.unwrap();

        assert_eq!(response, "Hello!");
        assert_eq!(provider.calls().len(), 1);
        assert_eq!(log.lines(), vec!["[ChatBot][TestAgent] Hello!".to_string()]);
    }

    #[tokio::test]
    async fn chat_passes_message_and_reply_through_unchanged() {
        let fx = fixture();
        let provider = Arc::new(MockProvider::replies(["  spaced reply \n"]));
        let (agent, log) = test_agent(&fx, provider.clone());

        let response = agent.chat_with_history("").await.unwrap();

        assert_eq!(response, "  spaced reply \n");
        assert_eq!(provider.calls()[0].last(), Some(&Message::user("")));
        assert_eq!(log.lines(), vec!["[ChatBot][TestAgent]   spaced reply \n".to_string()]);
    }

    #[tokio::test]
    async fn chat_threads_history_between_calls() {
        let fx = fixture();
        let provider = Arc::new(MockProvider::replies(["Hi, I'm your tutor.", "You said hello."]));
        let (agent, log) = test_agent(&fx, provider.clone());

        agent.chat_with_history("Hello").await.unwrap();
        agent.chat_with_history("What did I say?").await.unwrap();

        assert_eq!(
            provider.calls()[1],
            vec![
                Message::system("Test Prompt"),
                Message::user("Hello"),
                Message::assistant("Hi, I'm your tutor."),
                Message::user("What did I say?"),
            ]
        );
        assert_eq!(log.lines().len(), 2);
        assert_eq!(agent.history().len(), 4);
    }

    #[tokio::test]
    async fn chat_error_propagates_without_logging() {
        let fx = fixture();
        let provider = Arc::new(MockProvider::from_responses(vec![Err(MockProvider::api_error(503))]));
        let (agent, log) = test_agent(&fx, provider.clone());

        let err = agent.chat_with_history("Hello").await.unwrap_err();

        assert_eq!(err.status(), Some(503));
        assert_eq!(provider.calls().len(), 1);
        assert!(log.lines().is_empty());
        assert!(agent.history().is_empty());
    }

    #[tokio::test]
    async fn chat_in_other_session_is_isolated() {
        let fx = fixture();
        let provider = Arc::new(MockProvider::replies(["own", "other"]));
        let (agent, log) = test_agent(&fx, provider.clone());

        agent.chat_with_history("mine").await.unwrap();
        let reply = agent.chat_with_history_in("guest", "theirs").await.unwrap();

        assert_eq!(reply, "other");
        assert_eq!(provider.calls()[1].len(), 2);
        assert_eq!(log.lines()[1], "[ChatBot][TestAgent] other");
        assert_eq!(agent.history().len(), 2);
    }

    #[tokio::test]
    async fn agents_can_share_a_persistent_store() {
        let fx = fixture();
        let dir = tempfile::tempdir().unwrap();
        let sessions = Arc::new(SessionManager::persistent(Some(dir.path().to_path_buf())).unwrap());

        let agent = Agent::builder("Tutor", &fx.prompt, Arc::new(MockProvider::replies(["saved"])))
            .sessions(sessions)
            .build()
            .unwrap();
        agent.chat_with_history("remember me").await.unwrap();

        let reopened = SessionManager::persistent(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(
            reopened.get_history("Tutor", 10),
            vec![Message::user("remember me"), Message::assistant("saved")]
        );
    }

    #[tokio::test]
    async fn default_log_emits_one_debug_event() {
        let output = CapturedOutput::default();
        let _guard = tracing::subscriber::set_default(output.subscriber(tracing::Level::DEBUG));

        let fx = fixture();
        let agent = Agent::new(
            "TestAgent",
            &fx.prompt,
            None,
            Arc::new(MockProvider::replies(["Hello!"])),
        )
        .unwrap();
        assert_eq!(agent.chat_with_history("Hello").await.unwrap(), "Hello!");

        let chat_lines: Vec<String> = output
            .lines()
            .into_iter()
            .filter(|l| l.contains("[ChatBot]"))
            .collect();
        assert_eq!(chat_lines.len(), 1);
        assert_eq!(chat_lines[0].trim(), "DEBUG [ChatBot][TestAgent] Hello!");
    }

    #[tokio::test]
    async fn default_log_is_silent_above_debug() {
        let output = CapturedOutput::default();
        let _guard = tracing::subscriber::set_default(output.subscriber(tracing::Level::INFO));

        let fx = fixture();
        let agent = Agent::new(
            "TestAgent",
            &fx.prompt,
            None,
            Arc::new(MockProvider::replies(["Hello!"])),
        )
        .unwrap();
        agent.chat_with_history("Hello").await.unwrap();

        assert!(output.lines().iter().all(|l| !l.contains("[ChatBot]")));
    }

    // ── Sessions ──

    #[tokio::test]
    async fn start_new_session_seeds_intro() {
        let fx = fixture();
        let provider = Arc::new(MockProvider::replies(["before", "after"]));
        let (agent, _) = test_agent(&fx, provider.clone());

        agent.chat_with_history("old turn").await.unwrap();
        let intro = agent.start_new_session(None);

        assert_eq!(intro.as_deref(), Some("test"));
        assert_eq!(agent.history(), vec![Message::assistant("test")]);

        agent.chat_with_history("Hello").await.unwrap();
        assert_eq!(
            provider.calls()[1],
            vec![
                Message::system("Test Prompt"),
                Message::assistant("test"),
                Message::user("Hello"),
            ]
        );
    }

    #[test]
    fn start_new_session_by_key() {
        let fx = fixture();
        std::fs::write(
            &fx.intro,
            r#"{"greeting": "Hi!", "hotel": "Welcome to the Grand.", "meta": {"level": 2}}"#,
        )
        .unwrap();
        let (agent, _) = test_agent(&fx, Arc::new(MockProvider::replies(["x"])));

        assert_eq!(agent.start_new_session(Some("hotel")).as_deref(), Some("Welcome to the Grand."));
        assert_eq!(agent.start_new_session(Some("meta")).as_deref(), Some(r#"{"level":2}"#));
        assert_eq!(agent.history().len(), 1);
    }

    #[test]
    fn start_new_session_without_intro_just_clears() {
        let fx = fixture();
        let (agent, _) = test_agent(&fx, Arc::new(MockProvider::replies(["x"])));
        agent
            .history_client()
            .sessions()
            .add_message(agent.session_id(), Message::user("stale"));

        assert_eq!(agent.start_new_session(Some("missing")), None);
        assert!(agent.history().is_empty());
    }

    #[test]
    fn reset_session_clears_history() {
        let fx = fixture();
        let (agent, _) = test_agent(&fx, Arc::new(MockProvider::replies(["x"])));
        agent.start_new_session(None);
        agent.reset_session();
        assert!(agent.history().is_empty());
    }
}
