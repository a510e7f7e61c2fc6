//! Prompt and intro-message loading.
//!
//! The prompt file is plain UTF-8 text used verbatim as the system prompt.
//! The intro file is a JSON object of canned openers keyed by role or purpose:
//!
//! ```json
//! { "greeting": "Hi! Ready to practise?", "hotel_checkin": "Welcome to the Grand..." }
//! ```

use std::path::Path;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::AgentError;

/// Intro messages in file order.
pub type IntroMessages = IndexMap<String, serde_json::Value>;

/// Read the whole prompt file.
///
/// Any read failure, including invalid UTF-8, is reported as `NotFound`.
pub fn load_prompt(path: &Path) -> Result<String, AgentError> {
    let prompt = std::fs::read_to_string(path).map_err(|source| AgentError::NotFound {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(file = %path.display(), bytes = prompt.len(), "loaded prompt");
    Ok(prompt)
}

/// Parse the intro file.
///
/// Valid JSON whose top level is not an object is a `Parse` error too.
pub fn load_intro(path: &Path) -> Result<IntroMessages, AgentError> {
    let content = std::fs::read_to_string(path).map_err(|source| AgentError::NotFound {
        path: path.to_path_buf(),
        source,
    })?;
    let intro: IntroMessages =
        serde_json::from_str(&content).map_err(|source| AgentError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(file = %path.display(), entries = intro.len(), "loaded intro messages");
    Ok(intro)
}

/// Render an intro value as chat text: strings as-is, anything else as compact JSON.
pub fn intro_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
