//! Errors raised while building an [`Agent`](crate::Agent).

use std::path::PathBuf;

use thiserror::Error;

/// Why an agent could not be constructed.
///
/// Chat-time failures are not listed here: they are the provider's
/// [`ProviderError`](parley_providers::ProviderError), passed through as-is.
#[derive(Error, Debug)]
pub enum AgentError {
    /// A prompt or intro file is missing or unreadable.
    #[error("file not found or unreadable: {}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The intro file is not a JSON object.
    #[error("invalid JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl AgentError {
    /// The file that failed to load.
    pub fn path(&self) -> &std::path::Path {
        match self {
            AgentError::NotFound { path, .. } | AgentError::Parse { path, .. } => path,
        }
    }
}
