//! Errors surfaced by LLM providers.

use thiserror::Error;

/// Failure of a single chat completion call.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Transport failure: connect, timeout, TLS.
    #[error("HTTP request to {provider} failed: {source}")]
    Http {
        provider: String,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-success status.
    #[error("{provider} API error (status {status}): {body}")]
    Api {
        provider: String,
        status: u16,
        body: String,
    },

    /// The response body was not a chat completion.
    #[error("failed to decode {provider} response: {message}")]
    Decode { provider: String, message: String },

    /// A well-formed response with no choices in it.
    #[error("{provider} returned no choices")]
    EmptyChoices { provider: String },

    /// No configured provider can serve the requested model.
    #[error(
        "No configured provider found for model '{model}'. \
         Set an API key (e.g. PARLEY_PROVIDERS__OPENAI__API_KEY) or an Ollama api base."
    )]
    NoProvider { model: String },

    /// The HTTP client itself could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ProviderError {
    /// HTTP status for API errors, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
