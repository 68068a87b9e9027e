pub mod client;
pub mod extract;
pub mod prompt;

use thiserror::Error;

use prompt::LlmPrompt;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("{0} API key not configured")]
    NotConfigured(&'static str),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("LLM error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("{0}")]
    Parse(String),
}

/// Text/code generation service invoked with a role-tagged prompt.
pub trait Oracle {
    fn generate(&self, prompt: &LlmPrompt) -> Result<String, OracleError>;
}
