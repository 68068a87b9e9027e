use thiserror::Error;

use crate::llm::OracleError;
use crate::source::SourceError;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Oracle(#[from] OracleError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
