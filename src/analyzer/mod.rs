pub mod maven;
pub mod types;

pub use maven::analyze;
pub use types::{BuildOutcome, DiagnosticKind, DiagnosticRecord};
