use std::collections::BTreeSet;

use serde::Serialize;

/// Where in the build a diagnostic came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    Compilation,
    Runtime,
}

/// One classified problem extracted from build output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticRecord {
    pub kind: DiagnosticKind,
    pub origin_file: String,
    pub line: Option<u32>,
    pub message: String,
    pub details: Vec<String>,
}

impl DiagnosticRecord {
    /// Identity used for deduplication: message followed by every detail.
    pub fn dedup_key(&self) -> String {
        let mut key = self.message.clone();
        for d in &self.details {
            key.push('\n');
            key.push_str(d);
        }
        key
    }

    /// Text handed back to the oracle as part of the error log.
    pub fn render(&self) -> String {
        match self.kind {
            DiagnosticKind::Compilation => {
                let mut out = match self.line {
                    Some(n) => format!("Line {}: {}", n, self.message),
                    None => self.message.clone(),
                };
                for d in &self.details {
                    out.push_str("\n      ");
                    out.push_str(d);
                }
                out
            }
            DiagnosticKind::Runtime => {
                let mut out = format!("❌ {}", self.message);
                for d in &self.details {
                    out.push_str("\n   ");
                    out.push_str(d);
                }
                out
            }
        }
    }
}

/// Result of analyzing one build run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildOutcome {
    pub succeeded: bool,
    pub relevant: Vec<DiagnosticRecord>,
    pub unrelated_files: BTreeSet<String>,
}

impl BuildOutcome {
    pub fn rendered(&self) -> Vec<String> {
        self.relevant.iter().map(DiagnosticRecord::render).collect()
    }

    /// Error log carried into the next repair attempt.
    pub fn relevant_text(&self) -> String {
        self.rendered().join("\n")
    }

    pub fn has_unrelated_breakage(&self) -> bool {
        !self.unrelated_files.is_empty()
    }
}
