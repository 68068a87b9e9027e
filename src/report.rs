//! Per-run audit record.
//!
//! One entry per attempt: which prompts were sent, how much the candidate
//! test changed, what the build said about it.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use uuid::Uuid;

use crate::machine::RunOutcome;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CodeChanges {
    pub inserted: usize,
    pub deleted: usize,
}

/// Line-level change stats between two versions of the test.
pub fn code_changes(old: &str, new: &str) -> CodeChanges {
    let diff = TextDiff::from_lines(old, new);
    let mut changes = CodeChanges::default();

    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => changes.inserted += 1,
            ChangeTag::Delete => changes.deleted += 1,
            ChangeTag::Equal => {}
        }
    }

    changes
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AttemptRecord {
    pub number: u32,
    pub prompt_hashes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_changes: Option<CodeChanges>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_duration_ms: Option<u128>,
    pub diagnostics: Vec<String>,
    pub unrelated_files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oracle_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub target_class: String,
    pub test_identifier: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub max_attempts: u32,
    pub context_types: Vec<String>,
    pub attempts: Vec<AttemptRecord>,
    pub outcome: Option<RunOutcome>,
}

impl RunReport {
    pub fn new(target_class: &str, test_identifier: &str, max_attempts: u32) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            target_class: target_class.to_string(),
            test_identifier: test_identifier.to_string(),
            started_at: Utc::now(),
            finished_at: None,
            max_attempts,
            context_types: Vec::new(),
            attempts: Vec::new(),
            outcome: None,
        }
    }

    /// Record for attempt `number`, created on first access.
    pub fn attempt(&mut self, number: u32) -> &mut AttemptRecord {
        let idx = match self.attempts.iter().position(|a| a.number == number) {
            Some(idx) => idx,
            None => {
                self.attempts.push(AttemptRecord {
                    number,
                    ..AttemptRecord::default()
                });
                self.attempts.len() - 1
            }
        };
        &mut self.attempts[idx]
    }

    pub fn finish(&mut self, outcome: RunOutcome) {
        self.finished_at = Some(Utc::now());
        self.outcome = Some(outcome);
    }

    pub fn write(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, text)
    }
}
