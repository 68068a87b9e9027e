//! machine.rs
//!
//! Retry lifecycle state machine.
//!
//! Every transition takes the current [`RetryState`] by value and returns
//! its successor; nothing is mutated in place. Side effects (oracle calls,
//! file writes, builds) live in the orchestrator, which feeds their results
//! into the functions below.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;

use crate::analyzer::BuildOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Generating,
    Diagnosing,
    Repairing,
    Executing,
    Analyzing,
    Succeeded,
    AbortedUnrelated,
    Exhausted,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Phase::Succeeded | Phase::AbortedUnrelated | Phase::Exhausted
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustReason {
    /// Every allowed attempt ended in a relevant failure.
    RetriesSpent,
    /// The oracle produced no code (transport failure or empty answer).
    NoCode,
}

/// Terminal result reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Succeeded {
        attempts: u32,
        test_path: PathBuf,
    },
    AbortedUnrelated {
        attempt: u32,
        files: BTreeSet<String>,
    },
    Exhausted {
        attempts: u32,
        reason: ExhaustReason,
    },
}

/// How a finished build steers the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Unrelated(BTreeSet<String>),
    Repair(String),
}

pub fn verdict(outcome: &BuildOutcome) -> Verdict {
    if outcome.succeeded {
        Verdict::Pass
    } else if outcome.has_unrelated_breakage() {
        Verdict::Unrelated(outcome.unrelated_files.clone())
    } else {
        Verdict::Repair(outcome.relevant_text())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryState {
    pub phase: Phase,
    /// 1-indexed.
    pub attempt: u32,
    pub max_attempts: u32,
    pub test_code: Option<String>,
    pub error_log: Option<String>,
    pub diagnosis: Option<String>,
    pub test_path: Option<PathBuf>,
    pub build_output: Option<String>,
    pub unrelated_files: BTreeSet<String>,
    pub exhaust_reason: Option<ExhaustReason>,
}

impl RetryState {
    pub fn new(max_attempts: u32) -> Self {
        let state = Self {
            phase: Phase::Generating,
            attempt: 1,
            max_attempts,
            test_code: None,
            error_log: None,
            diagnosis: None,
            test_path: None,
            build_output: None,
            unrelated_files: BTreeSet::new(),
            exhaust_reason: None,
        };

        if max_attempts == 0 {
            Self {
                attempt: 0,
                ..exhaust(state, ExhaustReason::RetriesSpent)
            }
        } else {
            state
        }
    }

    pub fn outcome(&self) -> Option<RunOutcome> {
        match self.phase {
            Phase::Succeeded => Some(RunOutcome::Succeeded {
                attempts: self.attempt,
                test_path: self.test_path.clone().unwrap_or_default(),
            }),
            Phase::AbortedUnrelated => Some(RunOutcome::AbortedUnrelated {
                attempt: self.attempt,
                files: self.unrelated_files.clone(),
            }),
            Phase::Exhausted => Some(RunOutcome::Exhausted {
                attempts: self.attempt,
                reason: self.exhaust_reason.unwrap_or(ExhaustReason::RetriesSpent),
            }),
            _ => None,
        }
    }
}

fn exhaust(state: RetryState, reason: ExhaustReason) -> RetryState {
    RetryState {
        phase: Phase::Exhausted,
        exhaust_reason: Some(reason),
        ..state
    }
}

/* ---------- transitions ---------- */

/// Generating / Repairing -> Executing, or Exhausted when nothing came back.
pub fn after_code(state: RetryState, code: Option<String>) -> RetryState {
    match code.filter(|c| !c.trim().is_empty()) {
        Some(code) => RetryState {
            phase: Phase::Executing,
            test_code: Some(code),
            ..state
        },
        None => exhaust(
            RetryState {
                test_code: None,
                ..state
            },
            ExhaustReason::NoCode,
        ),
    }
}

/// Diagnosing -> Repairing. An oracle failure aborts the attempt.
pub fn after_diagnosis(state: RetryState, diagnosis: Option<String>) -> RetryState {
    match diagnosis {
        Some(text) => RetryState {
            phase: Phase::Repairing,
            diagnosis: Some(text),
            ..state
        },
        None => exhaust(state, ExhaustReason::NoCode),
    }
}

/// Executing -> Analyzing once the build has run.
pub fn after_build(state: RetryState, test_path: PathBuf, output: String) -> RetryState {
    RetryState {
        phase: Phase::Analyzing,
        test_path: Some(test_path),
        build_output: Some(output),
        ..state
    }
}

/// Analyzing -> Succeeded | AbortedUnrelated | Exhausted | Diagnosing.
pub fn after_analysis(state: RetryState, outcome: &BuildOutcome) -> RetryState {
    match verdict(outcome) {
        Verdict::Pass => RetryState {
            phase: Phase::Succeeded,
            ..state
        },
        Verdict::Unrelated(files) => RetryState {
            phase: Phase::AbortedUnrelated,
            unrelated_files: files,
            ..state
        },
        Verdict::Repair(log) if state.attempt >= state.max_attempts => exhaust(
            RetryState {
                error_log: Some(log),
                ..state
            },
            ExhaustReason::RetriesSpent,
        ),
        Verdict::Repair(log) => RetryState {
            phase: Phase::Diagnosing,
            attempt: state.attempt + 1,
            error_log: Some(log),
            diagnosis: None,
            build_output: None,
            ..state
        },
    }
}
