//! Drives the retry machine through the external collaborators.
//!
//! Strictly sequential: each attempt finishes generation, persistence, build
//! and analysis before the next one starts.

use crate::analyzer::analyze;
use crate::error::AgentError;
use crate::executor::run::BuildRunner;
use crate::llm::extract::extract_code;
use crate::llm::prompt::{diagnosis_prompt, fix_prompt, generation_prompt, LlmPrompt};
use crate::llm::Oracle;
use crate::logger::{log, LogLevel};
use crate::machine::{
    after_analysis, after_build, after_code, after_diagnosis, ExhaustReason, Phase, RetryState,
    RunOutcome,
};
use crate::report::{code_changes, RunReport};
use crate::source::SourceUnit;
use crate::testgen::materialize::SourceStore;

const DIAGNOSIS_PREVIEW: usize = 200;

pub struct Collaborators<'a> {
    pub oracle: &'a dyn Oracle,
    pub runner: &'a dyn BuildRunner,
    pub store: &'a dyn SourceStore,
}

pub struct Orchestrator<'a> {
    unit: &'a SourceUnit,
    context: String,
    deps: Collaborators<'a>,
    report: RunReport,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        unit: &'a SourceUnit,
        context: String,
        deps: Collaborators<'a>,
        max_attempts: u32,
    ) -> Self {
        let report = RunReport::new(&unit.class_name, &unit.test_identifier(), max_attempts);
        Self {
            unit,
            context,
            deps,
            report,
        }
    }

    pub fn with_context_types(mut self, types: Vec<String>) -> Self {
        self.report.context_types = types;
        self
    }

    /// Run until a terminal phase; returns the outcome and the audit record.
    pub fn run(mut self) -> Result<(RunOutcome, RunReport), AgentError> {
        let mut state = RetryState::new(self.report.max_attempts);

        loop {
            if let Some(outcome) = state.outcome() {
                announce(&outcome);
                self.report.finish(outcome.clone());
                return Ok((outcome, self.report));
            }
            state = self.step(state)?;
        }
    }

    fn step(&mut self, state: RetryState) -> Result<RetryState, AgentError> {
        let n = state.attempt;

        match state.phase {
            Phase::Generating => {
                log(LogLevel::Info, format!("--- 🔄 Attempt {}/{} ---", n, state.max_attempts));
                log(LogLevel::Info, "🧠 Generating initial test...");

                let prompt =
                    generation_prompt(&self.unit.class_name, &self.unit.text, &self.context);
                let code = self.ask(n, &prompt).map(|t| extract_code(&t));
                Ok(after_code(state, code))
            }

            Phase::Diagnosing => {
                log(LogLevel::Info, format!("--- 🔄 Attempt {}/{} ---", n, state.max_attempts));
                log(LogLevel::Info, "💡 Step 1: Analyzing previous failure...");

                let prompt = diagnosis_prompt(
                    &self.unit.class_name,
                    &self.unit.text,
                    state.test_code.as_deref().unwrap_or_default(),
                    state.error_log.as_deref().unwrap_or_default(),
                    &self.context,
                );
                let diagnosis = self.ask(n, &prompt).map(|t| t.trim().to_string());

                if let Some(text) = &diagnosis {
                    let preview: String = text.chars().take(DIAGNOSIS_PREVIEW).collect();
                    log(LogLevel::Info, format!("   > Diagnosis: {preview}..."));
                    self.report.attempt(n).diagnosis = Some(text.clone());
                }
                Ok(after_diagnosis(state, diagnosis))
            }

            Phase::Repairing => {
                log(LogLevel::Info, "💡 Step 2: Generating fix based on diagnosis...");

                let prompt = fix_prompt(
                    &self.unit.class_name,
                    &self.unit.text,
                    state.test_code.as_deref().unwrap_or_default(),
                    state.error_log.as_deref().unwrap_or_default(),
                    state.diagnosis.as_deref().unwrap_or_default(),
                    &self.context,
                );
                let code = self.ask(n, &prompt).map(|t| extract_code(&t));

                if let (Some(old), Some(new)) = (&state.test_code, &code) {
                    self.report.attempt(n).code_changes = Some(code_changes(old, new));
                }
                Ok(after_code(state, code))
            }

            Phase::Executing => {
                let Some(code) = state.test_code.as_deref() else {
                    return Ok(after_code(state, None));
                };

                let path = self.deps.store.write_test(
                    &self.unit.test_class_name(),
                    &self.unit.package,
                    code,
                )?;
                log(LogLevel::Info, format!("📝 Test written to {}", path.display()));

                log(LogLevel::Info, "⏳ Running Maven test...");
                let run = self.deps.runner.run(&self.unit.test_identifier());

                let record = self.report.attempt(n);
                record.build_success = Some(run.success);
                record.build_duration_ms = Some(run.duration_ms);

                Ok(after_build(state, path, run.output))
            }

            Phase::Analyzing => {
                let outcome = analyze(
                    state.build_output.as_deref().unwrap_or_default(),
                    &self.unit.test_class_name(),
                );

                let record = self.report.attempt(n);
                record.diagnostics = outcome.rendered();
                record.unrelated_files = outcome.unrelated_files.iter().cloned().collect();

                if !outcome.succeeded && !outcome.has_unrelated_breakage() {
                    log(LogLevel::Warn, "⚠️ Test Failed (Relevant Errors):");
                    log(LogLevel::Warn, outcome.relevant_text());
                }
                Ok(after_analysis(state, &outcome))
            }

            Phase::Succeeded | Phase::AbortedUnrelated | Phase::Exhausted => Ok(state),
        }
    }

    /// Oracle failures are logged and recorded, never propagated.
    fn ask(&mut self, attempt: u32, prompt: &LlmPrompt) -> Option<String> {
        self.report.attempt(attempt).prompt_hashes.push(prompt.hash());

        match self.deps.oracle.generate(prompt) {
            Ok(text) => Some(text),
            Err(e) => {
                log(LogLevel::Error, format!("❌ Error communicating with the model: {e}"));
                self.report.attempt(attempt).oracle_error = Some(e.to_string());
                None
            }
        }
    }
}

fn announce(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Succeeded { attempts, .. } => {
            log(
                LogLevel::Success,
                format!("🎉 SUCCESS! Test passed on attempt {attempts}."),
            );
        }
        RunOutcome::AbortedUnrelated { files, .. } => {
            log(LogLevel::Error, "⛔ CRITICAL STOP: Unrelated Compilation Errors Detected!");
            log(
                LogLevel::Error,
                "The agent cannot run tests because other files in your project are broken:",
            );
            for f in files {
                log(LogLevel::Error, format!("   > {f}"));
            }
            log(LogLevel::Error, "Action: Please fix these files and try again.");
        }
        RunOutcome::Exhausted {
            reason: ExhaustReason::NoCode,
            ..
        } => {
            log(LogLevel::Error, "❌ Failed to generate code.");
        }
        RunOutcome::Exhausted { attempts, .. } => {
            log(LogLevel::Error, format!("❌ Failed after {attempts} attempts."));
        }
    }
}
