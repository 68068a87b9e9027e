use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, VecDeque};
use std::io;
use std::path::{Path, PathBuf};

use jtester::executor::{BuildRun, BuildRunner};
use jtester::llm::prompt::LlmPrompt;
use jtester::llm::{Oracle, OracleError};
use jtester::machine::{ExhaustReason, RunOutcome};
use jtester::orchestrator::{Collaborators, Orchestrator};
use jtester::source::{parse_java_source, SourceUnit};
use jtester::testgen::SourceStore;

const TARGET: &str = "package com.dummy;\n\npublic class Foo {\n    public int bar() { return 1; }\n}\n";

const RELEVANT_FAILURE: &str = "[ERROR] /p/src/test/java/com/dummy/FooTest.java:[10,5] cannot find symbol\n[ERROR]   symbol:   variable bar\n[INFO] BUILD FAILURE";

const UNRELATED_FAILURE: &str = "[ERROR] /p/src/main/java/com/dummy/OtherClass.java:[3,1] incompatible types\n[INFO] BUILD FAILURE";

/* ---------- fakes ---------- */

#[derive(Default)]
struct ScriptedOracle {
    generations: Cell<u32>,
    diagnoses: Cell<u32>,
    fixes: Cell<u32>,
    fail_generation: bool,
    seen: RefCell<Vec<String>>,
}

impl Oracle for ScriptedOracle {
    fn generate(&self, prompt: &LlmPrompt) -> Result<String, OracleError> {
        self.seen.borrow_mut().push(prompt.user.clone());

        if prompt.user.starts_with("Write a unit test class") {
            self.generations.set(self.generations.get() + 1);
            if self.fail_generation {
                return Err(OracleError::Parse("connection refused".into()));
            }
            Ok("```java\nclass FooTest { /* v0 */ }\n```".into())
        } else if prompt.user.starts_with("The test for") {
            self.diagnoses.set(self.diagnoses.get() + 1);
            Ok("  Missing import for Bar.  ".into())
        } else {
            let n = self.fixes.get() + 1;
            self.fixes.set(n);
            Ok(format!("```java\nclass FooTest {{ /* v{n} */ }}\n```"))
        }
    }
}

struct ScriptedRunner {
    outputs: RefCell<VecDeque<&'static str>>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    fn new(outputs: &[&'static str]) -> Self {
        Self {
            outputs: RefCell::new(outputs.iter().copied().collect()),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl BuildRunner for ScriptedRunner {
    fn run(&self, test_identifier: &str) -> BuildRun {
        self.calls.borrow_mut().push(test_identifier.to_string());
        let output = self
            .outputs
            .borrow_mut()
            .pop_front()
            .unwrap_or(RELEVANT_FAILURE);
        BuildRun {
            success: output.contains("BUILD SUCCESS"),
            output: output.to_string(),
            duration_ms: 5,
        }
    }
}

#[derive(Default)]
struct MemoryStore {
    writes: RefCell<Vec<(PathBuf, String)>>,
}

impl SourceStore for MemoryStore {
    fn write_test(&self, class_name: &str, package: &str, code: &str) -> io::Result<PathBuf> {
        let path = PathBuf::from(format!("{}/{class_name}.java", package.replace('.', "/")));
        self.writes
            .borrow_mut()
            .push((path.clone(), code.to_string()));
        Ok(path)
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        self.writes
            .borrow()
            .iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, c)| c.clone())
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }
}

fn unit() -> SourceUnit {
    parse_java_source(TARGET).unwrap()
}

fn drive(
    unit: &SourceUnit,
    oracle: &ScriptedOracle,
    runner: &ScriptedRunner,
    store: &MemoryStore,
    max: u32,
) -> (RunOutcome, jtester::report::RunReport) {
    Orchestrator::new(
        unit,
        "\n--- Dependency: Bar ---\npublic int baz();\n".into(),
        Collaborators {
            oracle,
            runner,
            store,
        },
        max,
    )
    .run()
    .unwrap()
}

/* ---------- scenarios ---------- */

#[test]
fn passes_on_first_attempt() {
    let (oracle, store) = (ScriptedOracle::default(), MemoryStore::default());
    let runner = ScriptedRunner::new(&["[INFO] BUILD SUCCESS"]);

    let (outcome, report) = drive(&unit(), &oracle, &runner, &store, 3);

    assert_eq!(
        outcome,
        RunOutcome::Succeeded {
            attempts: 1,
            test_path: PathBuf::from("com/dummy/FooTest.java"),
        }
    );
    assert_eq!(*runner.calls.borrow(), vec!["com.dummy.FooTest"]);
    assert_eq!(oracle.diagnoses.get(), 0);
    assert_eq!(store.writes.borrow()[0].1, "class FooTest { /* v0 */ }");
    assert_eq!(report.attempts.len(), 1);
    assert!(report.outcome.is_some());
}

#[test]
fn repairs_then_passes_on_second_attempt() {
    let (oracle, store) = (ScriptedOracle::default(), MemoryStore::default());
    let runner = ScriptedRunner::new(&[RELEVANT_FAILURE, "[INFO] BUILD SUCCESS"]);

    let (outcome, report) = drive(&unit(), &oracle, &runner, &store, 3);

    assert!(matches!(outcome, RunOutcome::Succeeded { attempts: 2, .. }));
    assert_eq!(oracle.generations.get(), 1);
    assert_eq!(oracle.diagnoses.get(), 1);
    assert_eq!(oracle.fixes.get(), 1);

    let seen = oracle.seen.borrow();
    assert!(seen[1].contains("Line 10: cannot find symbol"));
    assert!(seen[2].contains("\"Missing import for Bar.\""));

    let writes = store.writes.borrow();
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[1].1, "class FooTest { /* v1 */ }");

    let second = &report.attempts[1];
    assert_eq!(second.diagnosis.as_deref(), Some("Missing import for Bar."));
    assert_eq!(second.prompt_hashes.len(), 2);
    assert!(second.code_changes.is_some());
    assert_eq!(report.attempts[0].diagnostics.len(), 1);
}

#[test]
fn unrelated_breakage_aborts_without_repair() {
    let (oracle, store) = (ScriptedOracle::default(), MemoryStore::default());
    let runner = ScriptedRunner::new(&[UNRELATED_FAILURE]);

    let (outcome, _) = drive(&unit(), &oracle, &runner, &store, 3);

    assert_eq!(
        outcome,
        RunOutcome::AbortedUnrelated {
            attempt: 1,
            files: BTreeSet::from(["OtherClass.java".to_string()]),
        }
    );
    assert_eq!(oracle.diagnoses.get(), 0);
    assert_eq!(runner.calls.borrow().len(), 1);
}

#[test]
fn three_relevant_failures_exhaust_the_budget() {
    let (oracle, store) = (ScriptedOracle::default(), MemoryStore::default());
    let runner = ScriptedRunner::new(&[RELEVANT_FAILURE; 3]);

    let (outcome, report) = drive(&unit(), &oracle, &runner, &store, 3);

    assert_eq!(
        outcome,
        RunOutcome::Exhausted {
            attempts: 3,
            reason: ExhaustReason::RetriesSpent,
        }
    );
    assert_eq!(oracle.generations.get(), 1);
    assert_eq!(oracle.fixes.get(), 2);
    assert_eq!(oracle.seen.borrow().len(), 5);
    assert_eq!(runner.calls.borrow().len(), 3);
    assert_eq!(report.attempts.len(), 3);
}

#[test]
fn oracle_failure_ends_the_run_before_any_build() {
    let oracle = ScriptedOracle {
        fail_generation: true,
        ..ScriptedOracle::default()
    };
    let store = MemoryStore::default();
    let runner = ScriptedRunner::new(&[]);

    let (outcome, report) = drive(&unit(), &oracle, &runner, &store, 3);

    assert_eq!(
        outcome,
        RunOutcome::Exhausted {
            attempts: 1,
            reason: ExhaustReason::NoCode,
        }
    );
    assert!(runner.calls.borrow().is_empty());
    assert!(store.writes.borrow().is_empty());
    assert!(report.attempts[0]
        .oracle_error
        .as_deref()
        .unwrap()
        .contains("connection refused"));
}

#[test]
fn single_attempt_budget_never_diagnoses() {
    let (oracle, store) = (ScriptedOracle::default(), MemoryStore::default());
    let runner = ScriptedRunner::new(&[RELEVANT_FAILURE]);

    let (outcome, _) = drive(&unit(), &oracle, &runner, &store, 1);

    assert!(matches!(
        outcome,
        RunOutcome::Exhausted {
            attempts: 1,
            reason: ExhaustReason::RetriesSpent
        }
    ));
    assert_eq!(oracle.seen.borrow().len(), 1);
}
