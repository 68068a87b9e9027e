//! Maven / Surefire build-log analysis.
//!
//! Single forward pass over the combined build output. Compilation errors are
//! attributed to a file through the `Name.java:[line,col]` locator; test
//! failures are picked up from Surefire's `<<< FAILURE!` / `<<< ERROR!`
//! headers. Anything pointing at a file other than the test under scrutiny
//! is reported as unrelated breakage and never enters the diagnostic stream.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::types::{BuildOutcome, DiagnosticKind, DiagnosticRecord};

pub const ERROR_MARKER: &str = "[ERROR]";
pub const INFO_MARKER: &str = "[INFO]";
pub const LOCATOR_PROBE: &str = ".java:[";
pub const SYMBOL_NOTE: &str = "symbol:";
pub const LOCATION_NOTE: &str = "location:";
pub const FAILURE_MARKER: &str = "<<< FAILURE!";
pub const ERROR_RESULT_MARKER: &str = "<<< ERROR!";
pub const RUNNING_MARKER: &str = "[INFO] Running";
pub const RESULTS_MARKER: &str = "[INFO] Results:";
pub const SUCCESS_MARKER: &str = "BUILD SUCCESS";

/// Upper bound on trace lines attached to a single runtime failure.
pub const MAX_TRACE_LINES: usize = 20;

static LOCATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[/\\]?(\w+\.java):\[(\d+),\d+\]\s+(.*)").expect("locator pattern")
});

/// Classify one build run against the test file under scrutiny.
///
/// `target_file_name` may be a bare class name (`FooTest`) or a file name
/// (`FooTest.java`). Never fails: output without recognizable markers yields
/// an unsuccessful outcome with no diagnostics.
pub fn analyze(raw_output: &str, target_file_name: &str) -> BuildOutcome {
    let target = normalize_target(target_file_name);
    let lines: Vec<&str> = raw_output.lines().collect();

    let mut outcome = BuildOutcome {
        succeeded: raw_output.contains(SUCCESS_MARKER),
        ..Default::default()
    };
    let mut seen: HashSet<String> = HashSet::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];

        // ---------- compilation errors ----------
        if line.contains(ERROR_MARKER) && line.contains(LOCATOR_PROBE) {
            if let Some(caps) = LOCATOR.captures(line) {
                let file = caps[1].to_string();

                if file == target {
                    let (details, next) = compile_details(&lines, i + 1);
                    let record = DiagnosticRecord {
                        kind: DiagnosticKind::Compilation,
                        origin_file: file,
                        line: caps[2].parse().ok(),
                        message: caps[3].trim().to_string(),
                        details,
                    };
                    push_unique(&mut outcome, &mut seen, record);
                    i = next;
                    continue;
                }

                tracing::debug!(file = %file, "compilation error outside target");
                outcome.unrelated_files.insert(file);
            }
            i += 1;
            continue;
        }

        // ---------- runtime failures ----------
        if line.contains(FAILURE_MARKER) || line.contains(ERROR_RESULT_MARKER) {
            let (details, next) = runtime_trace(&lines, i + 1);
            let record = DiagnosticRecord {
                kind: DiagnosticKind::Runtime,
                origin_file: target.clone(),
                line: None,
                message: strip_marker(line),
                details,
            };
            push_unique(&mut outcome, &mut seen, record);
            i = next;
            continue;
        }

        i += 1;
    }

    outcome
}

fn normalize_target(name: &str) -> String {
    let name = name.trim();
    if name.ends_with(".java") {
        name.to_string()
    } else {
        format!("{name}.java")
    }
}

fn strip_marker(line: &str) -> String {
    line.replace(ERROR_MARKER, "").trim().to_string()
}

/// Collect `symbol:` / `location:` notes following a locator line.
///
/// Returns the notes and the index of the first line not consumed.
fn compile_details(lines: &[&str], start: usize) -> (Vec<String>, usize) {
    let mut details = Vec::new();
    let mut j = start;

    while j < lines.len() {
        let next = lines[j];
        if next.contains(LOCATOR_PROBE) || next.contains(INFO_MARKER) {
            break;
        }

        if next.contains(ERROR_MARKER) {
            let clean = strip_marker(next);
            if clean.starts_with(SYMBOL_NOTE) || clean.starts_with(LOCATION_NOTE) {
                details.push(clean);
            }
        }
        j += 1;
    }

    (details, j)
}

/// Collect at most [`MAX_TRACE_LINES`] trace lines after a failure header.
fn runtime_trace(lines: &[&str], start: usize) -> (Vec<String>, usize) {
    let mut details = Vec::new();
    let mut j = start;
    let mut consumed = 0;

    while j < lines.len() && consumed < MAX_TRACE_LINES {
        let next = lines[j];
        if next.contains(RUNNING_MARKER) || next.contains(RESULTS_MARKER) {
            break;
        }

        if !next.contains(INFO_MARKER) {
            let clean = strip_marker(next);
            if !clean.is_empty() {
                details.push(clean);
            }
        }
        j += 1;
        consumed += 1;
    }

    (details, j)
}

fn push_unique(outcome: &mut BuildOutcome, seen: &mut HashSet<String>, record: DiagnosticRecord) {
    if seen.insert(record.dedup_key()) {
        outcome.relevant.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_marker_wins() {
        let log = "[INFO] Tests run: 3, Failures: 0\n[INFO] BUILD SUCCESS\n";
        let out = analyze(log, "FooTest");
        assert!(out.succeeded);
        assert!(out.relevant.is_empty());
    }

    #[test]
    fn success_marker_is_definitive_even_with_errors() {
        let log = "\
[ERROR] /p/src/test/java/a/FooTest.java:[4,1] cannot find symbol
[ERROR] OtherClass.java:[3,1] incompatible types
[INFO] BUILD SUCCESS";
        assert!(analyze(log, "FooTest").succeeded);
    }

    #[test]
    fn compile_error_with_symbol_note() {
        let log = "\
[ERROR] FooTest.java:[10,5] cannot find symbol
[ERROR] symbol: variable bar";
        let out = analyze(log, "FooTest");
        assert!(!out.succeeded);
        assert_eq!(
            out.rendered(),
            vec!["Line 10: cannot find symbol\n      symbol: variable bar".to_string()]
        );
        assert_eq!(out.relevant[0].line, Some(10));
        assert!(out.unrelated_files.is_empty());
    }

    #[test]
    fn unrelated_compile_error_is_isolated() {
        let log = "[ERROR] /src/main/java/x/OtherClass.java:[3,1] incompatible types";
        let out = analyze(log, "FooTest");
        assert!(out.relevant.is_empty());
        assert_eq!(out.unrelated_files.len(), 1);
        assert!(out.unrelated_files.contains("OtherClass.java"));
    }

    #[test]
    fn target_accepts_file_name_form() {
        let log = "[ERROR] FooTest.java:[1,1] ';' expected";
        let out = analyze(log, "FooTest.java");
        assert_eq!(out.relevant.len(), 1);
        assert!(out.unrelated_files.is_empty());
    }

    #[test]
    fn lookahead_stops_at_next_locator_and_info() {
        let log = "\
[ERROR] FooTest.java:[10,5] cannot find symbol
[ERROR]   symbol:   class Widget
[ERROR]   location: class FooTest
[ERROR] Bar.java:[2,2] class, interface, or enum expected
[ERROR] FooTest.java:[20,9] incompatible types: int cannot be converted to String
[INFO] 2 errors
[ERROR]   symbol: stray note after info";
        let out = analyze(log, "FooTest");

        assert_eq!(out.relevant.len(), 2);
        assert_eq!(
            out.relevant[0].details,
            vec!["symbol:   class Widget".to_string(), "location: class FooTest".to_string()]
        );
        assert!(out.relevant[1].details.is_empty());
        assert!(out.unrelated_files.contains("Bar.java"));
        assert!(!out.unrelated_files.contains("FooTest.java"));
    }

    #[test]
    fn repeated_compile_summary_is_deduplicated() {
        let block = "\
[ERROR] /p/FooTest.java:[10,5] cannot find symbol
[ERROR]   symbol:   variable bar
[INFO] ------------------------------------------------------------------------
";
        let log = format!("{block}[INFO] BUILD FAILURE\n{block}");
        let out = analyze(&log, "FooTest");
        assert_eq!(out.relevant.len(), 1);
    }

    #[test]
    fn runtime_failure_collects_trace_until_results() {
        let log = "\
[INFO] Running com.example.FooTest
[ERROR] Tests run: 1, Failures: 1, Errors: 0, Skipped: 0, Time elapsed: 0.05 s <<< FAILURE! - in com.example.FooTest
[ERROR] testAdd  Time elapsed: 0.01 s  <<< FAILURE!
org.opentest4j.AssertionFailedError: expected: <4> but was: <5>
\tat com.example.FooTest.testAdd(FooTest.java:14)

[INFO] Results:
[ERROR] Failures:
";
        let out = analyze(log, "FooTest");

        // The class summary header owns everything up to the Results block,
        // including the per-method header that follows it.
        assert_eq!(out.relevant.len(), 1);
        let failure = &out.relevant[0];
        assert!(failure.message.starts_with("Tests run: 1, Failures: 1"));
        assert_eq!(failure.line, None);
        assert_eq!(
            failure.details,
            vec![
                "testAdd  Time elapsed: 0.01 s  <<< FAILURE!".to_string(),
                "org.opentest4j.AssertionFailedError: expected: <4> but was: <5>".to_string(),
                "at com.example.FooTest.testAdd(FooTest.java:14)".to_string(),
            ]
        );
    }

    #[test]
    fn runtime_trace_stops_at_next_running_block() {
        let log = "\
[ERROR] testA  <<< FAILURE!
java.lang.AssertionError
[INFO] Running com.example.BarTest
[ERROR] testB  <<< ERROR!
java.lang.NullPointerException";
        let out = analyze(log, "FooTest");
        assert_eq!(out.relevant.len(), 2);
        assert_eq!(out.relevant[0].details, vec!["java.lang.AssertionError".to_string()]);
        assert_eq!(out.relevant[1].message, "testB  <<< ERROR!");
    }

    #[test]
    fn runtime_trace_is_capped() {
        let mut log = String::from("[ERROR] testBoom  <<< ERROR!\njava.lang.StackOverflowError\n");
        for n in 0..50 {
            log.push_str(&format!("\tat com.example.Deep.recurse(Deep.java:{n})\n"));
        }
        let out = analyze(&log, "FooTest");

        assert_eq!(out.relevant.len(), 1);
        assert_eq!(out.relevant[0].details.len(), MAX_TRACE_LINES);
    }

    #[test]
    fn runtime_header_without_trace_still_reported() {
        let log = "[ERROR] testX  <<< FAILURE!\n[INFO] Results:";
        let out = analyze(log, "FooTest");
        assert_eq!(out.rendered(), vec!["❌ testX  <<< FAILURE!".to_string()]);
    }

    #[test]
    fn relevant_keys_are_unique() {
        let log = "\
[ERROR] FooTest.java:[1,1] x
[ERROR] FooTest.java:[2,1] x
[ERROR] t  <<< FAILURE!
[INFO] Running next
[ERROR] t  <<< FAILURE!";
        let out = analyze(log, "FooTest");
        let keys: HashSet<String> = out.relevant.iter().map(|r| r.dedup_key()).collect();
        assert_eq!(keys.len(), out.relevant.len());
        assert_eq!(out.relevant.len(), 2);
    }

    #[test]
    fn unrecognized_output_yields_empty_failure() {
        let out = analyze("mvn: command not found", "FooTest");
        assert!(!out.succeeded);
        assert!(out.relevant.is_empty());
        assert!(out.unrelated_files.is_empty());
    }
}
