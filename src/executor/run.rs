//src/executor/run.rs
// Executes the build for a single test class and returns raw output.
// No parsing. Interpretation happens in the analyzer.

use std::io;
use std::path::PathBuf;
use std::process::Command;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct BuildRun {
    pub success: bool,
    /// stdout, a newline, then stderr.
    pub output: String,
    pub duration_ms: u128,
}

pub trait BuildRunner {
    fn run(&self, test_identifier: &str) -> BuildRun;
}

pub struct MavenRunner {
    project_root: PathBuf,
    program: String,
}

impl MavenRunner {
    pub fn new(project_root: impl Into<PathBuf>, program: impl Into<String>) -> Self {
        Self {
            project_root: project_root.into(),
            program: program.into(),
        }
    }

    pub fn args(test_identifier: &str) -> Vec<String> {
        vec!["test".to_string(), format!("-Dtest={test_identifier}")]
    }
}

impl BuildRunner for MavenRunner {
    fn run(&self, test_identifier: &str) -> BuildRun {
        let args = Self::args(test_identifier);
        tracing::info!(command = %format!("{} {}", self.program, args.join(" ")), "running build");

        let started = Instant::now();
        let output = Command::new(&self.program)
            .args(&args)
            .current_dir(&self.project_root)
            .output();
        let duration_ms = started.elapsed().as_millis();

        match output {
            Ok(out) => BuildRun {
                success: out.status.success(),
                output: format!(
                    "{}\n{}",
                    String::from_utf8_lossy(&out.stdout),
                    String::from_utf8_lossy(&out.stderr)
                ),
                duration_ms,
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => BuildRun {
                success: false,
                output: format!(
                    "Error: '{}' command not found. Is Maven installed and in your PATH?",
                    self.program
                ),
                duration_ms,
            },
            Err(e) => BuildRun {
                success: false,
                output: e.to_string(),
                duration_ms,
            },
        }
    }
}
