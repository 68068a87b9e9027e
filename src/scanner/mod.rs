//! Dependency context scanner.
//!
//! Finds sibling types a target class leans on and renders their public
//! surface as grounding text for the oracle.

pub mod signatures;
pub mod tokens;

use std::collections::HashSet;
use std::path::PathBuf;

use crate::source::package_dir;

pub use signatures::{public_signatures, read_signatures};
pub use tokens::{collect_candidates, CandidateSource, DependencyCandidate};

/// Conventional Maven source roots, searched in order.
pub const SOURCE_ROOTS: [&str; 2] = ["src/main/java", "src/test/java"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextEntry {
    pub type_name: String,
    pub path: PathBuf,
    pub signatures: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DependencyScanner {
    root: PathBuf,
}

impl DependencyScanner {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            root: project_root.into(),
        }
    }

    pub fn candidates(&self, source: &str, current_package: &str) -> Vec<DependencyCandidate> {
        collect_candidates(source, current_package)
    }

    /// First source root holding `<pkg path>/<Type>.java`.
    pub fn resolve(&self, candidate: &DependencyCandidate) -> Option<PathBuf> {
        SOURCE_ROOTS.iter().find_map(|root| {
            let path = package_dir(&self.root.join(root), &candidate.package)
                .join(format!("{}.java", candidate.type_name));
            path.is_file().then_some(path)
        })
    }

    pub fn entries(&self, source: &str, current_package: &str) -> Vec<ContextEntry> {
        let mut resolved: HashSet<String> = HashSet::new();
        let mut out = Vec::new();

        for candidate in self.candidates(source, current_package) {
            if resolved.contains(&candidate.type_name) {
                continue;
            }

            let Some(path) = self.resolve(&candidate) else {
                tracing::debug!(ty = %candidate.type_name, package = %candidate.package, "unresolved");
                continue;
            };

            tracing::info!(ty = %candidate.type_name, path = %path.display(), "found dependency");
            resolved.insert(candidate.type_name.clone());
            out.push(ContextEntry {
                signatures: read_signatures(&path),
                type_name: candidate.type_name,
                path,
            });
        }

        out
    }

    /// Context blob for `source`; empty when nothing resolves.
    pub fn scan(&self, source: &str, current_package: &str) -> String {
        render_context(&self.entries(source, current_package))
    }
}

pub fn render_context(entries: &[ContextEntry]) -> String {
    let mut out = String::new();
    for e in entries {
        out.push_str(&format!(
            "\n--- Dependency: {} ---\n{}\n",
            e.type_name,
            e.signatures.join("\n")
        ));
    }
    out
}
