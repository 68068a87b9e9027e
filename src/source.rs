//! Target source file model.
//!
//! Just enough of a Java compilation unit to drive test generation: the
//! package, the primary public type, and the raw text.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static PACKAGE_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"package\s+([\w.]+);").expect("package pattern"));

static PRIMARY_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"public\s+(?:abstract\s+)?(?:final\s+)?(?:class|interface)\s+(\w+)")
        .expect("class pattern")
});

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("could not find 'package' declaration")]
    MissingPackage,
    #[error("could not find 'public class' declaration")]
    MissingClass,
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub package: String,
    pub class_name: String,
    pub text: String,
}

impl SourceUnit {
    pub fn test_class_name(&self) -> String {
        format!("{}Test", self.class_name)
    }

    /// Fully-qualified identifier handed to the build runner.
    pub fn test_identifier(&self) -> String {
        if self.package.is_empty() {
            self.test_class_name()
        } else {
            format!("{}.{}", self.package, self.test_class_name())
        }
    }
}

pub fn parse_java_source(text: &str) -> Result<SourceUnit, SourceError> {
    let package = PACKAGE_DECL
        .captures(text)
        .map(|c| c[1].to_string())
        .ok_or(SourceError::MissingPackage)?;

    let class_name = PRIMARY_TYPE
        .captures(text)
        .map(|c| c[1].to_string())
        .ok_or(SourceError::MissingClass)?;

    Ok(SourceUnit {
        package,
        class_name,
        text: text.to_string(),
    })
}

pub fn load_java_file(path: &Path) -> Result<SourceUnit, SourceError> {
    let text = fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_java_source(&text)
}

/// `com.example.app` under `root` becomes `root/com/example/app`.
pub fn package_dir(root: &Path, package: &str) -> PathBuf {
    package
        .split('.')
        .filter(|seg| !seg.is_empty())
        .fold(root.to_path_buf(), |acc, seg| acc.join(seg))
}
