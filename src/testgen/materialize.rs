use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::source::package_dir;

/// Maven test source root, relative to the project root.
pub const TEST_SOURCE_ROOT: &str = "src/test/java";

/// Where generated tests are written and source files are read from.
pub trait SourceStore {
    fn write_test(&self, class_name: &str, package: &str, code: &str) -> io::Result<PathBuf>;
    fn read(&self, path: &Path) -> io::Result<String>;
}

pub struct FsSourceStore {
    project_root: PathBuf,
}

impl FsSourceStore {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    pub fn test_path(&self, class_name: &str, package: &str) -> PathBuf {
        package_dir(&self.project_root.join(TEST_SOURCE_ROOT), package)
            .join(format!("{class_name}.java"))
    }
}

impl SourceStore for FsSourceStore {
    /// Replaces any previous attempt's file.
    fn write_test(&self, class_name: &str, package: &str, code: &str) -> io::Result<PathBuf> {
        let path = self.test_path(class_name, package);
        ensure_parent_dir(&path)?;
        fs::write(&path, code)?;
        Ok(path)
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
