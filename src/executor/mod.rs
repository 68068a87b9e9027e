pub mod run;

pub use run::{BuildRun, BuildRunner, MavenRunner};
