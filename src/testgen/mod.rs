pub mod materialize;

pub use materialize::{FsSourceStore, SourceStore, TEST_SOURCE_ROOT};
