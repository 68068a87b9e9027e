//! Generate JUnit tests for a Java class and repair them against Maven
//! until they pass or the attempt budget runs out.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod executor;
pub mod llm;
pub mod logger;
pub mod machine;
pub mod orchestrator;
pub mod report;
pub mod scaffold;
pub mod scanner;
pub mod source;
pub mod testgen;
