use std::sync::LazyLock;

use regex::Regex;

static JAVA_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```java\s*(.*?)\s*```").expect("java fence pattern"));

static ANY_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```\s*(.*?)\s*```").expect("fence pattern"));

/// First `java` fenced block, else first fenced block, else the trimmed text.
pub fn extract_code(raw: &str) -> String {
    JAVA_FENCE
        .captures(raw)
        .or_else(|| ANY_FENCE.captures(raw))
        .map(|c| c[1].trim().to_string())
        .unwrap_or_else(|| raw.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_java_block() {
        let raw = "Here:\n```text\nnotes\n```\n```java\nclass ATest {}\n```\n";
        assert_eq!(extract_code(raw), "class ATest {}");
    }

    #[test]
    fn falls_back_to_generic_block() {
        let raw = "```\nclass ATest {}\n```";
        assert_eq!(extract_code(raw), "class ATest {}");
    }

    #[test]
    fn falls_back_to_raw_text() {
        assert_eq!(extract_code("  class ATest {}\n"), "class ATest {}");
    }

    #[test]
    fn empty_block_yields_empty_code() {
        assert_eq!(extract_code("```java\n```"), "");
    }
}
