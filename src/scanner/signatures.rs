use std::fs;
use std::path::Path;

/// Public member declarations of a Java file, one per line, bodies removed.
///
/// A line qualifies when it starts with `public` and is not a class or
/// interface header. Everything from the first `{` on is dropped and a
/// single `;` terminates the result.
pub fn public_signatures(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| l.starts_with("public") && !l.contains("class ") && !l.contains("interface "))
        .map(|l| {
            let head = l.split('{').next().unwrap_or(l).trim();
            format!("{};", head.trim_end_matches(';').trim_end())
        })
        .collect()
}

/// Read failures degrade to an empty signature list.
pub fn read_signatures(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(text) => public_signatures(&text),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "dependency unreadable");
            Vec::new()
        }
    }
}
