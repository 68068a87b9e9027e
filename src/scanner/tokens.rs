//! Dependency candidate discovery.
//!
//! Two sources: explicit `import` statements, and a same-package heuristic
//! that looks for `Type identifier` adjacency in the raw text. The heuristic
//! is not a parser. A capitalized word followed by a lowercase word is taken
//! as a type use wherever it appears, comments included.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static IMPORT_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"import\s+([\w\.]+)\.([A-Z]\w+);").expect("import pattern"));

/// Common library types never worth resolving.
pub const IGNORED_TYPES: &[&str] = &[
    "String",
    "Integer",
    "Long",
    "Double",
    "Boolean",
    "List",
    "Map",
    "Set",
    "Optional",
    "Object",
    "Class",
    "System",
    "Logger",
    "Arrays",
    "Collections",
];

/// Package prefixes that never resolve to project files.
pub const EXCLUDED_PREFIXES: &[&str] = &["java.", "javax.", "org.junit.", "org.mockito."];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    Import,
    SamePackage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyCandidate {
    pub type_name: String,
    pub package: String,
    pub source: CandidateSource,
}

impl DependencyCandidate {
    pub fn is_excluded(&self) -> bool {
        EXCLUDED_PREFIXES
            .iter()
            .any(|prefix| self.package.starts_with(prefix))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Word(&'a str),
    Space,
    Punct(char),
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub fn tokenize(src: &str) -> Vec<Token<'_>> {
    let mut out = Vec::new();
    let mut chars = src.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if is_word_char(c) {
            let mut end = start;
            while let Some(&(idx, ch)) = chars.peek() {
                if !is_word_char(ch) {
                    break;
                }
                end = idx + ch.len_utf8();
                chars.next();
            }
            out.push(Token::Word(&src[start..end]));
        } else if c.is_whitespace() {
            while let Some(&(_, ch)) = chars.peek() {
                if !ch.is_whitespace() {
                    break;
                }
                chars.next();
            }
            out.push(Token::Space);
        } else {
            out.push(Token::Punct(c));
            chars.next();
        }
    }

    out
}

fn looks_like_type(word: &str) -> bool {
    let mut chars = word.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

fn looks_like_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

/// Capitalized words directly followed (after whitespace) by a lowercase
/// word, in first-occurrence order, without duplicates or ignored types.
pub fn type_usages(src: &str) -> Vec<String> {
    let tokens = tokenize(src);
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for window in tokens.windows(3) {
        if let [Token::Word(ty), Token::Space, Token::Word(ident)] = window {
            if looks_like_type(ty)
                && looks_like_identifier(ident)
                && !IGNORED_TYPES.contains(ty)
                && seen.insert(*ty)
            {
                out.push(ty.to_string());
            }
        }
    }

    out
}

pub fn import_candidates(src: &str) -> Vec<DependencyCandidate> {
    IMPORT_DECL
        .captures_iter(src)
        .map(|c| DependencyCandidate {
            type_name: c[2].to_string(),
            package: c[1].to_string(),
            source: CandidateSource::Import,
        })
        .collect()
}

pub fn same_package_candidates(src: &str, current_package: &str) -> Vec<DependencyCandidate> {
    type_usages(src)
        .into_iter()
        .map(|type_name| DependencyCandidate {
            type_name,
            package: current_package.to_string(),
            source: CandidateSource::SamePackage,
        })
        .collect()
}

/// Imports first, then same-package guesses, excluded packages dropped.
pub fn collect_candidates(src: &str, current_package: &str) -> Vec<DependencyCandidate> {
    import_candidates(src)
        .into_iter()
        .chain(same_package_candidates(src, current_package))
        .filter(|c| !c.is_excluded())
        .collect()
}
