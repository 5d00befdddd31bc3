//! Search options shared by the find bar and the text surface.

use crate::error::{Error, Result};
use regex::{Regex, RegexBuilder};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

// ─────────────────────────────────────────────────────────────────────────────
// Flags
// ─────────────────────────────────────────────────────────────────────────────

/// Bit set consumed by `TextSurface::search_next` / `search_prev`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SearchFlags(u32);

impl SearchFlags {
    pub const NONE: SearchFlags = SearchFlags(0);
    pub const MATCH_CASE: SearchFlags = SearchFlags(1 << 0);
    pub const WHOLE_WORD: SearchFlags = SearchFlags(1 << 1);
    pub const REGEX: SearchFlags = SearchFlags(1 << 2);

    pub fn contains(self, other: SearchFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: SearchFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: SearchFlags) {
        self.0 &= !other.0;
    }
}

impl BitOr for SearchFlags {
    type Output = SearchFlags;

    fn bitor(self, rhs: SearchFlags) -> SearchFlags {
        SearchFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for SearchFlags {
    fn bitor_assign(&mut self, rhs: SearchFlags) {
        self.insert(rhs);
    }
}

impl fmt::Debug for SearchFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.contains(Self::MATCH_CASE) {
            names.push("MATCH_CASE");
        }
        if self.contains(Self::WHOLE_WORD) {
            names.push("WHOLE_WORD");
        }
        if self.contains(Self::REGEX) {
            names.push("REGEX");
        }
        if names.is_empty() {
            write!(f, "SearchFlags(NONE)")
        } else {
            write!(f, "SearchFlags({})", names.join(" | "))
        }
    }
}

/// How the find field text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegexMode {
    /// Plain text
    #[default]
    None,
    /// Regular expression
    Regex,
    /// `*` and `?` wildcards
    Wildcard,
}

impl RegexMode {
    pub fn label(&self) -> &'static str {
        match self {
            RegexMode::None => "None",
            RegexMode::Regex => "Regular expression",
            RegexMode::Wildcard => "Wildcard syntax",
        }
    }

    pub fn all() -> &'static [RegexMode] {
        &[RegexMode::None, RegexMode::Regex, RegexMode::Wildcard]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    Forward,
    Backward,
}

// ─────────────────────────────────────────────────────────────────────────────
// Pattern compilation
// ─────────────────────────────────────────────────────────────────────────────

/// Translate wildcard syntax into a regex: `*` is any run, `?` any single
/// character, everything else is literal.
pub fn wildcard_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut literal = String::new();
    for ch in pattern.chars() {
        match ch {
            '*' | '?' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                out.push_str(if ch == '*' { ".*" } else { "." });
            }
            _ => literal.push(ch),
        }
    }
    out.push_str(&regex::escape(&literal));
    out
}

/// Build the matcher for `needle` under `flags`.
///
/// Without `REGEX` the needle is escaped. Case folding comes from the
/// absence of `MATCH_CASE`. Whole-word filtering is left to the caller so
/// literal and regex searches apply the same boundary rule.
pub fn compile_pattern(needle: &str, flags: SearchFlags) -> Result<Regex> {
    let source = if flags.contains(SearchFlags::REGEX) {
        needle.to_string()
    } else {
        regex::escape(needle)
    };

    RegexBuilder::new(&source)
        .case_insensitive(!flags.contains(SearchFlags::MATCH_CASE))
        .multi_line(true)
        .build()
        .map_err(|source| Error::InvalidPattern {
            pattern: needle.to_string(),
            source,
        })
}

/// Convert `\1`-style back-references into the `${1}` form `regex` expects.
/// `$1` and `${name}` pass through unchanged; `\\` is a literal backslash.
pub fn convert_backrefs(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.peek().copied() {
            Some(d) if d.is_ascii_digit() => {
                let mut group = String::new();
                while let Some(d) = chars.peek().copied().filter(|c| c.is_ascii_digit()) {
                    group.push(d);
                    chars.next();
                }
                out.push_str("${");
                out.push_str(&group);
                out.push('}');
            }
            Some('\\') => {
                chars.next();
                out.push('\\');
            }
            _ => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_combine() {
        let flags = SearchFlags::MATCH_CASE | SearchFlags::REGEX;
        assert!(flags.contains(SearchFlags::MATCH_CASE));
        assert!(flags.contains(SearchFlags::REGEX));
        assert!(!flags.contains(SearchFlags::WHOLE_WORD));
        assert!(flags.contains(SearchFlags::NONE));
    }

    #[test]
    fn test_flags_insert_remove() {
        let mut flags = SearchFlags::NONE;
        flags |= SearchFlags::WHOLE_WORD;
        assert!(flags.contains(SearchFlags::WHOLE_WORD));
        flags.remove(SearchFlags::WHOLE_WORD);
        assert_eq!(flags, SearchFlags::NONE);
    }

    #[test]
    fn test_flags_debug() {
        assert_eq!(format!("{:?}", SearchFlags::NONE), "SearchFlags(NONE)");
        assert_eq!(
            format!("{:?}", SearchFlags::MATCH_CASE | SearchFlags::REGEX),
            "SearchFlags(MATCH_CASE | REGEX)"
        );
    }

    #[test]
    fn test_wildcard_to_regex() {
        assert_eq!(wildcard_to_regex("foo*"), "foo.*");
        assert_eq!(wildcard_to_regex("a?c"), "a.c");
        assert_eq!(wildcard_to_regex("x.y*"), r"x\.y.*");
    }

    #[test]
    fn test_wildcard_pattern_matches() {
        let re = compile_pattern(&wildcard_to_regex("get*Name"), SearchFlags::REGEX).unwrap();
        assert!(re.is_match("fn getFileName()"));
        assert!(!re.is_match("fn setName()"));
    }

    #[test]
    fn test_literal_is_escaped() {
        let re = compile_pattern("a.c", SearchFlags::MATCH_CASE).unwrap();
        assert!(re.is_match("a.c"));
        assert!(!re.is_match("abc"));
    }

    #[test]
    fn test_case_folding() {
        let re = compile_pattern("hello", SearchFlags::NONE).unwrap();
        assert!(re.is_match("HeLLo"));
        let re = compile_pattern("hello", SearchFlags::MATCH_CASE).unwrap();
        assert!(!re.is_match("HeLLo"));
    }

    #[test]
    fn test_invalid_regex_is_error() {
        let err = compile_pattern("[unclosed", SearchFlags::REGEX).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
        // the same text is fine as a literal
        assert!(compile_pattern("[unclosed", SearchFlags::NONE).is_ok());
    }

    #[test]
    fn test_convert_backrefs() {
        assert_eq!(convert_backrefs(r"\2-\1"), "${2}-${1}");
        assert_eq!(convert_backrefs("$1"), "$1");
        assert_eq!(convert_backrefs(r"a\\b"), r"a\b");
        assert_eq!(convert_backrefs(r"\n"), r"\n");
        assert_eq!(convert_backrefs(r"\12x"), "${12}x");
    }

    #[test]
    fn test_regex_mode_labels() {
        assert_eq!(RegexMode::all().len(), 3);
        assert_eq!(RegexMode::default(), RegexMode::None);
        assert_eq!(RegexMode::Wildcard.label(), "Wildcard syntax");
    }
}
