//! UTF-8 boundary helpers
//!
//! Text surfaces address text by byte offset while egui cursors count
//! characters. Offsets coming from either side are snapped to character
//! boundaries before slicing so a stray index never panics.

// ─────────────────────────────────────────────────────────────────────────────
// Boundaries
// ─────────────────────────────────────────────────────────────────────────────

/// Largest char boundary `<= index`, capped at `s.len()`.
#[inline]
pub fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Smallest char boundary `>= index`, capped at `s.len()`.
#[inline]
pub fn ceil_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Byte offset of the character following the one that starts at `index`.
///
/// Returns `s.len()` at or past the end.
#[inline]
pub fn next_char_boundary(s: &str, index: usize) -> usize {
    let index = floor_char_boundary(s, index);
    s[index..]
        .chars()
        .next()
        .map(|c| index + c.len_utf8())
        .unwrap_or(s.len())
}

/// Slice `s` with both ends snapped outward to char boundaries.
#[inline]
pub fn safe_slice(s: &str, start: usize, end: usize) -> &str {
    let start = floor_char_boundary(s, start);
    let end = ceil_char_boundary(s, end);
    if start >= end {
        return "";
    }
    &s[start..end]
}

// ─────────────────────────────────────────────────────────────────────────────
// Char <-> byte conversion (egui's CCursor counts chars)
// ─────────────────────────────────────────────────────────────────────────────

/// Convert a character index into a byte offset, clamped to the string length.
pub fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Convert a byte offset into a character index.
pub fn byte_index_to_char_index(s: &str, byte_index: usize) -> usize {
    let byte_index = floor_char_boundary(s, byte_index);
    s[..byte_index].chars().count()
}

/// True for characters that belong to an identifier-like word.
#[inline]
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_and_ceil_ascii_are_identity() {
        let s = "needle";
        for i in 0..=s.len() {
            assert_eq!(floor_char_boundary(s, i), i);
            assert_eq!(ceil_char_boundary(s, i), i);
        }
    }

    #[test]
    fn test_floor_and_ceil_inside_multibyte() {
        let s = "añb"; // 'ñ' occupies bytes 1..3
        assert_eq!(floor_char_boundary(s, 2), 1);
        assert_eq!(ceil_char_boundary(s, 2), 3);
        assert_eq!(floor_char_boundary(s, 99), s.len());
    }

    #[test]
    fn test_next_boundary() {
        let s = "a🎉b";
        assert_eq!(next_char_boundary(s, 1), 5);
        assert_eq!(next_char_boundary(s, 2), 5);
        assert_eq!(next_char_boundary(s, s.len()), s.len());
    }

    #[test]
    fn test_safe_slice_snaps_outward() {
        let s = "x中y";
        assert_eq!(safe_slice(s, 2, 3), "中");
        assert_eq!(safe_slice(s, 3, 1), "");
    }

    #[test]
    fn test_char_byte_conversion() {
        let s = "på deg";
        assert_eq!(char_index_to_byte_index(s, 2), 3);
        assert_eq!(byte_index_to_char_index(s, 3), 2);
        assert_eq!(char_index_to_byte_index(s, 100), s.len());
    }

    #[test]
    fn test_word_chars() {
        assert!(is_word_char('a'));
        assert!(is_word_char('_'));
        assert!(is_word_char('7'));
        assert!(!is_word_char('-'));
        assert!(!is_word_char(' '));
    }
}
