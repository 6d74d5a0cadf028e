//! # Shared Grammar Fragments
//!
//! Small recognizers reused by several tokenizers. Every function works on a
//! bounded slice of code points and returns local indices, so callers decide
//! how far a construct may reach.
//!
//! ## Modules
//!
//! - **`link`**: link labels, destinations and titles
//! - **`html`**: tag, comment and declaration grammar

pub mod html;
pub mod link;

use crate::source::CodePoint;

/// Character at `i`, if inside the slice.
#[inline]
pub(crate) fn at(s: &[CodePoint], i: usize) -> Option<char> {
    s.get(i).map(|p| p.code_point)
}

/// True when `s[i..]` starts with `pat`.
pub(crate) fn starts_with(s: &[CodePoint], i: usize, pat: &str) -> bool {
    let mut idx = i;
    for c in pat.chars() {
        if at(s, idx) != Some(c) {
            return false;
        }
        idx += 1;
    }
    true
}

/// Same as [`starts_with`] ignoring ASCII case.
pub(crate) fn starts_with_ignore_case(s: &[CodePoint], i: usize, pat: &str) -> bool {
    let mut idx = i;
    for c in pat.chars() {
        match at(s, idx) {
            Some(x) if x.eq_ignore_ascii_case(&c) => idx += 1,
            _ => return false,
        }
    }
    true
}

/// Index of the first character at or after `i` that is not a space or tab.
pub(crate) fn skip_spaces(s: &[CodePoint], mut i: usize) -> usize {
    while matches!(at(s, i), Some(' ' | '\t')) {
        i += 1;
    }
    i
}

/// Skips spaces and tabs plus at most one line ending.
pub(crate) fn skip_spaces_one_newline(s: &[CodePoint], i: usize) -> usize {
    let mut i = skip_spaces(s, i);
    if at(s, i) == Some('\n') {
        i = skip_spaces(s, i + 1);
    }
    i
}

/// Characters of `s[start..end]`.
pub(crate) fn chars(s: &[CodePoint], start: usize, end: usize) -> Vec<char> {
    s[start..end].iter().map(|p| p.code_point).collect()
}

#[cfg(test)]
pub(crate) fn points(text: &str) -> Vec<CodePoint> {
    crate::source::normalize(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_matching() {
        let s = points("<!DOCTYPE html>");
        assert!(starts_with(&s, 0, "<!"));
        assert!(starts_with_ignore_case(&s, 2, "doctype"));
        assert!(!starts_with(&s, 10, "html>x"));
    }

    #[test]
    fn whitespace_skipping() {
        let s = points("a  \n  \nb");
        assert_eq!(skip_spaces(&s, 1), 3);
        assert_eq!(skip_spaces_one_newline(&s, 1), 6);
    }
}
