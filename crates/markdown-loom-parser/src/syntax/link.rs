//! Link label, destination and title recognizers.

use super::{at, chars, skip_spaces};
use crate::source::{CodePoint, NodeInterval, chars::is_ascii_punctuation, text::decode};

/// Labels longer than this many characters never match.
pub const MAX_LABEL_LEN: usize = 999;

/// A recognized piece of link syntax: where it ends and its decoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    /// Local index just past the construct.
    pub end: usize,
    /// Raw content, delimiters excluded.
    pub inner: NodeInterval,
    /// Content with escapes and references applied.
    pub value: String,
}

/// `[label]` starting at `s[i] == '['`.
///
/// The label may not contain unescaped brackets and must hold a
/// non-whitespace character.
pub fn parse_link_label(s: &[CodePoint], i: usize) -> Option<Parsed> {
    if at(s, i) != Some('[') {
        return None;
    }
    let mut j = i + 1;
    let mut has_content = false;
    loop {
        let c = at(s, j)?;
        match c {
            ']' => break,
            '[' => return None,
            '\\' if at(s, j + 1).is_some_and(is_ascii_punctuation) => {
                has_content = true;
                j += 2;
                continue;
            }
            c if !c.is_whitespace() => has_content = true,
            _ => {}
        }
        j += 1;
        if j - i - 1 > MAX_LABEL_LEN {
            return None;
        }
    }
    if !has_content {
        return None;
    }
    let inner = NodeInterval::new(i + 1, j);
    Some(Parsed {
        end: j + 1,
        inner,
        value: chars(s, inner.start_index, inner.end_index)
            .into_iter()
            .collect(),
    })
}

/// Deepest unescaped `(` nesting a bare destination may hold.
const MAX_PAREN_DEPTH: usize = 32;

/// Link destination starting at `s[i]`, either `<...>` or a bare run with
/// balanced parentheses.

pub fn parse_link_destination(s: &[CodePoint], i: usize) -> Option<Parsed> {
    if at(s, i) == Some('<') {
        let mut j = i + 1;
        loop {
            match at(s, j)? {
                '>' => break,
                '<' | '\n' => return None,
                '\\' if at(s, j + 1).is_some_and(is_ascii_punctuation) => j += 2,
                _ => j += 1,
            }
        }
        let inner = NodeInterval::new(i + 1, j);
        return Some(Parsed {
            end: j + 1,
            inner,
            value: decode(&chars(s, inner.start_index, inner.end_index)),
        });
    }

    let mut j = i;
    let mut depth = 0usize;
    while let Some(c) = at(s, j) {
        match c {
            '\\' if at(s, j + 1).is_some_and(is_ascii_punctuation) => {
                j += 2;
                continue;
            }
            '(' => {
                depth += 1;
                if depth > MAX_PAREN_DEPTH {
                    return None;
                }
            }
            ')' => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            c if c == ' ' || c.is_ascii_control() => break,
            _ => {}
        }
        j += 1;
    }
    if j == i || depth != 0 {
        return None;
    }
    let inner = NodeInterval::new(i, j);
    Some(Parsed {
        end: j,
        inner,
        value: decode(&chars(s, i, j)),
    })
}

/// Link title starting at `s[i]`: `"..."`, `'...'` or `(...)`.
///
/// Titles may span lines but not contain a blank line.
pub fn parse_link_title(s: &[CodePoint], i: usize) -> Option<Parsed> {
    let close = match at(s, i)? {
        '"' => '"',
        '\'' => '\'',
        '(' => ')',
        _ => return None,
    };
    let mut j = i + 1;
    loop {
        let c = at(s, j)?;
        if c == close {
            break;
        }
        match c {
            '(' if close == ')' => return None,
            '\\' if at(s, j + 1).is_some_and(is_ascii_punctuation) => {
                j += 2;
                continue;
            }
            '\n' => {
                if at(s, skip_spaces(s, j + 1)) == Some('\n') {
                    return None;
                }
            }
            _ => {}
        }
        j += 1;
    }
    let inner = NodeInterval::new(i + 1, j);
    Some(Parsed {
        end: j + 1,
        inner,
        value: decode(&chars(s, inner.start_index, inner.end_index)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::points;
    use rstest::rstest;

    #[rstest]
    #[case("[foo]", Some("foo"))]
    #[case("[foo\\]bar]", Some("foo\\]bar"))]
    #[case("[foo[bar]", None)]
    #[case("[  ]", None)]
    #[case("[unclosed", None)]
    fn labels(#[case] input: &str, #[case] expected: Option<&str>) {
        let s = points(input);
        assert_eq!(
            parse_link_label(&s, 0).map(|p| p.value),
            expected.map(str::to_string)
        );
    }

    #[rstest]
    #[case("/url rest", Some(("/url", 4)))]
    #[case("<a b> rest", Some(("a b", 5)))]
    #[case("<>", Some(("", 2)))]
    #[case("a(b)c)", Some(("a(b)c", 5)))]
    #[case("a(b", None)]
    #[case("<a\nb>", None)]
    #[case("\\(x", Some(("(x", 3)))]
    #[case("&amp;x", Some(("&x", 6)))]
    fn destinations(#[case] input: &str, #[case] expected: Option<(&str, usize)>) {
        let s = points(input);
        assert_eq!(
            parse_link_destination(&s, 0).map(|p| (p.value, p.end)),
            expected.map(|(v, e)| (v.to_string(), e))
        );
    }

    #[rstest]
    #[case(32, true)]
    #[case(33, false)]
    fn destination_paren_depth_is_bounded(#[case] depth: usize, #[case] accepted: bool) {
        let dest = format!("{}a{}", "(".repeat(depth), ")".repeat(depth));
        let s = points(&dest);
        assert_eq!(parse_link_destination(&s, 0).is_some(), accepted);
    }

    #[rstest]
    #[case("\"title\"", Some("title"))]
    #[case("'it''s'", Some("it"))]
    #[case("(paren)", Some("paren"))]
    #[case("(a(b)", None)]
    #[case("\"multi\nline\"", Some("multi\nline"))]
    #[case("\"blank\n\nline\"", None)]
    #[case("\"esc\\\"aped\"", Some("esc\"aped"))]
    fn titles(#[case] input: &str, #[case] expected: Option<&str>) {
        let s = points(input);
        assert_eq!(
            parse_link_title(&s, 0).map(|p| p.value),
            expected.map(str::to_string)
        );
    }
}
