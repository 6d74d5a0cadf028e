//! # Source Normalization
//!
//! Turns the raw input string into the immutable code-point sequence every
//! later phase indexes into.
//!
//! ## Modules
//!
//! - **`chars`**: Character class predicates (whitespace, punctuation)
//! - **`text`**: Escape and entity decoding over code-point ranges
//!
//! ## Key Invariants
//!
//! - `\r\n` and lone `\r` collapse into a single `\n` record
//! - `U+0000` is replaced with `U+FFFD`
//! - Columns are visual: a tab advances to the next multiple-of-four stop
//! - The sequence is never mutated after [`normalize`] returns

pub mod chars;
pub mod text;

use crate::ast::{Point, Position};

/// Width of a tab stop in columns.
pub const TAB_STOP: usize = 4;

/// One normalized character of the source and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodePoint {
    pub code_point: char,
    /// 1-based line number.
    pub line: usize,
    /// 1-based visual column.
    pub column: usize,
    /// 0-based byte offset into the original string.
    pub offset: usize,
    /// Bytes this record occupies in the original string.
    pub len: usize,
}

impl CodePoint {
    /// Column the character after this one starts at.
    #[must_use]
    pub fn next_column(&self) -> usize {
        next_column(self.code_point, self.column)
    }
}

/// Column following `c` when `c` starts at `column`.
#[must_use]
pub fn next_column(c: char, column: usize) -> usize {
    if c == '\t' {
        ((column - 1) / TAB_STOP + 1) * TAB_STOP + 1
    } else {
        column + 1
    }
}

/// A half-open range `[start_index, end_index)` of code-point indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeInterval {
    pub start_index: usize,
    pub end_index: usize,
}

impl NodeInterval {
    pub fn new(start_index: usize, end_index: usize) -> Self {
        debug_assert!(start_index <= end_index, "inverted interval");
        Self {
            start_index,
            end_index,
        }
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// True when `other` lies entirely inside `self`.
    #[must_use]
    pub fn contains(self, other: NodeInterval) -> bool {
        self.start_index <= other.start_index && other.end_index <= self.end_index
    }
}

/// Normalizes `text` into code-point records.
pub fn normalize(text: &str) -> Vec<CodePoint> {
    let mut out = Vec::with_capacity(text.len());
    let mut line = 1;
    let mut column = 1;
    let mut chars = text.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match c {
            '\r' => {
                let len = match chars.peek() {
                    Some((_, '\n')) => {
                        chars.next();
                        2
                    }
                    _ => 1,
                };
                out.push(CodePoint {
                    code_point: '\n',
                    line,
                    column,
                    offset,
                    len,
                });
                line += 1;
                column = 1;
            }
            '\n' => {
                out.push(CodePoint {
                    code_point: '\n',
                    line,
                    column,
                    offset,
                    len: 1,
                });
                line += 1;
                column = 1;
            }
            _ => {
                let code_point = if c == '\0' { '\u{FFFD}' } else { c };
                out.push(CodePoint {
                    code_point,
                    line,
                    column,
                    offset,
                    len: c.len_utf8(),
                });
                column = next_column(c, column);
            }
        }
    }
    out
}

/// Point where the character at `index` starts.
///
/// Indices at or past the end resolve to the point just after the last
/// record.
pub fn point_at(points: &[CodePoint], index: usize) -> Point {
    if let Some(p) = points.get(index) {
        return Point {
            line: p.line,
            column: p.column,
            offset: p.offset,
        };
    }
    match points.last() {
        Some(last) => point_after(last),
        None => Point {
            line: 1,
            column: 1,
            offset: 0,
        },
    }
}

fn point_after(p: &CodePoint) -> Point {
    Point {
        line: p.line,
        column: p.next_column(),
        offset: p.offset + p.len,
    }
}

/// Position spanning `interval`; `end` is one past the last consumed record.
pub fn calc_position(points: &[CodePoint], interval: NodeInterval) -> Position {
    let start = point_at(points, interval.start_index);
    let end = if interval.end_index > interval.start_index {
        match points.get(interval.end_index - 1) {
            Some(last) => point_after(last),
            None => point_at(points, interval.end_index),
        }
    } else {
        start
    };
    Position { start, end }
}

/// Collects the raw characters of `interval`.
pub fn slice_string(points: &[CodePoint], interval: NodeInterval) -> String {
    points[interval.start_index..interval.end_index]
        .iter()
        .map(|p| p.code_point)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chars(points: &[CodePoint]) -> String {
        points.iter().map(|p| p.code_point).collect()
    }

    #[test]
    fn crlf_collapses_to_single_record() {
        let points = normalize("a\r\nb");
        assert_eq!(chars(&points), "a\nb");
        assert_eq!(points[1].len, 2);
        assert_eq!(points[2].offset, 3);
        assert_eq!(points[2].line, 2);
        assert_eq!(points[2].column, 1);
    }

    #[test]
    fn lone_cr_is_a_line_ending() {
        let points = normalize("a\rb");
        assert_eq!(chars(&points), "a\nb");
        assert_eq!(points[1].len, 1);
        assert_eq!(points[2].line, 2);
    }

    #[test]
    fn nul_is_replaced() {
        let points = normalize("a\0b");
        assert_eq!(points[1].code_point, '\u{FFFD}');
        assert_eq!(points[1].len, 1);
    }

    #[test]
    fn tab_advances_to_next_stop() {
        let points = normalize("a\tb\t\tc");
        assert_eq!(points[0].column, 1);
        assert_eq!(points[1].column, 2);
        assert_eq!(points[2].column, 5);
        assert_eq!(points[3].column, 6);
        assert_eq!(points[4].column, 9);
        assert_eq!(points[5].column, 13);
        // tabs keep their own code point
        assert_eq!(points[1].code_point, '\t');
    }

    #[test]
    fn offsets_are_bytes() {
        let points = normalize("é€x");
        assert_eq!(points[0].offset, 0);
        assert_eq!(points[1].offset, 2);
        assert_eq!(points[2].offset, 5);
        assert_eq!(points[2].column, 3);
    }

    #[test]
    fn empty_input() {
        assert!(normalize("").is_empty());
        let pos = calc_position(&[], NodeInterval::new(0, 0));
        assert_eq!(pos.start.line, 1);
        assert_eq!(pos.end.offset, 0);
    }

    #[test]
    fn position_end_is_after_last_record() {
        let points = normalize("ab\ncd");
        let pos = calc_position(&points, NodeInterval::new(3, 5));
        assert_eq!(pos.start.line, 2);
        assert_eq!(pos.start.column, 1);
        assert_eq!(pos.end.column, 3);
        assert_eq!(pos.end.offset, 5);
    }

    #[test]
    fn interval_contains() {
        let outer = NodeInterval::new(2, 10);
        assert!(outer.contains(NodeInterval::new(2, 10)));
        assert!(outer.contains(NodeInterval::new(4, 5)));
        assert!(!outer.contains(NodeInterval::new(1, 5)));
        assert!(!outer.contains(NodeInterval::new(9, 11)));
        assert!(NodeInterval::new(3, 3).is_empty());
    }
}
