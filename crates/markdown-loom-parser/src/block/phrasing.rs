//! Turning leaf lines into inline input or literal text.

use super::line::ContentLine;
use crate::source::{CodePoint, chars::is_space_or_tab};

/// Merges lines into one contiguous run for the inline engine.
///
/// Leading whitespace of every line and trailing whitespace of the last line
/// are dropped; line endings between lines are kept as `\n` records so
/// positions stay exact.
pub fn merge_lines(points: &[CodePoint], lines: &[ContentLine]) -> Vec<CodePoint> {
    let mut out = Vec::new();
    for (k, line) in lines.iter().enumerate() {
        let start = line.first_non_ws.min(line.end);
        out.extend_from_slice(&points[start..line.end]);
        if k + 1 < lines.len() {
            out.extend(points.get(line.end).copied());
        }
    }
    while out.last().is_some_and(|p| is_space_or_tab(p.code_point)) {
        out.pop();
    }
    out
}

/// Literal text of raw lines joined with `\n`, partially consumed tabs
/// restored as spaces.
pub fn literal_text(points: &[CodePoint], lines: &[ContentLine]) -> String {
    let mut out = String::new();
    for (k, line) in lines.iter().enumerate() {
        if k > 0 {
            out.push('\n');
        }
        out.extend(std::iter::repeat_n(' ', line.virtual_spaces));
        out.extend(points[line.start..line.end].iter().map(|p| p.code_point));
    }
    out
}
