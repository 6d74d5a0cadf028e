//! Raw HTML grammar: tags, comments, processing instructions, declarations and CDATA.
//!
//! Every matcher takes `s[i] == '<'` and returns the local index just past
//! the construct.

use super::{at, starts_with, starts_with_ignore_case};
use crate::source::CodePoint;

fn is_tag_name_start(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn is_tag_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

/// Skips whitespace including line endings; returns the new index and
/// whether anything was skipped.
fn skip_ws(s: &[CodePoint], mut i: usize) -> (usize, bool) {
    let start = i;
    while matches!(at(s, i), Some(' ' | '\t' | '\n')) {
        i += 1;
    }
    (i, i > start)
}

/// Tag name starting at `i`; returns its end.
pub fn tag_name_end(s: &[CodePoint], i: usize) -> Option<usize> {
    if !at(s, i).is_some_and(is_tag_name_start) {
        return None;
    }
    let mut j = i + 1;
    while at(s, j).is_some_and(is_tag_name_char) {
        j += 1;
    }
    Some(j)
}

fn attribute_end(s: &[CodePoint], i: usize) -> Option<usize> {
    let first = at(s, i)?;
    if !(first.is_ascii_alphabetic() || first == '_' || first == ':') {
        return None;
    }
    let mut j = i + 1;
    while at(s, j).is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '-'))
    {
        j += 1;
    }
    // optional `= value`
    let (k, _) = skip_ws(s, j);
    if at(s, k) != Some('=') {
        return Some(j);
    }
    let (k, _) = skip_ws(s, k + 1);
    match at(s, k)? {
        q @ ('"' | '\'') => {
            let mut m = k + 1;
            loop {
                let c = at(s, m)?;
                if c == q {
                    return Some(m + 1);
                }
                m += 1;
            }
        }
        _ => {
            let mut m = k;
            while at(s, m).is_some_and(|c| {
                !matches!(c, ' ' | '\t' | '\n' | '"' | '\'' | '=' | '<' | '>' | '`')
            }) {
                m += 1;
            }
            (m > k).then_some(m)
        }
    }
}

/// `<name attr="v" ... />`
pub fn open_tag_end(s: &[CodePoint], i: usize) -> Option<usize> {
    if at(s, i) != Some('<') {
        return None;
    }
    let mut j = tag_name_end(s, i + 1)?;
    loop {
        let (k, had_ws) = skip_ws(s, j);
        match at(s, k)? {
            '>' => return Some(k + 1),
            '/' => return (at(s, k + 1) == Some('>')).then_some(k + 2),
            _ if had_ws => j = attribute_end(s, k)?,
            _ => return None,
        }
    }
}

/// `</name >`
pub fn closing_tag_end(s: &[CodePoint], i: usize) -> Option<usize> {
    if !starts_with(s, i, "</") {
        return None;
    }
    let j = tag_name_end(s, i + 2)?;
    let (k, _) = skip_ws(s, j);
    (at(s, k) == Some('>')).then_some(k + 1)
}

fn find(s: &[CodePoint], from: usize, pat: &str) -> Option<usize> {
    (from..s.len()).find(|&j| starts_with(s, j, pat))
}

/// `<!-- ... -->`, including the degenerate `<!-->` and `<!--->`.
pub fn comment_end(s: &[CodePoint], i: usize) -> Option<usize> {
    if !starts_with(s, i, "<!--") {
        return None;
    }
    if starts_with(s, i + 4, ">") {
        return Some(i + 5);
    }
    if starts_with(s, i + 4, "->") {
        return Some(i + 6);
    }
    find(s, i + 4, "-->").map(|j| j + 3)
}

/// `<? ... ?>`
pub fn processing_instruction_end(s: &[CodePoint], i: usize) -> Option<usize> {
    if !starts_with(s, i, "<?") {
        return None;
    }
    find(s, i + 2, "?>").map(|j| j + 2)
}

/// `<!NAME ... >`
pub fn declaration_end(s: &[CodePoint], i: usize) -> Option<usize> {
    if !starts_with(s, i, "<!") || !at(s, i + 2).is_some_and(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    find(s, i + 3, ">").map(|j| j + 1)
}

/// `<![CDATA[ ... ]]>`
pub fn cdata_end(s: &[CodePoint], i: usize) -> Option<usize> {
    if !starts_with(s, i, "<![CDATA[") {
        return None;
    }
    find(s, i + 9, "]]>").map(|j| j + 3)
}

/// Any inline HTML construct.
pub fn inline_html_end(s: &[CodePoint], i: usize) -> Option<usize> {
    open_tag_end(s, i)
        .or_else(|| closing_tag_end(s, i))
        .or_else(|| comment_end(s, i))
        .or_else(|| processing_instruction_end(s, i))
        .or_else(|| cdata_end(s, i))
        .or_else(|| declaration_end(s, i))
}

/// Case-insensitive match of one of `names` as a whole tag name at `i`.
pub fn tag_name_in(s: &[CodePoint], i: usize, names: &[&str]) -> Option<usize> {
    let end = tag_name_end(s, i)?;
    names
        .iter()
        .any(|name| name.len() == end - i && starts_with_ignore_case(s, i, name))
        .then_some(end)
}
