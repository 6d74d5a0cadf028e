//! # Built-in Block Tokenizers
//!
//! CommonMark block structure plus the GFM table, footnote and math
//! extensions.
//!
//! ## Modules
//!
//! - **`blockquote`**, **`list`**, **`footnote_definition`**: containers
//! - **`heading`**, **`setext_heading`**, **`thematic_break`**: single-line leaves
//! - **`fence`**: fenced code and display math
//! - **`indented_code`**, **`html_block`**: raw leaves
//! - **`table`**: GFM tables, built from a paragraph's last line
//! - **`definition`**: link reference definitions peeled off paragraphs
//! - **`paragraph`**: the fallback

pub mod blockquote;
pub mod definition;
pub mod fence;
pub mod footnote_definition;
pub mod heading;
pub mod html_block;
pub mod indented_code;
pub mod list;
pub mod paragraph;
pub mod setext_heading;
pub mod table;
pub mod thematic_break;

pub use blockquote::Blockquote;
pub use definition::Definition;
pub use fence::Fence;
pub use footnote_definition::FootnoteDefinition;
pub use heading::Heading;
pub use html_block::HtmlBlock;
pub use indented_code::IndentedCode;
pub use list::List;
pub use paragraph::Paragraph;
pub use setext_heading::SetextHeading;
pub use table::Table;
pub use thematic_break::ThematicBreak;

use super::{BlockTokenizer, Line, LineCursor};

/// Default block tokenizers with their priorities, in registration order.
///
/// Thematic breaks come before lists so `* * *` is never read as a bullet.
pub fn gfm_defaults() -> Vec<(Box<dyn BlockTokenizer>, i32)> {
    vec![
        (Box::new(Fence::code()), 10),
        (Box::new(Fence::math()), 10),
        (Box::new(Blockquote), 10),
        (Box::new(ThematicBreak), 10),
        (Box::new(List), 10),
        (Box::new(FootnoteDefinition), 10),
        (Box::new(Heading), 10),
        (Box::new(HtmlBlock), 10),
        (Box::new(SetextHeading), 10),
        (Box::new(Table), 10),
        (Box::new(IndentedCode), 4),
        (Box::new(Definition), -1),
    ]
}

pub fn fallback() -> Box<dyn BlockTokenizer> {
    Box::new(Paragraph)
}

/// Cursor at the first non-whitespace character when it is indented by
/// fewer than four columns.
pub(crate) fn non_indented(line: &Line<'_>, cur: LineCursor) -> Option<LineCursor> {
    (line.indent(cur) < 4).then(|| line.next_non_ws(cur))
}

/// Length of the run of `c` starting at `index`.
pub(crate) fn run_length(line: &Line<'_>, index: usize, c: char) -> usize {
    let mut n = 0;
    while line.char_at(index + n) == Some(c) {
        n += 1;
    }
    n
}

/// Cursor at the end of the line.
pub(crate) fn line_end(line: &Line<'_>, cur: LineCursor) -> LineCursor {
    line.advance_chars(cur, line.end.saturating_sub(cur.index))
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::block::{BlockEngine, BlockToken, BlockTokenizer, transform::transform_tree};
    use crate::hooks::HookTable;
    use crate::source::{CodePoint, normalize};

    pub fn tokenizers() -> Vec<Box<dyn BlockTokenizer>> {
        let mut defaults = super::gfm_defaults();
        defaults.sort_by_key(|(_, priority)| std::cmp::Reverse(*priority));
        defaults
            .into_iter()
            .map(|(tokenizer, _)| tokenizer)
            .chain(std::iter::once(super::fallback()))
            .collect()
    }

    /// Match and transform `input`, returning the root token and the points.
    pub fn blocks(input: &str) -> (BlockToken, Vec<CodePoint>) {
        let owned = tokenizers();
        let refs: Vec<&dyn BlockTokenizer> = owned.iter().map(|t| t.as_ref()).collect();
        let hooks = HookTable::build(&refs, &[], &[]);
        let points = normalize(input);
        let mut root = BlockEngine::new(&refs, &hooks, 128).run(&points).unwrap();
        transform_tree(&refs, &mut root, &points);
        (root, points)
    }

    /// Node types of the root's children.
    pub fn top_types(input: &str) -> Vec<&'static str> {
        blocks(input).0.children.iter().map(|c| c.node_type).collect()
    }
}
