use super::{line_end, non_indented, run_length};
use crate::ast::{
    Node, NodeKind,
    node_type::{HEADING, NodeType, PARAGRAPH, TABLE},
};
use crate::block::{
    BlockParseContext, BlockToken, BlockTokenData, BlockTokenizer, ContentLine, Line, LineCursor,
    MatchContext, OpenerResult,
};
use crate::error::ParserError;
use crate::source::{NodeInterval, chars::is_space_or_tab};

/// ATX headings: one to six `#` followed by a space or the line end.
#[derive(Debug, Default)]
pub struct Heading;

impl Heading {
    pub const NAME: &'static str = "heading";
}

/// End of heading text once trailing whitespace and an optional closing
/// `#` sequence are removed.
fn content_end(line: &Line<'_>, start: usize) -> usize {
    let trim = |mut end: usize| {
        while end > start && line.char_at(end - 1).is_some_and(is_space_or_tab) {
            end -= 1;
        }
        end
    };
    let end = trim(line.end);
    let mut hashes = end;
    while hashes > start && line.char_at(hashes - 1) == Some('#') {
        hashes -= 1;
    }
    if hashes == end {
        return end;
    }
    if hashes == start {
        return start;
    }
    if line.char_at(hashes - 1).is_some_and(is_space_or_tab) {
        trim(hashes)
    } else {
        end
    }
}

impl BlockTokenizer for Heading {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[HEADING]
    }

    fn interruptable_types(&self) -> &'static [NodeType] {
        &[PARAGRAPH, TABLE]
    }

    fn eat_opener(
        &self,
        line: &Line<'_>,
        cur: LineCursor,
        _ctx: &MatchContext,
    ) -> Option<OpenerResult> {
        let start = non_indented(line, cur)?;
        let depth = run_length(line, start.index, '#');
        if !(1..=6).contains(&depth) {
            return None;
        }
        let after = start.index + depth;
        if line.char_at(after).is_some_and(|c| !is_space_or_tab(c)) {
            return None;
        }
        let text_cursor = line.next_non_ws(line.advance_chars(start, depth));
        let text_start = text_cursor.index;
        let text_end = content_end(line, text_start).max(text_start);
        let content = ContentLine {
            start: text_start,
            end: text_end,
            first_non_ws: text_start,
            virtual_spaces: 0,
        };
        Some(OpenerResult {
            token: BlockToken::new(
                HEADING,
                NodeInterval::new(start.index, line.end),
                BlockTokenData::Heading {
                    depth: depth as u8,
                    lines: vec![content],
                },
            ),
            next: line_end(line, cur),
            saturated: true,
        })
    }

    fn parse(
        &self,
        token: BlockToken,
        _children: Vec<Node>,
        ctx: &BlockParseContext<'_>,
    ) -> Result<Option<Node>, ParserError> {
        let BlockTokenData::Heading { depth, lines } = &token.data else {
            return Ok(None);
        };
        let children = ctx.parse_lines(lines)?;
        Ok(Some(Node::with_children(
            NodeKind::Heading { depth: *depth },
            children,
            ctx.position(token.interval),
        )))
    }
}
