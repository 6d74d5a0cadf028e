//! Fenced code blocks and display math share one fence grammar.

use super::{line_end, non_indented, run_length};
use crate::ast::{
    Node, NodeKind,
    node_type::{CODE, MATH, NodeType, PARAGRAPH, TABLE},
};
use crate::block::{
    BlockParseContext, BlockToken, BlockTokenData, BlockTokenizer, ContinuationResult, Line,
    LineCursor, MatchContext, OpenerResult, phrasing::literal_text,
};
use crate::error::ParserError;
use crate::source::{NodeInterval, chars::is_space_or_tab, text::decode};
use crate::syntax::chars;

/// Fenced blocks: code between backtick or tilde fences, and `$$` math.
#[derive(Debug, Clone)]
pub struct Fence {
    name: &'static str,
    node_type: NodeType,
    markers: &'static [char],
    min_size: usize,
}

impl Fence {
    pub const CODE: &'static str = "fencedCode";
    pub const MATH: &'static str = "math";

    /// ```` ``` ```` or `~~~` fences producing `code` nodes.
    pub fn code() -> Self {
        Self {
            name: Self::CODE,
            node_type: CODE,
            markers: &['`', '~'],
            min_size: 3,
        }
    }

    /// `$$` fences producing `math` nodes.
    pub fn math() -> Self {
        Self {
            name: Self::MATH,
            node_type: MATH,
            markers: &['$'],
            min_size: 2,
        }
    }

    fn is_closing(&self, line: &Line<'_>, cur: LineCursor, marker: char, size: usize) -> bool {
        let Some(start) = non_indented(line, cur) else {
            return false;
        };
        let n = run_length(line, start.index, marker);
        n >= size && line.is_blank_from(line.advance_chars(start, n))
    }
}

impl BlockTokenizer for Fence {
    fn name(&self) -> &'static str {
        self.name
    }

    fn node_types(&self) -> &'static [NodeType] {
        if self.node_type == MATH { &[MATH] } else { &[CODE] }
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
        let marker = line.char_at(start.index).filter(|c| self.markers.contains(c))?;
        let size = run_length(line, start.index, marker);
        if size < self.min_size {
            return None;
        }
        let info_start = line.next_non_ws(line.advance_chars(start, size)).index;
        let mut info_end = line.end;
        while info_end > info_start && line.char_at(info_end - 1).is_some_and(is_space_or_tab) {
            info_end -= 1;
        }
        if marker != '~' && (info_start..info_end).any(|i| line.char_at(i) == Some(marker)) {
            return None;
        }
        Some(OpenerResult {
            token: BlockToken::new(
                self.node_type,
                NodeInterval::new(start.index, line.end),
                BlockTokenData::Fence {
                    marker,
                    size,
                    indent: start.column - cur.column,
                    info: NodeInterval::new(info_start, info_end),
                    lines: Vec::new(),
                    closed: false,
                },
            ),
            next: line_end(line, cur),
            saturated: false,
        })
    }

    fn eat_continuation(
        &self,
        line: &Line<'_>,
        cur: LineCursor,
        token: &mut BlockToken,
        _ctx: &MatchContext,
    ) -> ContinuationResult {
        let BlockTokenData::Fence {
            marker,
            size,
            indent,
            lines,
            closed,
            ..
        } = &mut token.data
        else {
            return ContinuationResult::NotMatched;
        };
        token.interval.end_index = line.end;
        if self.is_closing(line, cur, *marker, *size) {
            *closed = true;
            return ContinuationResult::Closing;
        }
        lines.push(line.content_from(line.advance_columns(cur, *indent)));
        ContinuationResult::Consumed
    }

    fn keeps_blank_line(&self, _token: &BlockToken, _line: &Line<'_>) -> bool {
        true
    }

    fn parse(
        &self,
        token: BlockToken,
        _children: Vec<Node>,
        ctx: &BlockParseContext<'_>,
    ) -> Result<Option<Node>, ParserError> {
        let BlockTokenData::Fence { info, lines, .. } = &token.data else {
            return Ok(None);
        };
        let value = literal_text(ctx.points, lines);
        let info = decode(&chars(ctx.points, info.start_index, info.end_index));
        let info = (!info.is_empty()).then_some(info);
        let kind = if self.node_type == MATH {
            NodeKind::Math { meta: info, value }
        } else {
            let (lang, meta) = match info {
                Some(info) => match info.split_once([' ', '\t']) {
                    Some((lang, rest)) => {
                        let rest = rest.trim();
                        (Some(lang.to_string()), (!rest.is_empty()).then(|| rest.to_string()))
                    }
                    None => (Some(info), None),
                },
                None => (None, None),
            };
            NodeKind::Code { lang, meta, value }
        };
        Ok(Some(Node::new(kind, ctx.position(token.interval))))
    }
}
