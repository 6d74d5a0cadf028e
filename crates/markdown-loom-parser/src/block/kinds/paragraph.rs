use crate::ast::{Node, NodeKind, node_type::{NodeType, PARAGRAPH}};
use crate::block::{
    BlockParseContext, BlockToken, BlockTokenData, BlockTokenizer, ContinuationResult, Line,
    LineCursor, MatchContext, OpenerResult,
};
use crate::error::ParserError;

/// Fallback block: any non-blank text no other tokenizer claims.
#[derive(Debug, Default)]
pub struct Paragraph;

impl Paragraph {
    pub const NAME: &'static str = "paragraph";

    fn push_line(line: &Line<'_>, cur: LineCursor, token: &mut BlockToken) {
        let content = line.content_from(cur);
        token.interval.end_index = token.interval.end_index.max(content.end);
        if let BlockTokenData::Paragraph { lines } = &mut token.data {
            lines.push(content);
        }
    }
}

impl BlockTokenizer for Paragraph {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[PARAGRAPH]
    }

    fn eat_opener(
        &self,
        line: &Line<'_>,
        cur: LineCursor,
        _ctx: &MatchContext,
    ) -> Option<OpenerResult> {
        let content = line.content_from(cur);
        if content.is_blank() {
            return None;
        }
        Some(OpenerResult {
            token: BlockToken::new(
                PARAGRAPH,
                content.trimmed_interval(),
                BlockTokenData::Paragraph {
                    lines: vec![content],
                },
            ),
            next: line.advance_chars(cur, line.end - cur.index),
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
        if line.is_blank_from(cur) {
            return ContinuationResult::NotMatched;
        }
        Self::push_line(line, cur, token);
        ContinuationResult::Consumed
    }

    fn eat_lazy_continuation(
        &self,
        line: &Line<'_>,
        cur: LineCursor,
        token: &mut BlockToken,
    ) -> bool {
        Self::push_line(line, cur, token);
        true
    }

    fn parse(
        &self,
        token: BlockToken,
        _children: Vec<Node>,
        ctx: &BlockParseContext<'_>,
    ) -> Result<Option<Node>, ParserError> {
        let BlockTokenData::Paragraph { lines } = &token.data else {
            return Ok(None);
        };
        if lines.iter().all(|l| l.is_blank()) {
            return Ok(None);
        }
        let children = ctx.parse_lines(lines)?;
        Ok(Some(Node::with_children(
            NodeKind::Paragraph,
            children,
            ctx.position(token.interval),
        )))
    }
}
