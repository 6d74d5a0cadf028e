use super::non_indented;
use crate::ast::{
    Node, NodeKind,
    node_type::{BLOCKQUOTE, NodeType, PARAGRAPH, TABLE},
};
use crate::block::{
    BlockParseContext, BlockToken, BlockTokenData, BlockTokenizer, ContinuationResult, Line,
    LineCursor, MatchContext, OpenerResult,
};
use crate::error::ParserError;
use crate::source::{NodeInterval, chars::is_space_or_tab};

/// `>` block quotes, continued by further `>` lines or lazy paragraph text.
#[derive(Debug, Default)]
pub struct Blockquote;

impl Blockquote {
    pub const NAME: &'static str = "blockquote";

    /// `>` plus one optional column of whitespace.
    fn marker(line: &Line<'_>, cur: LineCursor) -> Option<(usize, LineCursor)> {
        let start = non_indented(line, cur)?;
        if line.char_at(start.index) != Some('>') {
            return None;
        }
        let mut next = line.advance_chars(start, 1);
        if line.char_at(next.index).is_some_and(is_space_or_tab) {
            next = line.advance_columns(next, 1);
        }
        Some((start.index, next))
    }
}

impl BlockTokenizer for Blockquote {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[BLOCKQUOTE]
    }

    fn is_container(&self) -> bool {
        true
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
        let (start, next) = Self::marker(line, cur)?;
        Some(OpenerResult {
            token: BlockToken::new(
                BLOCKQUOTE,
                NodeInterval::new(start, next.index.max(start + 1)),
                BlockTokenData::Blockquote,
            ),
            next,
            saturated: false,
        })
    }

    fn eat_continuation(
        &self,
        line: &Line<'_>,
        cur: LineCursor,
        _token: &mut BlockToken,
        _ctx: &MatchContext,
    ) -> ContinuationResult {
        match Self::marker(line, cur) {
            Some((_, next)) => ContinuationResult::Opening { next },
            None => ContinuationResult::NotMatched,
        }
    }

    fn keeps_blank_line(&self, _token: &BlockToken, _line: &Line<'_>) -> bool {
        true
    }

    fn parse(
        &self,
        token: BlockToken,
        children: Vec<Node>,
        ctx: &BlockParseContext<'_>,
    ) -> Result<Option<Node>, ParserError> {
        Ok(Some(Node::with_children(
            NodeKind::Blockquote,
            children,
            ctx.position(token.interval),
        )))
    }
}
