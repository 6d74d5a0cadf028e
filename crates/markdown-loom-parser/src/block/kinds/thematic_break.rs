use super::{line_end, non_indented};
use crate::ast::{
    Node, NodeKind,
    node_type::{NodeType, PARAGRAPH, TABLE, THEMATIC_BREAK},
};
use crate::block::{
    BlockParseContext, BlockToken, BlockTokenData, BlockTokenizer, Line, LineCursor, MatchContext,
    OpenerResult,
};
use crate::error::ParserError;
use crate::source::{NodeInterval, chars::is_space_or_tab};

/// Three or more `*`, `-` or `_`, optionally separated by spaces.
#[derive(Debug, Default)]
pub struct ThematicBreak;

impl ThematicBreak {
    pub const NAME: &'static str = "thematicBreak";
}

impl BlockTokenizer for ThematicBreak {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[THEMATIC_BREAK]
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
        let marker = line.char_at(start.index).filter(|c| matches!(c, '*' | '-' | '_'))?;
        let mut count = 0;
        for i in start.index..line.end {
            match line.char_at(i) {
                Some(c) if c == marker => count += 1,
                Some(c) if is_space_or_tab(c) => {}
                _ => return None,
            }
        }
        if count < 3 {
            return None;
        }
        Some(OpenerResult {
            token: BlockToken::new(
                THEMATIC_BREAK,
                NodeInterval::new(start.index, line.end),
                BlockTokenData::ThematicBreak,
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
        Ok(Some(Node::new(
            NodeKind::ThematicBreak,
            ctx.position(token.interval),
        )))
    }
}
