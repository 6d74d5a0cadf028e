use super::line_end;
use crate::ast::{
    Node, NodeKind,
    node_type::{CODE, NodeType},
};
use crate::block::{
    BlockParseContext, BlockToken, BlockTokenData, BlockTokenizer, ContinuationResult, Line,
    LineCursor, MatchContext, OpenerResult, phrasing::literal_text,
};
use crate::error::ParserError;
use crate::source::{CodePoint, NodeInterval};

const CODE_INDENT: usize = 4;

/// Lines indented by four or more columns.
#[derive(Debug, Default)]
pub struct IndentedCode;

impl IndentedCode {
    pub const NAME: &'static str = "indentedCode";
}

impl BlockTokenizer for IndentedCode {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[CODE]
    }

    fn eat_opener(
        &self,
        line: &Line<'_>,
        cur: LineCursor,
        ctx: &MatchContext,
    ) -> Option<OpenerResult> {
        // An open paragraph takes indented lines as lazy continuation.
        if ctx.open_leaf.is_some() || line.is_blank_from(cur) || line.indent(cur) < CODE_INDENT {
            return None;
        }
        let content = line.content_from(line.advance_columns(cur, CODE_INDENT));
        Some(OpenerResult {
            token: BlockToken::new(
                CODE,
                NodeInterval::new(cur.index, line.end),
                BlockTokenData::IndentedCode {
                    lines: vec![content],
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
        let blank = line.is_blank_from(cur);
        if !blank && line.indent(cur) < CODE_INDENT {
            return ContinuationResult::NotMatched;
        }
        if let BlockTokenData::IndentedCode { lines } = &mut token.data {
            lines.push(line.content_from(line.advance_columns(cur, CODE_INDENT)));
        }
        if !blank {
            token.interval.end_index = line.end;
        }
        ContinuationResult::Consumed
    }

    fn on_close(&self, token: &mut BlockToken, _points: &[CodePoint]) {
        if let BlockTokenData::IndentedCode { lines } = &mut token.data {
            while lines.last().is_some_and(|l| l.is_blank()) {
                lines.pop();
            }
        }
    }

    fn parse(
        &self,
        token: BlockToken,
        _children: Vec<Node>,
        ctx: &BlockParseContext<'_>,
    ) -> Result<Option<Node>, ParserError> {
        let BlockTokenData::IndentedCode { lines } = &token.data else {
            return Ok(None);
        };
        Ok(Some(Node::new(
            NodeKind::Code {
                lang: None,
                meta: None,
                value: literal_text(ctx.points, lines),
            },
            ctx.position(token.interval),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::blocks;
    use crate::block::phrasing::literal_text;
    use pretty_assertions::assert_eq;

    fn code_value(input: &str) -> String {
        let (root, points) = blocks(input);
        let token = &root.children[0];
        assert_eq!(token.node_type, "code");
        literal_text(&points, token.lines().unwrap())
    }

    #[test]
    fn strips_four_columns() {
        assert_eq!(code_value("    a\n      b\n"), "a\n  b");
    }

    #[test]
    fn keeps_inner_blank_lines_and_drops_trailing() {
        assert_eq!(code_value("    a\n\n    b\n\n\n"), "a\n\nb");
    }

    #[test]
    fn partial_tab_becomes_spaces() {
        assert_eq!(code_value("  \tfoo\n"), "foo");
        assert_eq!(code_value("\t\tbar\n"), "\tbar");
    }

    #[test]
    fn stops_at_unindented_line() {
        let (root, _) = blocks("    a\nb\n");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[1].node_type, "paragraph");
    }
}
