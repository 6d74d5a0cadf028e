use std::ops::ControlFlow;

use super::scan;
use crate::ast::{
    Node, NodeKind,
    node_type::{BREAK, NodeType},
};
use crate::inline::{Delimiter, InlineContext, InlineToken, InlineTokenData, InlineTokenizer};
use crate::source::NodeInterval;

/// A line ending preceded by a backslash or by two or more spaces.
#[derive(Debug, Default)]
pub struct HardBreak;

impl HardBreak {
    pub const NAME: &'static str = "break";
}

impl InlineTokenizer for HardBreak {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[BREAK]
    }

    fn find_delimiter(
        &self,
        start: usize,
        end: usize,
        ctx: &InlineContext<'_>,
    ) -> Option<Delimiter> {
        let points = ctx.points;
        let found = |i: usize, close: usize| {
            ControlFlow::Break(Delimiter::full(InlineToken::atomic(
                BREAK,
                NodeInterval::new(i, close),
                InlineTokenData::None,
            )))
        };
        scan(points, start, end, |i| match points[i].code_point {
            '\\' if i + 1 < end && points[i + 1].code_point == '\n' => found(i, i + 2),
            ' ' => {
                let spaces = super::run_length(points, i, end, ' ');
                let newline = i + spaces;
                if spaces >= 2 && newline < end && points[newline].code_point == '\n' {
                    found(i, newline + 1)
                } else {
                    ControlFlow::Continue(newline)
                }
            }
            _ => ControlFlow::Continue(i + 1),
        })
    }

    fn parse(&self, token: InlineToken, _children: Vec<Node>, ctx: &InlineContext<'_>) -> Node {
        Node::new(NodeKind::Break, ctx.position(token.interval))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{inline, outline};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("a  \nb", "text \"a\"\nbreak\ntext \"b\"\n")]
    #[case("a\\\nb", "text \"a\"\nbreak\ntext \"b\"\n")]
    #[case("a \nb", "text \"a\\nb\"\n")]
    #[case("`a  \nb`", "inlineCode \"a   b\"\n")]
    fn breaks(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(outline(&inline(input)), expected);
    }
}
