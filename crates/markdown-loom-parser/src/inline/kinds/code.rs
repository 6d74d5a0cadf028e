use std::ops::ControlFlow;

use super::{run_length, scan};
use crate::ast::{
    Node, NodeKind,
    node_type::{INLINE_CODE, INLINE_MATH, NodeType},
};
use crate::inline::{Delimiter, InlineContext, InlineToken, InlineTokenData, InlineTokenizer};
use crate::source::{CodePoint, NodeInterval};

/// Index of the next backtick run of exactly `n` in `from..end`.
fn closing_run(points: &[CodePoint], from: usize, end: usize, n: usize) -> Option<usize> {
    let mut j = from;
    while j < end {
        if points[j].code_point == '`' {
            let m = run_length(points, j, end, '`');
            if m == n {
                return Some(j);
            }
            j += m;
        } else {
            j += 1;
        }
    }
    None
}

/// Line endings become spaces; one space is stripped from each side when
/// both are present and the content is not all spaces.
fn code_value(points: &[CodePoint], start: usize, end: usize) -> String {
    let chars: Vec<char> = points[start..end]
        .iter()
        .map(|p| if p.code_point == '\n' { ' ' } else { p.code_point })
        .collect();
    let strip = chars.len() >= 2
        && chars.first() == Some(&' ')
        && chars.last() == Some(&' ')
        && chars.iter().any(|&c| c != ' ');
    if strip {
        chars[1..chars.len() - 1].iter().collect()
    } else {
        chars.into_iter().collect()
    }
}

/// `` `code` ``; backslash escapes do not apply inside.
#[derive(Debug, Default)]
pub struct InlineCode;

impl InlineCode {
    pub const NAME: &'static str = "inlineCode";
}

impl InlineTokenizer for InlineCode {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[INLINE_CODE]
    }

    fn find_delimiter(
        &self,
        start: usize,
        end: usize,
        ctx: &InlineContext<'_>,
    ) -> Option<Delimiter> {
        let points = ctx.points;
        scan(points, start, end, |i| {
            if points[i].code_point != '`' {
                return ControlFlow::Continue(i + 1);
            }
            let n = run_length(points, i, end, '`');
            match closing_run(points, i + n, end, n) {
                Some(close) => ControlFlow::Break(Delimiter::full(InlineToken::atomic(
                    INLINE_CODE,
                    NodeInterval::new(i, close + n),
                    InlineTokenData::Literal(code_value(points, i + n, close)),
                ))),
                None => ControlFlow::Continue(i + n),
            }
        })
    }

    fn parse(&self, token: InlineToken, _children: Vec<Node>, ctx: &InlineContext<'_>) -> Node {
        let value = match token.data {
            InlineTokenData::Literal(value) => value,
            _ => String::new(),
        };
        Node::new(NodeKind::InlineCode { value }, ctx.position(token.interval))
    }
}

/// `` $`math`$ ``, a code span wrapped in dollar signs.
#[derive(Debug, Default)]
pub struct InlineMath;

impl InlineMath {
    pub const NAME: &'static str = "inlineMath";
}

impl InlineTokenizer for InlineMath {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[INLINE_MATH]
    }

    fn find_delimiter(
        &self,
        start: usize,
        end: usize,
        ctx: &InlineContext<'_>,
    ) -> Option<Delimiter> {
        let points = ctx.points;
        scan(points, start, end, |i| {
            if points[i].code_point != '$' || i + 1 >= end || points[i + 1].code_point != '`' {
                return ControlFlow::Continue(i + 1);
            }
            let n = run_length(points, i + 1, end, '`');
            let mut from = i + 1 + n;
            while let Some(close) = closing_run(points, from, end, n) {
                if close + n < end && points[close + n].code_point == '$' {
                    return ControlFlow::Break(Delimiter::full(InlineToken::atomic(
                        INLINE_MATH,
                        NodeInterval::new(i, close + n + 1),
                        InlineTokenData::Literal(code_value(points, i + 1 + n, close)),
                    )));
                }
                from = close + n;
            }
            ControlFlow::Continue(i + 1)
        })
    }

    fn parse(&self, token: InlineToken, _children: Vec<Node>, ctx: &InlineContext<'_>) -> Node {
        let value = match token.data {
            InlineTokenData::Literal(value) => value,
            _ => String::new(),
        };
        Node::new(NodeKind::InlineMath { value }, ctx.position(token.interval))
    }
}
