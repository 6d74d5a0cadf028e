use std::ops::ControlFlow;

use super::scan;
use crate::ast::{
    Node, NodeKind,
    node_type::{HTML, NodeType},
};
use crate::inline::{Delimiter, InlineContext, InlineToken, InlineTokenData, InlineTokenizer};
use crate::source::{NodeInterval, slice_string};
use crate::syntax::html::inline_html_end;

/// Raw HTML tags, comments, declarations and CDATA inside a paragraph.
#[derive(Debug, Default)]
pub struct HtmlInline;

impl HtmlInline {
    pub const NAME: &'static str = "htmlInline";
}

impl InlineTokenizer for HtmlInline {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[HTML]
    }

    fn find_delimiter(
        &self,
        start: usize,
        end: usize,
        ctx: &InlineContext<'_>,
    ) -> Option<Delimiter> {
        let bounded = &ctx.points[..end];
        scan(bounded, start, end, |i| {
            if bounded[i].code_point != '<' {
                return ControlFlow::Continue(i + 1);
            }
            match inline_html_end(bounded, i) {
                Some(close) => {
                    let interval = NodeInterval::new(i, close);
                    ControlFlow::Break(Delimiter::full(InlineToken::atomic(
                        HTML,
                        interval,
                        InlineTokenData::Literal(slice_string(bounded, interval)),
                    )))
                }
                None => ControlFlow::Continue(i + 1),
            }
        })
    }

    fn parse(&self, token: InlineToken, _children: Vec<Node>, ctx: &InlineContext<'_>) -> Node {
        let value = match token.data {
            InlineTokenData::Literal(value) => value,
            _ => String::new(),
        };
        Node::new(NodeKind::Html { value }, ctx.position(token.interval))
    }
}
