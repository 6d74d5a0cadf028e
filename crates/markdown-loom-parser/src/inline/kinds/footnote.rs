use std::ops::ControlFlow;

use super::scan;
use crate::ast::{
    Node, NodeKind,
    node_type::{FOOTNOTE_REFERENCE, NodeType},
};
use crate::inline::{Delimiter, InlineContext, InlineToken, InlineTokenData, InlineTokenizer};
use crate::meta::normalize_label;
use crate::source::{NodeInterval, chars::is_whitespace};
use crate::syntax::{chars, link::MAX_LABEL_LEN};

/// `[^label]` pointing at a footnote defined somewhere in the document.
#[derive(Debug, Default)]
pub struct FootnoteReference;

impl FootnoteReference {
    pub const NAME: &'static str = "footnoteReference";
}

impl InlineTokenizer for FootnoteReference {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[FOOTNOTE_REFERENCE]
    }

    fn find_delimiter(
        &self,
        start: usize,
        end: usize,
        ctx: &InlineContext<'_>,
    ) -> Option<Delimiter> {
        if ctx.meta.footnote_count() == 0 {
            return None;
        }
        let points = ctx.points;
        scan(points, start, end, |i| {
            if points[i].code_point != '[' || i + 1 >= end || points[i + 1].code_point != '^' {
                return ControlFlow::Continue(i + 1);
            }
            let label_start = i + 2;
            let mut j = label_start;
            while j < end && j - label_start <= MAX_LABEL_LEN {
                match points[j].code_point {
                    ']' => break,
                    '[' => return ControlFlow::Continue(i + 1),
                    '\\' => j += 2,
                    c if is_whitespace(c) => return ControlFlow::Continue(i + 1),
                    _ => j += 1,
                }
            }
            if j >= end || j == label_start || points[j].code_point != ']' {
                return ControlFlow::Continue(i + 1);
            }
            let label: String = chars(points, label_start, j).into_iter().collect();
            if !ctx.meta.has_footnote(&label) {
                return ControlFlow::Continue(i + 1);
            }
            ControlFlow::Break(Delimiter::full(InlineToken::atomic(
                FOOTNOTE_REFERENCE,
                NodeInterval::new(i, j + 1),
                InlineTokenData::Footnote { label },
            )))
        })
    }

    fn parse(&self, token: InlineToken, _children: Vec<Node>, ctx: &InlineContext<'_>) -> Node {
        let label = match token.data {
            InlineTokenData::Footnote { label } => label,
            _ => String::new(),
        };
        Node::new(
            NodeKind::FootnoteReference {
                identifier: normalize_label(&label),
                label,
            },
            ctx.position(token.interval),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{inline_in, meta, outline};
    use pretty_assertions::assert_eq;

    #[test]
    fn defined_footnote_is_referenced() {
        let meta = meta(&[], &["Note"]);
        assert_eq!(
            outline(&inline_in("see[^note].", &meta)),
            "text \"see\"\nfootnoteReference identifier=\"note\"\ntext \".\"\n"
        );
    }

    #[test]
    fn undefined_footnote_stays_text() {
        let meta = meta(&[], &["other"]);
        assert_eq!(outline(&inline_in("[^note]", &meta)), "text \"[^note]\"\n");
    }
}
