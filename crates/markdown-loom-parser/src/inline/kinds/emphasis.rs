use std::ops::ControlFlow;

use super::{run_length, scan};
use crate::ast::{
    Node, NodeKind,
    node_type::{DELETE, EMPHASIS, NodeType, STRONG},
};
use crate::inline::{
    Delimiter, DelimiterData, DelimiterKind, InlineContext, InlineToken, InlineTokenData,
    InlineTokenizer, PairOutcome, PairResult,
};
use crate::source::{
    CodePoint, NodeInterval,
    chars::{is_punctuation, is_whitespace},
};

/// Whether the run `start..end` of `marker` can open and close.
///
/// The edges of the run count as whitespace.
fn flanking(points: &[CodePoint], start: usize, end: usize, marker: char) -> (bool, bool) {
    let before = if start == 0 {
        ' '
    } else {
        points[start - 1].code_point
    };
    let after = points.get(end).map_or(' ', |p| p.code_point);
    let left = !is_whitespace(after)
        && (!is_punctuation(after) || is_whitespace(before) || is_punctuation(before));
    let right = !is_whitespace(before)
        && (!is_punctuation(before) || is_whitespace(after) || is_punctuation(after));
    if marker == '_' {
        (
            left && (!right || is_punctuation(before)),
            right && (!left || is_punctuation(after)),
        )
    } else {
        (left, right)
    }
}

/// Delimiter runs: `*`/`_` for emphasis and strong, `~` for strikethrough.
#[derive(Debug)]
pub struct Emphasis {
    name: &'static str,
    markers: &'static [char],
    node_types: &'static [NodeType],
    strikethrough: bool,
}

impl Emphasis {
    pub const EMPHASIS: &'static str = "emphasis";
    pub const DELETE: &'static str = "delete";

    pub fn emphasis() -> Self {
        Self {
            name: Self::EMPHASIS,
            markers: &['*', '_'],
            node_types: &[EMPHASIS, STRONG],
            strikethrough: false,
        }
    }

    pub fn delete() -> Self {
        Self {
            name: Self::DELETE,
            markers: &['~'],
            node_types: &[DELETE],
            strikethrough: true,
        }
    }

    fn runs(opener: &Delimiter, closer: &Delimiter) -> Option<(char, usize, usize)> {
        match (&opener.data, &closer.data) {
            (
                DelimiterData::Run {
                    marker: om,
                    original: oo,
                },
                DelimiterData::Run {
                    marker: cm,
                    original: co,
                },
            ) if om == cm => Some((*om, *oo, *co)),
            _ => None,
        }
    }
}

impl InlineTokenizer for Emphasis {
    fn name(&self) -> &'static str {
        self.name
    }

    fn node_types(&self) -> &'static [NodeType] {
        self.node_types
    }

    fn find_delimiter(
        &self,
        start: usize,
        end: usize,
        ctx: &InlineContext<'_>,
    ) -> Option<Delimiter> {
        let points = ctx.points;
        scan(points, start, end, |i| {
            let marker = points[i].code_point;
            if !self.markers.contains(&marker) {
                return ControlFlow::Continue(i + 1);
            }
            let n = run_length(points, i, end, marker);
            if self.strikethrough && n > 2 {
                return ControlFlow::Continue(i + n);
            }
            let kind = match flanking(points, i, i + n, marker) {
                (true, true) => DelimiterKind::Both,
                (true, false) => DelimiterKind::Opener,
                (false, true) => DelimiterKind::Closer,
                (false, false) => return ControlFlow::Continue(i + n),
            };
            ControlFlow::Break(Delimiter::new(
                kind,
                NodeInterval::new(i, i + n),
                DelimiterData::Run { marker, original: n },
            ))
        })
    }

    fn is_delimiter_pair(
        &self,
        opener: &Delimiter,
        closer: &Delimiter,
        _ctx: &InlineContext<'_>,
    ) -> PairResult {
        let Some((marker, opener_len, closer_len)) = Self::runs(opener, closer) else {
            return PairResult::Skip;
        };
        if !self.markers.contains(&marker) {
            return PairResult::Skip;
        }
        if self.strikethrough {
            return if opener.thickness() == closer.thickness() {
                PairResult::Paired
            } else {
                PairResult::Skip
            };
        }
        // Rule of 3: a run that can both open and close only pairs when
        // the summed lengths are not a multiple of 3, unless both are.
        let either_both = opener.kind == DelimiterKind::Both || closer.kind == DelimiterKind::Both;
        if either_both
            && (opener_len + closer_len) % 3 == 0
            && !(opener_len % 3 == 0 && closer_len % 3 == 0)
        {
            return PairResult::Skip;
        }
        PairResult::Paired
    }

    /// Pairing looks at the closer's marker, whether it may also open, and
    /// its run length modulo 3 (exact length for `~`).
    fn closer_class(&self, closer: &Delimiter) -> Option<u64> {
        let DelimiterData::Run { marker, original } = closer.data else {
            return None;
        };
        let length = if self.strikethrough {
            closer.thickness()
        } else {
            original % 3
        };
        let both = u64::from(closer.kind == DelimiterKind::Both);
        Some((u64::from(marker) << 8) | (both << 4) | length as u64)
    }

    fn process_delimiter_pair(
        &self,
        opener: Delimiter,
        closer: Delimiter,
        inner: Vec<InlineToken>,
        _ctx: &InlineContext<'_>,
    ) -> PairOutcome {
        let used = if self.strikethrough {
            opener.thickness()
        } else if opener.thickness() >= 2 && closer.thickness() >= 2 {
            2
        } else {
            1
        };
        let node_type = match (self.strikethrough, used) {
            (true, _) => DELETE,
            (false, 2) => STRONG,
            _ => EMPHASIS,
        };
        let (o, c) = (opener.interval, closer.interval);
        let token = InlineToken::container(
            node_type,
            NodeInterval::new(o.end_index - used, c.start_index + used),
            NodeInterval::new(o.end_index, c.start_index),
            InlineTokenData::None,
            inner,
        );

        let remaining_opener = (opener.thickness() > used).then(|| Delimiter {
            interval: NodeInterval::new(o.start_index, o.end_index - used),
            ..opener
        });
        let remaining_closer = (closer.thickness() > used).then(|| Delimiter {
            interval: NodeInterval::new(c.start_index + used, c.end_index),
            ..closer
        });
        PairOutcome {
            token: Some(token),
            remaining_opener,
            remaining_closer,
            ..Default::default()
        }
    }

    fn parse(&self, token: InlineToken, children: Vec<Node>, ctx: &InlineContext<'_>) -> Node {
        let kind = match token.node_type {
            STRONG => NodeKind::Strong,
            DELETE => NodeKind::Delete,
            _ => NodeKind::Emphasis,
        };
        Node::with_children(kind, children, ctx.position(token.interval))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{inline, outline};
    use super::*;
    use crate::syntax::points;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("*foo**bar***", "emphasis\n  text \"foo\"\n  strong\n    text \"bar\"\n")]
    #[case("**a** b", "strong\n  text \"a\"\ntext \" b\"\n")]
    #[case("***a***", "emphasis\n  strong\n    text \"a\"\n")]
    #[case(
        "*a **b** c*",
        "emphasis\n  text \"a \"\n  strong\n    text \"b\"\n  text \" c\"\n"
    )]
    #[case("foo_bar_", "text \"foo_bar_\"\n")]
    #[case("a * b *", "text \"a * b *\"\n")]
    #[case("**a*", "text \"*\"\nemphasis\n  text \"a\"\n")]
    #[case("\\*a*", "text \"*a*\"\n")]
    fn emphasis(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(outline(&inline(input)), expected);
    }

    #[rstest]
    #[case("~~del~~", "delete\n  text \"del\"\n")]
    #[case("~a~", "delete\n  text \"a\"\n")]
    #[case("~~~a~~~", "text \"~~~a~~~\"\n")]
    #[case("~~a~", "text \"~~a~\"\n")]
    fn strikethrough(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(outline(&inline(input)), expected);
    }

    #[rstest]
    #[case("*a **b*", "text \"*a *\"\nemphasis\n  text \"b\"\n")]
    #[case(
        "*a *b c* d**",
        "emphasis\n  text \"a \"\n  emphasis\n    text \"b c\"\n  text \" d\"\ntext \"*\"\n"
    )]
    #[case("a_ a_ _b_", "text \"a_ a_ \"\nemphasis\n  text \"b\"\n")]
    #[case("_a *b_ c*", "emphasis\n  text \"a *b\"\ntext \" c*\"\n")]
    fn closers_skip_openers_that_cannot_pair(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(outline(&inline(input)), expected);
    }

    #[test]
    fn closer_classes_follow_pairing_inputs() {
        let tokenizer = Emphasis::emphasis();
        let ctx_points = points("a*b a****b a**");
        let meta = crate::meta::MetaRegistry::default();
        let ctx = InlineContext {
            points: &ctx_points,
            meta: &meta,
            in_link: false,
            keep_references: false,
        };
        let first = tokenizer.find_delimiter(0, ctx_points.len(), &ctx).unwrap();
        let second = tokenizer.find_delimiter(3, ctx_points.len(), &ctx).unwrap();
        let third = tokenizer.find_delimiter(10, ctx_points.len(), &ctx).unwrap();
        // `*` and `****` both open and close and agree modulo 3.
        assert_eq!(tokenizer.closer_class(&first), tokenizer.closer_class(&second));
        assert_ne!(tokenizer.closer_class(&first), tokenizer.closer_class(&third));
    }

    #[rstest]
    #[case("*a", 0, 1, '*', (true, false))]
    #[case("a*", 1, 2, '*', (false, true))]
    #[case("a*b", 1, 2, '*', (true, true))]
    #[case("a_b", 1, 2, '_', (false, false))]
    #[case("\"_a", 1, 2, '_', (true, false))]
    fn flanking_runs(
        #[case] text: &str,
        #[case] start: usize,
        #[case] end: usize,
        #[case] marker: char,
        #[case] expected: (bool, bool),
    ) {
        assert_eq!(flanking(&points(text), start, end, marker), expected);
    }
}
