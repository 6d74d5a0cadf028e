//! Links and images, inline and by reference.
//!
//! All four tokenizers share the `bracket` delimiter group: `[` and `![`
//! openers wait on the stack until a `]` closer arrives. Inline closers carry
//! their destination; reference closers carry the label to look up.

use std::ops::ControlFlow;

use super::scan;
use crate::ast::{
    Node, NodeKind, ReferenceType,
    node_type::{IMAGE, IMAGE_REFERENCE, LINK, LINK_REFERENCE, NodeType},
};
use crate::inline::{
    Delimiter, DelimiterData, DelimiterKind, InlineContext, InlineToken, InlineTokenData,
    InlineTokenizer, PairOutcome, PairResult,
};
use crate::meta::normalize_label;
use crate::source::{CodePoint, NodeInterval, chars::is_ascii_punctuation};
use crate::syntax::{
    at, chars,
    link::{MAX_LABEL_LEN, parse_link_destination, parse_link_label, parse_link_title},
    skip_spaces_one_newline, starts_with,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closers {
    /// `](destination "title")`
    Inline,
    /// `]`, `][]`, `][label]`
    Reference,
}

/// `](dest "title")` starting at `s[i] == ']'`.
fn inline_closer(s: &[CodePoint], i: usize) -> Option<Delimiter> {
    if at(s, i + 1) != Some('(') {
        return None;
    }
    let start = skip_spaces_one_newline(s, i + 2);
    let (url, title, end) = if at(s, start) == Some(')') {
        (String::new(), None, start + 1)
    } else {
        let dest = parse_link_destination(s, start)?;
        let after = skip_spaces_one_newline(s, dest.end);
        if at(s, after) == Some(')') {
            (dest.value, None, after + 1)
        } else if after > dest.end {
            let title = parse_link_title(s, after)?;
            let close = skip_spaces_one_newline(s, title.end);
            if at(s, close) != Some(')') {
                return None;
            }
            (dest.value, Some(title.value), close + 1)
        } else {
            return None;
        }
    };
    Some(Delimiter::new(
        DelimiterKind::Closer,
        NodeInterval::new(i, end),
        DelimiterData::InlineLinkCloser { url, title },
    ))
}

/// `]`, `][]` or `][label]` starting at `s[i] == ']'`.
///
/// A following `[label]` that is not defined leaves no closer here, so the
/// label can pair as its own shortcut reference.
fn reference_closer(s: &[CodePoint], i: usize, ctx: &InlineContext<'_>) -> Option<Delimiter> {
    let (label, reference_type, end) = if starts_with(s, i + 1, "[]") {
        (None, ReferenceType::Collapsed, i + 3)
    } else if let Some(label) = parse_link_label(s, i + 1) {
        if !ctx.meta.has_definition(&label.value) {
            return None;
        }
        (Some(label.value), ReferenceType::Full, label.end)
    } else {
        (None, ReferenceType::Shortcut, i + 1)
    };
    Some(Delimiter::new(
        DelimiterKind::Closer,
        NodeInterval::new(i, end),
        DelimiterData::ReferenceCloser {
            label,
            reference_type,
        },
    ))
}

/// Raw label between the brackets, when it is a valid label.
fn bracketed_label(points: &[CodePoint], start: usize, end: usize) -> Option<String> {
    if end - start > MAX_LABEL_LEN {
        return None;
    }
    let raw = chars(points, start, end);
    let mut k = 0;
    while k < raw.len() {
        match raw[k] {
            '\\' if raw.get(k + 1).is_some_and(|&c| is_ascii_punctuation(c)) => k += 2,
            '[' | ']' => return None,
            _ => k += 1,
        }
    }
    raw.iter()
        .any(|c| !c.is_whitespace())
        .then(|| raw.into_iter().collect())
}

/// Label and reference type a reference closer resolves with.
fn reference_label(
    opener: &Delimiter,
    closer: &Delimiter,
    ctx: &InlineContext<'_>,
) -> Option<(String, ReferenceType)> {
    let DelimiterData::ReferenceCloser {
        label,
        reference_type,
    } = &closer.data
    else {
        return None;
    };
    match label {
        Some(label) => Some((label.clone(), *reference_type)),
        None => bracketed_label(
            ctx.points,
            opener.interval.end_index,
            closer.interval.start_index,
        )
        .map(|label| (label, *reference_type)),
    }
}

fn alt_text(children: &[Node]) -> String {
    children.iter().map(Node::plain_text).collect()
}

/// One of `link`, `image`, `linkReference` or `imageReference`.
#[derive(Debug)]
pub struct Bracket {
    name: &'static str,
    node_type: &'static [NodeType],
    image: bool,
    closers: Closers,
}

impl Bracket {
    pub const GROUP: &'static str = "bracket";

    pub fn link() -> Self {
        Self {
            name: "link",
            node_type: &[LINK],
            image: false,
            closers: Closers::Inline,
        }
    }

    pub fn image() -> Self {
        Self {
            name: "image",
            node_type: &[IMAGE],
            image: true,
            closers: Closers::Inline,
        }
    }

    pub fn link_reference() -> Self {
        Self {
            name: "linkReference",
            node_type: &[LINK_REFERENCE],
            image: false,
            closers: Closers::Reference,
        }
    }

    pub fn image_reference() -> Self {
        Self {
            name: "imageReference",
            node_type: &[IMAGE_REFERENCE],
            image: true,
            closers: Closers::Reference,
        }
    }
}

impl InlineTokenizer for Bracket {
    fn name(&self) -> &'static str {
        self.name
    }

    fn node_types(&self) -> &'static [NodeType] {
        self.node_type
    }

    fn delimiter_group(&self) -> &'static str {
        Self::GROUP
    }

    fn find_delimiter(
        &self,
        start: usize,
        end: usize,
        ctx: &InlineContext<'_>,
    ) -> Option<Delimiter> {
        let bounded = &ctx.points[..end];
        scan(bounded, start, end, |i| {
            let found = match bounded[i].code_point {
                '!' if self.image && at(bounded, i + 1) == Some('[') => Some(Delimiter::new(
                    DelimiterKind::Opener,
                    NodeInterval::new(i, i + 2),
                    DelimiterData::Bracket { image: true },
                )),
                '[' if !self.image => Some(Delimiter::new(
                    DelimiterKind::Opener,
                    NodeInterval::new(i, i + 1),
                    DelimiterData::Bracket { image: false },
                )),
                ']' => match self.closers {
                    Closers::Inline => inline_closer(bounded, i),
                    Closers::Reference => reference_closer(bounded, i, ctx),
                },
                _ => None,
            };
            match found {
                Some(delimiter) => ControlFlow::Break(delimiter),
                None => ControlFlow::Continue(i + 1),
            }
        })
    }

    fn is_delimiter_pair(
        &self,
        opener: &Delimiter,
        closer: &Delimiter,
        ctx: &InlineContext<'_>,
    ) -> PairResult {
        let DelimiterData::Bracket { image } = opener.data else {
            return PairResult::Skip;
        };
        if image != self.image {
            return PairResult::Skip;
        }
        match (&closer.data, self.closers) {
            (DelimiterData::InlineLinkCloser { .. }, Closers::Inline) if opener.active => {
                PairResult::Paired
            }
            (DelimiterData::ReferenceCloser { .. }, Closers::Reference) if opener.active => {
                match reference_label(opener, closer, ctx) {
                    Some((label, _)) if ctx.meta.has_definition(&label) => PairResult::Paired,
                    _ => PairResult::Reject,
                }
            }
            (DelimiterData::InlineLinkCloser { .. }, Closers::Inline)
            | (DelimiterData::ReferenceCloser { .. }, Closers::Reference) => PairResult::Reject,
            _ => PairResult::Skip,
        }
    }

    fn process_delimiter_pair(
        &self,
        opener: Delimiter,
        closer: Delimiter,
        inner: Vec<InlineToken>,
        ctx: &InlineContext<'_>,
    ) -> PairOutcome {
        let data = match self.closers {
            Closers::Reference => match reference_label(&opener, &closer, ctx) {
                Some((label, reference_type)) => InlineTokenData::Reference {
                    label,
                    reference_type,
                },
                None => return PairOutcome::unpaired(inner),
            },
            Closers::Inline => match closer.data {
                DelimiterData::InlineLinkCloser { url, title } => {
                    InlineTokenData::Link { url, title }
                }
                _ => return PairOutcome::unpaired(inner),
            },
        };
        let token = InlineToken::container(
            self.node_type[0],
            NodeInterval::new(opener.interval.start_index, closer.interval.end_index),
            NodeInterval::new(opener.interval.end_index, closer.interval.start_index),
            data,
            inner,
        );
        PairOutcome {
            token: Some(token),
            deactivate_older: !self.image,
            ..Default::default()
        }
    }

    /// Every bracket opener answers every bracket closer, so one class covers
    /// them all.
    fn closer_class(&self, _closer: &Delimiter) -> Option<u64> {
        Some(0)
    }

    /// Only the `]` is spent; a `[label]` after it may still open.
    fn unpaired_closer_end(&self, closer: &Delimiter) -> usize {
        closer.interval.start_index + 1
    }

    /// Links may not contain links, so a new link disables older `[`.
    fn should_deactivate(&self, older: &Delimiter) -> bool {
        matches!(older.data, DelimiterData::Bracket { image: false })
    }

    fn parse(&self, token: InlineToken, children: Vec<Node>, ctx: &InlineContext<'_>) -> Node {
        let position = ctx.position(token.interval);
        match token.data {
            InlineTokenData::Link { url, title } if self.image => Node::new(
                NodeKind::Image {
                    url,
                    title,
                    alt: alt_text(&children),
                },
                position,
            ),
            InlineTokenData::Link { url, title } => {
                Node::with_children(NodeKind::Link { url, title }, children, position)
            }
            InlineTokenData::Reference {
                label,
                reference_type,
            } => {
                let definition = ctx.meta.definition(&label).filter(|_| !ctx.keep_references);
                match (definition, self.image) {
                    (Some(def), true) => Node::new(
                        NodeKind::Image {
                            url: def.url.clone(),
                            title: def.title.clone(),
                            alt: alt_text(&children),
                        },
                        position,
                    ),
                    (Some(def), false) => Node::with_children(
                        NodeKind::Link {
                            url: def.url.clone(),
                            title: def.title.clone(),
                        },
                        children,
                        position,
                    ),
                    (None, true) => Node::new(
                        NodeKind::ImageReference {
                            identifier: normalize_label(&label),
                            alt: alt_text(&children),
                            label,
                            reference_type,
                        },
                        position,
                    ),
                    (None, false) => Node::with_children(
                        NodeKind::LinkReference {
                            identifier: normalize_label(&label),
                            label,
                            reference_type,
                        },
                        children,
                        position,
                    ),
                }
            }
            _ => Node::with_children(
                NodeKind::Link {
                    url: String::new(),
                    title: None,
                },
                children,
                position,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{inline, inline_in, inline_with, meta, outline};
    use super::*;
    use crate::syntax::points;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("[a](/u)", "link url=\"/u\"\n  text \"a\"\n")]
    #[case("[a](/u \"t\")", "link url=\"/u\" title=\"t\"\n  text \"a\"\n")]
    #[case("[a](<b c>)", "link url=\"b c\"\n  text \"a\"\n")]
    #[case("[a]()", "link url=\"\"\n  text \"a\"\n")]
    #[case("[a](\n/u\n)", "link url=\"/u\"\n  text \"a\"\n")]
    #[case("![x *y*](/i.png)", "image url=\"/i.png\" alt=\"x y\"\n")]
    #[case("[a] (/u)", "text \"[a] (/u)\"\n")]
    #[case("[a](/u", "text \"[a](/u\"\n")]
    #[case("\\[a](/u)", "text \"[a](/u)\"\n")]
    fn inline_links(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(outline(&inline(input)), expected);
    }

    #[test]
    fn link_inside_link_text_wins() {
        assert_eq!(
            outline(&inline("[a [b](u1) c](u2)")),
            "text \"[a \"\nlink url=\"u1\"\n  text \"b\"\ntext \" c](u2)\"\n"
        );
    }

    #[test]
    fn image_may_hold_a_link() {
        assert_eq!(
            outline(&inline("![[a](/u)](/i)")),
            "image url=\"/i\" alt=\"a\"\n"
        );
    }

    #[rstest]
    #[case("[x]", "link url=\"/x\"\n  text \"x\"\n")]
    #[case("[X][]", "link url=\"/x\"\n  text \"X\"\n")]
    #[case("[text][x]", "link url=\"/x\"\n  text \"text\"\n")]
    #[case("![x]", "image url=\"/x\" alt=\"x\"\n")]
    #[case("[nope]", "text \"[nope]\"\n")]
    #[case("[text][nope]", "text \"[text][nope]\"\n")]
    #[case("[a][x][y]", "link url=\"/x\"\n  text \"a\"\ntext \"[y]\"\n")]
    #[case("[a][y][x]", "text \"[a]\"\nlink url=\"/x\"\n  text \"y\"\n")]
    fn references(#[case] input: &str, #[case] expected: &str) {
        let meta = meta(&[("x", "/x")], &[]);
        assert_eq!(outline(&inline_in(input, &meta)), expected);
    }

    #[rstest]
    #[case(
        "[foo [bar](/uri)][ref]",
        "text \"[foo \"\nlink url=\"/uri\"\n  text \"bar\"\ntext \"]\"\nlink url=\"/uri\"\n  text \"ref\"\n"
    )]
    #[case(
        "[foo *bar [baz][ref]*][ref]",
        "text \"[foo \"\nemphasis\n  text \"bar \"\n  link url=\"/uri\"\n    text \"baz\"\ntext \"]\"\nlink url=\"/uri\"\n  text \"ref\"\n"
    )]
    #[case("[a](b)][ref]", "link url=\"b\"\n  text \"a\"\ntext \"]\"\nlink url=\"/uri\"\n  text \"ref\"\n")]
    fn label_after_spent_bracket_still_links(#[case] input: &str, #[case] expected: &str) {
        let meta = meta(&[("ref", "/uri")], &[]);
        assert_eq!(outline(&inline_in(input, &meta)), expected);
    }

    #[test]
    fn references_can_be_kept() {
        let meta = meta(&[("x", "/x")], &[]);
        let nodes = inline_with("[t][X]", &meta, true, 128).unwrap();
        assert_eq!(
            nodes[0].kind,
            NodeKind::LinkReference {
                identifier: "x".to_string(),
                label: "X".to_string(),
                reference_type: ReferenceType::Full,
            }
        );
    }

    #[rstest]
    #[case("](/u)", Some(5))]
    #[case("](/u \"t\" )", Some(10))]
    #[case("](/u \"t\"x)", None)]
    #[case("](/u/a b)", None)]
    #[case("]x", None)]
    fn inline_closer_extent(#[case] input: &str, #[case] end: Option<usize>) {
        let s = points(input);
        assert_eq!(inline_closer(&s, 0).map(|d| d.interval.end_index), end);
    }
}
