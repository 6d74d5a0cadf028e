use super::{
    definition::{definition_line_count, paragraph_token},
    non_indented, run_length,
};
use crate::ast::{
    Node, NodeKind,
    node_type::{HEADING, NodeType, PARAGRAPH},
};
use crate::block::{
    BlockParseContext, BlockToken, BlockTokenData, BlockTokenizer, InterruptResult, Line,
    LineCursor, MatchContext,
};
use crate::error::ParserError;
use crate::source::NodeInterval;

/// A paragraph underlined with `=` (level 1) or `-` (level 2).
#[derive(Debug, Default)]
pub struct SetextHeading;

impl SetextHeading {
    pub const NAME: &'static str = "setextHeading";
}

impl BlockTokenizer for SetextHeading {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[HEADING]
    }

    fn sibling_types(&self) -> &'static [NodeType] {
        &[PARAGRAPH]
    }

    fn eat_and_interrupt_previous_sibling(
        &self,
        line: &Line<'_>,
        cur: LineCursor,
        previous: &BlockToken,
        _ctx: &MatchContext,
    ) -> Option<InterruptResult> {
        let start = non_indented(line, cur)?;
        let marker = line.char_at(start.index).filter(|c| matches!(c, '=' | '-'))?;
        let n = run_length(line, start.index, marker);
        if !line.is_blank_from(line.advance_chars(start, n)) {
            return None;
        }
        let BlockTokenData::Paragraph { lines } = &previous.data else {
            return None;
        };
        // Leading definitions stay behind; they cannot be heading text.
        let defs = definition_line_count(line.points, lines);
        if defs >= lines.len() {
            return None;
        }
        let text = &lines[defs..];
        let first = text[0].first_non_ws.min(text[0].end);
        Some(InterruptResult {
            token: BlockToken::new(
                HEADING,
                NodeInterval::new(first, line.end),
                BlockTokenData::Heading {
                    depth: if marker == '=' { 1 } else { 2 },
                    lines: text.to_vec(),
                },
            ),
            remaining_sibling: (defs > 0)
                .then(|| paragraph_token(&lines[..defs], previous.tokenizer)),
            saturated: true,
        })
    }

    fn parse(
        &self,
        token: BlockToken,
        _children: Vec<Node>,
        ctx: &BlockParseContext<'_>,
    ) -> Result<Option<Node>, ParserError> {
        let BlockTokenData::Heading { depth, lines } = &token.data else {
            return Ok(None);
        };
        let children = ctx.parse_lines(lines)?;
        Ok(Some(Node::with_children(
            NodeKind::Heading { depth: *depth },
            children,
            ctx.position(token.interval),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{blocks, top_types};
    use crate::block::BlockTokenData;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn depth(input: &str) -> Option<u8> {
        let (root, _) = blocks(input);
        root.children.iter().find_map(|t| match t.data {
            BlockTokenData::Heading { depth, .. } => Some(depth),
            _ => None,
        })
    }

    #[rstest]
    #[case("Foo\n===\n", Some(1))]
    #[case("Foo\nbar\n---\n", Some(2))]
    #[case("Foo\n   ----      \n", Some(2))]
    #[case("Foo\n    ---\n", None)]
    #[case("Foo\n= =\n", None)]
    #[case("Foo\n--- -\n", None)]
    fn underlines(#[case] input: &str, #[case] expected: Option<u8>) {
        assert_eq!(depth(input), expected);
    }

    #[test]
    fn multi_line_heading_keeps_all_lines() {
        let (root, _) = blocks("a\nb\n==\n");
        assert_eq!(root.children[0].lines().map(<[_]>::len), Some(2));
    }

    #[test]
    fn lazy_line_cannot_underline() {
        assert_eq!(top_types("> foo\n---\n"), vec!["blockquote", "thematicBreak"]);
    }

    #[test]
    fn definitions_are_peeled_before_heading() {
        assert_eq!(
            top_types("[a]: /u\nTitle\n===\n"),
            vec!["definition", "heading"]
        );
    }

    #[test]
    fn only_definitions_leaves_underline_alone() {
        assert_eq!(top_types("[a]: /u\n===\n"), vec!["definition", "paragraph"]);
    }
}
