use super::non_indented;
use crate::ast::{
    Node, NodeKind,
    node_type::{FOOTNOTE_DEFINITION, NodeType},
};
use crate::block::{
    BlockParseContext, BlockToken, BlockTokenData, BlockTokenizer, ContinuationResult, Line,
    LineCursor, MatchContext, OpenerResult,
};
use crate::error::ParserError;
use crate::meta::{MetaRegistry, normalize_label};
use crate::source::{CodePoint, NodeInterval, chars::is_whitespace};

/// Continuation lines of a footnote are indented this far.
const FOOTNOTE_INDENT: usize = 4;

/// `[^label]: content`, a container for the footnote's blocks.
#[derive(Debug, Default)]
pub struct FootnoteDefinition;

impl FootnoteDefinition {
    pub const NAME: &'static str = "footnoteDefinition";
}

impl BlockTokenizer for FootnoteDefinition {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[FOOTNOTE_DEFINITION]
    }

    fn is_container(&self) -> bool {
        true
    }

    fn eat_opener(
        &self,
        line: &Line<'_>,
        cur: LineCursor,
        _ctx: &MatchContext,
    ) -> Option<OpenerResult> {
        let start = non_indented(line, cur)?;
        if line.char_at(start.index) != Some('[') || line.char_at(start.index + 1) != Some('^') {
            return None;
        }
        let label_start = start.index + 2;
        let mut i = label_start;
        loop {
            match line.char_at(i)? {
                ']' => break,
                '[' => return None,
                '\\' => i += 2,
                c if is_whitespace(c) => return None,
                _ => i += 1,
            }
        }
        if i == label_start || line.char_at(i + 1) != Some(':') {
            return None;
        }
        let label: String = (label_start..i).filter_map(|k| line.char_at(k)).collect();
        let next = line.next_non_ws(line.advance_chars(start, i + 2 - start.index));
        Some(OpenerResult {
            token: BlockToken::new(
                FOOTNOTE_DEFINITION,
                NodeInterval::new(start.index, next.index),
                BlockTokenData::FootnoteDefinition { label },
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
        ctx: &MatchContext,
    ) -> ContinuationResult {
        if line.is_blank_from(cur) {
            if !ctx.has_children {
                return ContinuationResult::NotMatched;
            }
            return ContinuationResult::Opening {
                next: line.next_non_ws(cur),
            };
        }
        if line.indent(cur) >= FOOTNOTE_INDENT {
            return ContinuationResult::Opening {
                next: line.advance_columns(cur, FOOTNOTE_INDENT),
            };
        }
        ContinuationResult::NotMatched
    }

    fn parse_meta(&self, token: &BlockToken, _points: &[CodePoint], meta: &mut MetaRegistry) {
        if let BlockTokenData::FootnoteDefinition { label } = &token.data {
            meta.add_footnote(normalize_label(label));
        }
    }

    fn parse(
        &self,
        token: BlockToken,
        children: Vec<Node>,
        ctx: &BlockParseContext<'_>,
    ) -> Result<Option<Node>, ParserError> {
        let BlockTokenData::FootnoteDefinition { label } = token.data else {
            return Ok(None);
        };
        Ok(Some(Node::with_children(
            NodeKind::FootnoteDefinition {
                identifier: normalize_label(&label),
                label,
            },
            children,
            ctx.position(token.interval),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{blocks, top_types};
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn footnote_holds_indented_blocks() {
        let (root, _) = blocks("[^1]: first\n\n    second\n\nafter\n");
        let note = &root.children[0];
        assert_eq!(note.node_type, FOOTNOTE_DEFINITION);
        assert_eq!(note.children.len(), 2);
        assert_eq!(root.children[1].node_type, "paragraph");
    }

    #[test]
    fn lazy_line_continues_footnote_paragraph() {
        assert_eq!(top_types("[^a]: one\ntwo\n"), vec![FOOTNOTE_DEFINITION]);
    }

    #[test]
    fn label_keeps_its_case() {
        let (root, _) = blocks("[^Note]: x\n");
        let BlockTokenData::FootnoteDefinition { label } = &root.children[0].data else {
            panic!("expected footnote definition");
        };
        assert_eq!(label, "Note");
    }

    #[test]
    fn whitespace_in_label_is_not_footnote() {
        assert_eq!(top_types("[^a b] x\n"), vec!["paragraph"]);
    }
}
