//! Link reference definitions.
//!
//! Definitions are never opened directly. Paragraphs are matched as usual
//! and leading `[label]: destination "title"` runs are peeled off them once
//! matching is done, so a definition can span lines and still be
//! interrupted like a paragraph.

use crate::ast::{
    Node, NodeKind,
    node_type::{DEFINITION, NodeType, PARAGRAPH},
};
use crate::block::{
    BlockParseContext, BlockToken, BlockTokenData, BlockTokenizer, ContentLine,
    TransformContext, Transformed, phrasing::merge_lines,
};
use crate::error::ParserError;
use crate::meta::{LinkDefinition, MetaRegistry, normalize_label};
use crate::source::{CodePoint, NodeInterval};
use crate::syntax::{
    at,
    link::{parse_link_destination, parse_link_label, parse_link_title},
    skip_spaces, skip_spaces_one_newline,
};

/// Link reference definitions, `[label]: destination "title"`.
#[derive(Debug, Default)]
pub struct Definition;

impl Definition {
    pub const NAME: &'static str = "definition";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDefinition {
    pub label: String,
    pub url: String,
    pub title: Option<String>,
    /// Lines of the paragraph consumed up to and including this definition.
    pub lines_through: usize,
}

fn at_line_end(s: &[CodePoint], i: usize) -> bool {
    matches!(at(s, i), None | Some('\n'))
}

/// One definition starting at `pos`; returns it with the index of the line
/// ending (or input end) it finishes on.
fn parse_one(s: &[CodePoint], pos: usize) -> Option<(String, String, Option<String>, usize)> {
    let label = parse_link_label(s, pos)?;
    if at(s, label.end) != Some(':') {
        return None;
    }
    let dest_start = skip_spaces_one_newline(s, label.end + 1);
    let dest = parse_link_destination(s, dest_start)?;

    let title_start = skip_spaces_one_newline(s, dest.end);
    if title_start > dest.end {
        if let Some(title) = parse_link_title(s, title_start) {
            let end = skip_spaces(s, title.end);
            if at_line_end(s, end) {
                return Some((label.value, dest.value, Some(title.value), end));
            }
        }
    }
    let end = skip_spaces(s, dest.end);
    at_line_end(s, end).then_some((label.value, dest.value, None, end))
}

/// Definitions at the start of a paragraph's lines, in order.
pub fn parse_definitions(points: &[CodePoint], lines: &[ContentLine]) -> Vec<ParsedDefinition> {
    let merged = merge_lines(points, lines);
    let mut found = Vec::new();
    let mut pos = 0;
    let mut lines_through = 0;
    while pos < merged.len() {
        let Some((label, url, title, end)) = parse_one(&merged, pos) else {
            break;
        };
        lines_through += merged[pos..end]
            .iter()
            .filter(|p| p.code_point == '\n')
            .count()
            + 1;
        found.push(ParsedDefinition {
            label,
            url,
            title,
            lines_through,
        });
        pos = end + 1;
    }
    found
}

/// How many leading lines of a paragraph are link reference definitions.
pub fn definition_line_count(points: &[CodePoint], lines: &[ContentLine]) -> usize {
    parse_definitions(points, lines)
        .last()
        .map_or(0, |d| d.lines_through)
}

/// Paragraph token over `lines`.
pub(crate) fn paragraph_token(lines: &[ContentLine], tokenizer: usize) -> BlockToken {
    let start = lines.first().map_or(0, |l| l.first_non_ws.min(l.end));
    let end = lines.last().map_or(start, |l| l.end);
    let mut token = BlockToken::new(
        PARAGRAPH,
        NodeInterval::new(start, end.max(start)),
        BlockTokenData::Paragraph {
            lines: lines.to_vec(),
        },
    );
    token.tokenizer = tokenizer;
    token
}

impl BlockTokenizer for Definition {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[DEFINITION]
    }

    fn transform_match(
        &self,
        siblings: Vec<BlockToken>,
        ctx: &TransformContext<'_>,
    ) -> Transformed {
        let mut changed = false;
        let mut out = Vec::with_capacity(siblings.len());
        for token in siblings {
            let BlockTokenData::Paragraph { lines } = &token.data else {
                out.push(token);
                continue;
            };
            let defs = parse_definitions(ctx.points, lines);
            if defs.is_empty() {
                out.push(token);
                continue;
            }
            changed = true;
            let mut first_line = 0;
            for def in defs {
                let covered = &lines[first_line..def.lines_through];
                let interval = paragraph_token(covered, ctx.id).interval;
                let mut definition = BlockToken::new(
                    DEFINITION,
                    interval,
                    BlockTokenData::Definition {
                        identifier: normalize_label(&def.label),
                        label: def.label,
                        url: def.url,
                        title: def.title,
                    },
                );
                definition.tokenizer = ctx.id;
                out.push(definition);
                first_line = def.lines_through;
            }
            if first_line < lines.len() {
                let mut rest = paragraph_token(&lines[first_line..], token.tokenizer);
                rest.last_line_blank = token.last_line_blank;
                out.push(rest);
            } else if let Some(last) = out.last_mut() {
                last.last_line_blank = token.last_line_blank;
            }
        }
        if changed {
            Transformed::Replaced(out)
        } else {
            Transformed::Unchanged(out)
        }
    }

    fn parse_meta(&self, token: &BlockToken, _points: &[CodePoint], meta: &mut MetaRegistry) {
        if let BlockTokenData::Definition {
            identifier,
            label,
            url,
            title,
        } = &token.data
        {
            meta.add_definition(
                identifier.clone(),
                LinkDefinition {
                    label: label.clone(),
                    url: url.clone(),
                    title: title.clone(),
                },
            );
        }
    }

    fn parse(
        &self,
        token: BlockToken,
        _children: Vec<Node>,
        ctx: &BlockParseContext<'_>,
    ) -> Result<Option<Node>, ParserError> {
        let BlockTokenData::Definition {
            identifier,
            label,
            url,
            title,
        } = token.data
        else {
            return Ok(None);
        };
        Ok(Some(Node::new(
            NodeKind::Definition {
                identifier,
                label,
                url,
                title,
            },
            ctx.position(token.interval),
        )))
    }
}
