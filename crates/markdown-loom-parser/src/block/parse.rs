//! Meta collection and token-to-node conversion.

use super::{line::ContentLine, phrasing::merge_lines, token::BlockToken, tokenizer::BlockTokenizer};
use crate::ast::{Node, Position};
use crate::error::ParserError;
use crate::inline::InlineEngine;
use crate::meta::MetaRegistry;
use crate::source::{CodePoint, NodeInterval, calc_position};

/// What block tokenizers can reach while building nodes.
pub struct BlockParseContext<'a> {
    pub points: &'a [CodePoint],
    pub meta: &'a MetaRegistry,
    inline: &'a InlineEngine<'a>,
}

impl<'a> BlockParseContext<'a> {
    pub fn new(
        points: &'a [CodePoint],
        meta: &'a MetaRegistry,
        inline: &'a InlineEngine<'a>,
    ) -> Self {
        Self {
            points,
            meta,
            inline,
        }
    }

    pub fn position(&self, interval: NodeInterval) -> Option<Position> {
        Some(calc_position(self.points, interval))
    }

    /// Runs the inline engine over an already assembled run of code points.
    pub fn parse_phrasing(&self, points: Vec<CodePoint>) -> Result<Vec<Node>, ParserError> {
        self.inline.parse(points)
    }

    /// Merges `lines` and parses them as phrasing content.
    pub fn parse_lines(&self, lines: &[ContentLine]) -> Result<Vec<Node>, ParserError> {
        self.parse_phrasing(merge_lines(self.points, lines))
    }
}

/// Offers every token to its tokenizer's meta hook, depth first.
pub fn collect_meta(
    tokenizers: &[&dyn BlockTokenizer],
    token: &BlockToken,
    points: &[CodePoint],
    meta: &mut MetaRegistry,
) {
    for child in &token.children {
        tokenizers[child.tokenizer].parse_meta(child, points, meta);
        collect_meta(tokenizers, child, points, meta);
    }
}

/// Converts the children of `token` into nodes, bottom-up.
pub fn parse_children(
    tokenizers: &[&dyn BlockTokenizer],
    token: &mut BlockToken,
    ctx: &BlockParseContext<'_>,
) -> Result<Vec<Node>, ParserError> {
    let mut nodes = Vec::with_capacity(token.children.len());
    for mut child in std::mem::take(&mut token.children) {
        let children = parse_children(tokenizers, &mut child, ctx)?;
        let tokenizer = tokenizers[child.tokenizer];
        if let Some(node) = tokenizer.parse(child, children, ctx)? {
            nodes.push(node);
        }
    }
    Ok(nodes)
}
