//! The contract between the block engine and block tokenizers.
//!
//! Every hook except [`BlockTokenizer::parse`] has a do-nothing default, so a
//! tokenizer only implements the phases it takes part in.

use super::{
    line::{Line, LineCursor},
    parse::BlockParseContext,
    token::{BlockToken, TokenizerId},
};
use crate::ast::{Node, node_type::NodeType};
use crate::error::ParserError;
use crate::meta::MetaRegistry;
use crate::source::CodePoint;

/// What the engine knows about the surroundings of a match attempt.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext {
    /// Node type of the container a new block would open in.
    pub parent_type: NodeType,
    /// Interruptable leaf at the tip of the open path, whether or not its
    /// containers matched this line.
    pub open_leaf: Option<NodeType>,
    /// The open leaf matched this line, so an opener would interrupt it.
    pub interrupting: bool,
    /// The container being continued already holds children.
    pub has_children: bool,
}

pub struct OpenerResult {
    pub token: BlockToken,
    /// Where matching continues on this line.
    pub next: LineCursor,
    /// The block is complete and closes immediately.
    pub saturated: bool,
}

pub struct InterruptResult {
    pub token: BlockToken,
    /// What is left of the previous sibling, closed in place of it.
    pub remaining_sibling: Option<BlockToken>,
    pub saturated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinuationResult {
    NotMatched,
    /// Container prefix matched; the rest of the line starts at `next`.
    Opening { next: LineCursor },
    /// Leaf took the whole line.
    Consumed,
    /// Leaf took the whole line and is now complete.
    Closing,
}

/// Result of rewriting a sibling list.
pub enum Transformed {
    Unchanged(Vec<BlockToken>),
    Replaced(Vec<BlockToken>),
}

impl Transformed {
    pub fn into_tokens(self) -> Vec<BlockToken> {
        match self {
            Transformed::Unchanged(tokens) | Transformed::Replaced(tokens) => tokens,
        }
    }
}

pub struct TransformContext<'a> {
    pub points: &'a [CodePoint],
    /// Id to stamp on tokens the transform creates.
    pub id: TokenizerId,
}

pub trait BlockTokenizer: Send + Sync {
    fn name(&self) -> &'static str;

    fn node_types(&self) -> &'static [NodeType];

    fn is_container(&self) -> bool {
        false
    }

    /// Leaf types an opener of this tokenizer may interrupt.
    fn interruptable_types(&self) -> &'static [NodeType] {
        &[]
    }

    /// Leaf types [`Self::eat_and_interrupt_previous_sibling`] accepts.
    fn sibling_types(&self) -> &'static [NodeType] {
        &[]
    }

    fn eat_opener(
        &self,
        _line: &Line<'_>,
        _cur: LineCursor,
        _ctx: &MatchContext,
    ) -> Option<OpenerResult> {
        None
    }

    fn eat_and_interrupt_previous_sibling(
        &self,
        _line: &Line<'_>,
        _cur: LineCursor,
        _previous: &BlockToken,
        _ctx: &MatchContext,
    ) -> Option<InterruptResult> {
        None
    }

    fn eat_continuation(
        &self,
        _line: &Line<'_>,
        _cur: LineCursor,
        _token: &mut BlockToken,
        _ctx: &MatchContext,
    ) -> ContinuationResult {
        ContinuationResult::NotMatched
    }

    fn eat_lazy_continuation(
        &self,
        _line: &Line<'_>,
        _cur: LineCursor,
        _token: &mut BlockToken,
    ) -> bool {
        false
    }

    /// A blank line ending at this block as the tip does not count as a
    /// blank line for list looseness.
    fn keeps_blank_line(&self, _token: &BlockToken, _line: &Line<'_>) -> bool {
        false
    }

    fn on_close(&self, _token: &mut BlockToken, _points: &[CodePoint]) {}

    fn transform_match(
        &self,
        siblings: Vec<BlockToken>,
        _ctx: &TransformContext<'_>,
    ) -> Transformed {
        Transformed::Unchanged(siblings)
    }

    fn parse_meta(&self, _token: &BlockToken, _points: &[CodePoint], _meta: &mut MetaRegistry) {}

    fn parse(
        &self,
        token: BlockToken,
        children: Vec<Node>,
        ctx: &BlockParseContext<'_>,
    ) -> Result<Option<Node>, ParserError>;
}
