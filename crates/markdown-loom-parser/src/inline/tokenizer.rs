//! The contract between the inline engine and inline tokenizers.

use super::{
    delimiter::{Delimiter, DelimiterData},
    token::InlineToken,
};
use crate::ast::{Node, Position, node_type::NodeType};
use crate::meta::MetaRegistry;
use crate::source::{CodePoint, NodeInterval, calc_position};

/// What an inline tokenizer sees of the run being parsed.
#[derive(Clone, Copy)]
pub struct InlineContext<'a> {
    /// The whole phrasing run; intervals index into it.
    pub points: &'a [CodePoint],
    pub meta: &'a MetaRegistry,
    /// Scanning inside a link's text.
    pub in_link: bool,
    /// Emit reference nodes instead of resolving them.
    pub keep_references: bool,
}

impl InlineContext<'_> {
    pub fn position(&self, interval: NodeInterval) -> Option<Position> {
        Some(calc_position(self.points, interval))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairResult {
    Paired,
    /// Not this tokenizer's pair; keep looking.
    Skip,
    /// Drop the opener and leave the closer as text.
    Reject,
}

/// Result of turning an opener and closer into a token.
#[derive(Debug, Default)]
pub struct PairOutcome {
    pub token: Option<InlineToken>,
    /// Tokens that stay at the current level when no token was built.
    pub loose: Vec<InlineToken>,
    /// Unused part of the opener, pushed back onto the stack.
    pub remaining_opener: Option<Delimiter>,
    /// Unused part of the closer, which keeps looking for openers.
    pub remaining_closer: Option<Delimiter>,
    /// Ask [`InlineTokenizer::should_deactivate`] about every older opener.
    pub deactivate_older: bool,
}

impl PairOutcome {
    pub fn unpaired(inner: Vec<InlineToken>) -> Self {
        Self {
            loose: inner,
            ..Default::default()
        }
    }
}

pub trait InlineTokenizer: Send + Sync {
    fn name(&self) -> &'static str;

    fn node_types(&self) -> &'static [NodeType];

    /// Openers and closers only pair within one group.
    fn delimiter_group(&self) -> &'static str {
        self.name()
    }

    /// First delimiter in `start..end`, scanning left to right.
    fn find_delimiter(
        &self,
        start: usize,
        end: usize,
        ctx: &InlineContext<'_>,
    ) -> Option<Delimiter>;

    fn is_delimiter_pair(
        &self,
        _opener: &Delimiter,
        _closer: &Delimiter,
        _ctx: &InlineContext<'_>,
    ) -> PairResult {
        PairResult::Skip
    }

    fn process_delimiter_pair(
        &self,
        _opener: Delimiter,
        _closer: Delimiter,
        inner: Vec<InlineToken>,
        _ctx: &InlineContext<'_>,
    ) -> PairOutcome {
        PairOutcome::unpaired(inner)
    }

    /// Closers of one class pair with the same openers, so a search that
    /// found nothing bounds the next search for that class. `None` always
    /// searches the whole stack.
    fn closer_class(&self, _closer: &Delimiter) -> Option<u64> {
        None
    }

    /// Where scanning resumes after `closer` paired with nothing.
    fn unpaired_closer_end(&self, closer: &Delimiter) -> usize {
        closer.interval.end_index
    }

    /// Whether an older opener stops being usable once this tokenizer paired.
    fn should_deactivate(&self, _older: &Delimiter) -> bool {
        false
    }

    fn process_single_delimiter(
        &self,
        delimiter: Delimiter,
        _ctx: &InlineContext<'_>,
    ) -> Option<InlineToken> {
        match delimiter.data {
            DelimiterData::Token(token) => Some(token),
            _ => None,
        }
    }

    fn parse(&self, token: InlineToken, children: Vec<Node>, ctx: &InlineContext<'_>) -> Node;
}
