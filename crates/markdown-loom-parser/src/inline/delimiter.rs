use super::token::InlineToken;
use crate::ast::ReferenceType;
use crate::source::NodeInterval;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterKind {
    Opener,
    Closer,
    /// Can open or close; becomes an opener when nothing pairs with it.
    Both,
    /// A complete construct found in one piece.
    Full,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DelimiterData {
    /// A run of `*`, `_` or `~`.
    Run { marker: char, original: usize },
    /// `[` or `![`.
    Bracket { image: bool },
    /// `](destination "title")`
    InlineLinkCloser { url: String, title: Option<String> },
    /// `]`, `][]` or `][label]`.
    ReferenceCloser {
        label: Option<String>,
        reference_type: ReferenceType,
    },
    Token(InlineToken),
}

/// What a tokenizer's scanner reports.
#[derive(Debug, Clone, PartialEq)]
pub struct Delimiter {
    pub kind: DelimiterKind,
    pub interval: NodeInterval,
    pub data: DelimiterData,
    /// Inactive openers reject every closer.
    pub active: bool,
}

impl Delimiter {
    pub fn new(kind: DelimiterKind, interval: NodeInterval, data: DelimiterData) -> Self {
        Self {
            kind,
            interval,
            data,
            active: true,
        }
    }

    /// Wraps a token that needs no pairing.
    pub fn full(token: InlineToken) -> Self {
        Self::new(DelimiterKind::Full, token.interval, DelimiterData::Token(token))
    }

    /// Current length; shrinks as emphasis consumes the run.
    #[must_use]
    pub fn thickness(&self) -> usize {
        self.interval.len()
    }

    #[must_use]
    pub fn can_open(&self) -> bool {
        matches!(self.kind, DelimiterKind::Opener | DelimiterKind::Both)
    }

    #[must_use]
    pub fn can_close(&self) -> bool {
        matches!(self.kind, DelimiterKind::Closer | DelimiterKind::Both)
    }
}
