use crate::ast::{ReferenceType, node_type::NodeType};
use crate::source::NodeInterval;

/// An inline construct found in a run of phrasing content.
///
/// Intervals are indices into that run, not into the document.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineToken {
    pub node_type: NodeType,
    /// Owning tokenizer; stamped by the engine.
    pub tokenizer: usize,
    pub interval: NodeInterval,
    /// Region still open to lower-priority tokenizers; `None` for atomic tokens.
    pub content: Option<NodeInterval>,
    pub data: InlineTokenData,
    pub children: Vec<InlineToken>,
}

impl InlineToken {
    /// A token whose inside is never scanned again.
    pub fn atomic(node_type: NodeType, interval: NodeInterval, data: InlineTokenData) -> Self {
        Self {
            node_type,
            tokenizer: 0,
            interval,
            content: None,
            data,
            children: Vec::new(),
        }
    }

    pub fn container(
        node_type: NodeType,
        interval: NodeInterval,
        content: NodeInterval,
        data: InlineTokenData,
        children: Vec<InlineToken>,
    ) -> Self {
        Self {
            node_type,
            tokenizer: 0,
            interval,
            content: Some(content),
            data,
            children,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InlineTokenData {
    None,
    /// Already-decoded literal value (code, math, raw html).
    Literal(String),
    Link {
        url: String,
        title: Option<String>,
    },
    Reference {
        label: String,
        reference_type: ReferenceType,
    },
    Footnote {
        label: String,
    },
}
