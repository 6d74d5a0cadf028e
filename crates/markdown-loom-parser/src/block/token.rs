use super::line::ContentLine;
use crate::ast::{AlignType, node_type::NodeType};
use crate::source::NodeInterval;

/// Index of a block tokenizer in dispatch order.
pub type TokenizerId = usize;

/// A block produced during matching, before it becomes a [`crate::ast::Node`].
#[derive(Debug, Clone, PartialEq)]
pub struct BlockToken {
    pub node_type: NodeType,
    /// Owning tokenizer; stamped by the engine.
    pub tokenizer: TokenizerId,
    pub interval: NodeInterval,
    pub data: BlockTokenData,
    pub children: Vec<BlockToken>,
    /// The last line processed while this block was open was blank.
    pub last_line_blank: bool,
}

impl BlockToken {
    pub fn new(node_type: NodeType, interval: NodeInterval, data: BlockTokenData) -> Self {
        Self {
            node_type,
            tokenizer: 0,
            interval,
            data,
            children: Vec::new(),
            last_line_blank: false,
        }
    }

    /// Content lines of line-oriented leaves.
    pub fn lines(&self) -> Option<&[ContentLine]> {
        match &self.data {
            BlockTokenData::Paragraph { lines }
            | BlockTokenData::Heading { lines, .. }
            | BlockTokenData::IndentedCode { lines }
            | BlockTokenData::Fence { lines, .. }
            | BlockTokenData::Html { lines, .. } => Some(lines),
            _ => None,
        }
    }

    /// True when this block or its last descendant list/item ended on a blank line.
    pub fn ends_with_blank_line(&self) -> bool {
        let mut token = self;
        loop {
            if token.last_line_blank {
                return true;
            }
            let descend = matches!(
                token.data,
                BlockTokenData::List { .. } | BlockTokenData::ListItem { .. }
            );
            match token.children.last() {
                Some(last) if descend => token = last,
                _ => return false,
            }
        }
    }
}

/// Bullet marker or ordered-list delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMarker {
    pub ordered: bool,
    /// `-`, `+`, `*` for bullets; `.` or `)` for ordered items.
    pub marker: char,
    pub start: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCell {
    pub interval: NodeInterval,
    /// Trimmed cell content.
    pub content: NodeInterval,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub interval: NodeInterval,
    pub cells: Vec<TableCell>,
}

/// Per-tokenizer payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockTokenData {
    Root,
    Paragraph {
        lines: Vec<ContentLine>,
    },
    Heading {
        depth: u8,
        lines: Vec<ContentLine>,
    },
    ThematicBreak,
    Blockquote,
    /// Fenced code or math.
    Fence {
        marker: char,
        size: usize,
        indent: usize,
        info: NodeInterval,
        lines: Vec<ContentLine>,
        closed: bool,
    },
    IndentedCode {
        lines: Vec<ContentLine>,
    },
    Html {
        condition: u8,
        lines: Vec<ContentLine>,
    },
    ListItem {
        marker: ListMarker,
        /// Columns of the item prefix that continuation lines must match.
        content_indent: usize,
        checked: Option<bool>,
        spread: bool,
    },
    List {
        marker: ListMarker,
        spread: bool,
    },
    Definition {
        identifier: String,
        label: String,
        url: String,
        title: Option<String>,
    },
    FootnoteDefinition {
        label: String,
    },
    Table {
        align: Vec<Option<AlignType>>,
        rows: Vec<TableRow>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::node_type::{LIST, LIST_ITEM, PARAGRAPH};

    fn item(last_line_blank: bool, children: Vec<BlockToken>) -> BlockToken {
        let mut t = BlockToken::new(
            LIST_ITEM,
            NodeInterval::default(),
            BlockTokenData::ListItem {
                marker: ListMarker {
                    ordered: false,
                    marker: '-',
                    start: None,
                },
                content_indent: 2,
                checked: None,
                spread: false,
            },
        );
        t.last_line_blank = last_line_blank;
        t.children = children;
        t
    }

    #[test]
    fn blank_line_found_through_nested_items() {
        let inner = item(true, vec![]);
        let mut list = BlockToken::new(
            LIST,
            NodeInterval::default(),
            BlockTokenData::List {
                marker: ListMarker {
                    ordered: false,
                    marker: '-',
                    start: None,
                },
                spread: false,
            },
        );
        list.children = vec![inner];
        let outer = item(false, vec![list]);
        assert!(outer.ends_with_blank_line());
    }

    #[test]
    fn paragraphs_do_not_descend() {
        let mut para = BlockToken::new(
            PARAGRAPH,
            NodeInterval::default(),
            BlockTokenData::Paragraph { lines: vec![] },
        );
        para.children = vec![item(true, vec![])];
        assert!(!para.ends_with_blank_line());
    }
}
