//! # Syntax Tree
//!
//! The serializable tree handed back by [`crate::Parser::parse`]. Node kinds
//! and field names follow mdast so the JSON form is familiar.

use serde::Serialize;

/// Node type names shared by tokens and nodes.
pub mod node_type {
    pub type NodeType = &'static str;

    pub const ROOT: NodeType = "root";
    pub const PARAGRAPH: NodeType = "paragraph";
    pub const HEADING: NodeType = "heading";
    pub const THEMATIC_BREAK: NodeType = "thematicBreak";
    pub const BLOCKQUOTE: NodeType = "blockquote";
    pub const LIST: NodeType = "list";
    pub const LIST_ITEM: NodeType = "listItem";
    pub const HTML: NodeType = "html";
    pub const CODE: NodeType = "code";
    pub const MATH: NodeType = "math";
    pub const DEFINITION: NodeType = "definition";
    pub const FOOTNOTE_DEFINITION: NodeType = "footnoteDefinition";
    pub const TABLE: NodeType = "table";
    pub const TABLE_ROW: NodeType = "tableRow";
    pub const TABLE_CELL: NodeType = "tableCell";
    pub const TEXT: NodeType = "text";
    pub const EMPHASIS: NodeType = "emphasis";
    pub const STRONG: NodeType = "strong";
    pub const DELETE: NodeType = "delete";
    pub const INLINE_CODE: NodeType = "inlineCode";
    pub const INLINE_MATH: NodeType = "inlineMath";
    pub const BREAK: NodeType = "break";
    pub const LINK: NodeType = "link";
    pub const IMAGE: NodeType = "image";
    pub const LINK_REFERENCE: NodeType = "linkReference";
    pub const IMAGE_REFERENCE: NodeType = "imageReference";
    pub const FOOTNOTE_REFERENCE: NodeType = "footnoteReference";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Point {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub start: Point,
    pub end: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AlignType {
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReferenceType {
    Full,
    Collapsed,
    Shortcut,
}

/// What a node is, with its kind-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum NodeKind {
    Root,
    Paragraph,
    Heading {
        depth: u8,
    },
    ThematicBreak,
    Blockquote,
    List {
        ordered: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        start: Option<u32>,
        spread: bool,
        marker: char,
    },
    ListItem {
        #[serde(skip_serializing_if = "Option::is_none")]
        checked: Option<bool>,
        spread: bool,
    },
    Html {
        value: String,
    },
    Code {
        lang: Option<String>,
        meta: Option<String>,
        value: String,
    },
    Math {
        meta: Option<String>,
        value: String,
    },
    Definition {
        identifier: String,
        label: String,
        url: String,
        title: Option<String>,
    },
    FootnoteDefinition {
        identifier: String,
        label: String,
    },
    Table {
        align: Vec<Option<AlignType>>,
    },
    TableRow,
    TableCell,
    Text {
        value: String,
    },
    Emphasis,
    Strong,
    Delete,
    InlineCode {
        value: String,
    },
    InlineMath {
        value: String,
    },
    Break,
    Link {
        url: String,
        title: Option<String>,
    },
    Image {
        url: String,
        title: Option<String>,
        alt: String,
    },
    LinkReference {
        identifier: String,
        label: String,
        reference_type: ReferenceType,
    },
    ImageReference {
        identifier: String,
        label: String,
        reference_type: ReferenceType,
        alt: String,
    },
    FootnoteReference {
        identifier: String,
        label: String,
    },
}

impl NodeKind {
    pub fn node_type(&self) -> node_type::NodeType {
        use node_type::*;
        match self {
            NodeKind::Root => ROOT,
            NodeKind::Paragraph => PARAGRAPH,
            NodeKind::Heading { .. } => HEADING,
            NodeKind::ThematicBreak => THEMATIC_BREAK,
            NodeKind::Blockquote => BLOCKQUOTE,
            NodeKind::List { .. } => LIST,
            NodeKind::ListItem { .. } => LIST_ITEM,
            NodeKind::Html { .. } => HTML,
            NodeKind::Code { .. } => CODE,
            NodeKind::Math { .. } => MATH,
            NodeKind::Definition { .. } => DEFINITION,
            NodeKind::FootnoteDefinition { .. } => FOOTNOTE_DEFINITION,
            NodeKind::Table { .. } => TABLE,
            NodeKind::TableRow => TABLE_ROW,
            NodeKind::TableCell => TABLE_CELL,
            NodeKind::Text { .. } => TEXT,
            NodeKind::Emphasis => EMPHASIS,
            NodeKind::Strong => STRONG,
            NodeKind::Delete => DELETE,
            NodeKind::InlineCode { .. } => INLINE_CODE,
            NodeKind::InlineMath { .. } => INLINE_MATH,
            NodeKind::Break => BREAK,
            NodeKind::Link { .. } => LINK,
            NodeKind::Image { .. } => IMAGE,
            NodeKind::LinkReference { .. } => LINK_REFERENCE,
            NodeKind::ImageReference { .. } => IMAGE_REFERENCE,
            NodeKind::FootnoteReference { .. } => FOOTNOTE_REFERENCE,
        }
    }
}

/// A syntax tree node. The root exclusively owns every descendant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl Node {
    pub fn new(kind: NodeKind, position: Option<Position>) -> Self {
        Self {
            kind,
            children: Vec::new(),
            position,
        }
    }

    pub fn with_children(kind: NodeKind, children: Vec<Node>, position: Option<Position>) -> Self {
        Self {
            kind,
            children,
            position,
        }
    }

    pub fn text(value: impl Into<String>, position: Option<Position>) -> Self {
        Self::new(
            NodeKind::Text {
                value: value.into(),
            },
            position,
        )
    }

    pub fn node_type(&self) -> node_type::NodeType {
        self.kind.node_type()
    }

    /// Strips `position` from this node and all descendants.
    pub fn remove_positions(&mut self) {
        self.position = None;
        for child in &mut self.children {
            child.remove_positions();
        }
    }

    /// Concatenated literal content of the subtree, as used for image alt text.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.kind {
            NodeKind::Text { value }
            | NodeKind::InlineCode { value }
            | NodeKind::InlineMath { value } => out.push_str(value),
            NodeKind::Image { alt, .. } | NodeKind::ImageReference { alt, .. } => {
                out.push_str(alt)
            }
            NodeKind::Break => out.push('\n'),
            _ => {
                for child in &self.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Depth-first walk, parents before children.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Indented one-node-per-line rendering, used for snapshot tests and debugging.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(0, &mut out);
        out
    }

    fn write_outline(&self, indent: usize, out: &mut String) {
        out.push_str(&"  ".repeat(indent));
        out.push_str(self.node_type());
        let detail = match &self.kind {
            NodeKind::Heading { depth } => format!(" depth={depth}"),
            NodeKind::List {
                ordered,
                start,
                spread,
                ..
            } => match start {
                Some(start) => format!(" ordered={ordered} start={start} spread={spread}"),
                None => format!(" ordered={ordered} spread={spread}"),
            },
            NodeKind::ListItem { checked, .. } => match checked {
                Some(checked) => format!(" checked={checked}"),
                None => String::new(),
            },
            NodeKind::Text { value }
            | NodeKind::InlineCode { value }
            | NodeKind::InlineMath { value }
            | NodeKind::Html { value } => format!(" {value:?}"),
            NodeKind::Code { lang, value, .. } => match lang {
                Some(lang) => format!(" lang={lang} {value:?}"),
                None => format!(" {value:?}"),
            },
            NodeKind::Math { value, .. } => format!(" {value:?}"),
            NodeKind::Link { url, title } | NodeKind::Image { url, title, .. } => match title {
                Some(title) => format!(" url={url:?} title={title:?}"),
                None => format!(" url={url:?}"),
            },
            NodeKind::Definition { identifier, url, .. } => {
                format!(" identifier={identifier:?} url={url:?}")
            }
            NodeKind::LinkReference { identifier, .. }
            | NodeKind::ImageReference { identifier, .. }
            | NodeKind::FootnoteReference { identifier, .. }
            | NodeKind::FootnoteDefinition { identifier, .. } => {
                format!(" identifier={identifier:?}")
            }
            _ => String::new(),
        };
        out.push_str(&detail);
        if let NodeKind::Image { alt, .. } = &self.kind {
            out.push_str(&format!(" alt={alt:?}"));
        }
        out.push('\n');
        for child in &self.children {
            child.write_outline(indent + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn point(line: usize, column: usize, offset: usize) -> Point {
        Point {
            line,
            column,
            offset,
        }
    }

    fn sample() -> Node {
        let pos = Some(Position {
            start: point(1, 1, 0),
            end: point(1, 4, 3),
        });
        Node::with_children(
            NodeKind::Paragraph,
            vec![
                Node::text("ab", pos),
                Node::with_children(NodeKind::Emphasis, vec![Node::text("c", pos)], pos),
            ],
            pos,
        )
    }

    #[test]
    fn remove_positions_is_recursive() {
        let mut node = sample();
        node.remove_positions();
        let mut seen = 0;
        node.walk(&mut |n| {
            assert!(n.position.is_none());
            seen += 1;
        });
        assert_eq!(seen, 4);
    }

    #[test]
    fn plain_text_concatenates_leaves() {
        assert_eq!(sample().plain_text(), "abc");
    }

    #[test]
    fn serializes_mdast_shape() {
        let mut node = sample();
        node.remove_positions();
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "paragraph",
                "children": [
                    {"type": "text", "value": "ab"},
                    {"type": "emphasis", "children": [{"type": "text", "value": "c"}]}
                ]
            })
        );
    }

    #[test]
    fn serializes_camel_case_fields() {
        let node = Node::new(
            NodeKind::LinkReference {
                identifier: "x".into(),
                label: "X".into(),
                reference_type: ReferenceType::Full,
            },
            None,
        );
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["referenceType"], "full");
        assert_eq!(json["type"], "linkReference");
    }

    #[test]
    fn outline_rendering() {
        let mut node = sample();
        node.remove_positions();
        assert_eq!(
            node.outline(),
            "paragraph\n  text \"ab\"\n  emphasis\n    text \"c\"\n"
        );
    }
}
