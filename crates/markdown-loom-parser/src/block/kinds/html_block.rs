use super::{line_end, non_indented};
use crate::ast::{
    Node, NodeKind,
    node_type::{HTML, NodeType, PARAGRAPH, TABLE},
};
use crate::block::{
    BlockParseContext, BlockToken, BlockTokenData, BlockTokenizer, ContinuationResult, Line,
    LineCursor, MatchContext, OpenerResult, phrasing::literal_text,
};
use crate::error::ParserError;
use crate::source::{CodePoint, NodeInterval};
use crate::syntax::{
    at, html::{closing_tag_end, open_tag_end, tag_name_end, tag_name_in},
    starts_with, starts_with_ignore_case,
};

const RAW_TAGS: &[&str] = &["pre", "script", "style", "textarea"];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption", "center",
    "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hr", "html", "iframe", "legend", "li", "link", "main", "menu",
    "menuitem", "nav", "noframes", "ol", "optgroup", "option", "p", "param", "search", "section",
    "summary", "table", "tbody", "td", "tfoot", "th", "thead", "title", "tr", "track", "ul",
];

/// Raw HTML blocks, classified by the seven CommonMark start conditions.
#[derive(Debug, Default)]
pub struct HtmlBlock;

impl HtmlBlock {
    pub const NAME: &'static str = "htmlBlock";
}

fn ends_tag_name(s: &[CodePoint], end: usize) -> bool {
    matches!(at(s, end), None | Some(' ' | '\t' | '>'))
}

/// Start condition of an HTML block whose `<` sits at `i`.
fn start_condition(s: &[CodePoint], i: usize) -> Option<u8> {
    if let Some(end) = tag_name_in(s, i + 1, RAW_TAGS) {
        if ends_tag_name(s, end) {
            return Some(1);
        }
    }
    if starts_with(s, i, "<!--") {
        return Some(2);
    }
    if starts_with(s, i, "<?") {
        return Some(3);
    }
    if starts_with(s, i, "<!") && at(s, i + 2).is_some_and(|c| c.is_ascii_alphabetic()) {
        return Some(4);
    }
    if starts_with(s, i, "<![CDATA[") {
        return Some(5);
    }
    let name_start = if at(s, i + 1) == Some('/') { i + 2 } else { i + 1 };
    if let Some(end) = tag_name_in(s, name_start, BLOCK_TAGS) {
        if ends_tag_name(s, end) || starts_with(s, end, "/>") {
            return Some(6);
        }
    }
    let tag_end = open_tag_end(s, i).or_else(|| closing_tag_end(s, i))?;
    let is_raw = tag_name_end(s, name_start).is_some_and(|end| {
        RAW_TAGS
            .iter()
            .any(|t| t.len() == end - name_start && starts_with_ignore_case(s, name_start, t))
    });
    let rest_blank = s[tag_end..].iter().all(|p| matches!(p.code_point, ' ' | '\t'));
    (!is_raw && rest_blank).then_some(7)
}

/// Whether `s[from..]` holds the end marker of `condition`.
fn contains_end(s: &[CodePoint], from: usize, condition: u8) -> bool {
    (from..s.len()).any(|j| match condition {
        1 => {
            starts_with(s, j, "</")
                && tag_name_in(s, j + 2, RAW_TAGS).is_some_and(|end| at(s, end) == Some('>'))
        }
        2 => starts_with(s, j, "-->"),
        3 => starts_with(s, j, "?>"),
        4 => starts_with(s, j, ">"),
        5 => starts_with(s, j, "]]>"),
        _ => false,
    })
}

impl BlockTokenizer for HtmlBlock {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[HTML]
    }

    fn interruptable_types(&self) -> &'static [NodeType] {
        &[PARAGRAPH, TABLE]
    }

    fn eat_opener(
        &self,
        line: &Line<'_>,
        cur: LineCursor,
        ctx: &MatchContext,
    ) -> Option<OpenerResult> {
        let start = non_indented(line, cur)?;
        if line.char_at(start.index) != Some('<') {
            return None;
        }
        let s = &line.points[..line.end];
        let condition = start_condition(s, start.index)?;
        if condition == 7 && ctx.interrupting {
            return None;
        }
        let saturated = condition <= 5 && contains_end(s, start.index, condition);
        Some(OpenerResult {
            token: BlockToken::new(
                HTML,
                NodeInterval::new(start.index, line.end),
                BlockTokenData::Html {
                    condition,
                    lines: vec![line.content_from(cur)],
                },
            ),
            next: line_end(line, cur),
            saturated,
        })
    }

    fn eat_continuation(
        &self,
        line: &Line<'_>,
        cur: LineCursor,
        token: &mut BlockToken,
        _ctx: &MatchContext,
    ) -> ContinuationResult {
        let BlockTokenData::Html { condition, lines } = &mut token.data else {
            return ContinuationResult::NotMatched;
        };
        let blank = line.is_blank_from(cur);
        if *condition >= 6 && blank {
            return ContinuationResult::NotMatched;
        }
        lines.push(line.content_from(cur));
        token.interval.end_index = line.end;
        if *condition <= 5 && contains_end(&line.points[..line.end], cur.index, *condition) {
            ContinuationResult::Closing
        } else {
            ContinuationResult::Consumed
        }
    }

    fn parse(
        &self,
        token: BlockToken,
        _children: Vec<Node>,
        ctx: &BlockParseContext<'_>,
    ) -> Result<Option<Node>, ParserError> {
        let BlockTokenData::Html { lines, .. } = &token.data else {
            return Ok(None);
        };
        Ok(Some(Node::new(
            NodeKind::Html {
                value: literal_text(ctx.points, lines),
            },
            ctx.position(token.interval),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::blocks;
    use super::*;
    use crate::syntax::points;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("<script type=\"x\">", Some(1))]
    #[case("<PRE>", Some(1))]
    #[case("<!-- c", Some(2))]
    #[case("<?php", Some(3))]
    #[case("<!DOCTYPE html>", Some(4))]
    #[case("<![CDATA[", Some(5))]
    #[case("<div class=\"x\"", Some(6))]
    #[case("</table>", Some(6))]
    #[case("<br/>", Some(7))]
    #[case("<>", None)]
    #[case("<custom-el attr>  ", Some(7))]
    #[case("</custom>", Some(7))]
    #[case("<a href=\"x\"> text", None)]
    #[case("<divx>", Some(7))]
    fn conditions(#[case] input: &str, #[case] expected: Option<u8>) {
        assert_eq!(start_condition(&points(input), 0), expected);
    }

    fn html_values(input: &str) -> Vec<(String, String)> {
        let (root, points) = blocks(input);
        root.children
            .iter()
            .map(|t| {
                let value = match &t.data {
                    BlockTokenData::Html { lines, .. } => literal_text(&points, lines),
                    _ => String::new(),
                };
                (t.node_type.to_string(), value)
            })
            .collect()
    }

    #[test]
    fn condition_six_ends_at_blank_line() {
        assert_eq!(
            html_values("<div>\n*a*\n\ntext\n"),
            vec![
                ("html".to_string(), "<div>\n*a*".to_string()),
                ("paragraph".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn comment_runs_to_end_marker() {
        assert_eq!(
            html_values("<!-- a\n\nb -->\nc\n"),
            vec![
                ("html".to_string(), "<!-- a\n\nb -->".to_string()),
                ("paragraph".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn single_line_raw_block_closes_immediately() {
        assert_eq!(
            html_values("<pre>x</pre>\nafter\n"),
            vec![
                ("html".to_string(), "<pre>x</pre>".to_string()),
                ("paragraph".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn condition_seven_cannot_interrupt_paragraph() {
        let (root, _) = blocks("a\n<custom>\n");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].node_type, "paragraph");
    }
}
