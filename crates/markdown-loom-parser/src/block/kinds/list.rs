//! List items and the lists that group them.
//!
//! Items are matched one at a time; adjacent compatible items are grouped
//! into `list` tokens after matching, when looseness and task checkboxes
//! are also settled.

use super::non_indented;
use crate::ast::{
    Node, NodeKind,
    node_type::{LIST, LIST_ITEM, NodeType, PARAGRAPH, TABLE},
};
use crate::block::{
    BlockParseContext, BlockToken, BlockTokenData, BlockTokenizer, ContinuationResult, Line,
    LineCursor, MatchContext, OpenerResult, TransformContext, Transformed, token::ListMarker,
};
use crate::error::ParserError;
use crate::source::{CodePoint, NodeInterval, chars::is_space_or_tab};

const MAX_ORDINAL_DIGITS: usize = 9;

/// Bullet and ordered list items, grouped into lists after matching.
#[derive(Debug, Default)]
pub struct List;

impl List {
    pub const NAME: &'static str = "list";
}

/// Marker at `index` and its length in characters.
fn parse_marker(line: &Line<'_>, index: usize) -> Option<(ListMarker, usize)> {
    let c = line.char_at(index)?;
    if matches!(c, '-' | '+' | '*') {
        let marker = ListMarker {
            ordered: false,
            marker: c,
            start: None,
        };
        return Some((marker, 1));
    }
    let mut digits = 0;
    while line.char_at(index + digits).is_some_and(|d| d.is_ascii_digit()) {
        digits += 1;
    }
    if digits == 0 || digits > MAX_ORDINAL_DIGITS {
        return None;
    }
    let delimiter = line.char_at(index + digits).filter(|d| matches!(d, '.' | ')'))?;
    let number: String = (index..index + digits)
        .filter_map(|i| line.char_at(i))
        .collect();
    let marker = ListMarker {
        ordered: true,
        marker: delimiter,
        start: number.parse().ok(),
    };
    Some((marker, digits + 1))
}

fn same_list(a: &ListMarker, b: &ListMarker) -> bool {
    a.ordered == b.ordered && a.marker == b.marker
}

fn item_marker(token: &BlockToken) -> Option<ListMarker> {
    match &token.data {
        BlockTokenData::ListItem { marker, .. } => Some(*marker),
        _ => None,
    }
}

/// A list is loose when blank lines separate its items or any item's
/// direct children.
fn is_loose(items: &[BlockToken]) -> bool {
    items.iter().enumerate().any(|(k, item)| {
        let has_next_item = k + 1 < items.len();
        if has_next_item && item.ends_with_blank_line() {
            return true;
        }
        let n = item.children.len();
        item.children
            .iter()
            .enumerate()
            .any(|(j, child)| child.ends_with_blank_line() && (has_next_item || j + 1 < n))
    })
}

/// Checks for a `[ ]`/`[x]` checkbox at the start of the item's first
/// paragraph and strips it from the paragraph.
fn take_task_checkbox(item: &mut BlockToken, points: &[CodePoint]) -> Option<bool> {
    let first = item.children.first_mut()?;
    if first.node_type != PARAGRAPH {
        return None;
    }
    let BlockTokenData::Paragraph { lines } = &mut first.data else {
        return None;
    };
    let line = lines.first_mut()?;
    let i = line.first_non_ws;
    let c = |k: usize| (i + k < line.end).then(|| points[i + k].code_point);
    if c(0) != Some('[') || c(2) != Some(']') || !c(3).is_some_and(is_space_or_tab) {
        return None;
    }
    let checked = match c(1)? {
        ' ' => false,
        'x' | 'X' => true,
        _ => return None,
    };
    let mut rest = i + 4;
    while rest < line.end && is_space_or_tab(points[rest].code_point) {
        rest += 1;
    }
    line.start = rest;
    line.first_non_ws = rest;
    line.virtual_spaces = 0;
    first.interval.start_index = rest.min(first.interval.end_index);
    if lines.iter().all(|l| l.is_blank()) {
        item.children.remove(0);
    }
    Some(checked)
}

fn build_list(mut items: Vec<BlockToken>, id: usize, points: &[CodePoint]) -> BlockToken {
    let spread = is_loose(&items);
    let marker = item_marker(&items[0]).unwrap_or(ListMarker {
        ordered: false,
        marker: '-',
        start: None,
    });
    for item in &mut items {
        let task = take_task_checkbox(item, points);
        if let BlockTokenData::ListItem {
            checked,
            spread: item_spread,
            ..
        } = &mut item.data
        {
            *checked = task;
            *item_spread = spread;
        }
    }
    let start = items[0].interval.start_index;
    let end = items[items.len() - 1].interval.end_index;
    let last_line_blank = items[items.len() - 1].last_line_blank;
    let mut list = BlockToken::new(
        LIST,
        NodeInterval::new(start, end.max(start)),
        BlockTokenData::List { marker, spread },
    );
    list.tokenizer = id;
    list.children = items;
    list.last_line_blank = last_line_blank;
    list
}

impl BlockTokenizer for List {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[LIST, LIST_ITEM]
    }

    fn is_container(&self) -> bool {
        true
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
        let (marker, marker_len) = parse_marker(line, start.index)?;
        let marker_end = line.advance_chars(start, marker_len);
        if line.char_at(marker_end.index).is_some_and(|c| !is_space_or_tab(c)) {
            return None;
        }
        let empty = line.is_blank_from(marker_end);
        let interrupts_paragraph = ctx.interrupting && ctx.open_leaf == Some(PARAGRAPH);
        if interrupts_paragraph && (empty || (marker.ordered && marker.start != Some(1))) {
            return None;
        }

        let mut spaces_end = marker_end;
        loop {
            spaces_end = line.advance_columns(spaces_end, 1);
            let more = spaces_end.column - marker_end.column < 5
                && line.char_at(spaces_end.index).is_some_and(is_space_or_tab);
            if !more {
                break;
            }
        }
        let spaces = spaces_end.column - marker_end.column;
        let (padding, next) = if empty || !(1..5).contains(&spaces) {
            let next = if line.char_at(marker_end.index).is_some_and(is_space_or_tab) {
                line.advance_columns(marker_end, 1)
            } else {
                marker_end
            };
            (marker_len + 1, next)
        } else {
            (marker_len + spaces, spaces_end)
        };
        let content_indent = start.column - cur.column + padding;

        Some(OpenerResult {
            token: BlockToken::new(
                LIST_ITEM,
                NodeInterval::new(start.index, next.index.max(marker_end.index)),
                BlockTokenData::ListItem {
                    marker,
                    content_indent,
                    checked: None,
                    spread: false,
                },
            ),
            next,
            saturated: false,
        })
    }

    fn eat_continuation(
        &self,
        line: &Line<'_>,
        cur: LineCursor,
        token: &mut BlockToken,
        ctx: &MatchContext,
    ) -> ContinuationResult {
        let BlockTokenData::ListItem { content_indent, .. } = token.data else {
            return ContinuationResult::NotMatched;
        };
        if line.is_blank_from(cur) {
            if !ctx.has_children {
                return ContinuationResult::NotMatched;
            }
            return ContinuationResult::Opening {
                next: line.next_non_ws(cur),
            };
        }
        if line.indent(cur) >= content_indent {
            return ContinuationResult::Opening {
                next: line.advance_columns(cur, content_indent),
            };
        }
        ContinuationResult::NotMatched
    }

    fn keeps_blank_line(&self, token: &BlockToken, line: &Line<'_>) -> bool {
        token.children.is_empty() && token.interval.start_index >= line.start
    }

    fn transform_match(
        &self,
        siblings: Vec<BlockToken>,
        ctx: &TransformContext<'_>,
    ) -> Transformed {
        if !siblings.iter().any(|t| item_marker(t).is_some()) {
            return Transformed::Unchanged(siblings);
        }
        let mut out: Vec<BlockToken> = Vec::with_capacity(siblings.len());
        let mut run: Vec<BlockToken> = Vec::new();
        for token in siblings {
            match item_marker(&token) {
                Some(marker) => {
                    let compatible = run
                        .first()
                        .and_then(item_marker)
                        .is_none_or(|first| same_list(&first, &marker));
                    if !compatible {
                        out.push(build_list(std::mem::take(&mut run), ctx.id, ctx.points));
                    }
                    run.push(token);
                }
                None => {
                    if !run.is_empty() {
                        out.push(build_list(std::mem::take(&mut run), ctx.id, ctx.points));
                    }
                    out.push(token);
                }
            }
        }
        if !run.is_empty() {
            out.push(build_list(run, ctx.id, ctx.points));
        }
        Transformed::Replaced(out)
    }

    fn parse(
        &self,
        token: BlockToken,
        children: Vec<Node>,
        ctx: &BlockParseContext<'_>,
    ) -> Result<Option<Node>, ParserError> {
        let kind = match token.data {
            BlockTokenData::List { marker, spread } => NodeKind::List {
                ordered: marker.ordered,
                start: marker.start,
                spread,
                marker: marker.marker,
            },
            BlockTokenData::ListItem {
                checked, spread, ..
            } => NodeKind::ListItem { checked, spread },
            _ => return Ok(None),
        };
        Ok(Some(Node::with_children(
            kind,
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
    use rstest::rstest;

    fn list_of(input: &str) -> BlockToken {
        let (root, _) = blocks(input);
        root.children
            .into_iter()
            .find(|t| t.node_type == LIST)
            .expect("no list")
    }

    fn spread(token: &BlockToken) -> bool {
        matches!(token.data, BlockTokenData::List { spread: true, .. })
    }

    #[rstest]
    #[case("- a\n- b\n", false)]
    #[case("- a\n\n- b\n", true)]
    #[case("- a\n  - b\n\n  - c\n", false)]
    #[case("- a\n\n  b\n- c\n", true)]
    #[case("- a\n- b\n\n", false)]
    #[case("- ```\n  x\n\n  ```\n- b\n", false)]
    #[case("1. a\n\n   b\n", true)]
    fn looseness(#[case] input: &str, #[case] loose: bool) {
        assert_eq!(spread(&list_of(input)), loose);
    }

    #[test]
    fn changing_bullet_starts_new_list() {
        assert_eq!(top_types("- a\n- b\n+ c\n"), vec!["list", "list"]);
    }

    #[test]
    fn ordered_start_number() {
        let list = list_of("7) a\n8) b\n");
        let BlockTokenData::List { marker, .. } = list.data else {
            panic!("expected list");
        };
        assert_eq!(marker.start, Some(7));
        assert!(marker.ordered);
        assert_eq!(list.children.len(), 2);
    }

    #[rstest]
    #[case("a\n2. b\n")]
    #[case("a\n-\n")]
    #[case("-a\n")]
    #[case("1234567890. a\n")]
    fn not_list_starts(#[case] input: &str) {
        assert!(!top_types(input).contains(&LIST));
    }

    #[test]
    fn one_can_interrupt_paragraph() {
        assert_eq!(top_types("a\n1. b\n"), vec!["paragraph", "list"]);
    }

    #[test]
    fn content_indent_follows_marker_width() {
        let (root, _) = blocks("10.  a\n\n     b\n");
        let item = &root.children[0].children[0];
        assert_eq!(item.children.len(), 2);
        let BlockTokenData::ListItem { content_indent, .. } = item.data else {
            panic!("expected item");
        };
        assert_eq!(content_indent, 5);
    }

    #[test]
    fn five_spaces_after_marker_start_code() {
        let (root, _) = blocks("-      code\n");
        let item = &root.children[0].children[0];
        assert_eq!(item.children[0].node_type, "code");
    }

    #[test]
    fn blank_first_line_then_content() {
        let (root, _) = blocks("-\n  foo\n");
        let item = &root.children[0].children[0];
        assert_eq!(item.children[0].node_type, "paragraph");
    }

    #[test]
    fn empty_item_cannot_hold_blank_then_content() {
        let (root, _) = blocks("-\n\n  foo\n");
        assert_eq!(top_types("-\n\n  foo\n"), vec!["list", "paragraph"]);
        assert!(root.children[0].children[0].children.is_empty());
    }

    #[rstest]
    #[case("- [ ] todo\n", Some(false))]
    #[case("- [x] done\n", Some(true))]
    #[case("- [X] done\n", Some(true))]
    #[case("- [y] no\n", None)]
    #[case("- [x]no\n", None)]
    #[case("- plain\n", None)]
    fn task_items(#[case] input: &str, #[case] expected: Option<bool>) {
        let list = list_of(input);
        let BlockTokenData::ListItem { checked, .. } = list.children[0].data else {
            panic!("expected item");
        };
        assert_eq!(checked, expected);
    }
}
