//! GFM tables.
//!
//! A table starts when the line after a paragraph is a delimiter row whose
//! cell count matches the paragraph's last line. Body rows follow until a
//! blank line or another block interrupts.

use super::{definition::paragraph_token, non_indented};
use crate::ast::{
    AlignType, Node, NodeKind,
    node_type::{NodeType, PARAGRAPH, TABLE, TABLE_CELL, TABLE_ROW},
};
use crate::block::{
    BlockParseContext, BlockToken, BlockTokenData, BlockTokenizer, ContinuationResult,
    InterruptResult, Line, LineCursor, MatchContext,
    token::{TableCell, TableRow},
};
use crate::error::ParserError;
use crate::source::{CodePoint, NodeInterval, chars::is_space_or_tab};

/// GFM tables: a header row, a delimiter row, then body rows.
#[derive(Debug, Default)]
pub struct Table;

impl Table {
    pub const NAME: &'static str = "table";
}

fn is_ws(points: &[CodePoint], i: usize) -> bool {
    is_space_or_tab(points[i].code_point)
}

/// Splits `points[start..end]` into cells on unescaped pipes.
///
/// Leading and trailing pipes are optional; returns the row and whether it
/// contained a pipe at all.
fn split_row(points: &[CodePoint], start: usize, end: usize) -> (TableRow, bool) {
    let mut s = start;
    let mut e = end;
    while s < e && is_ws(points, s) {
        s += 1;
    }
    while e > s && is_ws(points, e - 1) {
        e -= 1;
    }
    let interval = NodeInterval::new(s, e);

    let mut pipes = Vec::new();
    let mut i = s;
    while i < e {
        match points[i].code_point {
            '\\' if i + 1 < e => i += 2,
            '|' => {
                pipes.push(i);
                i += 1;
            }
            _ => i += 1,
        }
    }
    let has_pipe = !pipes.is_empty();
    let mut bounds = Vec::with_capacity(pipes.len() + 2);
    if pipes.first() != Some(&s) {
        bounds.push(s);
    }
    for &p in &pipes {
        bounds.push(p + 1);
    }
    let trailing = pipes.last() == Some(&(e.saturating_sub(1))) && e > s;

    let mut cells = Vec::new();
    for (k, &cell_start) in bounds.iter().enumerate() {
        let cell_end = bounds.get(k + 1).map_or(e, |next| next - 1);
        if trailing && cell_start == e {
            break;
        }
        let mut cs = cell_start;
        let mut ce = cell_end;
        while cs < ce && is_ws(points, cs) {
            cs += 1;
        }
        while ce > cs && is_ws(points, ce - 1) {
            ce -= 1;
        }
        cells.push(TableCell {
            interval: NodeInterval::new(cell_start, cell_end),
            content: NodeInterval::new(cs, ce),
        });
    }
    (TableRow { interval, cells }, has_pipe)
}

/// Alignment of every column when the line is a delimiter row.
fn parse_delimiter_row(line: &Line<'_>, cur: LineCursor) -> Option<(Vec<Option<AlignType>>, bool)> {
    let start = non_indented(line, cur)?;
    let (row, has_pipe) = split_row(line.points, start.index, line.end);
    if row.cells.is_empty() {
        return None;
    }
    let mut align = Vec::with_capacity(row.cells.len());
    for cell in &row.cells {
        let text: Vec<char> = (cell.content.start_index..cell.content.end_index)
            .map(|i| line.points[i].code_point)
            .collect();
        let left = text.first() == Some(&':');
        let right = text.len() > 1 && text.last() == Some(&':');
        let dashes = &text[usize::from(left)..text.len() - usize::from(right)];
        if dashes.is_empty() || dashes.iter().any(|&c| c != '-') {
            return None;
        }
        align.push(match (left, right) {
            (true, true) => Some(AlignType::Center),
            (true, false) => Some(AlignType::Left),
            (false, true) => Some(AlignType::Right),
            (false, false) => None,
        });
    }
    Some((align, has_pipe))
}

/// Pads or truncates a body row to the header's column count.
fn fit_row(mut row: TableRow, columns: usize) -> TableRow {
    row.cells.truncate(columns);
    let end = row.interval.end_index;
    while row.cells.len() < columns {
        row.cells.push(TableCell {
            interval: NodeInterval::new(end, end),
            content: NodeInterval::new(end, end),
        });
    }
    row
}

/// Cell content as inline input, with `\|` reduced to `|`.
fn cell_points(points: &[CodePoint], content: NodeInterval) -> Vec<CodePoint> {
    let mut out = Vec::with_capacity(content.len());
    let mut i = content.start_index;
    while i < content.end_index {
        let p = points[i];
        if p.code_point == '\\' && i + 1 < content.end_index && points[i + 1].code_point == '|' {
            i += 1;
            continue;
        }
        out.push(p);
        i += 1;
    }
    out
}

impl BlockTokenizer for Table {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[TABLE, TABLE_ROW, TABLE_CELL]
    }

    fn sibling_types(&self) -> &'static [NodeType] {
        &[PARAGRAPH]
    }

    fn eat_and_interrupt_previous_sibling(
        &self,
        line: &Line<'_>,
        cur: LineCursor,
        previous: &BlockToken,
        _ctx: &MatchContext,
    ) -> Option<InterruptResult> {
        let (align, delimiter_pipe) = parse_delimiter_row(line, cur)?;
        let BlockTokenData::Paragraph { lines } = &previous.data else {
            return None;
        };
        let (header_line, before) = lines.split_last()?;
        let (header, header_pipe) =
            split_row(line.points, header_line.first_non_ws, header_line.end);
        if header.cells.len() != align.len() || !(delimiter_pipe || header_pipe) {
            return None;
        }
        let interval = NodeInterval::new(header.interval.start_index, line.end);
        Some(InterruptResult {
            token: BlockToken::new(
                TABLE,
                interval,
                BlockTokenData::Table {
                    align,
                    rows: vec![header],
                },
            ),
            remaining_sibling: (!before.is_empty())
                .then(|| paragraph_token(before, previous.tokenizer)),
            saturated: false,
        })
    }

    fn eat_continuation(
        &self,
        line: &Line<'_>,
        cur: LineCursor,
        token: &mut BlockToken,
        _ctx: &MatchContext,
    ) -> ContinuationResult {
        if line.is_blank_from(cur) {
            return ContinuationResult::NotMatched;
        }
        let BlockTokenData::Table { align, rows } = &mut token.data else {
            return ContinuationResult::NotMatched;
        };
        let start = line.next_non_ws(cur).index;
        let (row, _) = split_row(line.points, start, line.end);
        rows.push(fit_row(row, align.len()));
        token.interval.end_index = line.end;
        ContinuationResult::Consumed
    }

    fn parse(
        &self,
        token: BlockToken,
        _children: Vec<Node>,
        ctx: &BlockParseContext<'_>,
    ) -> Result<Option<Node>, ParserError> {
        let BlockTokenData::Table { align, rows } = token.data else {
            return Ok(None);
        };
        let mut row_nodes = Vec::with_capacity(rows.len());
        for row in rows {
            let mut cells = Vec::with_capacity(row.cells.len());
            for cell in row.cells {
                let children = ctx.parse_phrasing(cell_points(ctx.points, cell.content))?;
                cells.push(Node::with_children(
                    NodeKind::TableCell,
                    children,
                    ctx.position(cell.interval),
                ));
            }
            row_nodes.push(Node::with_children(
                NodeKind::TableRow,
                cells,
                ctx.position(row.interval),
            ));
        }
        Ok(Some(Node::with_children(
            NodeKind::Table { align },
            row_nodes,
            ctx.position(token.interval),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{blocks, top_types};
    use super::*;
    use crate::source::{normalize, slice_string};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn cells(input: &str) -> Vec<String> {
        let points = normalize(input);
        let (row, _) = split_row(&points, 0, points.len());
        row.cells
            .iter()
            .map(|c| slice_string(&points, c.content))
            .collect()
    }

    #[rstest]
    #[case("| a | b |", vec!["a", "b"])]
    #[case("a | b", vec!["a", "b"])]
    #[case("| a |", vec!["a"])]
    #[case("a \\| b | c", vec!["a \\| b", "c"])]
    #[case("|  | x", vec!["", "x"])]
    fn row_splitting(#[case] input: &str, #[case] expected: Vec<&str>) {
        assert_eq!(cells(input), expected);
    }

    fn table(input: &str) -> (Vec<Option<AlignType>>, Vec<usize>) {
        let (root, _) = blocks(input);
        let token = root
            .children
            .iter()
            .find(|t| t.node_type == TABLE)
            .expect("no table");
        let BlockTokenData::Table { align, rows } = &token.data else {
            panic!("expected table data");
        };
        (align.clone(), rows.iter().map(|r| r.cells.len()).collect())
    }

    #[test]
    fn alignment_and_rows() {
        let (align, rows) = table("| a | b | c |\n| :- | :-: | -: |\n| 1 | 2 | 3 |\n");
        assert_eq!(
            align,
            vec![
                Some(AlignType::Left),
                Some(AlignType::Center),
                Some(AlignType::Right)
            ]
        );
        assert_eq!(rows, vec![3, 3]);
    }

    #[test]
    fn body_rows_are_fitted_to_header() {
        let (_, rows) = table("a | b\n--|--\n1\n1 | 2 | 3\n");
        assert_eq!(rows, vec![2, 2, 2]);
    }

    #[test]
    fn mismatched_delimiter_is_not_a_table() {
        assert_eq!(top_types("| a | b |\n| --- |\n"), vec!["paragraph"]);
    }

    #[test]
    fn blank_line_ends_table() {
        assert_eq!(top_types("a|b\n-|-\nc|d\n\ne\n"), vec!["table", "paragraph"]);
    }

    #[test]
    fn leading_paragraph_lines_stay_paragraph() {
        assert_eq!(top_types("intro\na | b\n--- | ---\n"), vec!["paragraph", "table"]);
    }

    #[test]
    fn block_interrupts_table() {
        assert_eq!(top_types("a|b\n-|-\n> q\n"), vec!["table", "blockquote"]);
    }

    #[test]
    fn escaped_pipe_in_cell_content() {
        let points = normalize("a \\| b");
        let merged: String = cell_points(&points, NodeInterval::new(0, points.len()))
            .iter()
            .map(|p| p.code_point)
            .collect();
        assert_eq!(merged, "a | b");
    }
}
