use crate::source::{CodePoint, NodeInterval, chars::is_space_or_tab};

/// Position inside a line.
///
/// `column` can run ahead of `points[index].column` when a tab has been
/// partially consumed as indentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCursor {
    pub index: usize,
    pub column: usize,
}

/// A raw line of text owned by a leaf block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentLine {
    /// First code point that belongs to the block.
    pub start: usize,
    /// Index of the line ending (or end of input); never included.
    pub end: usize,
    /// First non-whitespace index at or after `start` (`end` when blank).
    pub first_non_ws: usize,
    /// Columns of a partially consumed tab that precede `start`.
    pub virtual_spaces: usize,
}

impl ContentLine {
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.first_non_ws >= self.end
    }

    /// Interval from the first non-whitespace character to the line end.
    #[must_use]
    pub fn trimmed_interval(&self) -> NodeInterval {
        NodeInterval::new(self.first_non_ws.min(self.end), self.end)
    }
}

/// One line of the document as seen by block tokenizers.
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    /// The whole document.
    pub points: &'a [CodePoint],
    pub start: usize,
    /// Index of the `\n` record, or the document length on the last line.
    pub end: usize,
    /// 1-based line number.
    pub number: usize,
}

impl<'a> Line<'a> {
    /// Splits `points` into lines.
    pub fn split(points: &'a [CodePoint]) -> Vec<Line<'a>> {
        let mut lines = Vec::new();
        let mut start = 0;
        let mut number = 1;
        for (i, p) in points.iter().enumerate() {
            if p.code_point == '\n' {
                lines.push(Line {
                    points,
                    start,
                    end: i,
                    number,
                });
                start = i + 1;
                number += 1;
            }
        }
        if start < points.len() {
            lines.push(Line {
                points,
                start,
                end: points.len(),
                number,
            });
        }
        lines
    }

    pub fn start_cursor(&self) -> LineCursor {
        LineCursor {
            index: self.start,
            column: self.column_at(self.start),
        }
    }

    /// Character at `index` if it lies within the line.
    pub fn char_at(&self, index: usize) -> Option<char> {
        (index < self.end).then(|| self.points[index].code_point)
    }

    /// Visual column where `index` starts; past the end this is the column
    /// just after the last character.
    pub fn column_at(&self, index: usize) -> usize {
        if index < self.end {
            return self.points[index].column;
        }
        if self.end > self.start {
            self.points[self.end - 1].next_column()
        } else {
            1
        }
    }

    /// Cursor at the first non-space/tab character at or after `cur`.
    pub fn next_non_ws(&self, cur: LineCursor) -> LineCursor {
        let mut index = cur.index;
        while self.char_at(index).is_some_and(is_space_or_tab) {
            index += 1;
        }
        if index == cur.index {
            return cur;
        }
        LineCursor {
            index,
            column: self.column_at(index),
        }
    }

    /// Columns of whitespace between `cur` and the next non-whitespace character.
    pub fn indent(&self, cur: LineCursor) -> usize {
        self.next_non_ws(cur).column - cur.column
    }

    pub fn is_blank_from(&self, cur: LineCursor) -> bool {
        self.next_non_ws(cur).index >= self.end
    }

    /// Consumes up to `columns` columns of whitespace, splitting a tab if needed.
    pub fn advance_columns(&self, cur: LineCursor, columns: usize) -> LineCursor {
        let mut cur = cur;
        let mut remaining = columns;
        while remaining > 0 {
            let Some(c) = self.char_at(cur.index) else {
                break;
            };
            match c {
                ' ' => {
                    cur.index += 1;
                    cur.column += 1;
                    remaining -= 1;
                }
                '\t' => {
                    let tab_end = self.points[cur.index].next_column();
                    let available = tab_end - cur.column;
                    if available <= remaining {
                        cur.index += 1;
                        cur.column = tab_end;
                        remaining -= available;
                    } else {
                        cur.column += remaining;
                        remaining = 0;
                    }
                }
                _ => break,
            }
        }
        cur
    }

    /// Moves past `count` non-tab characters (markers).
    pub fn advance_chars(&self, cur: LineCursor, count: usize) -> LineCursor {
        let index = (cur.index + count).min(self.end);
        LineCursor {
            index,
            column: self.column_at(index),
        }
    }

    /// Remainder of the line from `cur` as block content.
    pub fn content_from(&self, cur: LineCursor) -> ContentLine {
        let mut start = cur.index;
        let mut virtual_spaces = 0;
        if cur.index < self.end {
            let p = self.points[cur.index];
            if p.code_point == '\t' && cur.column > p.column {
                virtual_spaces = p.next_column() - cur.column;
                start += 1;
            }
        }
        let first_non_ws = self
            .next_non_ws(LineCursor {
                index: start,
                column: self.column_at(start),
            })
            .index;
        ContentLine {
            start,
            end: self.end,
            first_non_ws,
            virtual_spaces,
        }
    }

    /// Interval of the line from `cur` to the line end.
    pub fn interval_from(&self, cur: LineCursor) -> NodeInterval {
        NodeInterval::new(cur.index.min(self.end), self.end)
    }
}
