use crate::ast::{
    Node,
    node_type::{NodeType, TEXT},
};
use crate::inline::{Delimiter, InlineContext, InlineToken, InlineTokenizer};
use crate::source::{chars::is_space_or_tab, text::decode};

/// Literal text; covers whatever no other tokenizer claimed.
#[derive(Debug, Default)]
pub struct Text;

impl Text {
    pub const NAME: &'static str = "text";
}

/// Drops spaces and tabs around line endings, then decodes escapes and
/// character references.
fn text_value(raw: &[char]) -> String {
    let mut out: Vec<char> = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == '\n' {
            while out.last().is_some_and(|&c| is_space_or_tab(c)) {
                out.pop();
            }
            out.push('\n');
            i += 1;
            while i < raw.len() && is_space_or_tab(raw[i]) {
                i += 1;
            }
        } else {
            out.push(raw[i]);
            i += 1;
        }
    }
    decode(&out)
}

impl InlineTokenizer for Text {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[TEXT]
    }

    fn find_delimiter(
        &self,
        _start: usize,
        _end: usize,
        _ctx: &InlineContext<'_>,
    ) -> Option<Delimiter> {
        None
    }

    fn parse(&self, token: InlineToken, _children: Vec<Node>, ctx: &InlineContext<'_>) -> Node {
        let interval = token.interval;
        let raw: Vec<char> = ctx.points[interval.start_index..interval.end_index]
            .iter()
            .map(|p| p.code_point)
            .collect();
        Node::text(text_value(&raw), ctx.position(interval))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("a \t\n  b", "a\nb")]
    #[case("\\*x\\*", "*x*")]
    #[case("&amp; &copy;", "& ©")]
    #[case("a\\b", "a\\b")]
    fn decodes(#[case] raw: &str, #[case] expected: &str) {
        let chars: Vec<char> = raw.chars().collect();
        assert_eq!(text_value(&chars), expected);
    }
}
