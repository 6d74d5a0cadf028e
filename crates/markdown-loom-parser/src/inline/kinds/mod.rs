//! # Built-in Inline Tokenizers
//!
//! CommonMark inlines plus GFM strikethrough, footnote references, extended
//! autolinks and inline math.
//!
//! ## Modules
//!
//! - **`code`**: code spans and `` $`math`$ ``
//! - **`autolink`**: `<scheme:...>`, `<user@host>` and bare `www.`/`http` links
//! - **`html`**: raw inline HTML
//! - **`footnote`**: `[^label]` references
//! - **`link`**: inline links, images and their reference forms
//! - **`emphasis`**: `*`, `_` and `~` runs
//! - **`hard_break`**: backslash and double-space line breaks
//! - **`text`**: the fallback

pub mod autolink;
pub mod code;
pub mod emphasis;
pub mod footnote;
pub mod hard_break;
pub mod html;
pub mod link;
pub mod text;

pub use autolink::{Autolink, AutolinkExtension};
pub use code::{InlineCode, InlineMath};
pub use emphasis::Emphasis;
pub use footnote::FootnoteReference;
pub use hard_break::HardBreak;
pub use html::HtmlInline;
pub use link::Bracket;
pub use text::Text;

use std::ops::ControlFlow;

use super::InlineTokenizer;
use crate::source::{CodePoint, chars::is_ascii_punctuation};

/// Default inline tokenizers with their priorities, in registration order.
///
/// Equal priorities form one group; within a group the earliest match wins.
pub fn gfm_defaults() -> Vec<(Box<dyn InlineTokenizer>, i32)> {
    vec![
        (Box::new(InlineCode), 10),
        (Box::new(InlineMath), 10),
        (Box::new(Autolink), 10),
        (Box::new(HtmlInline), 10),
        (Box::new(FootnoteReference), 5),
        (Box::new(Bracket::link()), 3),
        (Box::new(Bracket::image()), 3),
        (Box::new(Bracket::link_reference()), 3),
        (Box::new(Bracket::image_reference()), 3),
        (Box::new(Emphasis::emphasis()), 2),
        (Box::new(Emphasis::delete()), 2),
        (Box::new(AutolinkExtension), 1),
        (Box::new(HardBreak), 1),
    ]
}

pub fn fallback() -> Box<dyn InlineTokenizer> {
    Box::new(Text)
}

/// Walks `start..end`, stepping over backslash escapes, until `step` breaks.
///
/// `step` returns the next index to look at when it keeps going.
pub(crate) fn scan<T>(
    points: &[CodePoint],
    start: usize,
    end: usize,
    mut step: impl FnMut(usize) -> ControlFlow<T, usize>,
) -> Option<T> {
    let mut i = start;
    while i < end {
        if points[i].code_point == '\\'
            && i + 1 < end
            && is_ascii_punctuation(points[i + 1].code_point)
        {
            i += 2;
            continue;
        }
        match step(i) {
            ControlFlow::Break(found) => return Some(found),
            ControlFlow::Continue(next) => i = next.max(i + 1),
        }
    }
    None
}

/// Length of the run of `c` starting at `i`, not going past `end`.
pub(crate) fn run_length(points: &[CodePoint], i: usize, end: usize, c: char) -> usize {
    points[i..end.min(points.len())]
        .iter()
        .take_while(|p| p.code_point == c)
        .count()
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::ast::Node;
    use crate::error::ParserError;
    use crate::hooks::HookTable;
    use crate::inline::{InlineEngine, InlineTokenizer};
    use crate::meta::{LinkDefinition, MetaRegistry, normalize_label};
    use crate::source::normalize;

    pub fn inline_with(
        input: &str,
        meta: &MetaRegistry,
        keep_references: bool,
        max_depth: usize,
    ) -> Result<Vec<Node>, ParserError> {
        let mut defaults = super::gfm_defaults();
        defaults.sort_by_key(|(_, priority)| std::cmp::Reverse(*priority));
        let priorities: Vec<i32> = defaults.iter().map(|(_, priority)| *priority).collect();
        let owned: Vec<Box<dyn InlineTokenizer>> = defaults
            .into_iter()
            .map(|(tokenizer, _)| tokenizer)
            .chain(std::iter::once(super::fallback()))
            .collect();
        let refs: Vec<&dyn InlineTokenizer> = owned.iter().map(|t| t.as_ref()).collect();
        let hooks = HookTable::build(&[], &refs, &priorities);
        InlineEngine::new(&refs, &hooks, meta, keep_references, max_depth).parse(normalize(input))
    }

    pub fn inline_in(input: &str, meta: &MetaRegistry) -> Vec<Node> {
        inline_with(input, meta, false, 128).unwrap()
    }

    pub fn inline(input: &str) -> Vec<Node> {
        inline_in(input, &MetaRegistry::default())
    }

    /// Registry holding `(label, url)` definitions and footnote labels.
    pub fn meta(definitions: &[(&str, &str)], footnotes: &[&str]) -> MetaRegistry {
        let mut meta = MetaRegistry::default();
        for (label, url) in definitions {
            meta.add_definition(
                normalize_label(label),
                LinkDefinition {
                    label: label.to_string(),
                    url: url.to_string(),
                    title: None,
                },
            );
        }
        for label in footnotes {
            meta.add_footnote(normalize_label(label));
        }
        meta
    }

    pub fn outline(nodes: &[Node]) -> String {
        nodes.iter().map(Node::outline).collect()
    }
}
