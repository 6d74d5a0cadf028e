//! Priority-grouped delimiter processing.
//!
//! Each group walks the run once, left to right. Uncovered gaps are offered
//! to the group's tokenizers; the earliest delimiter wins, ties going to the
//! tokenizer registered first. Openers wait on a stack that closers search
//! from the top down.

use std::collections::HashMap;
use std::mem;

use super::{
    delimiter::{Delimiter, DelimiterKind},
    token::{InlineToken, InlineTokenData},
    tokenizer::{InlineContext, InlineTokenizer, PairResult},
};
use crate::ast::{
    Node,
    node_type::{LINK, LINK_REFERENCE, TEXT},
};
use crate::error::ParserError;
use crate::hooks::HookTable;
use crate::meta::MetaRegistry;
use crate::source::{CodePoint, NodeInterval};

enum Item {
    Delimiter { hook: usize, delimiter: Delimiter },
    Token(InlineToken),
}

impl Item {
    fn into_token(self) -> Option<InlineToken> {
        match self {
            Item::Token(token) => Some(token),
            Item::Delimiter { .. } => None,
        }
    }
}

/// Pending delimiters and finished tokens of one nesting level.
///
/// `bottoms` holds, per delimiter group and closer class, the stack length
/// below which no opener pairs with such a closer. `deactivated` holds, per
/// pairing tokenizer, the length up to which older openers were already
/// offered to [`InlineTokenizer::should_deactivate`].
#[derive(Default)]
struct Stack {
    items: Vec<Item>,
    bottoms: HashMap<(&'static str, u64), usize>,
    deactivated: HashMap<usize, usize>,
}

impl Stack {
    fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    /// Removes and returns everything from `index` up.
    fn split_off(&mut self, index: usize) -> Vec<Item> {
        for bound in self.bottoms.values_mut().chain(self.deactivated.values_mut()) {
            *bound = (*bound).min(index);
        }
        self.items.split_off(index)
    }

    fn remove(&mut self, index: usize) {
        self.items.remove(index);
        for bound in self.bottoms.values_mut().chain(self.deactivated.values_mut()) {
            if *bound > index {
                *bound -= 1;
            }
        }
    }

    fn into_tokens(self) -> Vec<InlineToken> {
        self.items.into_iter().filter_map(Item::into_token).collect()
    }
}

/// Per-tokenizer scan result cached while walking one gap.
enum Slot {
    Stale,
    Found(Delimiter),
    Exhausted,
}

impl Slot {
    fn start(&self) -> Option<usize> {
        match self {
            Slot::Found(delimiter) => Some(delimiter.interval.start_index),
            _ => None,
        }
    }
}

enum Lookup {
    Paired { index: usize, pairing: usize },
    Rejected(usize),
    Missing,
}

pub struct InlineEngine<'a> {
    /// Dispatch order, fallback last.
    tokenizers: &'a [&'a dyn InlineTokenizer],
    hooks: &'a HookTable,
    meta: &'a MetaRegistry,
    keep_references: bool,
    max_depth: usize,
}

impl<'a> InlineEngine<'a> {
    pub fn new(
        tokenizers: &'a [&'a dyn InlineTokenizer],
        hooks: &'a HookTable,
        meta: &'a MetaRegistry,
        keep_references: bool,
        max_depth: usize,
    ) -> Self {
        Self {
            tokenizers,
            hooks,
            meta,
            keep_references,
            max_depth,
        }
    }

    /// Parses one phrasing run into inline nodes.
    pub fn parse(&self, points: Vec<CodePoint>) -> Result<Vec<Node>, ParserError> {
        let whole = NodeInterval::new(0, points.len());
        let mut tokens = Vec::new();
        for group in &self.hooks.inline_groups {
            tokens = self.scan(&points, whole, tokens, group, false, 0)?;
        }
        let tokens = self.fill_text(whole, tokens);
        let ctx = self.context(&points, false);
        Ok(self.build(tokens, &ctx))
    }

    fn context<'p>(&self, points: &'p [CodePoint], in_link: bool) -> InlineContext<'p>
    where
        'a: 'p,
    {
        InlineContext {
            points,
            meta: self.meta,
            in_link,
            keep_references: self.keep_references,
        }
    }

    /// Runs one group over `range`, threading it through the tokens earlier
    /// groups left there.
    fn scan(
        &self,
        points: &[CodePoint],
        range: NodeInterval,
        existing: Vec<InlineToken>,
        group: &[usize],
        in_link: bool,
        depth: usize,
    ) -> Result<Vec<InlineToken>, ParserError> {
        if depth > self.max_depth {
            let line = points.get(range.start_index).map_or(1, |p| p.line);
            log::warn!("inline nesting exceeded {} levels at line {line}", self.max_depth);
            return Err(ParserError::NestingTooDeep {
                limit: self.max_depth,
                line,
            });
        }

        let ctx = self.context(points, in_link);
        let mut stack = Stack {
            items: Vec::with_capacity(existing.len()),
            ..Default::default()
        };
        let mut pos = range.start_index;
        for mut token in existing {
            if let Some(content) = token.content {
                let nested = in_link || matches!(token.node_type, LINK | LINK_REFERENCE);
                let children = mem::take(&mut token.children);
                token.children = self.scan(points, content, children, group, nested, depth + 1)?;
            }
            self.scan_gap(pos, token.interval.start_index, group, &ctx, &mut stack);
            pos = token.interval.end_index;
            stack.push(Item::Token(token));
        }
        self.scan_gap(pos, range.end_index, group, &ctx, &mut stack);

        Ok(stack.into_tokens())
    }

    fn scan_gap(
        &self,
        start: usize,
        end: usize,
        group: &[usize],
        ctx: &InlineContext<'_>,
        stack: &mut Stack,
    ) {
        let mut cache: Vec<Slot> = group.iter().map(|_| Slot::Stale).collect();
        let mut pos = start;
        while pos < end {
            for (slot, &hook) in cache.iter_mut().zip(group) {
                if matches!(slot, Slot::Stale) {
                    *slot = match self.tokenizers[hook].find_delimiter(pos, end, ctx) {
                        Some(d)
                            if !d.interval.is_empty()
                                && d.interval.start_index >= pos
                                && d.interval.end_index <= end =>
                        {
                            Slot::Found(d)
                        }
                        _ => Slot::Exhausted,
                    };
                }
            }

            let mut best: Option<(usize, usize)> = None;
            for (k, slot) in cache.iter().enumerate() {
                if let Some(s) = slot.start() {
                    if best.is_none_or(|(_, b)| s < b) {
                        best = Some((k, s));
                    }
                }
            }
            let Some((k, _)) = best else {
                break;
            };
            let Slot::Found(delimiter) = mem::replace(&mut cache[k], Slot::Stale) else {
                break;
            };

            let (first, consumed) = (delimiter.interval.start_index, delimiter.interval.end_index);
            pos = consumed;
            for slot in &mut cache {
                if slot.start().is_some_and(|s| s < pos) {
                    *slot = Slot::Stale;
                }
            }
            // An unpaired closer may give back its tail; every slot that
            // started inside it is stale already, so scanning just resumes.
            if let Some(resume) = self.resolve(group[k], delimiter, ctx, stack) {
                pos = resume.clamp(first + 1, consumed);
            }
        }
    }

    /// Returns where scanning resumes when the delimiter was a closer that
    /// paired with nothing.
    fn resolve(
        &self,
        hook: usize,
        delimiter: Delimiter,
        ctx: &InlineContext<'_>,
        stack: &mut Stack,
    ) -> Option<usize> {
        match delimiter.kind {
            DelimiterKind::Full => {
                let tokenizer = self.tokenizers[hook];
                if let Some(mut token) = tokenizer.process_single_delimiter(delimiter, ctx) {
                    token.tokenizer = hook;
                    stack.push(Item::Token(token));
                }
                None
            }
            DelimiterKind::Opener => {
                stack.push(Item::Delimiter { hook, delimiter });
                None
            }
            DelimiterKind::Closer | DelimiterKind::Both => self.close(hook, delimiter, ctx, stack),
        }
    }

    fn close(
        &self,
        hook: usize,
        mut closer: Delimiter,
        ctx: &InlineContext<'_>,
        stack: &mut Stack,
    ) -> Option<usize> {
        let tokenizer = self.tokenizers[hook];
        let group = tokenizer.delimiter_group();
        loop {
            let bottom_key = tokenizer.closer_class(&closer).map(|class| (group, class));
            let bottom = bottom_key
                .and_then(|key| stack.bottoms.get(&key).copied())
                .unwrap_or(0);
            match self.find_opener(group, &closer, ctx, &stack.items[bottom..]) {
                Lookup::Paired { index, pairing } => {
                    let mut tail = stack.split_off(bottom + index);
                    let Item::Delimiter {
                        hook: opener_hook,
                        delimiter: opener,
                    } = tail.remove(0)
                    else {
                        return None;
                    };
                    let inner: Vec<InlineToken> =
                        tail.into_iter().filter_map(Item::into_token).collect();

                    let pairer = self.tokenizers[pairing];
                    let outcome = pairer.process_delimiter_pair(opener, closer, inner, ctx);
                    if let Some(rest) = outcome.remaining_opener {
                        stack.push(Item::Delimiter {
                            hook: opener_hook,
                            delimiter: rest,
                        });
                    }
                    stack.items.extend(outcome.loose.into_iter().map(Item::Token));
                    if let Some(mut token) = outcome.token {
                        token.tokenizer = pairing;
                        stack.push(Item::Token(token));
                    }
                    if outcome.deactivate_older {
                        self.deactivate(pairing, stack);
                    }
                    match outcome.remaining_closer {
                        Some(rest) => closer = rest,
                        None => return None,
                    }
                }
                Lookup::Rejected(index) => {
                    stack.remove(bottom + index);
                    return Some(tokenizer.unpaired_closer_end(&closer));
                }
                Lookup::Missing => {
                    if let Some(key) = bottom_key {
                        stack.bottoms.insert(key, stack.len());
                    }
                    if closer.kind == DelimiterKind::Both {
                        stack.push(Item::Delimiter {
                            hook,
                            delimiter: closer,
                        });
                        return None;
                    }
                    return Some(tokenizer.unpaired_closer_end(&closer));
                }
            }
        }
    }

    /// Offers openers not yet seen by `pairing` to its `should_deactivate`.
    fn deactivate(&self, pairing: usize, stack: &mut Stack) {
        let pairer = self.tokenizers[pairing];
        let from = stack.deactivated.get(&pairing).copied().unwrap_or(0);
        for item in &mut stack.items[from..] {
            if let Item::Delimiter { delimiter, .. } = item {
                if pairer.should_deactivate(delimiter) {
                    delimiter.active = false;
                }
            }
        }
        stack.deactivated.insert(pairing, stack.items.len());
    }

    /// Nearest opener of `group` some tokenizer in the group will pair,
    /// indexed into `items`.
    fn find_opener(
        &self,
        group: &str,
        closer: &Delimiter,
        ctx: &InlineContext<'_>,
        items: &[Item],
    ) -> Lookup {
        let candidates = self.hooks.inline_pairers(group);
        for (index, item) in items.iter().enumerate().rev() {
            let Item::Delimiter { hook, delimiter } = item else {
                continue;
            };
            if !delimiter.can_open() || self.tokenizers[*hook].delimiter_group() != group {
                continue;
            }
            for &candidate in candidates {
                match self.tokenizers[candidate].is_delimiter_pair(delimiter, closer, ctx) {
                    PairResult::Paired => {
                        return Lookup::Paired {
                            index,
                            pairing: candidate,
                        };
                    }
                    PairResult::Reject => return Lookup::Rejected(index),
                    PairResult::Skip => {}
                }
            }
        }
        Lookup::Missing
    }

    /// Covers every gap between tokens with a text token.
    fn fill_text(&self, range: NodeInterval, tokens: Vec<InlineToken>) -> Vec<InlineToken> {
        let mut out = Vec::with_capacity(tokens.len() * 2 + 1);
        let mut pos = range.start_index;
        for mut token in tokens {
            if let Some(content) = token.content {
                let children = mem::take(&mut token.children);
                token.children = self.fill_text(content, children);
            }
            if token.interval.start_index > pos {
                out.push(self.text_token(NodeInterval::new(pos, token.interval.start_index)));
            }
            pos = token.interval.end_index;
            out.push(token);
        }
        if range.end_index > pos {
            out.push(self.text_token(NodeInterval::new(pos, range.end_index)));
        }
        out
    }

    fn text_token(&self, interval: NodeInterval) -> InlineToken {
        let fallback = self.hooks.inline_fallback;
        let node_type = self.tokenizers[fallback].node_types().first().copied().unwrap_or(TEXT);
        let mut token = InlineToken::atomic(node_type, interval, InlineTokenData::None);
        token.tokenizer = fallback;
        token
    }

    fn build(&self, tokens: Vec<InlineToken>, ctx: &InlineContext<'_>) -> Vec<Node> {
        tokens
            .into_iter()
            .map(|mut token| {
                let children = self.build(mem::take(&mut token.children), ctx);
                self.tokenizers[token.tokenizer].parse(token, children, ctx)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::kinds::test_support::{inline, inline_with, outline};
    use super::super::delimiter::DelimiterData;
    use super::*;
    use crate::ast::NodeKind;
    use crate::meta::MetaRegistry;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_text_is_one_node() {
        let nodes = inline("just words");
        assert_eq!(nodes.len(), 1);
        assert_eq!(
            nodes[0].kind,
            NodeKind::Text {
                value: "just words".to_string()
            }
        );
    }

    #[test]
    fn empty_run_has_no_nodes() {
        assert!(inline("").is_empty());
    }

    #[test]
    fn code_span_shields_emphasis() {
        assert_eq!(
            outline(&inline("`*a*` *b*")),
            "inlineCode \"*a*\"\ntext \" \"\nemphasis\n  text \"b\"\n"
        );
    }

    #[test]
    fn emphasis_nests_inside_link_text() {
        assert_eq!(
            outline(&inline("[*a*](/u)")),
            "link url=\"/u\"\n  emphasis\n    text \"a\"\n"
        );
    }

    #[test]
    fn positions_are_relative_to_source() {
        let nodes = inline("ab *c*");
        let Some(position) = nodes[1].position else {
            panic!("expected a position");
        };
        assert_eq!((position.start.column, position.end.column), (4, 7));
    }

    #[test]
    fn nesting_limit_is_reported() {
        let err = inline_with("******x******", &MetaRegistry::default(), false, 2).unwrap_err();
        assert!(matches!(err, crate::error::ParserError::NestingTooDeep { limit: 2, .. }));
    }

    fn opener(at: usize) -> Item {
        Item::Delimiter {
            hook: 0,
            delimiter: Delimiter::new(
                DelimiterKind::Opener,
                NodeInterval::new(at, at + 1),
                DelimiterData::Bracket { image: false },
            ),
        }
    }

    #[test]
    fn stack_bounds_follow_removals() {
        let mut stack = Stack::default();
        for at in 0..5 {
            stack.push(opener(at));
        }
        stack.bottoms.insert(("bracket", 0), 4);
        stack.deactivated.insert(7, 2);

        stack.remove(1);
        assert_eq!(stack.bottoms[&("bracket", 0)], 3);
        assert_eq!(stack.deactivated[&7], 1);

        let tail = stack.split_off(2);
        assert_eq!((tail.len(), stack.len()), (2, 2));
        assert_eq!(stack.bottoms[&("bracket", 0)], 2);
        assert_eq!(stack.deactivated[&7], 1);
    }

    #[test]
    fn failed_searches_are_not_repeated() {
        let input = format!("{}{}", "*a ".repeat(200), "a_ ".repeat(200));
        let nodes = inline(&input);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].plain_text(), input);
    }
}
