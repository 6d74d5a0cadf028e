//! Line-by-line block matching over an arena of open blocks.
//!
//! The open path runs from the root to the deepest open block. Each line is
//! offered to the open containers (continuation), then to openers for new
//! blocks, then to the open leaf, and finally to the fallback paragraph.

use super::{
    line::{Line, LineCursor},
    token::{BlockToken, BlockTokenData},
    tokenizer::{BlockTokenizer, ContinuationResult, MatchContext},
};
use crate::ast::node_type::{NodeType, ROOT};
use crate::error::ParserError;
use crate::hooks::HookTable;
use crate::source::{CodePoint, NodeInterval};

struct Slot {
    token: BlockToken,
    parent: Option<usize>,
}

/// The open leaf at the tip of the path while a line is matched.
#[derive(Debug, Clone, Copy)]
struct OpenLeaf {
    id: usize,
    node_type: NodeType,
    interruptable: bool,
    /// All of its containers matched this line.
    matched: bool,
}

pub struct BlockEngine<'a> {
    tokenizers: &'a [&'a dyn BlockTokenizer],
    hooks: &'a HookTable,
    max_depth: usize,
}

struct MatchState<'p> {
    points: &'p [CodePoint],
    arena: Vec<Option<Slot>>,
    free: Vec<usize>,
    /// Arena indices from the root to the tip.
    path: Vec<usize>,
}

impl MatchState<'_> {
    fn token(&self, id: usize) -> &BlockToken {
        match &self.arena[id] {
            Some(slot) => &slot.token,
            None => unreachable!("open path refers to a freed slot"),
        }
    }

    fn token_mut(&mut self, id: usize) -> &mut BlockToken {
        match &mut self.arena[id] {
            Some(slot) => &mut slot.token,
            None => unreachable!("open path refers to a freed slot"),
        }
    }

    fn tip(&self) -> usize {
        self.path[self.path.len() - 1]
    }

    fn alloc(&mut self, slot: Slot) -> usize {
        match self.free.pop() {
            Some(id) => {
                self.arena[id] = Some(slot);
                id
            }
            None => {
                self.arena.push(Some(slot));
                self.arena.len() - 1
            }
        }
    }

    fn extend(&mut self, id: usize, end: usize) {
        let token = self.token_mut(id);
        token.interval.end_index = token.interval.end_index.max(end);
    }
}

impl<'a> BlockEngine<'a> {
    pub fn new(
        tokenizers: &'a [&'a dyn BlockTokenizer],
        hooks: &'a HookTable,
        max_depth: usize,
    ) -> Self {
        Self {
            tokenizers,
            hooks,
            max_depth,
        }
    }

    /// Runs the match phase over the whole document, returning the root token.
    ///
    /// Each line's matching returns the cursor where leaf content began, which
    /// decides whether the line counts as blank.
    pub fn run(&self, points: &[CodePoint]) -> Result<BlockToken, ParserError> {
        let root = BlockToken::new(
            ROOT,
            NodeInterval::new(0, points.len()),
            BlockTokenData::Root,
        );
        let mut st = MatchState {
            points,
            arena: vec![Some(Slot {
                token: root,
                parent: None,
            })],
            free: Vec::new(),
            path: vec![0],
        };

        let lines = Line::split(points);
        for line in &lines {
            let cur = self.match_line(&mut st, line)?;
            self.finish_line(&mut st, line, cur);
        }
        while st.path.len() > 1 {
            self.close_tip(&mut st);
        }
        log::trace!("block match finished: {} lines", lines.len());

        match st.arena.swap_remove(0) {
            Some(slot) => Ok(slot.token),
            None => unreachable!("root slot is never freed"),
        }
    }

    fn tokenizer(&self, st: &MatchState<'_>, id: usize) -> &'a dyn BlockTokenizer {
        self.tokenizers[st.token(id).tokenizer]
    }

    fn is_leaf(&self, st: &MatchState<'_>, id: usize) -> bool {
        id != 0 && !self.tokenizer(st, id).is_container()
    }

    fn match_line(
        &self,
        st: &mut MatchState<'_>,
        line: &Line<'_>,
    ) -> Result<LineCursor, ParserError> {
        let mut cur = line.start_cursor();

        // Continuation of open containers, root excluded.
        let mut matched = 1;
        while matched < st.path.len() {
            let id = st.path[matched];
            if self.is_leaf(st, id) {
                break;
            }
            let tokenizer = self.tokenizer(st, id);
            let ctx = MatchContext {
                parent_type: st.token(st.path[matched - 1]).node_type,
                open_leaf: None,
                interrupting: false,
                has_children: !st.token(id).children.is_empty() || matched + 1 < st.path.len(),
            };
            match tokenizer.eat_continuation(line, cur, st.token_mut(id), &ctx) {
                ContinuationResult::Opening { next } => {
                    cur = next;
                    st.extend(id, next.index);
                    matched += 1;
                }
                _ => break,
            }
        }

        let tip = st.tip();
        let mut leaf = None;
        if self.is_leaf(st, tip) {
            let node_type = st.token(tip).node_type;
            let interruptable = self.hooks.is_interruptable(node_type);
            let containers_matched = matched == st.path.len() - 1;
            if containers_matched && !interruptable {
                // Raw leaves see the line before any opener does.
                let tokenizer = self.tokenizer(st, tip);
                let ctx = self.context(st, matched - 1, None, false);
                match tokenizer.eat_continuation(line, cur, st.token_mut(tip), &ctx) {
                    ContinuationResult::Consumed | ContinuationResult::Opening { .. } => {
                        return Ok(cur);
                    }
                    ContinuationResult::Closing => {
                        self.close_tip(st);
                        return Ok(cur);
                    }
                    ContinuationResult::NotMatched => self.close_tip(st),
                }
            } else {
                leaf = Some(OpenLeaf {
                    id: tip,
                    node_type,
                    interruptable,
                    matched: containers_matched,
                });
            }
        }

        // New blocks.
        let mut depth = matched - 1;
        let mut opened_any = false;
        loop {
            if line.is_blank_from(cur) {
                break;
            }
            let interruptable_leaf = leaf.filter(|l| l.interruptable && !opened_any);
            let interrupting = interruptable_leaf.is_some_and(|l| l.matched);
            let ctx = self.context(
                st,
                depth,
                interruptable_leaf.map(|l| l.node_type),
                interrupting,
            );

            if let Some(l) = interruptable_leaf.filter(|_| interrupting) {
                for &sid in self.hooks.sibling_interrupters(l.node_type) {
                    let Some(res) = self.tokenizers[sid].eat_and_interrupt_previous_sibling(
                        line,
                        cur,
                        st.token(l.id),
                        &ctx,
                    ) else {
                        continue;
                    };
                    log::trace!(
                        "line {}: {} consumed previous {}",
                        line.number,
                        self.tokenizers[sid].name(),
                        l.node_type
                    );
                    self.discard_tip(st);
                    if let Some(remaining) = res.remaining_sibling {
                        self.push(st, depth, remaining, line)?;
                        self.close_tip(st);
                    }
                    let mut token = res.token;
                    token.tokenizer = sid;
                    self.push(st, depth, token, line)?;
                    if res.saturated {
                        self.close_tip(st);
                    }
                    return Ok(cur);
                }
            }

            let candidates = match interruptable_leaf {
                Some(l) if interrupting => self.hooks.interrupters(l.node_type),
                _ => self.hooks.openers.as_slice(),
            };
            let found = candidates.iter().find_map(|&tid| {
                self.tokenizers[tid]
                    .eat_opener(line, cur, &ctx)
                    .map(|res| (tid, res))
            });
            let Some((tid, res)) = found else {
                break;
            };

            self.close_to(st, depth + 1);
            leaf = None;
            opened_any = true;

            let mut token = res.token;
            token.tokenizer = tid;
            log::trace!("line {}: open {}", line.number, token.node_type);
            self.push(st, depth, token, line)?;
            if res.saturated {
                self.close_tip(st);
                return Ok(cur);
            }
            if self.tokenizers[tid].is_container() {
                cur = res.next;
                depth = st.path.len() - 1;
                continue;
            }
            // the returned cursor marks where leaf content began
            return Ok(cur);
        }

        if !opened_any {
            if let Some(l) = leaf {
                let tokenizer = self.tokenizer(st, l.id);
                if l.matched {
                    let ctx = self.context(st, depth, None, false);
                    match tokenizer.eat_continuation(line, cur, st.token_mut(l.id), &ctx) {
                        ContinuationResult::Consumed | ContinuationResult::Opening { .. } => {
                            return Ok(cur);
                        }
                        ContinuationResult::Closing => {
                            self.close_tip(st);
                            return Ok(cur);
                        }
                        ContinuationResult::NotMatched => self.close_tip(st),
                    }
                } else if l.interruptable
                    && !line.is_blank_from(cur)
                    && tokenizer.eat_lazy_continuation(line, cur, st.token_mut(l.id))
                {
                    log::trace!("line {}: lazy continuation", line.number);
                    return Ok(cur);
                }
            }
            self.close_to(st, depth + 1);
        }

        if line.is_blank_from(cur) {
            return Ok(cur);
        }

        let fallback = self.hooks.block_fallback;
        let ctx = self.context(st, st.path.len() - 1, None, false);
        if let Some(res) = self.tokenizers[fallback].eat_opener(line, cur, &ctx) {
            let mut token = res.token;
            token.tokenizer = fallback;
            self.push(st, st.path.len() - 1, token, line)?;
            if res.saturated {
                self.close_tip(st);
            }
        }
        Ok(cur)
    }

    fn context(
        &self,
        st: &MatchState<'_>,
        depth: usize,
        open_leaf: Option<NodeType>,
        interrupting: bool,
    ) -> MatchContext {
        MatchContext {
            parent_type: st.token(st.path[depth]).node_type,
            open_leaf,
            interrupting,
            has_children: false,
        }
    }

    /// Records blank-line state on every open block.
    fn finish_line(&self, st: &mut MatchState<'_>, line: &Line<'_>, cur: LineCursor) {
        let blank = line.is_blank_from(cur);
        let tip = st.tip();
        if blank {
            // the block just closed by this blank line ends with it
            if let Some(last) = st.token_mut(tip).children.last_mut() {
                last.last_line_blank = true;
            }
        }
        let keeps = tip != 0 && self.tokenizer(st, tip).keeps_blank_line(st.token(tip), line);
        let flag = blank && !keeps;
        for i in 0..st.path.len() {
            let id = st.path[i];
            st.token_mut(id).last_line_blank = flag;
        }
    }

    /// Opens `token` as a child of `path[depth]`; the path must already be
    /// trimmed to `depth + 1` entries.
    fn push(
        &self,
        st: &mut MatchState<'_>,
        depth: usize,
        token: BlockToken,
        line: &Line<'_>,
    ) -> Result<(), ParserError> {
        debug_assert_eq!(st.path.len(), depth + 1, "path not trimmed before push");
        if st.path.len() > self.max_depth {
            log::warn!(
                "block nesting exceeded {} levels at line {}",
                self.max_depth,
                line.number
            );
            return Err(ParserError::NestingTooDeep {
                limit: self.max_depth,
                line: line.number,
            });
        }
        let parent = st.path[depth];
        let id = st.alloc(Slot {
            token,
            parent: Some(parent),
        });
        st.path.push(id);
        Ok(())
    }

    /// Closes open blocks until the path has `len` entries.
    fn close_to(&self, st: &mut MatchState<'_>, len: usize) {
        while st.path.len() > len.max(1) {
            self.close_tip(st);
        }
    }

    /// Closes the tip and moves it into its parent.
    fn close_tip(&self, st: &mut MatchState<'_>) {
        let Some(slot) = self.take_tip(st) else {
            return;
        };
        let mut token = slot.token;
        self.tokenizers[token.tokenizer].on_close(&mut token, st.points);
        if let Some(parent) = slot.parent {
            let parent = st.token_mut(parent);
            parent.interval.end_index = parent.interval.end_index.max(token.interval.end_index);
            parent.children.push(token);
        }
    }

    /// Drops the tip without closing it.
    fn discard_tip(&self, st: &mut MatchState<'_>) {
        self.take_tip(st);
    }

    fn take_tip(&self, st: &mut MatchState<'_>) -> Option<Slot> {
        if st.path.len() <= 1 {
            return None;
        }
        let id = st.path.pop()?;
        st.free.push(id);
        st.arena[id].take()
    }
}
