//! Capability table derived from the registries.
//!
//! Built the first time a parser runs and reused until a registry changes.

use std::collections::HashMap;

use crate::ast::node_type::NodeType;
use crate::block::{BlockTokenizer, TokenizerId};
use crate::inline::InlineTokenizer;

#[derive(Debug, Default)]
pub struct HookTable {
    /// Block tokenizers offered a fresh line, in priority order.
    pub openers: Vec<TokenizerId>,
    /// Openers allowed to interrupt each leaf type.
    pub interrupters: HashMap<NodeType, Vec<TokenizerId>>,
    /// Tokenizers that may consume each leaf type as a previous sibling.
    pub sibling_interrupters: HashMap<NodeType, Vec<TokenizerId>>,
    pub block_fallback: TokenizerId,
    /// Inline tokenizers grouped by equal priority, highest first.
    pub inline_groups: Vec<Vec<usize>>,
    /// Inline tokenizers sharing each delimiter group, in dispatch order.
    pub inline_pairers: HashMap<&'static str, Vec<usize>>,
    pub inline_fallback: usize,
}

impl HookTable {
    /// `blocks` and `inlines` are in dispatch order with the fallback last;
    /// `inline_priorities` covers every inline entry but the fallback.
    pub fn build(
        blocks: &[&dyn BlockTokenizer],
        inlines: &[&dyn InlineTokenizer],
        inline_priorities: &[i32],
    ) -> Self {
        let mut table = HookTable {
            block_fallback: blocks.len().saturating_sub(1),
            inline_fallback: inlines.len().saturating_sub(1),
            ..Default::default()
        };

        for (id, tokenizer) in blocks.iter().enumerate().take(table.block_fallback) {
            table.openers.push(id);
            for ty in tokenizer.interruptable_types() {
                table.interrupters.entry(*ty).or_default().push(id);
            }
            for ty in tokenizer.sibling_types() {
                table.sibling_interrupters.entry(*ty).or_default().push(id);
            }
        }

        for (id, tokenizer) in inlines.iter().enumerate().take(table.inline_fallback) {
            table
                .inline_pairers
                .entry(tokenizer.delimiter_group())
                .or_default()
                .push(id);
        }

        let mut last_priority = None;
        for (id, priority) in inline_priorities.iter().enumerate() {
            if last_priority != Some(*priority) {
                table.inline_groups.push(Vec::new());
                last_priority = Some(*priority);
            }
            if let Some(group) = table.inline_groups.last_mut() {
                group.push(id);
            }
        }

        log::trace!(
            "built hook table: {} openers, {} interruptable types, {} inline groups",
            table.openers.len(),
            table.interrupters.len(),
            table.inline_groups.len()
        );
        table
    }

    /// Leaves with interrupters try new openers before their own continuation.
    pub fn is_interruptable(&self, ty: NodeType) -> bool {
        self.interrupters.contains_key(ty) || self.sibling_interrupters.contains_key(ty)
    }

    pub fn interrupters(&self, ty: NodeType) -> &[TokenizerId] {
        self.interrupters.get(ty).map_or(&[], Vec::as_slice)
    }

    pub fn sibling_interrupters(&self, ty: NodeType) -> &[TokenizerId] {
        self.sibling_interrupters.get(ty).map_or(&[], Vec::as_slice)
    }

    pub fn inline_pairers(&self, group: &str) -> &[usize] {
        self.inline_pairers.get(group).map(Vec::as_slice).unwrap_or(&[])
    }
}
