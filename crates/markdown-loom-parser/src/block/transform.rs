//! Post-match rewriting of sibling lists.

use super::{
    token::BlockToken,
    tokenizer::{BlockTokenizer, TransformContext, Transformed},
};
use crate::source::CodePoint;

/// Runs every transform hook over every sibling list, children before parents.
///
/// Returns how many sibling lists were rewritten.
pub fn transform_tree(
    tokenizers: &[&dyn BlockTokenizer],
    root: &mut BlockToken,
    points: &[CodePoint],
) -> usize {
    let mut replaced = 0;
    for child in &mut root.children {
        replaced += transform_tree(tokenizers, child, points);
    }

    let mut siblings = std::mem::take(&mut root.children);
    for (id, tokenizer) in tokenizers.iter().enumerate() {
        let ctx = TransformContext { points, id };
        siblings = match tokenizer.transform_match(siblings, &ctx) {
            Transformed::Unchanged(tokens) => tokens,
            Transformed::Replaced(tokens) => {
                log::trace!("{} rewrote children of {}", tokenizer.name(), root.node_type);
                replaced += 1;
                tokens
            }
        };
    }
    root.children = siblings;
    replaced
}
