//! # Block Parsing
//!
//! Line-oriented matching of block structure, followed by sibling-list
//! rewriting and conversion to nodes.
//!
//! ## Parsing Phases
//!
//! 1. **Match** (`engine`): every line is offered to the open containers,
//!    then to openers, then to the open leaf, then to the fallback
//! 2. **Post-match** (`transform`): sibling lists are rewritten bottom-up
//!    (list grouping, definition extraction)
//! 3. **Parse** (`parse`): meta hooks collect definitions, then tokens become
//!    nodes bottom-up and phrasing content goes to the inline engine
//!
//! ## Modules
//!
//! - **`line`**: `Line`, `LineCursor` and `ContentLine`
//! - **`token`**: `BlockToken` and its per-tokenizer payloads
//! - **`tokenizer`**: the `BlockTokenizer` trait and its result types
//! - **`engine`**: `BlockEngine` open-path state machine
//! - **`transform`**: post-match hook driver
//! - **`phrasing`**: merging leaf lines into inline input
//! - **`parse`**: meta collection and node building
//! - **`kinds`**: the built-in block tokenizers
//!
//! ## Key Invariants
//!
//! - Closing a container closes all of its descendants first
//! - A child's interval lies within its parent's interval
//! - Raw leaves (code, html, math) see a line before openers do;
//!   interruptable leaves (paragraph, table) see it after

pub mod engine;
pub mod kinds;
pub mod line;
pub mod parse;
pub mod phrasing;
pub mod token;
pub mod tokenizer;
pub mod transform;

pub use engine::BlockEngine;
pub use line::{ContentLine, Line, LineCursor};
pub use parse::BlockParseContext;
pub use token::{BlockToken, BlockTokenData, TokenizerId};
pub use tokenizer::{
    BlockTokenizer, ContinuationResult, InterruptResult, MatchContext, OpenerResult,
    TransformContext, Transformed,
};
