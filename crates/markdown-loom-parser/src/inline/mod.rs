//! # Inline Parsing
//!
//! Turns one run of phrasing content into inline nodes.
//!
//! Inline tokenizers are grouped by priority. Each group scans only the
//! text left uncovered by earlier groups, so code spans and autolinks shield
//! their content from emphasis, and links are settled before the emphasis
//! inside them.
//!
//! ## Modules
//!
//! - **`token`**: `InlineToken` and its payloads
//! - **`delimiter`**: `Delimiter`, what scanners report
//! - **`tokenizer`**: the `InlineTokenizer` trait and pairing results
//! - **`engine`**: group scheduling, the delimiter stack and text filling
//! - **`kinds`**: the built-in inline tokenizers
//!
//! ## Key Invariants
//!
//! - Sibling tokens never overlap and stay in source order
//! - Uncovered ranges always become text, so inline parsing is total
//! - An opener only pairs with a closer of the same delimiter group

pub mod delimiter;
pub mod engine;
pub mod kinds;
pub mod token;
pub mod tokenizer;

pub use delimiter::{Delimiter, DelimiterData, DelimiterKind};
pub use engine::InlineEngine;
pub use token::{InlineToken, InlineTokenData};
pub use tokenizer::{InlineContext, InlineTokenizer, PairOutcome, PairResult};
