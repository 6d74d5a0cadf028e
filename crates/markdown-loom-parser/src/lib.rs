//! # markdown-loom-parser
//!
//! A CommonMark/GFM Markdown parser that produces an mdast-shaped syntax
//! tree. Every construct is recognized by a pluggable tokenizer; the engine
//! only schedules them.
//!
//! ## Architecture Overview
//!
//! ```text
//! &str → normalize → block match → post-match → meta → block parse → Node
//!                    (BlockEngine)  (transform)        │
//!                                                      └→ inline engine per
//!                                                         phrasing run
//! ```
//!
//! ### 1. Source ([`source`] module)
//!
//! The input becomes a `Vec<CodePoint>`, each record carrying its line,
//! visual column and byte offset. Every later index points into it.
//!
//! ### 2. Block phase ([`block`] module)
//!
//! Lines are offered to open containers, then to openers in priority order,
//! then to the open leaf. The resulting token tree is rewritten sibling list
//! by sibling list (list grouping, definition extraction) before link and
//! footnote definitions are collected into a [`meta::MetaRegistry`].
//!
//! ### 3. Inline phase ([`inline`] module)
//!
//! Phrasing content is scanned group by group in priority order, with a
//! delimiter stack pairing openers and closers. Whatever nothing claims
//! becomes text.
//!
//! ## Usage
//!
//! ```
//! use markdown_loom_parser::{NodeKind, parse};
//!
//! let root = parse("# Title\n").unwrap();
//! assert_eq!(root.children[0].kind, NodeKind::Heading { depth: 1 });
//! ```
//!
//! Custom tokenizers are registered on a [`Parser`] with
//! [`Parser::use_tokenizer`]; a registration error never depends on input.

pub mod ast;
pub mod block;
pub mod error;
pub mod hooks;
pub mod inline;
pub mod meta;
pub mod parser;
pub mod registry;
pub mod source;
pub(crate) mod syntax;

pub use ast::{AlignType, Node, NodeKind, Point, Position, ReferenceType};
pub use error::ParserError;
pub use parser::{Parser, ParserOptions, Phase, Tokenizer, parse};
