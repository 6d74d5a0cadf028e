//! The public entry point: a tokenizer registry plus the parse pipeline.

use std::iter;
use std::path::Path;
use std::sync::OnceLock;

use markdown_loom_config::LoomConfig;

use crate::ast::{Node, NodeKind};
use crate::block::{
    self, BlockEngine, BlockParseContext, BlockTokenizer,
    parse::{collect_meta, parse_children},
    transform::transform_tree,
};
use crate::error::ParserError;
use crate::hooks::HookTable;
use crate::inline::{self, InlineEngine, InlineTokenizer};
use crate::meta::MetaRegistry;
use crate::registry::Registry;
use crate::source::{NodeInterval, calc_position, normalize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Keep `position` on every node.
    pub should_reserve_position: bool,
    pub max_nesting_depth: usize,
    /// Emit `linkReference`/`imageReference` instead of resolving them.
    pub keep_references: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            should_reserve_position: true,
            max_nesting_depth: 128,
            keep_references: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Block,
    Inline,
}

/// A tokenizer of either phase, as handed to the registration API.
pub enum Tokenizer {
    Block(Box<dyn BlockTokenizer>),
    Inline(Box<dyn InlineTokenizer>),
}

impl Tokenizer {
    pub fn name(&self) -> &'static str {
        match self {
            Tokenizer::Block(t) => t.name(),
            Tokenizer::Inline(t) => t.name(),
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            Tokenizer::Block(_) => Phase::Block,
            Tokenizer::Inline(_) => Phase::Inline,
        }
    }
}

/// A configured markdown parser.
///
/// Registration takes `&mut self`; parsing takes `&self` and may run from
/// several threads at once.
pub struct Parser {
    options: ParserOptions,
    block: Registry<dyn BlockTokenizer>,
    inline: Registry<dyn InlineTokenizer>,
    block_fallback: Option<Box<dyn BlockTokenizer>>,
    inline_fallback: Option<Box<dyn InlineTokenizer>>,
    /// Derived from the registries on first use; cleared on every change.
    hooks: OnceLock<HookTable>,
}

impl Parser {
    /// A parser with no tokenizers at all.
    pub fn new(options: ParserOptions) -> Self {
        Self {
            options,
            block: Registry::default(),
            inline: Registry::default(),
            block_fallback: None,
            inline_fallback: None,
            hooks: OnceLock::new(),
        }
    }

    /// CommonMark plus the GFM extensions, with default options.
    pub fn gfm() -> Self {
        Self::gfm_with(ParserOptions::default())
    }

    pub fn gfm_with(options: ParserOptions) -> Self {
        let mut parser = Self::new(options);
        for (tokenizer, priority) in block::kinds::gfm_defaults() {
            let name = tokenizer.name();
            if let Err(err) = parser.block.register(name, tokenizer, priority) {
                log::warn!("skipping default block tokenizer {name}: {err}");
            }
        }
        for (tokenizer, priority) in inline::kinds::gfm_defaults() {
            let name = tokenizer.name();
            if let Err(err) = parser.inline.register(name, tokenizer, priority) {
                log::warn!("skipping default inline tokenizer {name}: {err}");
            }
        }
        parser.block_fallback = Some(block::kinds::fallback());
        parser.inline_fallback = Some(inline::kinds::fallback());
        parser
    }

    /// A GFM parser shaped by the `[parser]` settings of a config file.
    pub fn from_config(config: &LoomConfig) -> Result<Self, ParserError> {
        let settings = &config.parser;
        let mut parser = Self::gfm_with(ParserOptions {
            should_reserve_position: settings.reserve_position,
            max_nesting_depth: settings.max_nesting_depth,
            keep_references: settings.keep_references,
        });
        for name in &settings.disabled_tokenizers {
            parser.unregister_tokenizer(name)?;
        }
        Ok(parser)
    }

    /// Loads `path` and builds a parser from it; a missing file means defaults.
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> Result<Self, ParserError> {
        let config = LoomConfig::load_from_path(path)?.unwrap_or_default();
        Self::from_config(&config)
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn should_reserve_position(&mut self, reserve: bool) -> &mut Self {
        self.options.should_reserve_position = reserve;
        self
    }

    pub fn use_tokenizer(
        &mut self,
        tokenizer: Tokenizer,
        priority: i32,
    ) -> Result<&mut Self, ParserError> {
        let name = tokenizer.name();
        if self.is_taken(name) {
            return Err(ParserError::DuplicateTokenizer(name.to_string()));
        }
        match tokenizer {
            Tokenizer::Block(t) => self.block.register(name, t, priority)?,
            Tokenizer::Inline(t) => self.inline.register(name, t, priority)?,
        }
        log::trace!("registered tokenizer {name} at priority {priority}");
        self.invalidate();
        Ok(self)
    }

    /// Installs the block tokenizer that takes every line nothing else
    /// opened, replacing the current one.
    pub fn use_block_fallback_tokenizer(
        &mut self,
        tokenizer: Box<dyn BlockTokenizer>,
    ) -> Result<&mut Self, ParserError> {
        let name = tokenizer.name();
        if self.is_taken(name) && !self.is_fallback(Phase::Block, name) {
            return Err(ParserError::DuplicateTokenizer(name.to_string()));
        }
        self.block_fallback = Some(tokenizer);
        log::trace!("installed block fallback {name}");
        self.invalidate();
        Ok(self)
    }

    /// Installs the inline tokenizer that covers every uncovered gap,
    /// replacing the current one.
    pub fn use_inline_fallback_tokenizer(
        &mut self,
        tokenizer: Box<dyn InlineTokenizer>,
    ) -> Result<&mut Self, ParserError> {
        let name = tokenizer.name();
        if self.is_taken(name) && !self.is_fallback(Phase::Inline, name) {
            return Err(ParserError::DuplicateTokenizer(name.to_string()));
        }
        self.inline_fallback = Some(tokenizer);
        log::trace!("installed inline fallback {name}");
        self.invalidate();
        Ok(self)
    }

    /// Swaps the tokenizer registered as `name` for one of the same phase,
    /// keeping its priority. Fallbacks can be replaced by name too.
    pub fn replace_tokenizer(
        &mut self,
        name: &str,
        tokenizer: Tokenizer,
    ) -> Result<&mut Self, ParserError> {
        let phase = if self.block.contains(name) || self.is_fallback(Phase::Block, name) {
            Phase::Block
        } else if self.inline.contains(name) || self.is_fallback(Phase::Inline, name) {
            Phase::Inline
        } else {
            return Err(ParserError::UnknownTokenizer(name.to_string()));
        };
        let new_name = tokenizer.name();
        if new_name != name && self.is_taken(new_name) {
            return Err(ParserError::DuplicateTokenizer(new_name.to_string()));
        }
        match (phase, tokenizer) {
            (Phase::Block, Tokenizer::Block(t)) if self.is_fallback(Phase::Block, name) => {
                self.block_fallback = Some(t);
            }
            (Phase::Block, Tokenizer::Block(t)) => self.block.replace(name, new_name, t)?,
            (Phase::Inline, Tokenizer::Inline(t)) if self.is_fallback(Phase::Inline, name) => {
                self.inline_fallback = Some(t);
            }
            (Phase::Inline, Tokenizer::Inline(t)) => self.inline.replace(name, new_name, t)?,
            _ => return Err(ParserError::PhaseMismatch(name.to_string())),
        }
        log::trace!("replaced tokenizer {name} with {new_name}");
        self.invalidate();
        Ok(self)
    }

    pub fn unregister_tokenizer(&mut self, name: &str) -> Result<&mut Self, ParserError> {
        if self.block.contains(name) {
            self.block.unregister(name)?;
        } else {
            self.inline.unregister(name)?;
        }
        log::trace!("unregistered tokenizer {name}");
        self.invalidate();
        Ok(self)
    }

    /// Registered tokenizer names in dispatch order, fallback last.
    pub fn tokenizers_for(&self, phase: Phase) -> Vec<&'static str> {
        match phase {
            Phase::Block => self
                .block
                .names()
                .into_iter()
                .chain(self.block_fallback.as_ref().map(|t| t.name()))
                .collect(),
            Phase::Inline => self
                .inline
                .names()
                .into_iter()
                .chain(self.inline_fallback.as_ref().map(|t| t.name()))
                .collect(),
        }
    }

    /// Whether any registry or fallback of either phase already uses `name`.
    fn is_taken(&self, name: &str) -> bool {
        self.block.contains(name)
            || self.inline.contains(name)
            || self.is_fallback(Phase::Block, name)
            || self.is_fallback(Phase::Inline, name)
    }

    fn is_fallback(&self, phase: Phase, name: &str) -> bool {
        match phase {
            Phase::Block => self.block_fallback.as_ref().is_some_and(|t| t.name() == name),
            Phase::Inline => self.inline_fallback.as_ref().is_some_and(|t| t.name() == name),
        }
    }

    fn invalidate(&mut self) {
        self.hooks.take();
    }

    /// Parses `source` into a `root` node.
    pub fn parse(&self, source: &str) -> Result<Node, ParserError> {
        let block_fallback = self
            .block_fallback
            .as_deref()
            .ok_or(ParserError::MissingFallback("block"))?;
        let inline_fallback = self
            .inline_fallback
            .as_deref()
            .ok_or(ParserError::MissingFallback("inline"))?;

        let blocks: Vec<&dyn BlockTokenizer> = self
            .block
            .iter()
            .map(|e| e.tokenizer.as_ref())
            .chain(iter::once(block_fallback))
            .collect();
        let inlines: Vec<&dyn InlineTokenizer> = self
            .inline
            .iter()
            .map(|e| e.tokenizer.as_ref())
            .chain(iter::once(inline_fallback))
            .collect();
        let hooks = self.hooks.get_or_init(|| {
            let priorities: Vec<i32> = self.inline.iter().map(|e| e.priority).collect();
            HookTable::build(&blocks, &inlines, &priorities)
        });

        let points = normalize(source);
        log::debug!(
            "normalized {} code points over {} lines",
            points.len(),
            points.last().map_or(0, |p| p.line)
        );

        let block_engine = BlockEngine::new(&blocks, hooks, self.options.max_nesting_depth);
        let mut root = block_engine.run(&points)?;
        log::debug!("matched {} top-level blocks", root.children.len());

        let replaced = transform_tree(&blocks, &mut root, &points);
        log::debug!("post-match rewrote {replaced} sibling lists");

        let mut meta = MetaRegistry::default();
        collect_meta(&blocks, &root, &points, &mut meta);
        log::debug!(
            "collected {} definitions and {} footnotes",
            meta.definition_count(),
            meta.footnote_count()
        );

        let inline_engine = InlineEngine::new(
            &inlines,
            hooks,
            &meta,
            self.options.keep_references,
            self.options.max_nesting_depth,
        );
        let ctx = BlockParseContext::new(&points, &meta, &inline_engine);
        let children = parse_children(&blocks, &mut root, &ctx)?;

        let position = calc_position(&points, NodeInterval::new(0, points.len()));
        let mut node = Node::with_children(NodeKind::Root, children, Some(position));
        if !self.options.should_reserve_position {
            node.remove_positions();
        }
        Ok(node)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::gfm()
    }
}

/// Parses `source` with a shared default GFM parser.
pub fn parse(source: &str) -> Result<Node, ParserError> {
    static DEFAULT: OnceLock<Parser> = OnceLock::new();
    DEFAULT.get_or_init(Parser::gfm).parse(source)
}
