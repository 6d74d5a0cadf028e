use markdown_loom_config::ConfigError;

/// Failures raised while configuring or running a [`crate::Parser`].
///
/// Markdown input itself never fails to parse; every error here is either a
/// registry misconfiguration or the nesting guard tripping.
#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    #[error("Tokenizer already registered: {0}")]
    DuplicateTokenizer(String),
    #[error("No tokenizer registered under name: {0}")]
    UnknownTokenizer(String),
    #[error("Tokenizer {0} cannot be replaced by a tokenizer of a different phase")]
    PhaseMismatch(String),
    #[error("No {0} fallback tokenizer registered")]
    MissingFallback(&'static str),
    #[error("Nesting deeper than {limit} levels at line {line}")]
    NestingTooDeep { limit: usize, line: usize },
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
