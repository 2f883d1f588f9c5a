//! Error taxonomy for the lexer, parser, renderer and dialect dispatcher.
//!
//! Plan errors are deliberately not part of [`PtahError`]: per the planner's
//! propagation policy, a failed column lookup degrades to an inline `Comment`
//! node rather than aborting the whole plan. See [`crate::planner::PlanError`].

use thiserror::Error;

/// A malformed token: an unterminated string or block comment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lex error at offset {offset}: {message}")]
pub struct LexError {
    pub offset: usize,
    pub message: String,
}

/// A token mismatch: the parser expected one production and found another.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at offset {offset}: expected {expected}, found {found}")]
pub struct ParseError {
    pub offset: usize,
    pub expected: String,
    pub found: String,
}

impl ParseError {
    pub fn new(offset: usize, expected: impl Into<String>, found: impl Into<String>) -> Self {
        ParseError {
            offset,
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// An unsupported statement or clause, named by its leading keyword.
    pub fn unsupported_keyword(offset: usize, keyword: &str) -> Self {
        ParseError::new(offset, "a supported statement or clause", format!("keyword `{}`", keyword))
    }
}

/// The parser exceeded its wall-clock deadline. Fatal for the parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse timed out after {budget_secs}s at offset {offset}")]
pub struct TimeoutError {
    pub offset: usize,
    pub budget_secs: u64,
}

/// An IR invariant was violated while rendering a node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("render error in {node}.{attribute}: {message}")]
pub struct RenderError {
    pub node: String,
    pub attribute: String,
    pub message: String,
}

impl RenderError {
    pub fn new(node: impl Into<String>, attribute: impl Into<String>, message: impl Into<String>) -> Self {
        RenderError {
            node: node.into(),
            attribute: attribute.into(),
            message: message.into(),
        }
    }
}

/// Dialect normalization returned the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported dialect: `{0}`")]
pub struct ConfigError(pub String);

/// The union of error kinds that can abort a pipeline stage outright.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PtahError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Timeout(#[from] TimeoutError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type PtahResult<T> = Result<T, PtahError>;
