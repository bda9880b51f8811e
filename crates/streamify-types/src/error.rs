use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid {kind} id: {value}")]
    InvalidId { kind: &'static str, value: String },

    #[error("invalid status filter: {0}")]
    InvalidStatus(String),

    #[error("invalid page request: {0}")]
    InvalidPage(String),

    #[error("illegal status transition: {from} -> {to}")]
    IllegalTransition { from: String, to: String },
}
