//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violated ordering rules or malformed input.
/// These are independent of storage concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("two siblings share position {position}")]
    CoincidentPositions { position: u32 },

    #[error("outline line {line}: expected '- name' or '- name:', got '{content}'")]
    OutlineSyntax { line: usize, content: String },

    #[error("outline line {line}: indentation does not match any open level")]
    OutlineIndent { line: usize },

    #[error("outline names must be unique: {0}")]
    DuplicateName(String),
}
