use std::fmt;
use thiserror::Error;

/// The id/name table a lookup went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierKind {
    Dimension,
    Coefficient,
    DataSpace,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IdentifierKind::Dimension => "dimension",
            IdentifierKind::Coefficient => "coefficient",
            IdentifierKind::DataSpace => "data space",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProblemShapeError {
    #[error("Malformed problem shape: {0}")]
    MalformedShape(String),
    #[error("Unknown {kind}: {ident}")]
    UnknownIdentifier { kind: IdentifierKind, ident: String },
    #[error("Problem shape used before initialization")]
    UseBeforeInit,
    #[error("Problem shape is already initialized")]
    AlreadyInitialized,
    #[error("Arity mismatch: expected {expected} values, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },
    #[error("Integer overflow while evaluating projection: {0}")]
    Overflow(String),
}

impl ProblemShapeError {
    pub fn malformed_shape(msg: impl Into<String>) -> Self {
        ProblemShapeError::MalformedShape(msg.into())
    }

    pub fn unknown_identifier(kind: IdentifierKind, ident: impl ToString) -> Self {
        ProblemShapeError::UnknownIdentifier {
            kind,
            ident: ident.to_string(),
        }
    }

    pub fn arity_mismatch(expected: usize, actual: usize) -> Self {
        ProblemShapeError::ArityMismatch { expected, actual }
    }

    pub fn overflow(msg: impl Into<String>) -> Self {
        ProblemShapeError::Overflow(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ProblemShapeError>;
