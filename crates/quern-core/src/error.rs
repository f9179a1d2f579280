use crate::{
    span::Span,
    types::{AtomType, SeqType},
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// CompileError
///
/// Static errors raised while compiling an expression tree. A compile error
/// from a non-first operand is not returned; it is parked in a
/// deferred-failure node and only surfaces if evaluation reaches it.
///

#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum CompileError {
    #[error("type mismatch at {span}: expected {expected}, found {found}")]
    TypeMismatch {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("invalid cast target at {span}: {target}")]
    InvalidCastTarget { target: SeqType, span: Span },

    #[error("malformed pattern '{pattern}' at {span}: {reason}")]
    MalformedPattern {
        pattern: String,
        reason: String,
        span: Span,
    },

    #[error("{name}() at {span} expects {expected} argument(s), found {found}")]
    Arity {
        name: &'static str,
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("typeswitch at {span} has no default case")]
    MissingDefaultCase { span: Span },

    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl CompileError {
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::TypeMismatch { .. } => ErrorClass::Type,
            Self::InvalidCastTarget { .. }
            | Self::MalformedPattern { .. }
            | Self::Arity { .. }
            | Self::MissingDefaultCase { .. } => ErrorClass::Static,
            Self::Eval(err) => err.class(),
        }
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::TypeMismatch { .. } => "XPTY0004",
            Self::InvalidCastTarget { .. } => "XPST0080",
            Self::MalformedPattern { .. } => "FORX0002",
            Self::Arity { .. } => "XPST0017",
            Self::MissingDefaultCase { .. } => "XPST0003",
            Self::Eval(err) => err.code(),
        }
    }
}

///
/// EvalError
///

#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum EvalError {
    #[error(transparent)]
    Cast(#[from] CastError),

    #[error("cannot list '{path}': {reason}")]
    FileList { path: String, reason: String },

    #[error("invalid pattern '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },

    #[error("type error at {span}: expected {expected}, found {found}")]
    Type {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("effective boolean value not defined for {found} at {span}")]
    Ebv { found: String, span: Span },

    #[error("no context item at {span}")]
    NoContext { span: Span },

    #[error("variable ${name} is not bound at {span}")]
    UnboundVariable { name: String, span: Span },

    #[error(transparent)]
    Cancelled(#[from] CancelledError),

    #[error("deferred: {0}")]
    Deferred(Box<CompileError>),
}

impl EvalError {
    /// Error raised when a deferred-failure node is evaluated.
    /// Evaluation errors parked at compile time come back unchanged.
    #[must_use]
    pub fn deferred(err: &CompileError) -> Self {
        match err {
            CompileError::Eval(inner) => inner.clone(),
            other => Self::Deferred(Box::new(other.clone())),
        }
    }

    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Cast(_) | Self::Type { .. } | Self::Ebv { .. } => ErrorClass::Type,
            Self::FileList { .. } | Self::Pattern { .. } | Self::NoContext { .. } => {
                ErrorClass::Dynamic
            }
            Self::UnboundVariable { .. } => ErrorClass::Static,
            Self::Cancelled(_) => ErrorClass::Cancelled,
            Self::Deferred(err) => err.class(),
        }
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Cast(err) => err.code(),
            Self::FileList { .. } => "FILE0005",
            Self::Pattern { .. } => "FORX0002",
            Self::Type { .. } => "XPTY0004",
            Self::Ebv { .. } => "FORG0006",
            Self::NoContext { .. } => "XPDY0002",
            Self::UnboundVariable { .. } => "XPST0008",
            Self::Cancelled(_) => "QRN0001",
            Self::Deferred(err) => err.code(),
        }
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

///
/// CastError
///

#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum CastError {
    #[error("cannot cast {from} to {to}")]
    Unsupported { from: AtomType, to: AtomType },

    #[error("invalid lexical value for {to}: '{value}'")]
    InvalidLexical { value: String, to: AtomType },

    #[error("value out of range for {to}: {value}")]
    OutOfRange { value: String, to: AtomType },

    #[error("empty sequence cannot be cast to {to}")]
    EmptySequence { to: AtomType },
}

impl CastError {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unsupported { .. } | Self::EmptySequence { .. } => "XPTY0004",
            Self::InvalidLexical { .. } => "FORG0001",
            Self::OutOfRange { .. } => "FOCA0003",
        }
    }
}

///
/// CancelledError
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, ThisError)]
#[error("query evaluation cancelled")]
pub struct CancelledError;

///
/// ErrorClass
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Static,
    Type,
    Dynamic,
    Cancelled,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Static => "static",
            Self::Type => "type",
            Self::Dynamic => "dynamic",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
