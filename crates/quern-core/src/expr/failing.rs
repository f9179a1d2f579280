use crate::{
    error::{CompileError, EvalError},
    span::Span,
    types::SeqType,
};
use std::fmt;

///
/// Failing
///
/// Deferred-failure placeholder: stands in for an operand whose compile
/// error may only surface if evaluation reaches it. Keeps the static type
/// of the operand it replaced.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Failing {
    pub error: CompileError,
    pub seq_type: SeqType,
    pub span: Span,
}

impl Failing {
    #[must_use]
    pub const fn new(error: CompileError, seq_type: SeqType, span: Span) -> Self {
        Self {
            error,
            seq_type,
            span,
        }
    }

    #[must_use]
    pub fn raise(&self) -> EvalError {
        EvalError::deferred(&self.error)
    }
}

impl fmt::Display for Failing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error(\"{}\")", self.error.code())
    }
}

///
/// TESTS
///
