use crate::{
    compile::{CompileContext, OptNote, Var},
    error::EvalError,
    eval::QueryContext,
    expr::{Expr, ExprKind, Transformed},
    span::Span,
    types::SeqType,
    value::Value,
};
use std::fmt;

///
/// VarRef
///

#[derive(Clone, Debug, PartialEq)]
pub struct VarRef {
    pub var: Var,
    pub span: Span,
}

impl VarRef {
    #[must_use]
    pub const fn new(var: Var, span: Span) -> Self {
        Self { var, span }
    }

    /// Declared type of the variable, or `item()*` when undeclared.
    #[must_use]
    pub fn seq_type(&self) -> SeqType {
        self.var.seq_type.unwrap_or(SeqType::ITEM_ZM)
    }

    pub(crate) fn inline(self, var: &Var, with: &Expr, cc: &mut CompileContext) -> Transformed {
        if self.var != *var {
            return Transformed::no(Expr::VarRef(self));
        }
        cc.info(OptNote::Inline, || format!("{self} := {with}"));

        Transformed::yes(cc.replace_with(ExprKind::VarRef, self.span, with.clone()))
    }

    pub(crate) fn evaluate(&self, qc: &QueryContext) -> Result<Value, EvalError> {
        qc.binding(self.var.id)
            .cloned()
            .ok_or_else(|| EvalError::UnboundVariable {
                name: self.var.name.clone(),
                span: self.span,
            })
    }
}

impl fmt::Display for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.var.name)
    }
}
