use crate::{
    compile::{CompileContext, OptNote, Var},
    error::{CompileError, EvalError},
    eval::QueryContext,
    expr::{Expr, ExprKind, Transformed},
    span::Span,
    types::{AtomType, SeqType},
    value::{Value, cast_value},
};
use std::fmt;

///
/// Cast
///
/// `operand cast as target`. The target is one atomic type with occurrence
/// one or zero-or-one.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Cast {
    pub operand: Box<Expr>,
    pub target: SeqType,
    pub span: Span,
}

impl Cast {
    #[must_use]
    pub fn new(operand: Expr, target: SeqType, span: Span) -> Self {
        Self {
            operand: Box::new(operand),
            target,
            span,
        }
    }

    pub(crate) fn compile(self, cc: &mut CompileContext) -> Result<Expr, CompileError> {
        let (target, span) = (self.target, self.span);
        if !target.atom.is_castable_target() || target.occ.min > 1 || target.occ.max != 1 {
            return Err(CompileError::InvalidCastTarget { target, span });
        }

        let operand = (*self.operand).compile(cc)?;
        let found = operand.seq_type();
        if found.occ.min > 1 {
            return Err(CompileError::TypeMismatch {
                expected: format!("{}?", AtomType::AnyAtomic),
                found: found.to_string(),
                span,
            });
        }

        Self::new(operand, target, span).optimize(cc)
    }

    pub(crate) fn inline(
        self,
        var: &Var,
        with: &Expr,
        cc: &mut CompileContext,
    ) -> Result<Transformed, CompileError> {
        let (target, span) = (self.target, self.span);
        let done = (*self.operand).inline(var, with, cc)?;
        let node = Self::new(done.expr, target, span);

        if done.changed {
            Ok(Transformed::yes(node.optimize(cc)?))
        } else {
            Ok(Transformed::no(Expr::Cast(node)))
        }
    }

    pub(crate) fn optimize(self, cc: &mut CompileContext) -> Result<Expr, CompileError> {
        let Self {
            operand,
            target,
            span,
        } = self;

        // pre-evaluate literal operands
        if let Expr::Literal(value) = operand.as_ref() {
            let cast = cast_value(value, target, span)?;
            cc.info(OptNote::PreEvaluate, || format!("{value} cast as {target}"));

            return Ok(cc.replace_with(ExprKind::Cast, span, Expr::Literal(cast)));
        }

        // the static type already guarantees the result
        if elidable(target.atom) {
            let found = operand.seq_type();
            if found == target
                || (found.atom == target.atom && found.is_one() && target.zero_or_one_items())
            {
                cc.info(OptNote::Elide, || format!("remove cast of {operand} to {target}"));
                return Ok(cc.replace_with(ExprKind::Cast, span, *operand));
            }
        }

        Ok(Expr::Cast(Self {
            operand,
            target,
            span,
        }))
    }

    pub(crate) fn evaluate(&self, qc: &mut QueryContext) -> Result<Value, EvalError> {
        let value = self.operand.evaluate(qc)?;

        cast_value(&value, self.target, self.span)
    }
}

// Targets whose cast is a no-op when the operand already has the type.
const fn elidable(atom: AtomType) -> bool {
    matches!(
        atom,
        AtomType::Boolean
            | AtomType::Float
            | AtomType::Double
            | AtomType::QName
            | AtomType::AnyUri
    )
}

impl fmt::Display for Cast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} cast as {}", self.operand, self.target)
    }
}
